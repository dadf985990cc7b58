//! Data access layer.
//!
//! Every function takes a `&mut SqliteConnection` rather than the pool: a
//! conversation turn runs inside a single transaction, and all reads and
//! writes for that turn must go through the same connection.

mod card_repo;
mod deck_repo;
mod user_repo;

pub use card_repo::*;
pub use deck_repo::*;
pub use user_repo::*;

#[cfg(test)]
pub mod tests {
    use crate::db::{self, DbPool};
    use diesel_migrations::MigrationHarness;

    /// Sets up a test database with migrations applied.
    ///
    /// Uses a unique shared in-memory database per test: plain ":memory:"
    /// gives each pooled connection its own separate database, so migrations
    /// run on one connection wouldn't be visible on others. A unique URI with
    /// cache=shared makes all connections in this pool share one database
    /// while staying isolated from other tests.
    pub fn setup_test_db() -> DbPool {
        let unique_id = uuid::Uuid::new_v4();
        let database_url = format!("file:test_{}?mode=memory&cache=shared", unique_id);
        let pool = db::init_pool(&database_url);

        let mut conn = pool.get().expect("Failed to get connection");
        conn.run_pending_migrations(crate::MIGRATIONS)
            .expect("Failed to run migrations");

        pool
    }
}

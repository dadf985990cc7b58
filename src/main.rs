use std::sync::Arc;

use clap::Parser;
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use memobot::config::{get_config, CliArgs};
use memobot::poller::{self, RehearsalNotice};
use memobot::session::Session;
use memobot::tz::TimezoneResolver;
use memobot::{create_app, db, run_migrations};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    dotenv::dotenv().ok();

    let args = CliArgs::parse();
    let config = get_config(args);

    let pool = db::init_pool(&config.database_url);
    let mut conn = pool.get()?;
    run_migrations(&mut conn)?;
    drop(conn);

    let resolver = match &config.maps_api_key {
        Some(api_key) => TimezoneResolver::Http {
            client: reqwest::Client::new(),
            api_key: api_key.clone(),
        },
        None => {
            warn!("no maps API key configured, locations will resolve to UTC");
            TimezoneResolver::Fixed("UTC".to_string())
        }
    };

    let session = Arc::new(Session::new(pool.clone(), config.algorithm(), resolver));

    // The poller hands reminders to this channel; a real transport would
    // push them to the chat service. This binary logs them.
    let (notice_tx, mut notice_rx) = mpsc::unbounded_channel::<RehearsalNotice>();
    tokio::spawn(poller::run(pool, config.poll_interval(), notice_tx));
    tokio::spawn(async move {
        while let Some(notice) = notice_rx.recv().await {
            match serde_json::to_string(&notice.actions) {
                Ok(actions) => info!(user_id = notice.user_id, actions, "rehearsal notice"),
                Err(err) => warn!(user_id = notice.user_id, error = %err, "unserializable notice"),
            }
        }
    });

    let app = create_app(session);

    info!("Listening on {}", config.listen_addr);
    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

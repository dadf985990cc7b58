use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::sm::{Algorithm, SM2, SM2_MOD};

/// Configuration for the memobot server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// URL for the database connection
    pub database_url: String,
    /// Address the HTTP server binds to
    pub listen_addr: String,
    /// Scheduling algorithm variant: "sm2" or "sm2-mod"
    pub algorithm: String,
    /// Seconds between rehearsal poll passes
    pub poll_interval_secs: u64,
    /// API key for the time zone lookup; without one, locations resolve to
    /// this fixed zone instead
    pub maps_api_key: Option<String>,
}

/// Update structure for Config with all fields optional
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConfigUpdate {
    #[serde(default)]
    pub database_url: Option<String>,
    #[serde(default)]
    pub listen_addr: Option<String>,
    #[serde(default)]
    pub algorithm: Option<String>,
    #[serde(default)]
    pub poll_interval_secs: Option<u64>,
    #[serde(default)]
    pub maps_api_key: Option<String>,
}

/// Command line arguments for the application
#[derive(Parser, Debug)]
#[clap(name = "memobot", about = "A spaced-repetition flash-card chat assistant")]
pub struct CliArgs {
    /// Database URL
    #[clap(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Listen address
    #[clap(long, env = "LISTEN_ADDR")]
    pub listen_addr: Option<String>,

    /// Scheduling algorithm variant ("sm2" or "sm2-mod")
    #[clap(long, env = "ALGORITHM")]
    pub algorithm: Option<String>,

    /// Seconds between rehearsal poll passes
    #[clap(long, env = "POLL_INTERVAL_SECS")]
    pub poll_interval_secs: Option<u64>,

    /// Google Maps API key for time zone lookups
    #[clap(long, env = "MAPS_API_KEY")]
    pub maps_api_key: Option<String>,
}

impl Config {
    /// Applies a config update to the current configuration
    pub fn apply_update(self, update: ConfigUpdate) -> Self {
        Self {
            database_url: update.database_url.unwrap_or(self.database_url),
            listen_addr: update.listen_addr.unwrap_or(self.listen_addr),
            algorithm: update.algorithm.unwrap_or(self.algorithm),
            poll_interval_secs: update.poll_interval_secs.unwrap_or(self.poll_interval_secs),
            maps_api_key: update.maps_api_key.or(self.maps_api_key),
        }
    }

    /// Resolves the configured algorithm variant.
    pub fn algorithm(&self) -> &'static Algorithm {
        match self.algorithm.as_str() {
            "sm2" => &SM2,
            "sm2-mod" => &SM2_MOD,
            other => {
                warn!(algorithm = other, "unknown algorithm, using sm2-mod");
                &SM2_MOD
            }
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

/// Returns the base (default) configuration
pub fn base_config(config_path: Option<PathBuf>) -> Config {
    let database_url = config_path.map_or("memobot.db".to_string(), |path| {
        path.join("memobot.db").to_string_lossy().to_string()
    });

    Config {
        database_url,
        listen_addr: "127.0.0.1:3000".to_string(),
        algorithm: "sm2-mod".to_string(),
        poll_interval_secs: 10,
        maps_api_key: None,
    }
}

/// Loads configuration from a TOML file
pub fn config_from_file(config_path: Option<PathBuf>) -> Result<ConfigUpdate, String> {
    let Some(config_path) = config_path else {
        return Ok(ConfigUpdate::default());
    };

    if !config_path.exists() {
        info!("Config file not found at {:?}, using defaults", config_path);
        return Ok(ConfigUpdate::default());
    }

    match fs::read_to_string(&config_path) {
        Ok(content) => match toml::from_str::<ConfigUpdate>(&content) {
            Ok(config) => {
                info!("Loaded configuration from {:?}", config_path);
                Ok(config)
            }
            Err(e) => {
                warn!("Failed to parse config file: {}", e);
                Err(format!("Failed to parse config file: {}", e))
            }
        },
        Err(e) => {
            warn!("Failed to read config file: {}", e);
            Err(format!("Failed to read config file: {}", e))
        }
    }
}

/// Loads configuration from command line arguments
pub fn config_from_args(args: CliArgs) -> ConfigUpdate {
    ConfigUpdate {
        database_url: args.database_url,
        listen_addr: args.listen_addr,
        algorithm: args.algorithm,
        poll_interval_secs: args.poll_interval_secs,
        maps_api_key: args.maps_api_key,
    }
}

/// Gets the complete configuration by combining defaults with values from the
/// config file, environment variables, and command line arguments in order of
/// increasing precedence
pub fn get_config(args: CliArgs) -> Config {
    let mut config_path = match ProjectDirs::from("com", "memobot", "memobot") {
        Some(proj_dirs) => Some(PathBuf::from(proj_dirs.config_dir())),
        None => {
            warn!("Could not determine XDG config directory, skipping config file");
            None
        }
    };

    config_path = config_path.and_then(|path| {
        if !path.exists() {
            info!("Config path not found at {:?}, using defaults", path);
            None
        } else {
            Some(path.join("config.toml"))
        }
    });

    let base = base_config(config_path.clone().and_then(|p| p.parent().map(PathBuf::from)));

    let config = base
        .apply_update(config_from_file(config_path).unwrap_or_default())
        .apply_update(config_from_args(args));

    info!(
        "Final configuration: database_url={}, listen_addr={}, algorithm={}, poll_interval={}s",
        config.database_url, config.listen_addr, config.algorithm, config.poll_interval_secs
    );

    config
}

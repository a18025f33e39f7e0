use std::path::PathBuf;

use log::LevelFilter;

use crate::api::client::DEFAULT_BASE_URL;
use crate::logging::LogConfig;

/// Runtime configuration, assembled from the environment (a local `.env`
/// file is honored via dotenv).
///
/// - `AGORA_API_URL` overrides the GoRest base URL.
/// - `AGORA_LOG` sets the log level, or `off` to disable logging.
/// - `AGORA_LOG_FILE` moves the log file.
#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    pub log: LogConfig,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();

        let base_url = std::env::var("AGORA_API_URL")
            .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        let mut log = LogConfig::default();
        if let Ok(level) = std::env::var("AGORA_LOG") {
            match level.to_lowercase().as_str() {
                "off" => log.enabled = false,
                "error" => log.level = LevelFilter::Error,
                "warn" => log.level = LevelFilter::Warn,
                "info" => log.level = LevelFilter::Info,
                "debug" => log.level = LevelFilter::Debug,
                "trace" => log.level = LevelFilter::Trace,
                other => {
                    eprintln!("Unknown AGORA_LOG level '{other}', keeping default");
                }
            }
        }
        if let Ok(file) = std::env::var("AGORA_LOG_FILE") {
            log.log_file = PathBuf::from(file);
        }

        Self { base_url, log }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            log: LogConfig::default(),
        }
    }
}

use std::fs::{File, OpenOptions};
use std::path::PathBuf;

use log::LevelFilter;
use simplelog::{ConfigBuilder, WriteLogger};

/// Logging configuration for the client.
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub enabled: bool,
    pub log_file: PathBuf,
    pub clear_on_startup: bool,
    pub level: LevelFilter,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            log_file: PathBuf::from("agora.log"),
            clear_on_startup: true,
            level: LevelFilter::Debug,
        }
    }
}

impl LogConfig {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }
}

/// Initializes the file logger. Logging goes to a file rather than the
/// terminal so diagnostics never interleave with the app's own output.
pub fn init_logging(config: &LogConfig) -> anyhow::Result<()> {
    if !config.enabled {
        let _ = WriteLogger::init(
            LevelFilter::Off,
            simplelog::Config::default(),
            std::io::sink(),
        );
        return Ok(());
    }

    if config.clear_on_startup {
        let _ = File::create(&config.log_file)?;
    }

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_file)?;

    let log_config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_time_offset_to_local()
        .unwrap_or_else(|builder| builder)
        .build();

    WriteLogger::init(config.level, log_config, log_file)?;

    log::info!(
        "Logging initialized: file={}, level={:?}",
        config.log_file.display(),
        config.level
    );
    Ok(())
}

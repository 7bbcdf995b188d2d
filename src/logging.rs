//! Log subscriber setup

use std::fs::OpenOptions;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;
use crate::error::{Error, Result};

/// Install a global fmt subscriber
///
/// `RUST_LOG` takes precedence over the configured level. Output goes to the
/// configured file when one is set, stderr otherwise.
///
/// # Errors
/// Fails if the level does not parse, the log file cannot be opened, or a
/// global subscriber is already installed.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level).map_err(|e| {
            Error::InvalidConfig(format!("Invalid log level '{}': {}", config.level, e))
        })?,
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    let installed = match &config.file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        None => builder.with_writer(std::io::stderr).try_init(),
    };

    installed.map_err(|e| Error::Config(format!("Failed to install log subscriber: {}", e)))
}

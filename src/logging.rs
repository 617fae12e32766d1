/// File logging.
///
/// The terminal belongs to the card while it runs, so trace output goes to
/// a plain file. `RUST_LOG` wins over the configured level.

use std::fs::OpenOptions;
use std::sync::Mutex;

use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LogConfig;
use crate::error::{CardError, Result};

/// Install the global subscriber. Does nothing when logging is disabled.
pub fn init(cfg: &LogConfig) -> Result<()> {
    if !cfg.enabled {
        return Ok(());
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&cfg.file)
        .map_err(|source| CardError::LogFile { path: cfg.file.clone(), source })?;

    let filter = match EnvFilter::try_from_default_env() {
        Ok(f) => f,
        Err(_) => EnvFilter::try_new(&cfg.level).map_err(|e| CardError::LogInit(e.to_string()))?,
    };

    fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .map_err(|e| CardError::LogInit(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn disabled_logging_touches_nothing() {
        let cfg = LogConfig {
            enabled: false,
            level: "info".into(),
            file: PathBuf::from("/nonexistent/dir/valentine.log"),
        };
        assert!(init(&cfg).is_ok());
    }

    #[test]
    fn unwritable_log_path_is_reported() {
        let cfg = LogConfig {
            enabled: true,
            level: "info".into(),
            file: PathBuf::from("/nonexistent/dir/valentine.log"),
        };
        assert!(matches!(init(&cfg), Err(CardError::LogFile { .. })));
    }
}

/// Failures that can actually happen. The card's own "errors" are jokes in
/// `domain::script`; these are the real ones.

use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum CardError {
    #[error("terminal I/O failed: {0}")]
    Terminal(#[from] io::Error),

    #[error("could not read {}: {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        source: io::Error,
    },

    #[error("{} parse error: {source}", path.display())]
    ConfigParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("could not open log file {}: {source}", path.display())]
    LogFile {
        path: PathBuf,
        source: io::Error,
    },

    #[error("logger initialization failed: {0}")]
    LogInit(String),
}

pub type Result<T> = std::result::Result<T, CardError>;

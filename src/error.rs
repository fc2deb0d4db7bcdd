use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("config validation error: {0}")]
    ConfigValidation(String),

    #[error("no API key configured: set LINEAR_API_KEY or run `todolink configure api-key`")]
    MissingApiKey,

    #[error("tracker error: {0}")]
    Tracker(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {1} out of range for {0}")]
    LineOutOfRange(PathBuf, usize),
}

pub type Result<T> = std::result::Result<T, Error>;

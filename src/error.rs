use thiserror::Error;

#[derive(Error, Debug)]
pub enum BankError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("malformed word bank document: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("word bank request to '{url}' returned status {status}")]
    Status { url: String, status: u16 },
    #[cfg(feature = "network")]
    #[error("failed to fetch word bank from '{url}'")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("network support is disabled in this build")]
    NetworkDisabled,
    #[error("no word bank available for language '{0}'")]
    Unavailable(String),
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown setting '{0}'")]
    UnknownKey(String),
    #[error("invalid value '{value}' for setting '{key}'")]
    InvalidValue { key: String, value: String },
}

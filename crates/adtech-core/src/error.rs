use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid request body")]
    RequestParse(#[source] serde_json::Error),

    #[error("missing required field '{0}'")]
    MissingField(&'static str),

    #[error("failed to encode response body")]
    ResponseEncode(#[source] serde_json::Error),

    #[error("failed to read config file '{path}'")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}'")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

pub type Result<T> = std::result::Result<T, CoreError>;

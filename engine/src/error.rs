use std::path::PathBuf;

use thiserror::Error;

/// Problems with ability, item, or enemy tables.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("failed to parse content: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("duplicate entry '{0}'")]
    Duplicate(String),
    #[error("level {level} already unlocks '{existing}', cannot also unlock '{name}'")]
    LevelTaken {
        level: u32,
        existing: String,
        name: String,
    },
    #[error("'{name}' has min damage {min} above max damage {max}")]
    DamageRange { name: String, min: i32, max: i32 },
    #[error("'{name}' has an out-of-range {field}")]
    OutOfRange { name: String, field: &'static str },
    #[error("unknown entry '{0}'")]
    Unknown(String),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("player record is malformed: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("no saved player with id '{0}'")]
    NotFound(String),
    #[error("'{0}' is not a valid player id")]
    InvalidId(String),
}

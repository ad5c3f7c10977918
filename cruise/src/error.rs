use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading vehicle type definitions.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid vehicle type file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("vehicle type '{0}' is defined more than once")]
    DuplicateType(String),
    #[error("vehicle type '{vtype}': invalid {name} = {value}")]
    InvalidParameter {
        vtype: String,
        name: &'static str,
        value: f64,
    },
}

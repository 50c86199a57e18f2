//! Failures while loading config or resolving the memory resource.

use std::path::PathBuf;
use thiserror::Error;

/// Errors returned by the config loader and resource resolution.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A config layer or working directory could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// A layer is not valid JSON5.
    #[error("failed to parse {layer}: {source}")]
    Parse {
        layer: String,
        #[source]
        source: json5::Error,
    },
    /// The merged layers did not decode into a config.
    #[error("failed to decode config: {0}")]
    Decode(#[from] serde_json::Error),
    /// A key is unknown or has the wrong type.
    #[error("invalid config at {path}: {message}")]
    InvalidField { path: String, message: String },
    /// A decoded value is outside its allowed range.
    #[error("invalid {field}: {message}")]
    OutOfRange {
        field: &'static str,
        message: &'static str,
    },
    /// Neither `memory.resource_id` nor `memory.resource_file` is set.
    #[error("no memory resource configured (set memory.resource_id or memory.resource_file)")]
    MissingResource,
    /// The legacy resource file is unreadable or carries no `memory_id`.
    #[error("invalid resource file {}: {message}", path.display())]
    ResourceFile { path: PathBuf, message: String },
}

impl ConfigError {
    pub(crate) fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::Read {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn parse(layer: impl Into<String>, source: json5::Error) -> Self {
        ConfigError::Parse {
            layer: layer.into(),
            source,
        }
    }
}

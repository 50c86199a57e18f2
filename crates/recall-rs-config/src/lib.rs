//! Configuration models and layered config loading.
//!
//! This crate owns the recall config schema, validation, and layer-merging
//! logic used by the CLI and by hosts embedding the memory hook.

mod error;
mod loader;
mod model;

/// Public error type returned by config loading and validation APIs.
pub use error::ConfigError;
/// Layered config types, loader options and the legacy resource file reader.
pub use loader::{
    ConfigLayer, ConfigLayerSource, LayeredConfig, LayeredConfigOptions, load_resource_file,
};
/// Configuration schema models.
pub use model::*;

//! IO helpers for reading config layers from disk.

use super::{ConfigLayerSource, DEFAULT_CONFIG_DIR, DEFAULT_CONFIG_FILE, schema};
use crate::ConfigError;
use directories::UserDirs;
use log::debug;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Load and schema-check a layer from disk.
pub(super) fn load_layer(source: ConfigLayerSource, path: &Path) -> Result<Value, ConfigError> {
    debug!(
        "loading config layer (source={:?}, path={})",
        source,
        path.display()
    );
    let label = layer_label(source, path);
    let contents = fs::read_to_string(path).map_err(|err| ConfigError::read(path, err))?;
    let value: Value =
        json5::from_str(&contents).map_err(|err| ConfigError::parse(label.as_str(), err))?;
    schema::validate_layer_schema(&value, &label)?;
    Ok(value)
}

/// Build a user-friendly label for schema validation errors.
pub(super) fn layer_label(source: ConfigLayerSource, path: &Path) -> String {
    let name = match source {
        ConfigLayerSource::User => "user",
        ConfigLayerSource::Project => "project",
        ConfigLayerSource::Cwd => "cwd",
        ConfigLayerSource::Runtime => "runtime",
    };
    format!("{name}({})", path.display())
}

/// Default user config path under the home directory.
pub(super) fn default_user_config_path() -> Option<PathBuf> {
    UserDirs::new().map(|dirs| {
        dirs.home_dir()
            .join(DEFAULT_CONFIG_DIR)
            .join(DEFAULT_CONFIG_FILE)
    })
}

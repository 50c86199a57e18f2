//! Layered configuration loader.
//!
//! Discovers configuration layers (user/project/cwd/runtime), validates the
//! schema of each, deep-merges them and produces a final `RecallConfig`.

mod layer_io;
mod merge;
mod schema;
mod utils;

#[cfg(test)]
mod tests;

use crate::{ConfigError, MemoryConfig, RecallConfig};
use log::{debug, info};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Default config filename in local layers.
const DEFAULT_CONFIG_FILE: &str = "recall.json5";
/// Default config directory under the user's home.
const DEFAULT_CONFIG_DIR: &str = ".recall";
/// Marker files/dirs that identify a project root.
const DEFAULT_PROJECT_ROOT_MARKERS: &[&str] = &[".git"];

/// Effective config plus metadata about which layers were loaded.
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    /// The merged, validated config.
    pub config: RecallConfig,
    /// Metadata for each layer that contributed.
    pub layers: Vec<ConfigLayer>,
}

/// Origin for a single config layer in the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigLayerSource {
    /// User-specific configuration.
    User,
    /// Project root configuration.
    Project,
    /// Current working directory configuration.
    Cwd,
    /// Runtime overrides (highest precedence).
    Runtime,
}

/// Metadata about a loaded config layer.
#[derive(Debug, Clone)]
pub struct ConfigLayer {
    /// Layer origin.
    pub source: ConfigLayerSource,
    /// Location on disk.
    pub path: PathBuf,
}

/// Options controlling layered config discovery and overrides.
#[derive(Debug, Clone)]
pub struct LayeredConfigOptions {
    /// Working directory used to resolve local layers.
    pub cwd: PathBuf,
    /// Optional user config path (defaults to `~/.recall/recall.json5`).
    pub user_config_path: Option<PathBuf>,
    /// Runtime override config paths applied last.
    pub runtime_paths: Vec<PathBuf>,
    /// Marker files/dirs used to detect the project root.
    pub project_root_markers: Vec<String>,
}

impl LayeredConfigOptions {
    /// Create options with default layer locations for the provided cwd.
    pub fn new(cwd: impl AsRef<Path>) -> Self {
        Self {
            cwd: cwd.as_ref().to_path_buf(),
            user_config_path: layer_io::default_user_config_path(),
            runtime_paths: Vec::new(),
            project_root_markers: DEFAULT_PROJECT_ROOT_MARKERS
                .iter()
                .map(|marker| marker.to_string())
                .collect(),
        }
    }

    /// Override the user config location (`None` disables the user layer).
    pub fn with_user_path(mut self, path: Option<PathBuf>) -> Self {
        self.user_config_path = path;
        self
    }

    /// Add a runtime override config path that is applied last.
    pub fn with_runtime_path(mut self, path: impl AsRef<Path>) -> Self {
        self.runtime_paths.push(path.as_ref().to_path_buf());
        self
    }
}

impl RecallConfig {
    /// Load a single config from a path (no layering).
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        info!("loading config from path: {}", path.display());
        let contents = fs::read_to_string(path).map_err(|err| ConfigError::read(path, err))?;
        let label = path.display().to_string();
        let value: Value =
            json5::from_str(&contents).map_err(|err| ConfigError::parse(label.as_str(), err))?;
        config_from_value(value, &label)
    }

    /// Load a single config from JSON5 contents (no layering).
    pub fn load_from_str(contents: &str) -> Result<Self, ConfigError> {
        debug!("loading config from raw contents (len={})", contents.len());
        let value: Value =
            json5::from_str(contents).map_err(|err| ConfigError::parse("config", err))?;
        config_from_value(value, "config")
    }

    /// Load a layered config stack using the default layer locations.
    pub fn load_layered(cwd: impl AsRef<Path>) -> Result<LayeredConfig, ConfigError> {
        info!(
            "loading layered config with defaults (cwd={})",
            cwd.as_ref().display()
        );
        Self::load_layered_with_options(LayeredConfigOptions::new(cwd))
    }

    /// Load a layered config stack using explicit layer locations and overrides.
    ///
    /// Layer precedence (low -> high): user, project, cwd, runtime overrides.
    pub fn load_layered_with_options(
        options: LayeredConfigOptions,
    ) -> Result<LayeredConfig, ConfigError> {
        let cwd = utils::normalize_path(&options.cwd)?;
        debug!("normalized cwd for config load: {}", cwd.display());
        let mut candidates = Vec::new();
        if let Some(path) = options.user_config_path.clone() {
            candidates.push((ConfigLayerSource::User, path));
        }
        match utils::find_project_root(&cwd, &options.project_root_markers) {
            Some(project_root) => {
                debug!("resolved project root: {}", project_root.display());
                candidates.push((
                    ConfigLayerSource::Project,
                    project_root.join(DEFAULT_CONFIG_FILE),
                ));
            }
            None => debug!("project root not found; skipping project layer"),
        }
        candidates.push((ConfigLayerSource::Cwd, cwd.join(DEFAULT_CONFIG_FILE)));

        let mut layers = Vec::new();
        let mut merged = Value::Object(serde_json::Map::new());
        let mut seen_paths = HashSet::new();

        for (source, path) in candidates {
            if !path.exists() {
                debug!(
                    "skipping missing layer (source={:?}, path={})",
                    source,
                    path.display()
                );
                continue;
            }
            if !seen_paths.insert(utils::unique_path(&path)) {
                debug!(
                    "skipping duplicate layer (source={:?}, path={})",
                    source,
                    path.display()
                );
                continue;
            }
            let value = layer_io::load_layer(source, &path)?;
            merge::merge_json_values(&mut merged, &value);
            layers.push(ConfigLayer { source, path });
        }

        for runtime_path in &options.runtime_paths {
            let value = layer_io::load_layer(ConfigLayerSource::Runtime, runtime_path)?;
            merge::merge_json_values(&mut merged, &value);
            debug!("loaded runtime layer (path={})", runtime_path.display());
            layers.push(ConfigLayer {
                source: ConfigLayerSource::Runtime,
                path: runtime_path.clone(),
            });
        }

        let config = config_from_value(merged, "effective")?;
        info!("layered config loaded (layers={})", layers.len());
        Ok(LayeredConfig { config, layers })
    }

    /// Validate configuration invariants that cannot be expressed in serde.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let memory = &self.memory;
        if memory
            .resource_id
            .as_deref()
            .is_some_and(|id| id.trim().is_empty())
        {
            return Err(ConfigError::OutOfRange {
                field: "memory.resource_id",
                message: "must not be empty",
            });
        }
        if memory.recent_turns == 0 {
            return Err(ConfigError::OutOfRange {
                field: "memory.recent_turns",
                message: "must be at least 1",
            });
        }
        if memory.top_k == 0 {
            return Err(ConfigError::OutOfRange {
                field: "memory.top_k",
                message: "must be at least 1",
            });
        }
        if memory.timeout_ms == 0 {
            return Err(ConfigError::OutOfRange {
                field: "memory.timeout_ms",
                message: "must be non-zero",
            });
        }
        if memory.persist_timeout_ms == 0 {
            return Err(ConfigError::OutOfRange {
                field: "memory.persist_timeout_ms",
                message: "must be non-zero",
            });
        }
        if !(1..=64).contains(&self.identity.hash_len) {
            return Err(ConfigError::OutOfRange {
                field: "identity.hash_len",
                message: "must be between 1 and 64",
            });
        }
        Ok(())
    }
}

impl MemoryConfig {
    /// Resolve the memory resource id.
    ///
    /// An inline `resource_id` wins; otherwise `resource_file` is read,
    /// relative to `base_dir` when not absolute.
    pub fn resolve_resource_id(&self, base_dir: &Path) -> Result<String, ConfigError> {
        if let Some(id) = &self.resource_id {
            return Ok(id.clone());
        }
        let Some(file) = &self.resource_file else {
            return Err(ConfigError::MissingResource);
        };
        load_resource_file(base_dir.join(file))
    }
}

/// Legacy resource pointer written by memory provisioning.
#[derive(Debug, Deserialize)]
struct ResourceFile {
    memory_id: Option<String>,
}

/// Read the memory resource id from a `memory_config.json` style file.
pub fn load_resource_file(path: impl AsRef<Path>) -> Result<String, ConfigError> {
    let path = path.as_ref();
    debug!("loading memory resource file: {}", path.display());
    let invalid = |message: String| ConfigError::ResourceFile {
        path: path.to_path_buf(),
        message,
    };
    let contents = fs::read_to_string(path).map_err(|err| invalid(err.to_string()))?;
    let file: ResourceFile =
        serde_json::from_str(&contents).map_err(|err| invalid(err.to_string()))?;
    match file.memory_id {
        Some(id) if !id.trim().is_empty() => Ok(id),
        _ => Err(invalid("memory_id must be a non-empty string".to_string())),
    }
}

fn config_from_value(value: Value, label: &str) -> Result<RecallConfig, ConfigError> {
    schema::validate_layer_schema(&value, label)?;
    let config: RecallConfig = serde_json::from_value(value)?;
    config.validate()?;
    Ok(config)
}

//! Tests for configuration loading.

use super::*;
use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;

/// Write contents to a path, creating parent directories if needed.
fn write_file(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("dir");
    }
    fs::write(path, contents).expect("write");
}

/// Options that ignore the developer's real home directory.
fn isolated_options(cwd: &Path) -> LayeredConfigOptions {
    LayeredConfigOptions::new(cwd).with_user_path(None)
}

/// A minimal config parses with the hook defaults.
#[test]
fn parse_minimal_config() {
    let config = RecallConfig::load_from_str("{}").expect("config");
    assert_eq!(config.memory.recent_turns, 5);
    assert_eq!(config.memory.top_k, 3);
    assert_eq!(config.memory.namespace_prefix, "");
    assert_eq!(config.memory.timeout(), Duration::from_secs(5));
    assert_eq!(config.identity.actor_prefix, "customer_");
    assert_eq!(config.identity.hash_len, 8);
}

/// JSON5 syntax (comments, trailing commas, unquoted keys) is accepted.
#[test]
fn parse_json5_memory_block() {
    let json5 = r#"{
        // support agent memory
        memory: { resource_id: "mem-123", namespace_prefix: "support", top_k: 4, },
    }"#;
    let config = RecallConfig::load_from_str(json5).expect("config");
    assert_eq!(config.memory.resource_id.as_deref(), Some("mem-123"));
    assert_eq!(config.memory.namespace_prefix, "support");
    assert_eq!(config.memory.top_k, 4);
}

/// Reject unexpected top-level config keys.
#[test]
fn rejects_unknown_top_level_key() {
    let err = RecallConfig::load_from_str(r#"{ unexpected: true }"#).unwrap_err();
    assert!(format!("{err}").contains("unknown key"));
}

/// Reject wrongly typed nested fields with their path.
#[test]
fn rejects_wrong_type_with_path() {
    let err = RecallConfig::load_from_str(r#"{ memory: { top_k: "three" } }"#).unwrap_err();
    let msg = format!("{err}");
    assert!(msg.contains("memory.top_k"), "{msg}");
}

/// Reject zero-valued limits.
#[test]
fn rejects_zero_top_k() {
    let err = RecallConfig::load_from_str(r#"{ memory: { top_k: 0 } }"#).unwrap_err();
    assert!(matches!(
        err,
        ConfigError::OutOfRange {
            field: "memory.top_k",
            ..
        }
    ));

    let err = RecallConfig::load_from_str(r#"{ memory: { persist_timeout_ms: 0 } }"#).unwrap_err();
    assert!(format!("{err}").contains("memory.persist_timeout_ms"));
}

/// Unparseable layers are reported with the layer they came from.
#[test]
fn parse_errors_name_the_layer() {
    let temp = TempDir::new().expect("tmp");
    write_file(&temp.path().join(DEFAULT_CONFIG_FILE), "{ memory: ");

    let err = RecallConfig::load_layered_with_options(isolated_options(temp.path())).unwrap_err();
    match err {
        ConfigError::Parse { layer, .. } => assert!(layer.starts_with("cwd("), "{layer}"),
        other => panic!("unexpected error: {other}"),
    }
}

/// A runtime layer that cannot be read is reported with its path.
#[test]
fn unreadable_runtime_layer_names_its_path() {
    let temp = TempDir::new().expect("tmp");
    let missing = temp.path().join("missing.json5");
    let options = isolated_options(temp.path()).with_runtime_path(&missing);

    let err = RecallConfig::load_layered_with_options(options).unwrap_err();
    assert!(matches!(err, ConfigError::Read { ref path, .. } if *path == missing));
}

/// Reject placeholders in the namespace prefix.
#[test]
fn rejects_template_prefix() {
    let err = RecallConfig::load_from_str(r#"{ memory: { namespace_prefix: "{actorId}" } }"#)
        .unwrap_err();
    assert!(format!("{err}").contains("namespace_prefix"));
}

/// Cwd config overrides the project root config, runtime overrides both.
#[test]
fn layered_config_precedence() {
    let temp = TempDir::new().expect("tmp");
    let project_root = temp.path().join("project");
    fs::create_dir_all(project_root.join(".git")).expect("git");
    let cwd = project_root.join("agent");
    fs::create_dir_all(&cwd).expect("cwd");

    write_file(
        &project_root.join(DEFAULT_CONFIG_FILE),
        r#"{ memory: { resource_id: "project", top_k: 2 } }"#,
    );
    write_file(
        &cwd.join(DEFAULT_CONFIG_FILE),
        r#"{ memory: { resource_id: "cwd" } }"#,
    );
    let runtime = temp.path().join("runtime.json5");
    write_file(&runtime, r#"{ memory: { namespace_prefix: "rt" } }"#);

    let layered = RecallConfig::load_layered_with_options(
        isolated_options(&cwd).with_runtime_path(&runtime),
    )
    .expect("layered");

    assert_eq!(layered.config.memory.resource_id.as_deref(), Some("cwd"));
    assert_eq!(layered.config.memory.top_k, 2);
    assert_eq!(layered.config.memory.namespace_prefix, "rt");
    let sources = layered
        .layers
        .iter()
        .map(|layer| layer.source)
        .collect::<Vec<_>>();
    assert_eq!(
        sources,
        vec![
            ConfigLayerSource::Project,
            ConfigLayerSource::Cwd,
            ConfigLayerSource::Runtime
        ]
    );
}

/// When cwd is the project root the same file is loaded once.
#[test]
fn layered_config_dedupes_project_and_cwd() {
    let temp = TempDir::new().expect("tmp");
    let root = temp.path();
    fs::create_dir_all(root.join(".git")).expect("git");
    write_file(&root.join(DEFAULT_CONFIG_FILE), "{}");

    let layered =
        RecallConfig::load_layered_with_options(isolated_options(root)).expect("layered");
    assert_eq!(layered.layers.len(), 1);
    assert_eq!(layered.layers[0].source, ConfigLayerSource::Project);
}

/// Inline resource id wins over the legacy resource file.
#[test]
fn resolve_resource_id_prefers_inline() {
    let temp = TempDir::new().expect("tmp");
    write_file(
        &temp.path().join("memory_config.json"),
        r#"{ "memory_id": "from-file" }"#,
    );
    let mut memory = MemoryConfig {
        resource_file: Some("memory_config.json".to_string()),
        ..MemoryConfig::default()
    };
    assert_eq!(
        memory.resolve_resource_id(temp.path()).expect("file id"),
        "from-file"
    );

    memory.resource_id = Some("inline".to_string());
    assert_eq!(
        memory.resolve_resource_id(temp.path()).expect("inline id"),
        "inline"
    );
}

/// Missing resource configuration names both settings.
#[test]
fn resolve_resource_id_requires_source() {
    let err = MemoryConfig::default()
        .resolve_resource_id(Path::new("."))
        .unwrap_err();
    assert!(matches!(err, ConfigError::MissingResource));
    assert!(format!("{err}").contains("memory.resource_file"));
}

/// A resource file without an id is rejected.
#[test]
fn resource_file_requires_memory_id() {
    let temp = TempDir::new().expect("tmp");
    let path = temp.path().join("memory_config.json");
    write_file(&path, r#"{ "memory_id": "" }"#);
    let err = load_resource_file(&path).unwrap_err();
    assert!(matches!(err, ConfigError::ResourceFile { path: ref at, .. } if *at == path));

    let err = load_resource_file(temp.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, ConfigError::ResourceFile { .. }));
}

//! Schema validation for recall JSON5 configuration.

use crate::ConfigError;
use serde_json::{Map, Value};

/// Validate a single config layer against the schema.
pub(super) fn validate_layer_schema(value: &Value, layer: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, "")?;
    ensure_allowed_keys(map, &["$schema", "memory", "identity"], layer, "")?;

    if let Some(value) = map.get("$schema") {
        expect_string(value, layer, "$schema")?;
    }
    if let Some(value) = map.get("memory") {
        validate_memory(value, layer, "memory")?;
    }
    if let Some(value) = map.get("identity") {
        validate_identity(value, layer, "identity")?;
    }
    Ok(())
}

/// Validate the "memory" block.
fn validate_memory(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, path)?;
    let strings = ["resource_id", "resource_file", "namespace_prefix", "path"];
    let integers = ["recent_turns", "top_k", "timeout_ms", "persist_timeout_ms"];
    let allowed = strings.iter().chain(integers.iter()).copied().collect::<Vec<_>>();
    ensure_allowed_keys(map, &allowed, layer, path)?;

    for key in strings {
        if let Some(value) = map.get(key) {
            expect_string(value, layer, &join_path(path, key))?;
        }
    }
    for key in integers {
        if let Some(value) = map.get(key) {
            expect_u64(value, layer, &join_path(path, key))?;
        }
    }
    if let Some(prefix) = map.get("namespace_prefix").and_then(Value::as_str)
        && (prefix.contains('{') || prefix.contains('}'))
    {
        return Err(invalid_field(
            layer,
            &join_path(path, "namespace_prefix"),
            "template placeholders are not allowed in the prefix",
        ));
    }
    Ok(())
}

/// Validate the "identity" block.
fn validate_identity(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, path)?;
    ensure_allowed_keys(map, &["actor_prefix", "hash_len"], layer, path)?;

    if let Some(value) = map.get("actor_prefix") {
        expect_string(value, layer, &join_path(path, "actor_prefix"))?;
    }
    if let Some(value) = map.get("hash_len") {
        expect_u64(value, layer, &join_path(path, "hash_len"))?;
    }
    Ok(())
}

/// Expect a JSON object or return a typed error.
fn expect_object<'a>(
    value: &'a Value,
    layer: &str,
    path: &str,
) -> Result<&'a Map<String, Value>, ConfigError> {
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(invalid_field(layer, path, "expected object")),
    }
}

/// Expect a JSON string or return a typed error.
fn expect_string(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    if value.as_str().is_some() {
        Ok(())
    } else {
        Err(invalid_field(layer, path, "expected string"))
    }
}

/// Expect a non-negative JSON integer or return a typed error.
fn expect_u64(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    if value.is_u64() {
        Ok(())
    } else {
        Err(invalid_field(layer, path, "expected non-negative integer"))
    }
}

/// Ensure an object contains only allowed keys.
fn ensure_allowed_keys(
    map: &Map<String, Value>,
    allowed: &[&str],
    layer: &str,
    path: &str,
) -> Result<(), ConfigError> {
    match map.keys().find(|key| !allowed.contains(&key.as_str())) {
        Some(key) => Err(invalid_field(layer, &join_path(path, key), "unknown key")),
        None => Ok(()),
    }
}

/// Join nested paths for better error messages.
fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

/// Build a structured invalid-field error.
fn invalid_field(layer: &str, path: &str, message: &str) -> ConfigError {
    let normalized_path = if path.is_empty() { "root" } else { path };
    ConfigError::InvalidField {
        path: format!("{layer}:{normalized_path}"),
        message: message.to_string(),
    }
}

//! Configuration schema for recall.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root config for the recall SDK and CLI.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RecallConfig {
    #[serde(default, rename = "$schema")]
    pub schema: Option<String>,
    #[serde(default)]
    pub memory: MemoryConfig,
    #[serde(default)]
    pub identity: IdentityConfig,
}

/// Memory resource and hook tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Memory resource id; takes precedence over `resource_file`.
    #[serde(default)]
    pub resource_id: Option<String>,
    /// Legacy `memory_config.json` holding `{ "memory_id": ... }`.
    #[serde(default)]
    pub resource_file: Option<String>,
    #[serde(default)]
    pub namespace_prefix: String,
    /// Root directory for the file-backed store.
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default = "default_recent_turns")]
    pub recent_turns: usize,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_timeout_ms")]
    pub persist_timeout_ms: u64,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            resource_id: None,
            resource_file: None,
            namespace_prefix: String::new(),
            path: None,
            recent_turns: default_recent_turns(),
            top_k: default_top_k(),
            timeout_ms: default_timeout_ms(),
            persist_timeout_ms: default_timeout_ms(),
        }
    }
}

impl MemoryConfig {
    /// Deadline for history loads and retrievals.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Deadline for persisting a turn.
    pub fn persist_timeout(&self) -> Duration {
        Duration::from_millis(self.persist_timeout_ms)
    }
}

/// Number of recent turns preloaded at agent start.
fn default_recent_turns() -> usize {
    5
}

/// Number of records retrieved per namespace.
fn default_top_k() -> usize {
    3
}

fn default_timeout_ms() -> u64 {
    5_000
}

/// How actor ids are derived from customer identities.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    #[serde(default = "default_actor_prefix")]
    pub actor_prefix: String,
    /// Hex characters of the digest kept in the actor id.
    #[serde(default = "default_hash_len")]
    pub hash_len: usize,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            actor_prefix: default_actor_prefix(),
            hash_len: default_hash_len(),
        }
    }
}

fn default_actor_prefix() -> String {
    "customer_".to_string()
}

fn default_hash_len() -> usize {
    8
}

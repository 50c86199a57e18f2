//! Conversation memory for support agents.
//!
//! Re-exports the config, hook and store crates under one roof. A typical
//! host builds a [`prelude::MemoryHook`] per conversation, registers it on
//! its [`prelude::HookRegistry`], and fires lifecycle events as the agent
//! runs.

pub use recall_rs_config as config;
pub use recall_rs_core as core;
pub use recall_rs_memory as memory;

/// Types most hosts need to wire a memory hook.
pub mod prelude {
    pub use recall_rs_config::{MemoryConfig, RecallConfig};
    pub use recall_rs_core::{
        AgentState, HookError, HookRegistry, LifecycleHook, MemoryHook, MemoryHookConfig,
        Message, actor_id_from_email,
    };
    pub use recall_rs_memory::{FileMemoryStore, MemoryError, MemoryStore, Role, Turn};
}

#[inline]
/// Initialize logging using env_logger if the "logging" feature is enabled.
///
/// No-op without the feature.
pub fn init_logging() {
    #[cfg(feature = "logging")]
    {
        let _ = env_logger::try_init();
    }
}

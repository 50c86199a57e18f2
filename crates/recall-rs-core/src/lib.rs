//! Conversation memory augmentation for agent runtimes.
//!
//! [`MemoryHook`] subscribes to two lifecycle events through a
//! [`HookRegistry`]: on agent start it preloads recent turns, and on every
//! appended message it injects long-term memories into user turns and
//! persists the turn to a [`recall_rs_memory::MemoryStore`].

pub mod context;
pub mod error;
pub mod events;
pub mod hook;
pub mod identity;
pub mod namespace;
pub mod registry;

pub use error::{HookError, NamespaceError};
pub use events::{
    AgentInitializedEvent, AgentState, ChatRole, ContentBlock, HookEventKind, Message,
    MessageAddedEvent,
};
pub use hook::{
    HookPhase, ISSUES_HEADER, MEMORY_GUIDANCE, MemoryHook, MemoryHookBuilder, MemoryHookConfig,
    PREFERENCES_HEADER,
};
pub use identity::actor_id_from_email;
pub use namespace::{MemoryCategory, NamespaceResolver};
pub use registry::{HookRegistry, LifecycleHook};

//! Error types for the memory hook.

use crate::namespace::MemoryCategory;
use recall_rs_memory::MemoryError;
use thiserror::Error;

/// Errors returned while resolving namespaces.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NamespaceError {
    /// Actor id was empty.
    #[error("actor id is empty")]
    EmptyActor,
    /// Session-scoped category resolved without a session id.
    #[error("namespace category {0} requires a session id")]
    MissingSession(MemoryCategory),
}

/// Errors surfaced by hook construction and event handling.
#[derive(Debug, Error)]
pub enum HookError {
    /// Persisting a turn failed; the turn is not in durable history.
    #[error("failed to persist turn ({resource_id}/{actor_id}/{session_id}): {source}")]
    Persistence {
        resource_id: String,
        actor_id: String,
        session_id: String,
        #[source]
        source: MemoryError,
    },
    /// Hook or identity configuration was rejected.
    #[error("invalid hook config: {0}")]
    InvalidConfig(String),
}

impl HookError {
    /// True when the failure was a store deadline rather than a store error.
    pub fn is_timeout(&self) -> bool {
        matches!(self, HookError::Persistence { source, .. } if source.is_timeout())
    }
}

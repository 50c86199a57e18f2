//! Memory store contract and reference storage for recall.
//!
//! The hook in `recall-rs-core` only talks to [`MemoryStore`]. Production
//! deployments plug in a managed memory service; [`FileMemoryStore`] is a
//! JSONL-backed implementation used by the CLI and tests.

pub mod error;
pub mod model;
mod rank;
pub mod store;

/// Memory error type.
pub use error::MemoryError;
/// Turn and record models.
pub use model::{MemoryRecord, Role, Turn};
/// Store contract and the default file implementation.
pub use store::{FileMemoryStore, MemoryStore};

//! Test helpers shared across recall crates.

pub mod memory;

pub use memory::{HistoryCall, RetrieveCall, SavedCall, StoreOp, StubStore};

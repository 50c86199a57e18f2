use async_trait::async_trait;
use parking_lot::Mutex;
use recall_rs_memory::{MemoryError, MemoryRecord, MemoryStore, Role, Turn};
use std::collections::HashMap;
use std::time::Duration;

/// Store operation a [`StubStore`] can be told to fail or stall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    GetLastKTurns,
    RetrieveMemories,
    SaveConversation,
}

/// One recorded `save_conversation` call.
#[derive(Debug, Clone, PartialEq)]
pub struct SavedCall {
    pub resource_id: String,
    pub actor_id: String,
    pub session_id: String,
    pub turns: Vec<(String, Role)>,
}

/// One recorded `get_last_k_turns` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryCall {
    pub resource_id: String,
    pub actor_id: String,
    pub session_id: String,
    pub k: usize,
}

/// One recorded `retrieve_memories` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrieveCall {
    pub resource_id: String,
    pub namespace: String,
    pub query: String,
    pub top_k: usize,
}

/// In-memory store with canned responses, injectable failures, and call recording.
#[derive(Default)]
pub struct StubStore {
    turns: Vec<Turn>,
    records: HashMap<String, Vec<MemoryRecord>>,
    failures: HashMap<StoreOp, fn() -> MemoryError>,
    failing_namespaces: Vec<String>,
    delays: HashMap<StoreOp, Duration>,
    saved: Mutex<Vec<SavedCall>>,
    retrieved: Mutex<Vec<RetrieveCall>>,
    history: Mutex<Vec<HistoryCall>>,
}

impl StubStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve these turns from `get_last_k_turns` (the last `k` are returned).
    pub fn with_turns(mut self, turns: Vec<Turn>) -> Self {
        self.turns = turns;
        self
    }

    /// Serve `contents` as records under `namespace`.
    pub fn with_records(mut self, namespace: &str, contents: &[&str]) -> Self {
        let records = contents
            .iter()
            .map(|content| MemoryRecord::new(namespace, *content))
            .collect();
        self.records.insert(namespace.to_string(), records);
        self
    }

    /// Fail every call of `op` with the error built by `error`.
    pub fn failing(mut self, op: StoreOp, error: fn() -> MemoryError) -> Self {
        self.failures.insert(op, error);
        self
    }

    /// Fail retrievals for one namespace only.
    pub fn failing_namespace(mut self, namespace: &str) -> Self {
        self.failing_namespaces.push(namespace.to_string());
        self
    }

    /// Sleep before answering `op`.
    pub fn delayed(mut self, op: StoreOp, delay: Duration) -> Self {
        self.delays.insert(op, delay);
        self
    }

    /// Recorded `save_conversation` calls, in call order.
    pub fn saved(&self) -> Vec<SavedCall> {
        self.saved.lock().clone()
    }

    /// Recorded `retrieve_memories` calls, in call order.
    pub fn retrieve_calls(&self) -> Vec<RetrieveCall> {
        self.retrieved.lock().clone()
    }

    /// Namespaces passed to `retrieve_memories`, in call order.
    pub fn retrieved_namespaces(&self) -> Vec<String> {
        self.retrieved
            .lock()
            .iter()
            .map(|call| call.namespace.clone())
            .collect()
    }

    /// Recorded `get_last_k_turns` calls, in call order.
    pub fn history_calls(&self) -> Vec<HistoryCall> {
        self.history.lock().clone()
    }

    async fn enter(&self, op: StoreOp) -> Result<(), MemoryError> {
        if let Some(delay) = self.delays.get(&op) {
            tokio::time::sleep(*delay).await;
        }
        match self.failures.get(&op) {
            Some(error) => Err(error()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl MemoryStore for StubStore {
    async fn get_last_k_turns(
        &self,
        resource_id: &str,
        actor_id: &str,
        session_id: &str,
        k: usize,
    ) -> Result<Vec<Turn>, MemoryError> {
        self.history.lock().push(HistoryCall {
            resource_id: resource_id.to_string(),
            actor_id: actor_id.to_string(),
            session_id: session_id.to_string(),
            k,
        });
        self.enter(StoreOp::GetLastKTurns).await?;
        let skip = self.turns.len().saturating_sub(k);
        Ok(self.turns[skip..].to_vec())
    }

    async fn retrieve_memories(
        &self,
        resource_id: &str,
        namespace: &str,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<MemoryRecord>, MemoryError> {
        self.retrieved.lock().push(RetrieveCall {
            resource_id: resource_id.to_string(),
            namespace: namespace.to_string(),
            query: query.to_string(),
            top_k,
        });
        self.enter(StoreOp::RetrieveMemories).await?;
        if self.failing_namespaces.iter().any(|ns| ns == namespace) {
            return Err(MemoryError::StoreUnavailable(format!(
                "retrieval failed for {namespace}"
            )));
        }
        let mut records = self.records.get(namespace).cloned().unwrap_or_default();
        records.truncate(top_k);
        Ok(records)
    }

    async fn save_conversation(
        &self,
        resource_id: &str,
        actor_id: &str,
        session_id: &str,
        turns: &[(String, Role)],
    ) -> Result<(), MemoryError> {
        self.enter(StoreOp::SaveConversation).await?;
        self.saved.lock().push(SavedCall {
            resource_id: resource_id.to_string(),
            actor_id: actor_id.to_string(),
            session_id: session_id.to_string(),
            turns: turns.to_vec(),
        });
        Ok(())
    }

    async fn list_records(
        &self,
        _resource_id: &str,
        namespace: &str,
        limit: usize,
    ) -> Result<Vec<MemoryRecord>, MemoryError> {
        let mut records = self.records.get(namespace).cloned().unwrap_or_default();
        records.truncate(limit);
        Ok(records)
    }
}

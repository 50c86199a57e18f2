//! Memory store contract and the JSONL-backed reference implementation.

use crate::error::MemoryError;
use crate::model::{MemoryRecord, Role, Turn};
use crate::rank::{namespace_matches, rank_records};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;

#[async_trait]
/// Durable turn storage and long-term memory retrieval consumed by the hook.
///
/// Every call is keyed by the memory resource id. Turns are additionally
/// partitioned by actor and session, records by namespace.
pub trait MemoryStore: Send + Sync {
    /// Return up to `k` most recent turns, oldest first.
    ///
    /// Stores report a session without history as [`MemoryError::NotFound`].
    async fn get_last_k_turns(
        &self,
        resource_id: &str,
        actor_id: &str,
        session_id: &str,
        k: usize,
    ) -> Result<Vec<Turn>, MemoryError>;

    /// Retrieve up to `top_k` records relevant to `query` under `namespace`.
    async fn retrieve_memories(
        &self,
        resource_id: &str,
        namespace: &str,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<MemoryRecord>, MemoryError>;

    /// Append turns to the session history.
    async fn save_conversation(
        &self,
        resource_id: &str,
        actor_id: &str,
        session_id: &str,
        turns: &[(String, Role)],
    ) -> Result<(), MemoryError>;

    /// List records under a namespace without ranking, newest first.
    async fn list_records(
        &self,
        resource_id: &str,
        namespace: &str,
        limit: usize,
    ) -> Result<Vec<MemoryRecord>, MemoryError>;
}

/// On-disk shape of a persisted turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct TurnEntry {
    id: Uuid,
    role: Role,
    text: String,
    created_at: DateTime<Utc>,
}

/// File-backed store keeping turns and records as JSONL.
///
/// Layout under the root:
/// `{resource}/turns/{actor}/{session}.jsonl` and `{resource}/records.jsonl`.
#[derive(Debug, Clone)]
pub struct FileMemoryStore {
    /// Root directory for all resources.
    root: PathBuf,
}

impl FileMemoryStore {
    /// Create a new file-backed store under the given root.
    pub fn new(root: impl AsRef<Path>) -> Result<Self, MemoryError> {
        let root = root.as_ref().to_path_buf();
        std::fs::create_dir_all(&root)?;
        info!("initialized file memory store (root={})", root.display());
        Ok(Self { root })
    }

    /// Root directory of the store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path to a session's turn log.
    fn turns_path(
        &self,
        resource_id: &str,
        actor_id: &str,
        session_id: &str,
    ) -> Result<PathBuf, MemoryError> {
        Ok(self
            .root
            .join(path_component("resource_id", resource_id)?)
            .join("turns")
            .join(path_component("actor_id", actor_id)?)
            .join(format!(
                "{}.jsonl",
                path_component("session_id", session_id)?
            )))
    }

    /// Path to a resource's record log.
    fn records_path(&self, resource_id: &str) -> Result<PathBuf, MemoryError> {
        Ok(self
            .root
            .join(path_component("resource_id", resource_id)?)
            .join("records.jsonl"))
    }

    /// Load every record stored for a resource.
    fn load_records(&self, resource_id: &str) -> Result<Vec<MemoryRecord>, MemoryError> {
        read_jsonl(&self.records_path(resource_id)?)
    }

    /// Store a derived record under a namespace.
    ///
    /// Production stores derive these from conversations on their own; the
    /// file store needs them written explicitly (seeding, tests).
    pub fn put_record(
        &self,
        resource_id: &str,
        namespace: &str,
        content: &str,
    ) -> Result<MemoryRecord, MemoryError> {
        if namespace.trim().is_empty() {
            return Err(MemoryError::Validation("namespace is empty".to_string()));
        }
        if content.trim().is_empty() {
            return Err(MemoryError::Validation(
                "record content is empty".to_string(),
            ));
        }
        let record = MemoryRecord::new(namespace, content);
        append_jsonl(&self.records_path(resource_id)?, std::slice::from_ref(&record))?;
        debug!(
            "stored memory record (resource_id={}, namespace={}, content_len={})",
            resource_id,
            namespace,
            content.len()
        );
        Ok(record)
    }
}

#[async_trait]
impl MemoryStore for FileMemoryStore {
    async fn get_last_k_turns(
        &self,
        resource_id: &str,
        actor_id: &str,
        session_id: &str,
        k: usize,
    ) -> Result<Vec<Turn>, MemoryError> {
        let path = self.turns_path(resource_id, actor_id, session_id)?;
        if !path.exists() {
            return Err(MemoryError::NotFound(format!(
                "actor={actor_id}, session={session_id}"
            )));
        }
        let entries: Vec<TurnEntry> = read_jsonl(&path)?;
        let start = entries.len().saturating_sub(k);
        debug!(
            "loaded recent turns (actor_id={}, session_id={}, returned={})",
            actor_id,
            session_id,
            entries.len() - start
        );
        Ok(entries[start..]
            .iter()
            .map(|entry| Turn::new(entry.role, entry.text.clone()))
            .collect())
    }

    async fn retrieve_memories(
        &self,
        resource_id: &str,
        namespace: &str,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<MemoryRecord>, MemoryError> {
        let records = self
            .load_records(resource_id)?
            .into_iter()
            .filter(|record| namespace_matches(&record.namespace, namespace))
            .collect::<Vec<_>>();
        let ranked = rank_records(records, query, top_k);
        debug!(
            "retrieved memories (resource_id={}, namespace={}, returned={})",
            resource_id,
            namespace,
            ranked.len()
        );
        Ok(ranked)
    }

    async fn save_conversation(
        &self,
        resource_id: &str,
        actor_id: &str,
        session_id: &str,
        turns: &[(String, Role)],
    ) -> Result<(), MemoryError> {
        if turns.is_empty() {
            return Err(MemoryError::Validation("no turns to save".to_string()));
        }
        if let Some((_, role)) = turns.iter().find(|(text, _)| text.trim().is_empty()) {
            return Err(MemoryError::Validation(format!("empty {role} turn text")));
        }
        let path = self.turns_path(resource_id, actor_id, session_id)?;
        let now = Utc::now();
        let entries = turns
            .iter()
            .map(|(text, role)| TurnEntry {
                id: Uuid::new_v4(),
                role: *role,
                text: text.clone(),
                created_at: now,
            })
            .collect::<Vec<_>>();
        append_jsonl(&path, &entries)?;
        debug!(
            "saved conversation (actor_id={}, session_id={}, turns={})",
            actor_id,
            session_id,
            entries.len()
        );
        Ok(())
    }

    async fn list_records(
        &self,
        resource_id: &str,
        namespace: &str,
        limit: usize,
    ) -> Result<Vec<MemoryRecord>, MemoryError> {
        let mut records = self
            .load_records(resource_id)?
            .into_iter()
            .filter(|record| namespace_matches(&record.namespace, namespace))
            .collect::<Vec<_>>();
        // Later lines win ties on identical timestamps.
        records.reverse();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        records.truncate(limit);
        Ok(records)
    }
}

/// Map an id onto a single path segment, injectively.
///
/// Ids made only of `[A-Za-z0-9_-]` are used as-is. Anything else becomes a
/// readable slug followed by `~` and the hex of the raw id; `~` never occurs
/// in a plain id, so distinct ids never share a segment.
fn path_component(label: &str, value: &str) -> Result<String, MemoryError> {
    if value.trim().is_empty() {
        return Err(MemoryError::Validation(format!("{label} is empty")));
    }
    let is_plain = |ch: char| ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_');
    if value.chars().all(is_plain) {
        return Ok(value.to_string());
    }
    let slug = value
        .chars()
        .map(|ch| if is_plain(ch) { ch } else { '_' })
        .collect::<String>();
    Ok(format!("{slug}~{}", hex::encode(value.as_bytes())))
}

/// Read every JSON line of a file; a missing file yields no entries.
fn read_jsonl<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Vec<T>, MemoryError> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let file = OpenOptions::new().read(true).open(path)?;
    let reader = BufReader::new(file);
    let mut entries = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        entries.push(serde_json::from_str(&line)?);
    }
    Ok(entries)
}

/// Append entries as JSON lines, creating parent directories.
fn append_jsonl<T: Serialize>(path: &Path, entries: &[T]) -> Result<(), MemoryError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    for entry in entries {
        let line = serde_json::to_string(entry)?;
        writeln!(file, "{line}")?;
    }
    Ok(())
}

//! Turn and memory record models shared by stores and the hook.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Speaker of a persisted turn.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Customer-authored turn.
    #[serde(alias = "USER")]
    User,
    /// Agent-authored turn.
    #[serde(alias = "ASSISTANT")]
    Assistant,
}

impl Role {
    /// Return the role as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }

    /// Parse a role label case-insensitively; anything unknown is a user.
    pub fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("assistant") {
            Role::Assistant
        } else {
            Role::User
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One role-tagged utterance in a session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Turn {
    /// Speaker of the turn.
    pub role: Role,
    /// Text payload.
    pub text: String,
}

impl Turn {
    /// Build a turn from a role and text.
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
        }
    }

    /// Build a user turn.
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, text)
    }

    /// Build an assistant turn.
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Role::Assistant, text)
    }
}

/// Derived long-term memory (preference, issue, summary) stored under a namespace.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MemoryRecord {
    /// Record identifier.
    pub id: Uuid,
    /// Namespace the record was written under.
    pub namespace: String,
    /// Free-text content.
    pub content: String,
    /// Relevance assigned by retrieval; never persisted.
    #[serde(default, skip_serializing)]
    pub score: Option<f32>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl MemoryRecord {
    /// Create a new record under a namespace.
    pub fn new(namespace: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            namespace: namespace.into(),
            content: content.into(),
            score: None,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{MemoryRecord, Role};
    use pretty_assertions::assert_eq;

    #[test]
    fn role_parse_defaults_to_user() {
        assert_eq!(Role::parse("ASSISTANT"), Role::Assistant);
        assert_eq!(Role::parse("assistant"), Role::Assistant);
        assert_eq!(Role::parse("USER"), Role::User);
        assert_eq!(Role::parse("tool"), Role::User);
    }

    #[test]
    fn role_deserializes_store_labels() {
        let role: Role = serde_json::from_str("\"ASSISTANT\"").expect("role");
        assert_eq!(role, Role::Assistant);
        assert_eq!(serde_json::to_string(&Role::User).expect("json"), "\"user\"");
    }

    #[test]
    fn record_score_is_not_persisted() {
        let mut record = MemoryRecord::new("/preferences/cust_1", "likes premium covers");
        record.score = Some(0.9);
        let json = serde_json::to_value(&record).expect("json");
        assert!(json.get("score").is_none());
        let decoded: MemoryRecord = serde_json::from_value(json).expect("decode");
        assert_eq!(decoded.score, None);
    }
}

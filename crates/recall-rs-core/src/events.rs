//! Agent state and lifecycle event payloads delivered by the host runtime.

use recall_rs_memory::Role;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Speaker role of a live conversation message.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    /// System-generated message.
    System,
    /// User-authored message.
    User,
    /// Assistant-authored message.
    Assistant,
    /// Tool result message.
    Tool,
}

impl ChatRole {
    /// Return the role as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::System => "system",
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
            ChatRole::Tool => "tool",
        }
    }

    /// Parse a role label; unknown labels map to user.
    pub fn parse(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "system" => ChatRole::System,
            "assistant" => ChatRole::Assistant,
            "tool" => ChatRole::Tool,
            _ => ChatRole::User,
        }
    }

    /// Store role for conversational roles; `None` for system and tool.
    pub fn as_turn_role(&self) -> Option<Role> {
        match self {
            ChatRole::User => Some(Role::User),
            ChatRole::Assistant => Some(Role::Assistant),
            ChatRole::System | ChatRole::Tool => None,
        }
    }
}

impl From<Role> for ChatRole {
    fn from(role: Role) -> Self {
        match role {
            Role::User => ChatRole::User,
            Role::Assistant => ChatRole::Assistant,
        }
    }
}

/// One content block of a message: text, or a structured payload such as a tool call.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ContentBlock {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Any non-text fields (`toolUse`, `toolResult`, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ContentBlock {
    /// Text-only block.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            extra: Map::new(),
        }
    }

    /// Structured block without text.
    pub fn structured(key: impl Into<String>, value: Value) -> Self {
        let mut extra = Map::new();
        extra.insert(key.into(), value);
        Self { text: None, extra }
    }
}

/// Conversation message as held by the agent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub role: ChatRole,
    pub content: Vec<ContentBlock>,
}

impl Message {
    /// Message with a single text block.
    pub fn new(role: ChatRole, text: impl Into<String>) -> Self {
        Self {
            role,
            content: vec![ContentBlock::text(text)],
        }
    }

    /// User text message.
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(ChatRole::User, text)
    }

    /// Assistant text message.
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(ChatRole::Assistant, text)
    }

    /// Text of the leading content block, if it carries any.
    pub fn text(&self) -> Option<&str> {
        self.content.first().and_then(|block| block.text.as_deref())
    }

    /// Mutable text of the leading content block.
    pub fn text_mut(&mut self) -> Option<&mut String> {
        self.content.first_mut().and_then(|block| block.text.as_mut())
    }
}

/// Mutable agent state exposed to hooks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AgentState {
    /// System instructions sent with every model call.
    pub system_prompt: String,
    /// Message history, oldest first.
    pub messages: Vec<Message>,
}

impl AgentState {
    /// Empty state with the given system instructions.
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            messages: Vec::new(),
        }
    }
}

/// Lifecycle events a hook can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookEventKind {
    /// Fired once after the agent is constructed.
    AgentInitialized,
    /// Fired after every message appended to the conversation.
    MessageAdded,
}

/// Payload for [`HookEventKind::AgentInitialized`].
#[derive(Debug)]
pub struct AgentInitializedEvent<'a> {
    pub agent: &'a mut AgentState,
}

/// Payload for [`HookEventKind::MessageAdded`]; the new message is last.
#[derive(Debug)]
pub struct MessageAddedEvent<'a> {
    pub agent: &'a mut AgentState,
}

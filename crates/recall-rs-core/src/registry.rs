//! Lifecycle hook subscription and dispatch.

use crate::error::HookError;
use crate::events::{AgentInitializedEvent, AgentState, HookEventKind, Message, MessageAddedEvent};
use async_trait::async_trait;
use log::debug;
use std::sync::Arc;

#[async_trait]
/// Something that reacts to agent lifecycle events.
pub trait LifecycleHook: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// Handle agent initialization.
    async fn on_agent_initialized(
        &self,
        event: &mut AgentInitializedEvent<'_>,
    ) -> Result<(), HookError>;

    /// Handle a message appended to the conversation.
    async fn on_message_added(&self, event: &mut MessageAddedEvent<'_>) -> Result<(), HookError>;

    /// Subscribe this hook's handlers on a registry.
    fn register_hooks(self: Arc<Self>, registry: &mut HookRegistry);
}

/// Event dispatcher owned by the agent runtime.
///
/// Callbacks run in registration order; the first error stops dispatch and
/// is returned to the caller.
#[derive(Default)]
pub struct HookRegistry {
    callbacks: Vec<(HookEventKind, Arc<dyn LifecycleHook>)>,
}

impl HookRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe a hook to one event kind.
    pub fn add_callback(&mut self, kind: HookEventKind, hook: Arc<dyn LifecycleHook>) {
        debug!("registered callback (hook={}, event={:?})", hook.name(), kind);
        self.callbacks.push((kind, hook));
    }

    /// Let a hook subscribe itself.
    pub fn add_hook(&mut self, hook: Arc<dyn LifecycleHook>) {
        hook.register_hooks(self);
    }

    /// Number of callbacks subscribed to an event kind.
    pub fn callback_count(&self, kind: HookEventKind) -> usize {
        self.callbacks
            .iter()
            .filter(|(registered, _)| *registered == kind)
            .count()
    }

    /// Hooks subscribed to an event kind, in registration order.
    fn subscribers(&self, kind: HookEventKind) -> impl Iterator<Item = &Arc<dyn LifecycleHook>> {
        self.callbacks
            .iter()
            .filter(move |(registered, _)| *registered == kind)
            .map(|(_, hook)| hook)
    }

    /// Fire the agent-initialized event.
    pub async fn fire_agent_initialized(&self, agent: &mut AgentState) -> Result<(), HookError> {
        let mut event = AgentInitializedEvent { agent };
        for hook in self.subscribers(HookEventKind::AgentInitialized) {
            hook.on_agent_initialized(&mut event).await?;
        }
        Ok(())
    }

    /// Fire the message-added event for the last message in `agent`.
    pub async fn fire_message_added(&self, agent: &mut AgentState) -> Result<(), HookError> {
        let mut event = MessageAddedEvent { agent };
        for hook in self.subscribers(HookEventKind::MessageAdded) {
            hook.on_message_added(&mut event).await?;
        }
        Ok(())
    }

    /// Append a message and fire the message-added event for it.
    pub async fn append_message(
        &self,
        agent: &mut AgentState,
        message: Message,
    ) -> Result<(), HookError> {
        agent.messages.push(message);
        self.fire_message_added(agent).await
    }
}

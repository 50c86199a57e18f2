//! Memory hook: preloads history, injects long-term memory, persists turns.

use crate::context::{format_memory_block, format_recent_turns};
use crate::error::HookError;
use crate::events::{AgentInitializedEvent, HookEventKind, Message, MessageAddedEvent};
use crate::namespace::{MemoryCategory, NamespaceResolver};
use crate::registry::{HookRegistry, LifecycleHook};
use async_trait::async_trait;
use log::{debug, error, info, warn};
use recall_rs_config::MemoryConfig;
use recall_rs_memory::{MemoryError, MemoryStore, Role};
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Duration;

/// Header placed above retrieved preferences.
pub const PREFERENCES_HEADER: &str = "these are the user's preferences:";
/// Header placed above retrieved issues.
pub const ISSUES_HEADER: &str = "these are the user's known issues:";
/// Appended to the system instructions when history is preloaded.
pub const MEMORY_GUIDANCE: &str = "Do not answer with the user's preferences or issues directly. \
Use them strictly to understand the user better. \
Keep in mind that this information may be out of date.";

const DEFAULT_RECENT_TURNS: usize = 5;
const DEFAULT_TOP_K: usize = 3;
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Namespaces consulted for every user turn, in injection order.
const CONTEXT_CATEGORIES: [(MemoryCategory, &str); 2] = [
    (MemoryCategory::Preferences, PREFERENCES_HEADER),
    (MemoryCategory::Issues, ISSUES_HEADER),
];

/// Identity of the conversation a hook is bound to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryHookConfig {
    pub memory_resource_id: String,
    pub actor_id: String,
    pub session_id: String,
    pub namespace_prefix: String,
}

impl MemoryHookConfig {
    /// Config with an empty namespace prefix.
    pub fn new(
        memory_resource_id: impl Into<String>,
        actor_id: impl Into<String>,
        session_id: impl Into<String>,
    ) -> Self {
        Self {
            memory_resource_id: memory_resource_id.into(),
            actor_id: actor_id.into(),
            session_id: session_id.into(),
            namespace_prefix: String::new(),
        }
    }

    /// Set the namespace prefix.
    pub fn with_namespace_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.namespace_prefix = prefix.into();
        self
    }
}

/// Lifecycle phase of a hook instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookPhase {
    /// No event handled yet.
    Uninitialized,
    /// Agent initialization handled (with or without history).
    Initialized,
    /// At least one message handled.
    Active,
}

impl HookPhase {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => HookPhase::Uninitialized,
            1 => HookPhase::Initialized,
            _ => HookPhase::Active,
        }
    }
}

/// Builder for [`MemoryHook`].
pub struct MemoryHookBuilder {
    store: Arc<dyn MemoryStore>,
    config: MemoryHookConfig,
    recent_turns: usize,
    top_k: usize,
    timeout: Duration,
    persist_timeout: Duration,
}

impl MemoryHookBuilder {
    /// Start from defaults: 5 recent turns, top 3 records, 5s deadlines.
    pub fn new(store: Arc<dyn MemoryStore>, config: MemoryHookConfig) -> Self {
        Self {
            store,
            config,
            recent_turns: DEFAULT_RECENT_TURNS,
            top_k: DEFAULT_TOP_K,
            timeout: DEFAULT_TIMEOUT,
            persist_timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Apply tuning from loaded configuration.
    ///
    /// A non-empty `namespace_prefix` in the settings replaces the one on
    /// [`MemoryHookConfig`]; an empty one keeps it.
    pub fn with_settings(mut self, settings: &MemoryConfig) -> Self {
        self.recent_turns = settings.recent_turns;
        self.top_k = settings.top_k;
        self.timeout = settings.timeout();
        self.persist_timeout = settings.persist_timeout();
        if !settings.namespace_prefix.trim_matches('/').is_empty() {
            self.config.namespace_prefix = settings.namespace_prefix.clone();
        }
        self
    }

    /// Number of turns preloaded at agent start.
    pub fn recent_turns(mut self, k: usize) -> Self {
        self.recent_turns = k;
        self
    }

    /// Records retrieved per namespace.
    pub fn top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Deadline for history loads and retrievals.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Deadline for persisting a turn.
    pub fn persist_timeout(mut self, timeout: Duration) -> Self {
        self.persist_timeout = timeout;
        self
    }

    /// Validate and build the hook.
    pub fn build(self) -> Result<MemoryHook, HookError> {
        for (label, value) in [
            ("memory_resource_id", &self.config.memory_resource_id),
            ("actor_id", &self.config.actor_id),
            ("session_id", &self.config.session_id),
        ] {
            if value.trim().is_empty() {
                return Err(HookError::InvalidConfig(format!("{label} is empty")));
            }
        }
        if self.recent_turns == 0 || self.top_k == 0 {
            return Err(HookError::InvalidConfig(
                "recent_turns and top_k must be at least 1".to_string(),
            ));
        }
        let resolver = NamespaceResolver::new(&self.config.namespace_prefix);
        info!(
            "built memory hook (resource_id={}, actor_id={}, session_id={}, prefix={})",
            self.config.memory_resource_id,
            self.config.actor_id,
            self.config.session_id,
            resolver.prefix()
        );
        Ok(MemoryHook {
            store: self.store,
            config: self.config,
            resolver,
            recent_turns: self.recent_turns,
            top_k: self.top_k,
            timeout: self.timeout,
            persist_timeout: self.persist_timeout,
            phase: AtomicU8::new(HookPhase::Uninitialized as u8),
        })
    }
}

/// Memory hook bound to one (resource, actor, session) triple.
///
/// Holds no conversation state of its own; every event is served by store
/// round trips. Failures loading history or retrieving memories degrade
/// the turn, failures persisting a turn are returned to the caller.
pub struct MemoryHook {
    store: Arc<dyn MemoryStore>,
    config: MemoryHookConfig,
    resolver: NamespaceResolver,
    recent_turns: usize,
    top_k: usize,
    timeout: Duration,
    persist_timeout: Duration,
    phase: AtomicU8,
}

impl MemoryHook {
    /// Start building a hook.
    pub fn builder(store: Arc<dyn MemoryStore>, config: MemoryHookConfig) -> MemoryHookBuilder {
        MemoryHookBuilder::new(store, config)
    }

    /// Hook with default tuning.
    pub fn new(store: Arc<dyn MemoryStore>, config: MemoryHookConfig) -> Result<Self, HookError> {
        Self::builder(store, config).build()
    }

    /// Bound conversation identity.
    pub fn config(&self) -> &MemoryHookConfig {
        &self.config
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> HookPhase {
        HookPhase::from_u8(self.phase.load(Ordering::Acquire))
    }

    /// Move forward to `phase`; never moves backwards.
    fn advance(&self, phase: HookPhase) {
        self.phase.fetch_max(phase as u8, Ordering::AcqRel);
    }

    /// Seed the agent with recent turns from the store.
    ///
    /// Never fails: store errors and timeouts degrade to a cold start.
    pub async fn handle_agent_initialized(&self, event: &mut AgentInitializedEvent<'_>) {
        let config = &self.config;
        let loaded = with_deadline(
            self.timeout,
            self.store.get_last_k_turns(
                &config.memory_resource_id,
                &config.actor_id,
                &config.session_id,
                self.recent_turns,
            ),
        )
        .await;
        self.advance(HookPhase::Initialized);

        let turns = match loaded {
            Ok(turns) => turns,
            Err(err) if err.is_not_found() => {
                debug!(
                    "no prior history (actor_id={}, session_id={})",
                    config.actor_id, config.session_id
                );
                return;
            }
            Err(err) => {
                warn!(
                    "starting cold (resource_id={}, actor_id={}, session_id={}): {}",
                    config.memory_resource_id, config.actor_id, config.session_id, err
                );
                return;
            }
        };
        if turns.is_empty() {
            return;
        }

        event.agent.messages = format_recent_turns(&turns);
        let prompt = &mut event.agent.system_prompt;
        if !prompt.is_empty() {
            prompt.push_str("\n\n");
        }
        prompt.push_str(MEMORY_GUIDANCE);
        info!(
            "preloaded conversation history (actor_id={}, session_id={}, turns={})",
            config.actor_id,
            config.session_id,
            turns.len()
        );
    }

    /// Augment a new user turn with long-term memory and persist the turn.
    ///
    /// The persisted text is the turn as the user wrote it, before memory is
    /// appended.
    pub async fn handle_message_added(
        &self,
        event: &mut MessageAddedEvent<'_>,
    ) -> Result<(), HookError> {
        let Some(last) = event.agent.messages.last() else {
            return Ok(());
        };
        let Some(role) = last.role.as_turn_role() else {
            debug!("ignoring {} message", last.role.as_str());
            return Ok(());
        };
        let Some(text) = last.text() else {
            debug!("ignoring {} message without text", last.role.as_str());
            return Ok(());
        };
        let original = text.to_string();

        if role == Role::User {
            let pending = self.retrieve_context(&original).await;
            if !pending.is_empty()
                && let Some(text) = event.agent.messages.last_mut().and_then(Message::text_mut)
            {
                text.push_str(&pending);
            }
        }

        self.advance(HookPhase::Active);
        self.persist(original, role).await
    }

    /// Build the pending context for a user query, one block per namespace.
    async fn retrieve_context(&self, query: &str) -> String {
        let mut pending = String::new();
        for (category, header) in CONTEXT_CATEGORIES {
            let namespace = match self.resolver.resolve(
                category,
                &self.config.actor_id,
                Some(&self.config.session_id),
            ) {
                Ok(namespace) => namespace,
                Err(err) => {
                    warn!("skipping {category} memories: {err}");
                    continue;
                }
            };
            let retrieved = with_deadline(
                self.timeout,
                self.store.retrieve_memories(
                    &self.config.memory_resource_id,
                    &namespace,
                    query,
                    self.top_k,
                ),
            )
            .await;
            let records = match retrieved {
                Ok(records) => records,
                Err(err) => {
                    warn!(
                        "retrieval failed, skipping namespace (resource_id={}, namespace={}): {}",
                        self.config.memory_resource_id, namespace, err
                    );
                    continue;
                }
            };
            let block = format_memory_block(&records, header);
            if block.is_empty() {
                continue;
            }
            debug!(
                "injecting memories (namespace={}, records={})",
                namespace,
                records.len()
            );
            pending.push_str("\n\n");
            pending.push_str(&block);
        }
        pending
    }

    /// Persist exactly one turn; failures are surfaced.
    async fn persist(&self, text: String, role: Role) -> Result<(), HookError> {
        let config = &self.config;
        let turns = [(text, role)];
        let saved = with_deadline(
            self.persist_timeout,
            self.store.save_conversation(
                &config.memory_resource_id,
                &config.actor_id,
                &config.session_id,
                &turns,
            ),
        )
        .await;
        saved.map_err(|source| {
            error!(
                "failed to persist turn (resource_id={}, actor_id={}, session_id={}, role={}): {}",
                config.memory_resource_id, config.actor_id, config.session_id, role, source
            );
            HookError::Persistence {
                resource_id: config.memory_resource_id.clone(),
                actor_id: config.actor_id.clone(),
                session_id: config.session_id.clone(),
                source,
            }
        })
    }
}

#[async_trait]
impl LifecycleHook for MemoryHook {
    fn name(&self) -> &str {
        "memory"
    }

    async fn on_agent_initialized(
        &self,
        event: &mut AgentInitializedEvent<'_>,
    ) -> Result<(), HookError> {
        self.handle_agent_initialized(event).await;
        Ok(())
    }

    async fn on_message_added(&self, event: &mut MessageAddedEvent<'_>) -> Result<(), HookError> {
        self.handle_message_added(event).await
    }

    fn register_hooks(self: Arc<Self>, registry: &mut HookRegistry) {
        registry.add_callback(HookEventKind::MessageAdded, self.clone());
        registry.add_callback(HookEventKind::AgentInitialized, self);
    }
}

/// Run a store call under a deadline, mapping expiry to [`MemoryError::Timeout`].
async fn with_deadline<T>(
    deadline: Duration,
    call: impl Future<Output = Result<T, MemoryError>>,
) -> Result<T, MemoryError> {
    match tokio::time::timeout(deadline, call).await {
        Ok(result) => result,
        Err(_) => Err(MemoryError::Timeout(deadline)),
    }
}

#[cfg(test)]
mod tests {
    use super::{HookPhase, MemoryHook, MemoryHookConfig};
    use crate::error::HookError;
    use crate::events::{AgentState, ChatRole, ContentBlock, Message, MessageAddedEvent};
    use pretty_assertions::assert_eq;
    use recall_rs_config::MemoryConfig;
    use recall_rs_test_utils::StubStore;
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;

    fn config() -> MemoryHookConfig {
        MemoryHookConfig::new("mem", "cust_1", "s1")
    }

    #[test]
    fn build_rejects_empty_ids() {
        let store = Arc::new(StubStore::new());
        let err = MemoryHook::new(store.clone(), MemoryHookConfig::new("mem", "", "s1"))
            .err()
            .expect("error");
        assert!(matches!(err, HookError::InvalidConfig(msg) if msg.contains("actor_id")));

        let err = MemoryHook::builder(store, config())
            .top_k(0)
            .build()
            .err()
            .expect("error");
        assert!(matches!(err, HookError::InvalidConfig(_)));
    }

    #[test]
    fn settings_carry_prefix_and_limits() {
        let settings = MemoryConfig {
            namespace_prefix: "support".to_string(),
            top_k: 7,
            ..MemoryConfig::default()
        };
        let hook = MemoryHook::builder(Arc::new(StubStore::new()), config())
            .with_settings(&settings)
            .build()
            .expect("hook");
        assert_eq!(hook.config().namespace_prefix, "support");
        assert_eq!(hook.top_k, 7);
        assert_eq!(hook.timeout, Duration::from_secs(5));
    }

    #[tokio::test]
    async fn default_settings_keep_an_explicit_prefix() {
        let store = Arc::new(StubStore::new());
        let hook = MemoryHook::builder(store.clone(), config().with_namespace_prefix("support"))
            .with_settings(&MemoryConfig::default())
            .build()
            .expect("hook");
        assert_eq!(hook.config().namespace_prefix, "support");

        let mut agent = AgentState::default();
        agent.messages.push(Message::user("charger"));
        let mut event = MessageAddedEvent { agent: &mut agent };
        hook.handle_message_added(&mut event).await.expect("turn");
        assert_eq!(
            store.retrieved_namespaces(),
            vec!["/support/preferences/cust_1", "/support/issues/cust_1"]
        );

        let settings = MemoryConfig {
            namespace_prefix: "tenant".to_string(),
            ..MemoryConfig::default()
        };
        let hook = MemoryHook::builder(store, config().with_namespace_prefix("support"))
            .with_settings(&settings)
            .build()
            .expect("hook");
        assert_eq!(hook.config().namespace_prefix, "tenant");
    }

    #[tokio::test]
    async fn tool_messages_are_ignored() {
        let store = Arc::new(StubStore::new());
        let hook = MemoryHook::new(store.clone(), config()).expect("hook");
        let mut agent = AgentState::default();
        agent.messages.push(Message {
            role: ChatRole::Assistant,
            content: vec![ContentBlock::structured(
                "toolUse",
                json!({ "name": "check_warranty" }),
            )],
        });
        agent.messages.push(Message::new(ChatRole::Tool, "warranty ok"));

        let mut event = MessageAddedEvent { agent: &mut agent };
        hook.handle_message_added(&mut event).await.expect("tool");
        agent.messages.pop();
        let mut event = MessageAddedEvent { agent: &mut agent };
        hook.handle_message_added(&mut event).await.expect("tool use");

        assert!(store.saved().is_empty());
        assert!(store.retrieve_calls().is_empty());
        assert_eq!(hook.phase(), HookPhase::Uninitialized);
    }

    #[tokio::test]
    async fn empty_history_is_a_no_op() {
        let store = Arc::new(StubStore::new());
        let hook = MemoryHook::new(store, config()).expect("hook");
        let mut agent = AgentState::default();
        let mut event = MessageAddedEvent { agent: &mut agent };
        hook.handle_message_added(&mut event).await.expect("empty");
    }
}

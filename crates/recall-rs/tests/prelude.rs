//! Wiring a hook through the facade.

use pretty_assertions::assert_eq;
use recall_rs::prelude::*;
use recall_rs_test_utils::StubStore;
use std::sync::Arc;

#[tokio::test]
async fn hook_wires_through_prelude() {
    recall_rs::init_logging();
    let config = RecallConfig::load_from_str("{ memory: { top_k: 1 } }").expect("config");
    let store = Arc::new(
        StubStore::new().with_records("/preferences/cust_1", &["likes premium covers", "unused"]),
    );
    let hook = MemoryHook::builder(store.clone(), MemoryHookConfig::new("mem", "cust_1", "s1"))
        .with_settings(&config.memory)
        .build()
        .expect("hook");
    let mut registry = HookRegistry::new();
    registry.add_hook(Arc::new(hook));

    let mut agent = AgentState::default();
    registry
        .append_message(&mut agent, Message::user("charger"))
        .await
        .expect("turn");

    assert_eq!(
        agent.messages[0].text(),
        Some("charger\n\nthese are the user's preferences:\n\nlikes premium covers")
    );
    assert_eq!(store.saved()[0].turns, vec![("charger".to_string(), Role::User)]);
}

//! Subcommand handlers.

use crate::Workspace;
use anyhow::Context;
use log::info;
use recall_rs_core::{
    AgentState, HookRegistry, MemoryCategory, MemoryHook, MemoryHookConfig, Message,
    NamespaceResolver,
};
use recall_rs_memory::MemoryStore;
use std::sync::Arc;

fn resolver(workspace: &Workspace) -> NamespaceResolver {
    NamespaceResolver::new(&workspace.config.memory.namespace_prefix)
}

/// Resolve the namespace of `category` for an actor.
pub(crate) fn namespace_for(
    workspace: &Workspace,
    category: MemoryCategory,
    actor: &str,
    session: Option<&str>,
) -> anyhow::Result<String> {
    resolver(workspace)
        .resolve(category, actor, session)
        .with_context(|| format!("cannot resolve {category} namespace"))
}

pub(crate) async fn history(
    workspace: &Workspace,
    actor: &str,
    session: &str,
    k: usize,
) -> anyhow::Result<()> {
    let turns = match workspace
        .store
        .get_last_k_turns(&workspace.resource_id, actor, session, k)
        .await
    {
        Ok(turns) => turns,
        Err(err) if err.is_not_found() => {
            println!("no history for {actor} in session {session}");
            return Ok(());
        }
        Err(err) => return Err(err).context("failed to load turns"),
    };
    println!("{} turn(s) for {actor} in session {session}", turns.len());
    for turn in turns {
        println!("  [{}] {}", turn.role, turn.text);
    }
    Ok(())
}

pub(crate) async fn list(
    workspace: &Workspace,
    actor: &str,
    categories: &[MemoryCategory],
    session: Option<&str>,
    max: usize,
) -> anyhow::Result<()> {
    for category in categories {
        let namespace = match (category.is_session_scoped(), session) {
            (true, None) => resolver(workspace)
                .actor_scope(*category, actor)
                .context("cannot resolve namespace")?,
            _ => namespace_for(workspace, *category, actor, session)?,
        };
        let records = workspace
            .store
            .list_records(&workspace.resource_id, &namespace, max)
            .await
            .with_context(|| format!("failed to list {namespace}"))?;
        println!("{category} ({namespace}): {} record(s)", records.len());
        for record in records {
            println!(
                "  - {} [{}]",
                record.content,
                record.created_at.format("%Y-%m-%d %H:%M")
            );
        }
    }
    Ok(())
}

pub(crate) async fn search(
    workspace: &Workspace,
    namespace: &str,
    query: &str,
    top_k: usize,
) -> anyhow::Result<()> {
    let records = workspace
        .store
        .retrieve_memories(&workspace.resource_id, namespace, query, top_k)
        .await
        .with_context(|| format!("failed to search {namespace}"))?;
    if records.is_empty() {
        println!("no memories found in {namespace}");
        return Ok(());
    }
    for record in records {
        println!("{:.2}  {}", record.score.unwrap_or_default(), record.content);
    }
    Ok(())
}

pub(crate) async fn stats(workspace: &Workspace, actor: &str) -> anyhow::Result<()> {
    let resolver = resolver(workspace);
    println!("memory for {actor} (resource {})", workspace.resource_id);
    for category in MemoryCategory::ALL {
        let namespace = resolver
            .actor_scope(category, actor)
            .context("cannot resolve namespace")?;
        let count = workspace
            .store
            .list_records(&workspace.resource_id, &namespace, usize::MAX)
            .await
            .with_context(|| format!("failed to count {namespace}"))?
            .len();
        println!("  {category:<12} {count}");
    }
    Ok(())
}

/// Drive a fresh hook through agent start and one user turn.
pub(crate) async fn turn(
    workspace: &Workspace,
    actor: &str,
    session: &str,
    text: &str,
) -> anyhow::Result<()> {
    let hook = MemoryHook::builder(
        workspace.store.clone(),
        MemoryHookConfig::new(&workspace.resource_id, actor, session),
    )
    .with_settings(&workspace.config.memory)
    .build()
    .context("failed to build memory hook")?;
    let mut registry = HookRegistry::new();
    registry.add_hook(Arc::new(hook));

    let mut agent = AgentState::default();
    registry
        .fire_agent_initialized(&mut agent)
        .await
        .context("agent initialization failed")?;
    info!("agent initialized (preloaded={})", agent.messages.len());
    registry
        .append_message(&mut agent, Message::user(text))
        .await
        .context("turn was not persisted")?;

    println!("preloaded turns: {}", agent.messages.len() - 1);
    if let Some(augmented) = agent.messages.last().and_then(Message::text) {
        println!("{augmented}");
    }
    Ok(())
}

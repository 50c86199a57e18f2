//! Operator CLI for inspecting and seeding conversation memory.

mod commands;
mod seed;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use log::{debug, info};
use recall_rs_config::RecallConfig;
use recall_rs_core::{MemoryCategory, actor_id_from_email};
use recall_rs_memory::FileMemoryStore;
use std::path::PathBuf;
use std::sync::Arc;

const DEFAULT_STORE_ROOT: &str = ".recall/memory";

/// Command-line options for the memory inspector.
#[derive(Parser)]
#[command(name = "recall", version)]
struct Cli {
    /// Optional path to a recall.json5 config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// File store root directory (overrides memory.path)
    #[arg(long, global = true)]
    root: Option<PathBuf>,
    /// Memory resource id (overrides memory.resource_id)
    #[arg(long, global = true)]
    resource_id: Option<String>,
    #[command(subcommand)]
    command: Command,
}

/// Customer identity: an actor id, or an email to derive it from.
#[derive(Args, Debug, Clone)]
#[group(required = true, multiple = false)]
struct ActorArgs {
    /// Actor id as stored
    #[arg(long)]
    actor: Option<String>,
    /// Customer email; the actor id is derived from it
    #[arg(long)]
    email: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the most recent turns of a session
    History {
        #[command(flatten)]
        who: ActorArgs,
        #[arg(long)]
        session: String,
        #[arg(short, long, default_value_t = 5)]
        k: usize,
    },
    /// List stored records for an actor
    List {
        #[command(flatten)]
        who: ActorArgs,
        /// all, preferences, issues or summaries
        #[arg(long, default_value = "all")]
        category: String,
        /// Session id, required for summaries
        #[arg(long)]
        session: Option<String>,
        #[arg(long, default_value_t = 20)]
        max: usize,
    },
    /// Rank records against a query
    Search {
        #[arg(long)]
        query: String,
        /// Namespace to search; defaults to the actor's preferences
        #[arg(long)]
        namespace: Option<String>,
        #[arg(long)]
        actor: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        top_k: Option<usize>,
    },
    /// Count records per category for an actor
    Stats {
        #[command(flatten)]
        who: ActorArgs,
    },
    /// Write sample support sessions and derived records for a customer
    Seed {
        #[arg(long)]
        email: String,
    },
    /// Run one user turn through the memory hook and print the augmented text
    Turn {
        #[command(flatten)]
        who: ActorArgs,
        #[arg(long)]
        session: String,
        #[arg(long)]
        text: String,
    },
}

/// Resolved config, store and resource shared by every command.
pub(crate) struct Workspace {
    pub config: RecallConfig,
    pub store: Arc<FileMemoryStore>,
    pub resource_id: String,
}

impl Workspace {
    /// Map an actor id or email onto an actor id.
    pub fn actor_id(&self, actor: Option<&str>, email: Option<&str>) -> anyhow::Result<String> {
        match (actor, email) {
            (Some(actor), _) => Ok(actor.to_string()),
            (None, Some(email)) => {
                actor_id_from_email(email, &self.config.identity).context("invalid email")
            }
            (None, None) => anyhow::bail!("either --actor or --email is required"),
        }
    }

    fn actor_of(&self, who: &ActorArgs) -> anyhow::Result<String> {
        self.actor_id(who.actor.as_deref(), who.email.as_deref())
    }
}

/// Entry point for the recall CLI.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = env_logger::builder()
        .format_timestamp_millis()
        .parse_default_env()
        .try_init();

    let cli = Cli::parse();
    let cwd = std::env::current_dir().context("failed to resolve current working directory")?;
    let config = if let Some(path) = cli.config.as_ref() {
        RecallConfig::load_from_path(path).context("failed to load config")?
    } else {
        let layered = RecallConfig::load_layered(&cwd).context("failed to load layered config")?;
        debug!("layered config loaded (layers={})", layered.layers.len());
        layered.config
    };
    config.validate().context("invalid config")?;

    let resource_id = match cli.resource_id.clone() {
        Some(id) => id,
        None => config
            .memory
            .resolve_resource_id(&cwd)
            .context("no memory resource configured; pass --resource-id")?,
    };
    let root = cli
        .root
        .clone()
        .or_else(|| config.memory.path.clone().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_ROOT));
    let store = Arc::new(FileMemoryStore::new(&root).context("failed to open memory store")?);
    info!(
        "starting recall (resource_id={}, root={})",
        resource_id,
        root.display()
    );
    let workspace = Workspace {
        config,
        store,
        resource_id,
    };

    match cli.command {
        Command::History { who, session, k } => {
            let actor = workspace.actor_of(&who)?;
            commands::history(&workspace, &actor, &session, k).await
        }
        Command::List {
            who,
            category,
            session,
            max,
        } => {
            let actor = workspace.actor_of(&who)?;
            let categories = parse_categories(&category)?;
            commands::list(&workspace, &actor, &categories, session.as_deref(), max).await
        }
        Command::Search {
            query,
            namespace,
            actor,
            email,
            top_k,
        } => {
            let namespace = match namespace {
                Some(namespace) => namespace,
                None => {
                    let actor = workspace.actor_id(actor.as_deref(), email.as_deref())?;
                    commands::namespace_for(&workspace, MemoryCategory::Preferences, &actor, None)?
                }
            };
            let top_k = top_k.unwrap_or(workspace.config.memory.top_k);
            commands::search(&workspace, &namespace, &query, top_k).await
        }
        Command::Stats { who } => {
            let actor = workspace.actor_of(&who)?;
            commands::stats(&workspace, &actor).await
        }
        Command::Seed { email } => seed::run(&workspace, &email).await,
        Command::Turn { who, session, text } => {
            let actor = workspace.actor_of(&who)?;
            commands::turn(&workspace, &actor, &session, &text).await
        }
    }
}

/// Parse `--category`; `all` expands to every category.
fn parse_categories(value: &str) -> anyhow::Result<Vec<MemoryCategory>> {
    if value.eq_ignore_ascii_case("all") {
        return Ok(MemoryCategory::ALL.to_vec());
    }
    let category = value.parse::<MemoryCategory>().map_err(anyhow::Error::msg)?;
    Ok(vec![category])
}

#[cfg(test)]
mod tests {
    use super::{Cli, parse_categories};
    use clap::Parser;
    use pretty_assertions::assert_eq;
    use recall_rs_core::MemoryCategory;

    #[test]
    fn categories_expand_all() {
        assert_eq!(
            parse_categories("ALL").expect("all"),
            MemoryCategory::ALL.to_vec()
        );
        assert_eq!(
            parse_categories("issues").expect("issues"),
            vec![MemoryCategory::Issues]
        );
        assert!(parse_categories("orders").is_err());
    }

    #[test]
    fn actor_and_email_are_exclusive() {
        assert!(Cli::try_parse_from(["recall", "stats", "--actor", "a", "--email", "b"]).is_err());
        assert!(Cli::try_parse_from(["recall", "stats"]).is_err());
        assert!(
            Cli::try_parse_from(["recall", "--resource-id", "m", "stats", "--email", "a@b.c"])
                .is_ok()
        );
    }
}

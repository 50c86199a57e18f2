//! Sample support history for a customer.

use crate::Workspace;
use crate::commands::namespace_for;
use anyhow::Context;
use log::info;
use recall_rs_core::MemoryCategory;
use recall_rs_memory::{MemoryStore, Role};

struct SampleSession {
    id: &'static str,
    turns: &'static [(&'static str, Role)],
    summary: &'static str,
}

const SESSIONS: &[SampleSession] = &[
    SampleSession {
        id: "session_001_initial_purchase",
        turns: &[
            ("Hi. I'd like to buy a smartphone, what do you recommend?", Role::User),
            ("Thanks for reaching out. What will you mainly use it for?", Role::Assistant),
            ("Mostly work. Lots of email and video calls. Battery life matters most.", Role::User),
            (
                "For business use with a focus on battery, the ProModel-X is a good fit.",
                Role::Assistant,
            ),
            ("I'll take it. Does it come with a charger?", Role::User),
            ("Yes, a USB-C charger is included, with EU/UK/US plug adapters.", Role::Assistant),
            ("Perfect. I'd also like a cover with it.", Role::User),
            ("The black premium cover is popular for business use.", Role::Assistant),
            ("Please add that too.", Role::User),
            ("Your order is confirmed. The order number is #1234.", Role::Assistant),
        ],
        summary: "Customer bought a ProModel-X with a black premium cover (order #1234).",
    },
    SampleSession {
        id: "session_002_setup_help",
        turns: &[
            ("My new phone arrived. How do I set it up?", Role::User),
            ("Congratulations. First, hold the power button for three seconds.", Role::Assistant),
            ("It's on. What next?", Role::User),
            ("Pick your language on the first screen.", Role::Assistant),
            ("Done. How do I connect to WiFi?", Role::User),
            ("Open Settings, choose Network, then select your WiFi.", Role::Assistant),
            ("Connected. Can you help me set up email as well?", Role::User),
            ("Go to Accounts, choose Add email account, and enter your address.", Role::Assistant),
            ("All set up. Thank you.", Role::User),
            ("Happy to help. Reach out any time.", Role::Assistant),
        ],
        summary: "Walked the customer through initial setup, WiFi and email.",
    },
    SampleSession {
        id: "session_003_troubleshooting",
        turns: &[
            ("My phone keeps freezing now and then.", Role::User),
            ("Sorry about that. When did it start?", Role::Assistant),
            ("Two days ago. It locks up when several apps are open.", Role::User),
            ("It may be running low on memory. Try closing background apps.", Role::Assistant),
            ("How do I close them? I'm a beginner, please explain in detail.", Role::User),
            ("Swipe up from the bottom, then swipe each open app upwards.", Role::Assistant),
            ("That worked, it's much faster now.", Role::User),
            ("Great. Closing apps regularly helps.", Role::Assistant),
            ("Thanks for the clear steps. Could you email me a guide?", Role::User),
            ("Sure, I'll send the troubleshooting guide by email.", Role::Assistant),
        ],
        summary: "Resolved freezes by closing background apps; guide sent by email.",
    },
];

const PREFERENCES: &[&str] = &[
    "Uses the phone mainly for work email and video calls",
    "Prioritizes battery life",
    "Likes premium covers in black",
    "Prefers detailed step-by-step explanations",
    "Prefers receiving guides by email",
];

const ISSUES: &[&str] = &[
    "ProModel-X froze with several apps open; closing background apps fixed it",
];

/// Write the sample sessions and their derived records.
pub(crate) async fn run(workspace: &Workspace, email: &str) -> anyhow::Result<()> {
    let actor = workspace.actor_id(None, Some(email))?;
    let resource = workspace.resource_id.as_str();
    println!("seeding memory for {email} ({actor})");

    for session in SESSIONS {
        let turns = session
            .turns
            .iter()
            .map(|(text, role)| (text.to_string(), *role))
            .collect::<Vec<_>>();
        workspace
            .store
            .save_conversation(resource, &actor, session.id, &turns)
            .await
            .with_context(|| format!("failed to save session {}", session.id))?;
        let namespace =
            namespace_for(workspace, MemoryCategory::Summaries, &actor, Some(session.id))?;
        workspace
            .store
            .put_record(resource, &namespace, session.summary)
            .with_context(|| format!("failed to write summary for {}", session.id))?;
        println!("  session {} ({} turns)", session.id, turns.len());
    }

    for (category, contents) in [
        (MemoryCategory::Preferences, PREFERENCES),
        (MemoryCategory::Issues, ISSUES),
    ] {
        let namespace = namespace_for(workspace, category, &actor, None)?;
        for content in contents {
            workspace
                .store
                .put_record(resource, &namespace, content)
                .with_context(|| format!("failed to write {category} record"))?;
        }
        println!("  {} {category} record(s)", contents.len());
    }

    info!(
        "seeded sample memory (actor_id={}, sessions={})",
        actor,
        SESSIONS.len()
    );
    Ok(())
}

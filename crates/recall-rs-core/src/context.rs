//! Formatting of recent turns and retrieved memories into agent context.

use crate::events::{ChatRole, Message};
use recall_rs_memory::{MemoryRecord, Turn};

/// Convert stored turns into agent messages, preserving order and count.
pub fn format_recent_turns(turns: &[Turn]) -> Vec<Message> {
    turns
        .iter()
        .map(|turn| Message::new(ChatRole::from(turn.role), turn.text.clone()))
        .collect()
}

/// Render records under a header: the header, a blank line, then one record per line.
///
/// Record text is trimmed and whitespace-only records are dropped. Returns an
/// empty string when no record is left, so callers never append a bare header.
pub fn format_memory_block(records: &[MemoryRecord], header: &str) -> String {
    let lines = records
        .iter()
        .map(|record| record.content.trim())
        .filter(|content| !content.is_empty())
        .collect::<Vec<_>>();
    if lines.is_empty() {
        return String::new();
    }
    format!("{header}\n\n{}", lines.join("\n"))
}

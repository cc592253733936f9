//! Context digest: one short line per matched fact.

use crate::store::{KnowledgeEntry, MatchResult};

/// Characters kept from each fact.
pub const FACT_PREVIEW_CHARS: usize = 100;

/// Render matched knowledge as `name: <first 100 chars>...` lines.
pub fn summarize_knowledge(knowledge: &MatchResult) -> String {
    let mut summary = Vec::new();
    for (category, content) in knowledge.iter() {
        match content {
            KnowledgeEntry::Section(items) => {
                for (subcategory, info) in items {
                    summary.push(digest_line(subcategory, info));
                }
            }
            KnowledgeEntry::Fact(fact) => summary.push(digest_line(category, fact)),
        }
    }
    summary.join("\n")
}

fn digest_line(name: &str, fact: &str) -> String {
    format!("{name}: {}...", preview(fact, FACT_PREVIEW_CHARS))
}

/// First `max_chars` characters, never splitting a code point.
fn preview(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

//! Question detection.
//!
//! A cheap gate in front of everything else: only messages that look like a
//! question, or like a modding/gaming request, reach the rate limiter and
//! the model.

use regex::Regex;
use std::sync::LazyLock;

/// Openers that make a sentence a question when followed by enough words.
const QUESTION_STARTS: &[&str] = &[
    "how", "what", "where", "when", "why", "can", "could", "would", "is", "are", "does",
    "tell me", "explain", "do", "did", "will", "should", "which", "who", "whom",
    "how come", "what if", "why not", "could you",
];

/// Openers that say nothing on their own.
const BARE_FRAGMENTS: &[&str] = &["how come", "what if", "why not"];

/// Request phrases accepted anywhere in the message.
const REQUEST_PATTERNS: &[&str] = &[
    "difference between", "vs", "versus", "compare", "tell me about", "explain",
    "how to", "how can", "mod", "modding", "hack", "game crash", "cheat", "unban",
    "file editing",
];

/// Split interrogatives: "how did that come", "what do you think about", ...
static SPLIT_INTERROGATIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(\bhow\b.*\bcome\b|\bwhat\b.*\babout\b|\bwhy\b.*\bnot\b|\bwhere\b.*\bto\b|\bwho\b.*\belse\b)",
    )
    .expect("split interrogative pattern is valid")
});

/// Whether `message` is worth answering.
pub fn is_question(message: &str) -> bool {
    let message = message.trim().to_lowercase();

    if message.contains('?') {
        return true;
    }

    if BARE_FRAGMENTS.contains(&message.as_str()) {
        return false;
    }

    // At least a subject and a verb after the opener.
    if QUESTION_STARTS.iter().any(|start| message.starts_with(start))
        && message.split_whitespace().count() > 2
    {
        return true;
    }

    if REQUEST_PATTERNS.iter().any(|pattern| message.contains(pattern)) {
        return true;
    }

    SPLIT_INTERROGATIVE.is_match(&message)
}

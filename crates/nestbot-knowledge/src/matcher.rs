//! Keyword matcher: picks the knowledge entries a question talks about.
//!
//! Matching is plain set intersection between the question's words and
//! - the underscore-separated parts of a (sub)category name, or
//! - the words of a subcategory's fact.
//!
//! Every qualifying entry is returned; there is no ranking or cut-off.

use std::collections::HashSet;

use crate::store::{KnowledgeBase, KnowledgeEntry, MatchResult};

/// Words that mark a comparison question ("difference between x and y").
const COMPARISON_MARKERS: [&str; 4] = ["difference", "compare", "vs", "versus"];

/// Select the entries of `kb` relevant to `question`.
pub fn find_relevant_knowledge(kb: &KnowledgeBase, question: &str) -> MatchResult {
    tracing::info!("Finding knowledge for question: {question}");

    let words = query_words(question);
    let mut relevant = MatchResult::new();

    for (category, content) in kb.iter() {
        match content {
            KnowledgeEntry::Section(items) => {
                for (subcategory, info) in items {
                    // A name hit wins; the fact text is not looked at.
                    if intersects(&words, &name_terms(subcategory)) {
                        relevant.insert_subentry(category, subcategory, info);
                        continue;
                    }
                    if intersects(&words, &content_words(info)) {
                        relevant.insert_subentry(category, subcategory, info);
                    }
                }
            }
            KnowledgeEntry::Fact(fact) => {
                if intersects(&words, &name_terms(category)) {
                    relevant.insert_fact(category, fact);
                }
            }
        }
    }

    if COMPARISON_MARKERS.iter().any(|m| words.contains(*m)) {
        // Pull in every entity named by the question, whatever its fact says.
        for (category, content) in kb.iter() {
            if let KnowledgeEntry::Section(items) = content {
                for (subcategory, info) in items {
                    if intersects(&words, &name_terms(subcategory)) {
                        relevant.insert_subentry(category, subcategory, info);
                    }
                }
            }
        }
    }

    tracing::info!("Relevant categories found: {:?}", relevant.categories());
    relevant
}

/// Distinct lowercase whitespace-separated words of the question.
fn query_words(question: &str) -> HashSet<String> {
    question
        .trim()
        .to_lowercase()
        .split_whitespace()
        .map(String::from)
        .collect()
}

/// Terms derived from a key: its underscore-separated parts plus the whole
/// key, so a question that spells out `mod_a` names that entry too.
fn name_terms(key: &str) -> HashSet<String> {
    let key = key.to_lowercase();
    let mut terms: HashSet<String> = key
        .split('_')
        .filter(|part| !part.is_empty())
        .map(String::from)
        .collect();
    terms.insert(key);
    terms
}

fn content_words(fact: &str) -> HashSet<String> {
    fact.to_lowercase()
        .split_whitespace()
        .map(String::from)
        .collect()
}

fn intersects(a: &HashSet<String>, b: &HashSet<String>) -> bool {
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    small.iter().any(|w| large.contains(w))
}

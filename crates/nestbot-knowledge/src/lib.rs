//! # NestBot Knowledge
//!
//! Keyword-based retrieval over a small hand-written knowledge file.
//! No embeddings, no index, no scoring: a query word either hits a
//! category/subcategory name or a word of its fact, or it doesn't.
//!
//! ## How it works
//! ```text
//! User: "what causes out of memory crash"
//!   ↓
//! find_relevant_knowledge()    words ∩ {out, of, memory} → crash_fixes.out_of_memory
//!   ↓
//! summarize_knowledge()        "out_of_memory: increase virtual memory..."
//!   ↓
//! Injected into the prompt as grounding context
//! ```

pub mod matcher;
pub mod store;
pub mod summarizer;

pub use matcher::find_relevant_knowledge;
pub use store::{KnowledgeBase, KnowledgeEntry, MatchResult};
pub use summarizer::summarize_knowledge;

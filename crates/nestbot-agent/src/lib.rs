//! # NestBot Agent
//! Turns chat messages into grounded answers.
//!
//! ## Pipeline
//! ```text
//! message ─▶ question::is_question ─▶ RateLimiter ─▶ find_relevant_knowledge
//!         ─▶ summarize_knowledge ─▶ prompt ─▶ InferencePool ─▶ reply | nothing
//! ```
//!
//! Every failure along the way ends in "no reply"; nothing is ever posted
//! to the chat about internal errors.

pub mod dispatcher;
pub mod handler;
pub mod question;
pub mod responder;

pub use dispatcher::Dispatcher;
pub use handler::MessageHandler;
pub use question::is_question;
pub use responder::Responder;

#[cfg(test)]
pub(crate) mod test_support;

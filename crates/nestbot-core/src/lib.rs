//! # NestBot Core
//!
//! Shared foundation for every NestBot crate:
//! - **config**: TOML configuration with per-field defaults
//! - **error**: the `NestBotError` type and `Result` alias
//! - **traits**: `Channel` (chat platforms) and `CompletionBackend` (language models)
//! - **types**: messages flowing between channels and the agent, completion requests

pub mod config;
pub mod error;
pub mod traits;
pub mod types;

pub use error::{NestBotError, Result};

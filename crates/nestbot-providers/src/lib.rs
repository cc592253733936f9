//! # NestBot Providers
//!
//! Language model backends behind the synchronous `CompletionBackend`
//! boundary, plus the `InferencePool` that runs them off the async
//! scheduler.
//!
//! The only built-in backend talks to a llama.cpp server (or anything
//! exposing the OpenAI `/v1/completions` text-completion API).

pub mod llama_server;
pub mod pool;

use std::sync::Arc;

use nestbot_core::config::BrainConfig;
use nestbot_core::error::Result;
use nestbot_core::traits::CompletionBackend;

pub use llama_server::LlamaServerBackend;
pub use pool::InferencePool;

/// Create the configured completion backend.
///
/// Must be called from within a Tokio runtime (the backend keeps a handle to
/// it for its HTTP calls).
pub fn create_backend(config: &BrainConfig) -> Result<Arc<dyn CompletionBackend>> {
    Ok(Arc::new(LlamaServerBackend::new(config)?))
}

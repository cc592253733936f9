//! Language model boundary.

use crate::error::Result;
use crate::types::{CompletionRequest, CompletionResponse};

/// A text-completion engine: prompt in, completion out.
///
/// Calls are synchronous and may take seconds of CPU/GPU time, so callers on
/// an async runtime must move them off the scheduler threads (see the
/// inference pool in `nestbot-providers`).
pub trait CompletionBackend: Send + Sync {
    /// Backend name for logs.
    fn name(&self) -> &str;

    /// Run one completion.
    fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse>;

    /// Whether the backend is able to serve requests.
    fn health_check(&self) -> Result<bool>;
}

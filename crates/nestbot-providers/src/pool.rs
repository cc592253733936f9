//! Bounded inference pool.
//!
//! Model calls are blocking and slow. Each call runs on Tokio's blocking
//! thread pool while the calling task awaits, so other messages keep being
//! classified and matched in the meantime. A semaphore caps how many calls
//! hit the backend at once; extra callers queue on it.

use std::sync::Arc;

use nestbot_core::error::{NestBotError, Result};
use nestbot_core::traits::CompletionBackend;
use nestbot_core::types::{CompletionRequest, CompletionResponse};
use tokio::sync::Semaphore;

#[derive(Clone)]
pub struct InferencePool {
    backend: Arc<dyn CompletionBackend>,
    permits: Arc<Semaphore>,
    workers: usize,
}

impl InferencePool {
    /// `workers` is clamped to at least 1.
    pub fn new(backend: Arc<dyn CompletionBackend>, workers: usize) -> Self {
        let workers = workers.max(1);
        Self {
            backend,
            permits: Arc::new(Semaphore::new(workers)),
            workers,
        }
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Run one completion off the async scheduler.
    pub async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        let permit = self
            .permits
            .clone()
            .acquire_owned()
            .await
            .map_err(|e| NestBotError::Provider(format!("inference pool closed: {e}")))?;

        let backend = self.backend.clone();
        tokio::task::spawn_blocking(move || {
            // Held until the backend returns, even if the caller goes away.
            let _permit = permit;
            backend.complete(&request)
        })
        .await
        .map_err(|e| NestBotError::Provider(format!("inference task failed: {e}")))?
    }

    /// Backend health, checked off the async scheduler.
    pub async fn health_check(&self) -> Result<bool> {
        let backend = self.backend.clone();
        tokio::task::spawn_blocking(move || backend.health_check())
            .await
            .map_err(|e| NestBotError::Provider(format!("health check task failed: {e}")))?
    }
}

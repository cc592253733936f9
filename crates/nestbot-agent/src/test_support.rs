//! Fakes shared by the agent tests.

use std::sync::{Arc, Mutex};

use nestbot_core::error::{NestBotError, Result};
use nestbot_core::traits::CompletionBackend;
use nestbot_core::types::{CompletionRequest, CompletionResponse, IncomingMessage};

/// Replays a canned answer and records every request.
pub struct FakeBackend {
    reply: std::result::Result<String, String>,
    pub requests: Mutex<Vec<CompletionRequest>>,
}

impl FakeBackend {
    pub fn answering(text: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(text.to_string()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(msg: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(msg.to_string()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl CompletionBackend for FakeBackend {
    fn name(&self) -> &str {
        "fake"
    }

    fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse> {
        self.requests.lock().unwrap().push(request.clone());
        match &self.reply {
            Ok(text) => Ok(CompletionResponse::text(text.clone())),
            Err(msg) => Err(NestBotError::Provider(msg.clone())),
        }
    }

    fn health_check(&self) -> Result<bool> {
        Ok(true)
    }
}

pub const KNOWLEDGE_JSON: &str =
    r#"{"crash_fixes": {"out_of_memory": "increase virtual memory"}}"#;

pub fn message(id: &str, sender: &str, content: &str) -> IncomingMessage {
    IncomingMessage {
        channel: "test".into(),
        message_id: id.into(),
        thread_id: "chan-1".into(),
        sender_id: sender.into(),
        sender_name: Some(format!("user-{sender}")),
        content: content.into(),
        is_bot: false,
        timestamp: chrono::Utc::now(),
    }
}

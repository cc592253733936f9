//! Per-message handling: gates, answer, reply.

use std::sync::Arc;

use nestbot_core::config::NestBotConfig;
use nestbot_core::types::{IncomingMessage, OutgoingMessage};
use nestbot_knowledge::KnowledgeBase;
use nestbot_providers::InferencePool;
use nestbot_security::RateLimiter;

use crate::question::is_question;
use crate::responder::Responder;

pub struct MessageHandler {
    responder: Responder,
    rate_limiter: Arc<RateLimiter>,
    signature: String,
}

impl MessageHandler {
    pub fn new(responder: Responder, rate_limiter: Arc<RateLimiter>, signature: impl Into<String>) -> Self {
        Self {
            responder,
            rate_limiter,
            signature: signature.into(),
        }
    }

    /// Wire a handler from configuration and the shared state objects.
    pub fn from_config(
        config: &NestBotConfig,
        knowledge: Arc<KnowledgeBase>,
        inference: InferencePool,
    ) -> Self {
        Self::new(
            Responder::new(config, knowledge, inference),
            Arc::new(RateLimiter::from_config(&config.rate_limit)),
            config.identity.signature.clone(),
        )
    }

    /// Decide whether and how to answer one message.
    pub async fn handle(&self, msg: &IncomingMessage) -> Option<OutgoingMessage> {
        if msg.is_bot {
            return None;
        }

        let user = msg.sender_name.as_deref().unwrap_or("");
        tracing::info!(user = %user, user_id = %msg.sender_id, "Message: {}", msg.content);

        if !is_question(&msg.content) {
            return None;
        }

        if self.rate_limiter.is_rate_limited(&msg.sender_id) {
            tracing::warn!(user = %user, user_id = %msg.sender_id, "User is rate limited");
            return None;
        }

        let answer = self.responder.generate_response(&msg.content).await?;
        Some(
            OutgoingMessage::new(&msg.thread_id, answer)
                .with_footer(&self.signature)
                .in_reply_to(&msg.message_id),
        )
    }
}

//! Message dispatch loop.
//!
//! Each inbound message gets its own task: while one waits on the model,
//! others are classified, rate limited and matched. Replies to different
//! users may therefore go out in any order.

use std::sync::Arc;

use futures::StreamExt;
use nestbot_core::error::Result;
use nestbot_core::traits::Channel;
use tokio::task::JoinSet;

use crate::handler::MessageHandler;

pub struct Dispatcher {
    handler: Arc<MessageHandler>,
}

impl Dispatcher {
    pub fn new(handler: MessageHandler) -> Self {
        Self {
            handler: Arc::new(handler),
        }
    }

    /// Serve `channel` until its message stream ends, then wait for the
    /// replies still in flight.
    pub async fn run(&self, channel: Arc<dyn Channel>) -> Result<()> {
        let mut incoming = channel.listen().await?;
        let mut tasks = JoinSet::new();
        tracing::info!("Dispatching messages from {}", channel.name());

        loop {
            tokio::select! {
                msg = incoming.next() => {
                    let Some(msg) = msg else { break };
                    let handler = self.handler.clone();
                    let channel = channel.clone();
                    tasks.spawn(async move {
                        let Some(reply) = handler.handle(&msg).await else {
                            return;
                        };
                        if let Err(e) = channel.send(reply).await {
                            tracing::error!(
                                user_id = %msg.sender_id,
                                "Failed to deliver reply: {e}"
                            );
                        }
                    });
                }
                Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                    log_task_outcome(joined);
                }
            }
        }

        tracing::info!("{} message stream ended", channel.name());
        while let Some(joined) = tasks.join_next().await {
            log_task_outcome(joined);
        }
        Ok(())
    }
}

fn log_task_outcome(joined: std::result::Result<(), tokio::task::JoinError>) {
    if let Err(e) = joined {
        tracing::error!("Unexpected error while handling a message: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FakeBackend, KNOWLEDGE_JSON, message};
    use async_trait::async_trait;
    use futures::stream::Stream;
    use nestbot_core::config::NestBotConfig;
    use nestbot_core::error::NestBotError;
    use nestbot_core::types::{IncomingMessage, OutgoingMessage};
    use nestbot_knowledge::KnowledgeBase;
    use nestbot_providers::InferencePool;
    use std::sync::Mutex;

    /// Replays a fixed list of messages and records what gets sent.
    struct ScriptedChannel {
        inbox: Mutex<Vec<IncomingMessage>>,
        sent: Mutex<Vec<OutgoingMessage>>,
        fail_sends: bool,
    }

    impl ScriptedChannel {
        fn new(inbox: Vec<IncomingMessage>, fail_sends: bool) -> Arc<Self> {
            Arc::new(Self {
                inbox: Mutex::new(inbox),
                sent: Mutex::new(Vec::new()),
                fail_sends,
            })
        }
    }

    #[async_trait]
    impl Channel for ScriptedChannel {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn connect(&mut self) -> Result<()> {
            Ok(())
        }

        async fn disconnect(&mut self) -> Result<()> {
            Ok(())
        }

        fn is_connected(&self) -> bool {
            true
        }

        async fn send(&self, message: OutgoingMessage) -> Result<()> {
            if self.fail_sends {
                return Err(NestBotError::Channel("403 Missing Permissions".into()));
            }
            self.sent.lock().unwrap().push(message);
            Ok(())
        }

        async fn listen(&self) -> Result<Box<dyn Stream<Item = IncomingMessage> + Send + Unpin>> {
            let msgs = std::mem::take(&mut *self.inbox.lock().unwrap());
            Ok(Box::new(futures::stream::iter(msgs)))
        }
    }

    fn dispatcher(backend: Arc<FakeBackend>) -> Dispatcher {
        let kb = Arc::new(KnowledgeBase::from_json_str(KNOWLEDGE_JSON).unwrap());
        Dispatcher::new(MessageHandler::from_config(
            &NestBotConfig::default(),
            kb,
            InferencePool::new(backend, 1),
        ))
    }

    #[tokio::test]
    async fn test_end_to_end() {
        let backend = FakeBackend::answering("Raise the page file.");
        let channel = ScriptedChannel::new(
            vec![
                message("1", "42", "good morning everyone"),
                message("2", "42", "what causes out of memory crash"),
                message("3", "42", "what causes out of memory crash"),
                message("4", "7", "how is the weather today"),
            ],
            false,
        );

        dispatcher(backend.clone()).run(channel.clone()).await.unwrap();

        let sent = channel.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        // Only one of user 42's two questions gets through the cooldown.
        assert!(matches!(sent[0].reply_to.as_deref(), Some("2") | Some("3")));
        assert_eq!(sent[0].content, "Raise the page file.");
        assert_eq!(backend.calls(), 1);
    }

    #[tokio::test]
    async fn test_delivery_failure_is_swallowed() {
        let backend = FakeBackend::answering("Raise the page file.");
        let channel = ScriptedChannel::new(
            vec![
                message("1", "42", "what causes out of memory crash"),
                message("2", "7", "what causes out of memory crash"),
            ],
            true,
        );

        assert!(dispatcher(backend.clone()).run(channel.clone()).await.is_ok());
        assert_eq!(backend.calls(), 2);
        assert!(channel.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_model_failure_posts_nothing() {
        let channel = ScriptedChannel::new(
            vec![message("1", "42", "what causes out of memory crash")],
            false,
        );
        dispatcher(FakeBackend::failing("llama crashed"))
            .run(channel.clone())
            .await
            .unwrap();
        assert!(channel.sent.lock().unwrap().is_empty());
    }
}

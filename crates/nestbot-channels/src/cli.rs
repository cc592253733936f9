//! Local stdin/stdout channel.
//!
//! Each input line is a message from a single local user; replies are
//! printed with their footer. Useful for checking answers against a
//! knowledge file without a Discord bot.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::Stream;
use nestbot_core::error::Result;
use nestbot_core::traits::Channel;
use nestbot_core::types::{IncomingMessage, OutgoingMessage};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_stream::wrappers::UnboundedReceiverStream;

pub const CLI_USER_ID: &str = "local";
const CLI_THREAD_ID: &str = "cli";

pub struct CliChannel {
    user_name: String,
    next_id: Arc<AtomicU64>,
    connected: bool,
}

impl CliChannel {
    pub fn new(user_name: impl Into<String>) -> Self {
        Self {
            user_name: user_name.into(),
            next_id: Arc::new(AtomicU64::new(1)),
            connected: false,
        }
    }

    /// Wrap one input line as an incoming message.
    pub fn to_incoming(&self, line: &str) -> IncomingMessage {
        line_to_incoming(&self.user_name, &self.next_id, line)
    }
}

impl Default for CliChannel {
    fn default() -> Self {
        Self::new(whoami())
    }
}

fn whoami() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "you".into())
}

fn line_to_incoming(user_name: &str, next_id: &AtomicU64, line: &str) -> IncomingMessage {
    IncomingMessage {
        channel: "cli".into(),
        message_id: next_id.fetch_add(1, Ordering::Relaxed).to_string(),
        thread_id: CLI_THREAD_ID.into(),
        sender_id: CLI_USER_ID.into(),
        sender_name: Some(user_name.to_string()),
        content: line.to_string(),
        is_bot: false,
        timestamp: chrono::Utc::now(),
    }
}

#[async_trait]
impl Channel for CliChannel {
    fn name(&self) -> &str {
        "cli"
    }

    async fn connect(&mut self) -> Result<()> {
        self.connected = true;
        tracing::info!("CLI channel ready, type a question (Ctrl-D to quit)");
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<()> {
        self.connected = false;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    async fn send(&self, message: OutgoingMessage) -> Result<()> {
        println!("\n{}\n", message.rendered());
        Ok(())
    }

    async fn listen(&self) -> Result<Box<dyn Stream<Item = IncomingMessage> + Send + Unpin>> {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        let user_name = self.user_name.clone();
        let next_id = self.next_id.clone();

        tokio::spawn(async move {
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        if line.trim().is_empty() {
                            continue;
                        }
                        if tx.send(line_to_incoming(&user_name, &next_id, &line)).is_err() {
                            return;
                        }
                    }
                    Ok(None) => {
                        tracing::info!("stdin closed");
                        return;
                    }
                    Err(e) => {
                        tracing::error!("stdin read error: {e}");
                        return;
                    }
                }
            }
        });

        Ok(Box::new(UnboundedReceiverStream::new(rx)))
    }
}

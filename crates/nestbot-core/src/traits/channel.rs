//! Chat platform abstraction.

use async_trait::async_trait;
use futures::stream::Stream;

use crate::error::Result;
use crate::types::{IncomingMessage, OutgoingMessage};

/// A chat platform the bot listens on and replies through.
#[async_trait]
pub trait Channel: Send + Sync {
    /// Channel name (e.g. "discord", "cli").
    fn name(&self) -> &str;

    /// Establish the connection (login, handshake).
    async fn connect(&mut self) -> Result<()>;

    async fn disconnect(&mut self) -> Result<()>;

    fn is_connected(&self) -> bool;

    /// Deliver a reply.
    async fn send(&self, message: OutgoingMessage) -> Result<()>;

    /// Stream of inbound messages. Ends when the connection is gone for good.
    async fn listen(&self) -> Result<Box<dyn Stream<Item = IncomingMessage> + Send + Unpin>>;
}

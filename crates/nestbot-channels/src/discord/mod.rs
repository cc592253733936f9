//! Discord channel: gateway WebSocket for events, REST API for replies.

pub mod gateway;
pub mod models;

use async_trait::async_trait;
use futures::stream::Stream;
use nestbot_core::error::{NestBotError, Result};
use nestbot_core::traits::Channel;
use nestbot_core::types::{IncomingMessage, OutgoingMessage};
use tokio_stream::wrappers::UnboundedReceiverStream;

use self::models::DiscordUser;

const API_BASE: &str = "https://discord.com/api/v10";

pub struct DiscordChannel {
    token: String,
    client: reqwest::Client,
    connected: bool,
}

impl DiscordChannel {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            client: reqwest::Client::new(),
            connected: false,
        }
    }

    fn api_url(path: &str) -> String {
        format!("{API_BASE}{path}")
    }

    fn auth_header(&self) -> String {
        format!("Bot {}", self.token)
    }

    /// Get the bot's own user (validates the token).
    pub async fn get_me(&self) -> Result<DiscordUser> {
        let response = self
            .client
            .get(Self::api_url("/users/@me"))
            .header("Authorization", self.auth_header())
            .send()
            .await
            .map_err(|e| NestBotError::Channel(format!("Discord getMe failed: {e}")))?;

        if !response.status().is_success() {
            return Err(NestBotError::Channel(format!(
                "Discord rejected the bot token: {}",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| NestBotError::Channel(format!("Invalid Discord user response: {e}")))
    }

    /// Post a message (an embed reply when `reply_to` is set).
    pub async fn create_message(&self, message: &OutgoingMessage) -> Result<()> {
        let url = Self::api_url(&format!("/channels/{}/messages", message.thread_id));
        let body = models::reply_payload(message);

        let response = self
            .client
            .post(&url)
            .header("Authorization", self.auth_header())
            .json(&body)
            .send()
            .await
            .map_err(|e| NestBotError::Channel(format!("Discord createMessage failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(NestBotError::Channel(format!(
                "Discord send failed {status}: {text}"
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl Channel for DiscordChannel {
    fn name(&self) -> &str {
        "discord"
    }

    async fn connect(&mut self) -> Result<()> {
        let me = self.get_me().await?;
        tracing::info!("Discord bot: {} ({})", me.username, me.id);
        self.connected = true;
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
        self.create_message(&message).await
    }

    async fn listen(&self) -> Result<Box<dyn Stream<Item = IncomingMessage> + Send + Unpin>> {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        let token = self.token.clone();
        tokio::spawn(async move {
            gateway::run(token, tx).await;
        });
        Ok(Box::new(UnboundedReceiverStream::new(rx)))
    }
}

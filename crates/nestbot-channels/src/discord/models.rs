//! Discord API payloads (only the fields the bot reads).

use nestbot_core::types::{IncomingMessage, OutgoingMessage};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscordUser {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub global_name: Option<String>,
    #[serde(default)]
    pub bot: bool,
}

/// `MESSAGE_CREATE` event body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscordMessage {
    pub id: String,
    pub channel_id: String,
    pub author: DiscordUser,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl DiscordMessage {
    /// Convert to a NestBot IncomingMessage.
    pub fn to_incoming(&self) -> IncomingMessage {
        let timestamp = self
            .timestamp
            .as_deref()
            .and_then(|ts| chrono::DateTime::parse_from_rfc3339(ts).ok())
            .map(|ts| ts.with_timezone(&chrono::Utc))
            .unwrap_or_else(chrono::Utc::now);

        IncomingMessage {
            channel: "discord".into(),
            message_id: self.id.clone(),
            thread_id: self.channel_id.clone(),
            sender_id: self.author.id.clone(),
            sender_name: Some(self.author.username.clone()),
            content: self.content.clone(),
            is_bot: self.author.bot,
            timestamp,
        }
    }
}

/// A gateway frame: `{op, d, s, t}`.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayPayload {
    pub op: u8,
    #[serde(default)]
    pub d: Value,
    #[serde(default)]
    pub s: Option<u64>,
    #[serde(default)]
    pub t: Option<String>,
}

/// REST body for a reply: the answer as an embed with the disclaimer in the
/// footer, attached to the triggering message.
pub fn reply_payload(message: &OutgoingMessage) -> Value {
    let mut embed = json!({ "description": message.content });
    if let Some(footer) = &message.footer {
        embed["footer"] = json!({ "text": footer.trim() });
    }

    let mut body = json!({ "embeds": [embed] });
    if let Some(reply_to) = &message.reply_to {
        body["message_reference"] = json!({
            "message_id": reply_to,
            "fail_if_not_exists": false,
        });
    }
    body
}

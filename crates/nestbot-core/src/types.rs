//! Message and completion types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A message received from a chat platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomingMessage {
    /// Channel that delivered it ("discord", "cli", ...).
    pub channel: String,
    /// Platform message id, used to attach the reply.
    pub message_id: String,
    /// Conversation / text channel id.
    pub thread_id: String,
    pub sender_id: String,
    pub sender_name: Option<String>,
    pub content: String,
    /// Authored by a bot account.
    #[serde(default)]
    pub is_bot: bool,
    pub timestamp: DateTime<Utc>,
}

/// A reply to deliver on a chat platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutgoingMessage {
    pub thread_id: String,
    pub content: String,
    /// Disclaimer shown under the answer.
    pub footer: Option<String>,
    /// Message this reply is attached to.
    pub reply_to: Option<String>,
}

impl OutgoingMessage {
    pub fn new(thread_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            thread_id: thread_id.into(),
            content: content.into(),
            footer: None,
            reply_to: None,
        }
    }

    pub fn with_footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = Some(footer.into());
        self
    }

    pub fn in_reply_to(mut self, message_id: impl Into<String>) -> Self {
        self.reply_to = Some(message_id.into());
        self
    }

    /// Plain-text form: content followed by the footer.
    pub fn rendered(&self) -> String {
        match &self.footer {
            Some(footer) => format!("{}{}", self.content, footer),
            None => self.content.clone(),
        }
    }
}

/// Parameters for one completion call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
    #[serde(default)]
    pub stop: Vec<String>,
    /// Include the prompt in the returned text.
    #[serde(default)]
    pub echo: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompletionChoice {
    pub text: String,
}

/// Completion output. Mirrors the `choices[].text` shape of llama.cpp / OpenAI
/// text completions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompletionResponse {
    #[serde(default)]
    pub choices: Vec<CompletionChoice>,
}

impl CompletionResponse {
    /// Single-choice response.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            choices: vec![CompletionChoice { text: text.into() }],
        }
    }

    /// Text of the first choice, if any.
    pub fn first_text(&self) -> Option<&str> {
        self.choices.first().map(|c| c.text.as_str())
    }
}

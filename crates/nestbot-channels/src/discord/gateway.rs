//! Discord gateway client.
//! Handles: HELLO, heartbeats, IDENTIFY, READY, MESSAGE_CREATE, reconnects.
//!
//! No session resume: after any disconnect the client identifies again.

use std::time::Duration;

use futures::{SinkExt, StreamExt};
use nestbot_core::error::{NestBotError, Result};
use nestbot_core::types::IncomingMessage;
use rand::Rng;
use serde_json::{Value, json};
use tokio::sync::mpsc::UnboundedSender;
use tokio_tungstenite::tungstenite::Message as WsMessage;

use super::models::{DiscordMessage, DiscordUser, GatewayPayload};

const GATEWAY_URL: &str = "wss://gateway.discord.gg/?v=10&encoding=json";

/// GUILD_MESSAGES | DIRECT_MESSAGES | MESSAGE_CONTENT.
pub const INTENTS: u64 = (1 << 9) | (1 << 12) | (1 << 15);

const RECONNECT_DELAY: Duration = Duration::from_secs(5);

mod op {
    pub const DISPATCH: u8 = 0;
    pub const HEARTBEAT: u8 = 1;
    pub const IDENTIFY: u8 = 2;
    pub const RECONNECT: u8 = 7;
    pub const INVALID_SESSION: u8 = 9;
    pub const HELLO: u8 = 10;
    pub const HEARTBEAT_ACK: u8 = 11;
}

/// What a single gateway frame means for the session.
#[derive(Debug, Clone)]
pub enum GatewayEvent {
    Hello { heartbeat_interval: Duration },
    Ready(DiscordUser),
    MessageCreate(DiscordMessage),
    HeartbeatRequest,
    HeartbeatAck,
    /// Server asked us to reconnect (op 7 / op 9).
    Reconnect,
    /// Dispatch we don't care about.
    Other(Option<String>),
}

/// Decode one text frame. Returns the sequence number (if any) and the event.
pub fn parse_frame(text: &str) -> Result<(Option<u64>, GatewayEvent)> {
    let payload: GatewayPayload = serde_json::from_str(text)
        .map_err(|e| NestBotError::Channel(format!("Invalid gateway frame: {e}")))?;

    let event = match payload.op {
        op::HELLO => {
            let ms = payload.d["heartbeat_interval"].as_u64().ok_or_else(|| {
                NestBotError::Channel("HELLO without heartbeat_interval".into())
            })?;
            GatewayEvent::Hello {
                heartbeat_interval: Duration::from_millis(ms),
            }
        }
        op::HEARTBEAT => GatewayEvent::HeartbeatRequest,
        op::HEARTBEAT_ACK => GatewayEvent::HeartbeatAck,
        op::RECONNECT | op::INVALID_SESSION => GatewayEvent::Reconnect,
        op::DISPATCH => match payload.t.as_deref() {
            Some("READY") => {
                let user: DiscordUser = serde_json::from_value(payload.d["user"].clone())?;
                GatewayEvent::Ready(user)
            }
            Some("MESSAGE_CREATE") => {
                GatewayEvent::MessageCreate(serde_json::from_value(payload.d)?)
            }
            other => GatewayEvent::Other(other.map(String::from)),
        },
        _ => GatewayEvent::Other(None),
    };
    Ok((payload.s, event))
}

pub fn identify_payload(token: &str) -> Value {
    json!({
        "op": op::IDENTIFY,
        "d": {
            "token": token,
            "intents": INTENTS,
            "properties": {
                "os": std::env::consts::OS,
                "browser": "nestbot",
                "device": "nestbot",
            }
        }
    })
}

pub fn heartbeat_payload(seq: Option<u64>) -> Value {
    json!({ "op": op::HEARTBEAT, "d": seq })
}

/// Keep a gateway session alive, forwarding messages to `tx`, until the
/// receiver is dropped.
pub async fn run(token: String, tx: UnboundedSender<IncomingMessage>) {
    tracing::info!("Discord gateway loop started");
    loop {
        match run_session(&token, &tx).await {
            Ok(()) if tx.is_closed() => {
                tracing::info!("Discord gateway stopped (receiver dropped)");
                return;
            }
            Ok(()) => tracing::info!("Discord gateway session ended, reconnecting"),
            Err(e) => tracing::error!("Discord gateway error: {e}"),
        }
        if tx.is_closed() {
            return;
        }
        tokio::time::sleep(RECONNECT_DELAY).await;
    }
}

async fn run_session(token: &str, tx: &UnboundedSender<IncomingMessage>) -> Result<()> {
    let (ws_stream, _response) = tokio_tungstenite::connect_async(GATEWAY_URL)
        .await
        .map_err(|e| NestBotError::Channel(format!("WebSocket connect failed: {e}")))?;
    let (mut write, mut read) = ws_stream.split();

    let mut seq: Option<u64> = None;
    // Set by HELLO; until then the heartbeat timer stays disarmed.
    let mut heartbeat: Option<tokio::time::Interval> = None;

    loop {
        let tick = async {
            match heartbeat.as_mut() {
                Some(interval) => {
                    interval.tick().await;
                }
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            _ = tick => {
                send_json(&mut write, &heartbeat_payload(seq)).await?;
                tracing::trace!("Discord heartbeat sent (seq={seq:?})");
            }
            frame = read.next() => {
                let Some(frame) = frame else {
                    return Ok(());
                };
                let frame = frame
                    .map_err(|e| NestBotError::Channel(format!("WebSocket error: {e}")))?;

                match frame {
                    WsMessage::Text(text) => {
                        let (s, event) = match parse_frame(&text) {
                            Ok(parsed) => parsed,
                            Err(e) => {
                                tracing::warn!("Failed to parse Discord event: {e}");
                                continue;
                            }
                        };
                        if s.is_some() {
                            seq = s;
                        }

                        match event {
                            GatewayEvent::Hello { heartbeat_interval } => {
                                // First beat after a random fraction of the interval.
                                let jitter = heartbeat_interval
                                    .mul_f64(rand::thread_rng().gen_range(0.0..1.0));
                                heartbeat = Some(tokio::time::interval_at(
                                    tokio::time::Instant::now() + jitter,
                                    heartbeat_interval,
                                ));
                                send_json(&mut write, &identify_payload(token)).await?;
                            }
                            GatewayEvent::Ready(user) => {
                                tracing::info!("Bot {} is ready and online!", user.username);
                            }
                            GatewayEvent::MessageCreate(msg) => {
                                if tx.send(msg.to_incoming()).is_err() {
                                    return Ok(());
                                }
                            }
                            GatewayEvent::HeartbeatRequest => {
                                send_json(&mut write, &heartbeat_payload(seq)).await?;
                            }
                            GatewayEvent::HeartbeatAck => {}
                            GatewayEvent::Reconnect => {
                                tracing::info!("Discord requested reconnect");
                                return Ok(());
                            }
                            GatewayEvent::Other(t) => {
                                tracing::trace!("Discord event ignored: {t:?}");
                            }
                        }
                    }
                    WsMessage::Close(frame) => {
                        tracing::info!("Discord WebSocket closed: {:?}", frame);
                        return Ok(());
                    }
                    _ => {}
                }
            }
        }
    }
}

async fn send_json<S>(write: &mut S, value: &Value) -> Result<()>
where
    S: futures::Sink<WsMessage> + Unpin,
    S::Error: std::fmt::Display,
{
    write
        .send(WsMessage::Text(value.to_string()))
        .await
        .map_err(|e| NestBotError::Channel(format!("WebSocket send failed: {e}")))
}

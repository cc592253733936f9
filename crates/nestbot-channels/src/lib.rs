//! # NestBot Channels
//! Chat platforms the bot can sit in.
//!
//! - **discord**: gateway WebSocket for inbound messages, REST for embed replies
//! - **cli**: stdin/stdout, for trying the bot without a server

pub mod cli;
pub mod discord;

pub use cli::CliChannel;
pub use discord::DiscordChannel;

//! # NestBot Security
//!
//! Abuse protection for the chat front door. Currently a per-user cooldown:
//! once a user's question is accepted, further questions from the same user
//! are ignored until the window has elapsed.

pub mod rate_limit;

pub use rate_limit::{Clock, RateLimiter, SystemClock};

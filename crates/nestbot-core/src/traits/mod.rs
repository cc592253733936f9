//! Seams between the agent and the outside world.

pub mod channel;
pub mod completion;

pub use channel::Channel;
pub use completion::CompletionBackend;

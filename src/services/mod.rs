//! Chat services module
//!
//! The hosted chat-completion client behind the proxy endpoint, and the
//! fallback-aware conversation client that talks to the proxy.

pub mod chat;
pub mod client;
pub mod upstream;

// Re-export main types
pub use chat::{ChatBackend, ChatError, ChatMessage, ChatReply, ChatRequest, ChatRole};
pub use client::{ChatClient, ChatExchange, ProxyBackend};
pub use upstream::UpstreamClient;

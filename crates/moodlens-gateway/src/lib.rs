//! MoodLens Gateway - chat-completions client for the hosted AI gateway
//!
//! - chat: request/response wire types (text and multimodal messages)
//! - client: authenticated `/chat/completions` client

pub mod chat;
pub mod client;

pub use chat::{ChatMessage, ContentPart, ImageUrl, MessageContent, Role};
pub use client::{GatewayClient, GatewayConfig, GatewayError, DEFAULT_GATEWAY_URL, DEFAULT_MODEL};

//! Completion client for chat requests against model provider endpoints.

mod client;
mod error;
mod types;

pub use client::{CompletionClient, OpenAiCompatibleClient};
pub use error::LlmError;
pub use types::{
    ChatRequest, ChatResponse, Choice, ContentPart, ImageUrl, Message, MessageContent, Role, Usage,
};

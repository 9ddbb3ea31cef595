use crate::domain::chat::{ChatMessage, ToolSpec};
use crate::domain::model::ScoredLocation;
use crate::utils::error::Result;
use async_trait::async_trait;
use tokio::sync::mpsc;

/// Semantic search over the travel knowledge base.
#[async_trait]
pub trait LocationIndex: Send + Sync {
    /// Returns at most `k` candidates, nearest first.
    async fn similarity_search(&self, query: &str, k: usize) -> Result<Vec<ScoredLocation>>;
}

#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

/// A tool-calling chat model. Returns the next assistant message, which
/// either carries text or requests tool calls.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, messages: &[ChatMessage], tools: &[ToolSpec]) -> Result<ChatMessage>;

    /// Like `complete`, but text tokens are sent on `token_tx` as they are
    /// generated. The returned message holds the full text and any tool calls.
    async fn stream(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolSpec],
        token_tx: mpsc::Sender<String>,
    ) -> Result<ChatMessage>;
}

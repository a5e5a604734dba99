//! Word validity capability consumed by the placement engine.

use async_trait::async_trait;

/// Outcome of an external word check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Accepted { definition: Option<String> },
    /// Unknown word, or blocked by the content policy. Both look the same to
    /// the player.
    NotFound,
    /// The service could not give an answer.
    Unavailable,
}

#[async_trait]
pub trait WordValidator: Send + Sync {
    /// `word` is uppercase A-Z.
    async fn validate(&self, word: &str) -> Verdict;
}

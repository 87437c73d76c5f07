//! Text embedding boundary.

pub mod hf;

pub use hf::HfEmbedder;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmbedError {
    #[error("embedding request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("embedding api returned status {status}: {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("malformed embedding response: {0}")]
    MalformedResponse(String),
}

/// Converts text into fixed-length vectors.
///
/// Implementations must preserve order: vector `i` of the result belongs to
/// input `i`, and every vector shares one dimensionality.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embeds a batch of texts.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError>;

    /// Embeds a single query string.
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        let vectors = self.embed(&[text.to_string()]).await?;
        vectors.into_iter().next().ok_or_else(|| {
            EmbedError::MalformedResponse("no vector returned for query".to_string())
        })
    }
}

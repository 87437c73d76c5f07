use std::sync::Arc;

use thiserror::Error;

use crate::config::AppConfig;
use crate::embedding::{EmbedError, Embedder, HfEmbedder};
use crate::generation::{AnswerGenerator, GenerateError, HfGenerator};
use crate::index::{IndexError, VectorIndex};
use crate::scrape::{PageSource, ScrapeError};

#[derive(Debug, Error)]
pub enum InitError {
    #[error("failed to scrape the source page: {0}")]
    Scrape(#[from] ScrapeError),

    #[error("failed to embed the scraped documents: {0}")]
    Embed(#[from] EmbedError),

    #[error("failed to build the vector index: {0}")]
    Index(#[from] IndexError),

    #[error("failed to build the answer generator: {0}")]
    Generator(#[from] GenerateError),
}

/// Global application state shared across all routes.
///
/// Built once before the server accepts connections and never mutated
/// afterwards; handlers only read from it.
pub struct AppState {
    pub config: AppConfig,
    pub index: VectorIndex,
    pub generator: Arc<dyn AnswerGenerator>,
}

impl AppState {
    /// Initializes the application state.
    ///
    /// This process includes:
    /// 1. Scraping the configured source page into documents
    /// 2. Embedding every document through the hosted model
    /// 3. Building the in-memory vector index
    /// 4. Wiring the answer generator
    ///
    /// Any failure is fatal; the server must not start with partial state.
    pub async fn initialize(config: AppConfig) -> Result<Arc<Self>, InitError> {
        let source = PageSource::new(&config.source_url, config.request_timeout)?;
        let documents = source.load().await?;
        tracing::info!(
            "scraped {} documents from {}",
            documents.len(),
            config.source_url
        );

        let embedder: Arc<dyn Embedder> = Arc::new(HfEmbedder::new(
            &config.hf_api_base,
            &config.embedding_model,
            &config.hf_api_token,
            config.request_timeout,
        )?);

        let texts: Vec<String> = documents.iter().map(|doc| doc.content.clone()).collect();
        let embeddings = embedder.embed(&texts).await?;
        let index = VectorIndex::build(embedder, documents, embeddings)?;
        tracing::info!(
            "vector index ready: {} entries, {} dimensions",
            index.len(),
            index.dimensions()
        );

        let generator: Arc<dyn AnswerGenerator> = Arc::new(HfGenerator::new(
            &config.hf_api_base,
            &config.chat_model,
            &config.hf_api_token,
            config.generation_timeout,
        )?);

        Ok(Self::assemble(config, index, generator))
    }

    /// Assembles a state from already-built parts; tests use this to stand
    /// in fakes behind the collaborator traits.
    pub fn assemble(
        config: AppConfig,
        index: VectorIndex,
        generator: Arc<dyn AnswerGenerator>,
    ) -> Arc<Self> {
        Arc::new(Self {
            config,
            index,
            generator,
        })
    }
}

//! In-memory vector index, built once at startup and read-only afterwards.

use std::cmp::Ordering;
use std::sync::Arc;

use ndarray::ArrayView1;
use thiserror::Error;

use crate::embedding::{EmbedError, Embedder};
use crate::scrape::Document;

/// Documents returned per query unless configured otherwise.
pub const DEFAULT_TOP_K: usize = 4;

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("got {documents} documents but {embeddings} embeddings")]
    LengthMismatch {
        documents: usize,
        embeddings: usize,
    },
    #[error("embedding dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },
    #[error("cannot index an empty embedding vector")]
    EmptyEmbedding,
}

/// A document returned from a similarity query.
#[derive(Debug, Clone)]
pub struct RetrievedDocument {
    pub document: Document,
    pub score: f32,
}

struct IndexEntry {
    document: Document,
    embedding: Vec<f32>,
}

/// Brute-force nearest-neighbour index over the scraped corpus.
///
/// Holds the embedder that produced the stored vectors and reuses it for
/// queries, so query and corpus vectors always share one space.
pub struct VectorIndex {
    embedder: Arc<dyn Embedder>,
    entries: Vec<IndexEntry>,
    dimensions: usize,
}

impl VectorIndex {
    /// Pairs documents with their embeddings. Embedding `i` must belong to
    /// document `i` and all embeddings must share one dimensionality.
    pub fn build(
        embedder: Arc<dyn Embedder>,
        documents: Vec<Document>,
        embeddings: Vec<Vec<f32>>,
    ) -> Result<Self, IndexError> {
        if documents.len() != embeddings.len() {
            return Err(IndexError::LengthMismatch {
                documents: documents.len(),
                embeddings: embeddings.len(),
            });
        }

        let dimensions = embeddings.first().map(Vec::len).unwrap_or(0);
        if !embeddings.is_empty() && dimensions == 0 {
            return Err(IndexError::EmptyEmbedding);
        }
        for embedding in &embeddings {
            if embedding.len() != dimensions {
                return Err(IndexError::DimensionMismatch {
                    expected: dimensions,
                    got: embedding.len(),
                });
            }
        }

        let entries = documents
            .into_iter()
            .zip(embeddings)
            .map(|(document, embedding)| IndexEntry {
                document,
                embedding,
            })
            .collect();

        Ok(Self {
            embedder,
            entries,
            dimensions,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Embeds `text` and returns up to `k` documents ordered by decreasing
    /// cosine similarity. An empty index yields an empty result.
    pub async fn query(&self, text: &str, k: usize) -> Result<Vec<RetrievedDocument>, EmbedError> {
        if self.entries.is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        let query = self.embedder.embed_query(text).await?;

        let mut scored: Vec<(usize, f32)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(idx, entry)| (idx, cosine_similarity(&query, &entry.embedding)))
            .collect();
        scored.sort_by(|left, right| right.1.partial_cmp(&left.1).unwrap_or(Ordering::Equal));

        Ok(scored
            .into_iter()
            .take(k)
            .map(|(idx, score)| RetrievedDocument {
                document: self.entries[idx].document.clone(),
                score,
            })
            .collect())
    }
}

/// Cosine similarity of two vectors; zero when either has no magnitude or
/// the lengths disagree.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let left = ArrayView1::from(a);
    let right = ArrayView1::from(b);

    let denom = left.dot(&left).sqrt() * right.dot(&right).sqrt();
    if denom <= f32::EPSILON {
        return 0.0;
    }

    left.dot(&right) / denom
}

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;

    const AXES: [&str; 3] = ["rust", "piano", "cooking"];

    /// Deterministic stand-in for the hosted model: one axis per keyword.
    struct KeywordEmbedder;

    #[async_trait]
    impl Embedder for KeywordEmbedder {
        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
            Ok(texts.iter().map(|text| keyword_vector(text)).collect())
        }
    }

    fn keyword_vector(text: &str) -> Vec<f32> {
        let lowered = text.to_lowercase();
        AXES.iter()
            .map(|keyword| lowered.matches(keyword).count() as f32)
            .collect()
    }

    fn document(content: &str) -> Document {
        Document {
            content: content.to_string(),
            source: Some("https://example.test/page".to_string()),
        }
    }

    async fn corpus_index() -> VectorIndex {
        let embedder = Arc::new(KeywordEmbedder);
        let documents = vec![
            document("Rust systems programming, more rust"),
            document("Piano lessons for beginners"),
            document("Cooking with cast iron"),
        ];
        let texts: Vec<String> = documents.iter().map(|doc| doc.content.clone()).collect();
        let embeddings = embedder.embed(&texts).await.unwrap();
        VectorIndex::build(embedder, documents, embeddings).unwrap()
    }

    fn approx_eq(left: f32, right: f32) -> bool {
        (left - right).abs() < 1e-5
    }

    #[test]
    fn cosine_is_one_for_identical_vectors() {
        let vec = [1.0, 2.0, 3.0, 4.0];
        assert!(approx_eq(cosine_similarity(&vec, &vec), 1.0));
    }

    #[test]
    fn cosine_is_zero_for_orthogonal_vectors() {
        assert!(approx_eq(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0));
    }

    #[test]
    fn cosine_is_zero_for_mismatched_or_zero_vectors() {
        assert_eq!(cosine_similarity(&[1.0, 2.0], &[1.0, 2.0, 3.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]), 0.0);
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
    }

    #[test]
    fn build_rejects_mismatched_lengths() {
        let result = VectorIndex::build(
            Arc::new(KeywordEmbedder),
            vec![document("one"), document("two")],
            vec![vec![1.0, 0.0, 0.0]],
        );
        assert!(matches!(result, Err(IndexError::LengthMismatch { .. })));
    }

    #[test]
    fn build_rejects_mismatched_dimensions() {
        let result = VectorIndex::build(
            Arc::new(KeywordEmbedder),
            vec![document("one"), document("two")],
            vec![vec![1.0, 0.0, 0.0], vec![1.0, 0.0]],
        );
        assert!(matches!(
            result,
            Err(IndexError::DimensionMismatch {
                expected: 3,
                got: 2
            })
        ));
    }

    #[tokio::test]
    async fn query_ranks_the_closest_document_first() {
        let index = corpus_index().await;
        let results = index.query("learning rust", 3).await.unwrap();

        assert_eq!(results.len(), 3);
        assert!(results[0].document.content.contains("Rust"));
        assert!(results[0].score >= results[1].score);
        assert!(results[1].score >= results[2].score);
    }

    #[tokio::test]
    async fn query_returns_at_most_k_documents() {
        let index = corpus_index().await;

        assert_eq!(index.query("rust", 2).await.unwrap().len(), 2);
        assert_eq!(index.query("rust", 0).await.unwrap().len(), 0);
    }

    #[tokio::test]
    async fn query_caps_k_at_the_corpus_size() {
        let index = corpus_index().await;
        let results = index.query("piano", 10).await.unwrap();
        assert_eq!(results.len(), index.len());
    }

    #[tokio::test]
    async fn empty_index_answers_with_no_documents() {
        let index = VectorIndex::build(Arc::new(KeywordEmbedder), Vec::new(), Vec::new()).unwrap();

        assert!(index.is_empty());
        assert!(index.query("anything", 4).await.unwrap().is_empty());
    }
}

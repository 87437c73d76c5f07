//! Hugging Face Inference API embedder, via the feature-extraction pipeline.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use super::{EmbedError, Embedder};

/// Inputs sent per API call; larger corpora are embedded in chunks.
const MAX_BATCH: usize = 64;

#[derive(Serialize)]
struct FeatureExtractionRequest<'a> {
    inputs: &'a [String],
}

pub struct HfEmbedder {
    client: reqwest::Client,
    api_base: String,
    model: String,
    token: String,
}

impl HfEmbedder {
    pub fn new(
        api_base: impl Into<String>,
        model: impl Into<String>,
        token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, EmbedError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            model: model.into(),
            token: token.into(),
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/hf-inference/models/{}/pipeline/feature-extraction",
            self.api_base, self.model
        )
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.token)
            .json(&FeatureExtractionRequest { inputs: texts })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EmbedError::Api { status, body });
        }

        let body = response.text().await?;
        parse_embeddings(&body, texts.len())
    }
}

fn parse_embeddings(body: &str, inputs: usize) -> Result<Vec<Vec<f32>>, EmbedError> {
    let vectors: Vec<Vec<f32>> = serde_json::from_str(body)
        .map_err(|err| EmbedError::MalformedResponse(err.to_string()))?;

    if vectors.len() != inputs {
        return Err(EmbedError::MalformedResponse(format!(
            "{} inputs produced {} vectors",
            inputs,
            vectors.len()
        )));
    }

    Ok(vectors)
}

#[async_trait]
impl Embedder for HfEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
        let mut all_vectors = Vec::with_capacity(texts.len());
        for batch in texts.chunks(MAX_BATCH) {
            all_vectors.extend(self.embed_batch(batch).await?);
        }
        Ok(all_vectors)
    }
}

use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::errors::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub query: Option<String>,
}

/// `POST /chat`: answer a question about the indexed page.
///
/// A missing or blank `query` is a client error with a fixed message; any
/// retrieval or generation failure surfaces as a 500 carrying the
/// underlying message.
pub async fn chat(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ChatRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let query = payload
        .query
        .as_deref()
        .map(str::trim)
        .filter(|query| !query.is_empty())
        .ok_or_else(|| ApiError::BadRequest("No query provided".to_string()))?
        .to_string();

    let retrieved = state
        .index
        .query(&query, state.config.top_k)
        .await
        .map_err(|err| {
            tracing::error!("retrieval failed: {}", err);
            ApiError::from(err)
        })?;
    tracing::debug!("retrieved {} documents for the query", retrieved.len());

    let documents: Vec<_> = retrieved.into_iter().map(|hit| hit.document).collect();
    let answer = state
        .generator
        .generate(&query, &documents)
        .await
        .map_err(|err| {
            tracing::error!("generation failed: {}", err);
            ApiError::from(err)
        })?;

    Ok(Json(json!({ "response": answer })))
}

//! Hugging Face router chat-completions client.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{build_user_prompt, AnswerGenerator, GenerateError};
use crate::scrape::Document;

const SYSTEM_PROMPT: &str = "You answer questions about the provided context. \
Use only the numbered context blocks; if they do not contain the answer, say you do not know.";

const MAX_TOKENS: u32 = 512;
const TEMPERATURE: f64 = 0.2;

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f64,
    stream: bool,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

pub struct HfGenerator {
    client: reqwest::Client,
    api_base: String,
    model: String,
    token: String,
}

impl HfGenerator {
    pub fn new(
        api_base: impl Into<String>,
        model: impl Into<String>,
        token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, GenerateError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            model: model.into(),
            token: token.into(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/chat/completions", self.api_base)
    }
}

fn extract_answer(payload: ChatCompletionResponse) -> Result<String, GenerateError> {
    payload
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| {
            GenerateError::MalformedResponse("response carried no message content".to_string())
        })
}

#[async_trait]
impl AnswerGenerator for HfGenerator {
    async fn generate(
        &self,
        question: &str,
        documents: &[Document],
    ) -> Result<String, GenerateError> {
        let request = ChatCompletionRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: build_user_prompt(question, documents),
                },
            ],
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
            stream: false,
        };

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.token)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerateError::Api { status, body });
        }

        let body = response.text().await?;
        let payload: ChatCompletionResponse = serde_json::from_str(&body)
            .map_err(|err| GenerateError::MalformedResponse(err.to_string()))?;

        extract_answer(payload)
    }
}

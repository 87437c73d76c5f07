//! Answer generation boundary: prompt assembly plus the hosted model call.

pub mod hf;

pub use hf::HfGenerator;

use async_trait::async_trait;
use thiserror::Error;

use crate::scrape::Document;

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("generation request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("generation api returned status {status}: {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("malformed generation response: {0}")]
    MalformedResponse(String),
}

/// Produces an answer to a question grounded in the supplied documents.
#[async_trait]
pub trait AnswerGenerator: Send + Sync {
    async fn generate(
        &self,
        question: &str,
        documents: &[Document],
    ) -> Result<String, GenerateError>;
}

/// Stuffs every supporting document into one prompt: numbered context blocks
/// with their sources, then the question.
fn build_user_prompt(question: &str, documents: &[Document]) -> String {
    let mut prompt = String::new();

    if documents.is_empty() {
        prompt.push_str("No context documents were retrieved.\n\n");
    } else {
        prompt.push_str("Context:\n\n");
        for (idx, document) in documents.iter().enumerate() {
            match &document.source {
                Some(source) => {
                    prompt.push_str(&format!("[{}] (Source: {})\n", idx + 1, source));
                }
                None => {
                    prompt.push_str(&format!("[{}]\n", idx + 1));
                }
            }
            prompt.push_str(document.content.trim());
            prompt.push_str("\n\n");
        }
    }

    prompt.push_str(&format!("Question: {}", question));
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document(content: &str, source: Option<&str>) -> Document {
        Document {
            content: content.to_string(),
            source: source.map(String::from),
        }
    }

    #[test]
    fn prompt_carries_every_document_and_the_question() {
        let documents = vec![
            document("Rust course overview", Some("https://example.test/a")),
            document("Python course overview", None),
        ];
        let prompt = build_user_prompt("Which courses exist?", &documents);

        assert!(prompt.contains("[1] (Source: https://example.test/a)"));
        assert!(prompt.contains("Rust course overview"));
        assert!(prompt.contains("[2]\nPython course overview"));
        assert!(prompt.ends_with("Question: Which courses exist?"));
    }

    #[test]
    fn prompt_orders_documents_as_given() {
        let documents = vec![
            document("first block", None),
            document("second block", None),
        ];
        let prompt = build_user_prompt("q", &documents);

        let first = prompt.find("first block").unwrap();
        let second = prompt.find("second block").unwrap();
        assert!(first < second);
    }

    #[test]
    fn prompt_without_documents_still_carries_the_question() {
        let prompt = build_user_prompt("Is anyone there?", &[]);

        assert!(prompt.contains("No context documents"));
        assert!(prompt.ends_with("Question: Is anyone there?"));
    }
}

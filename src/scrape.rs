use std::time::Duration;

use scraper::{ElementRef, Html, Node, Selector};
use thiserror::Error;

/// Tags whose subtree is page chrome or machinery, never course content.
const SKIPPED_TAGS: &[&str] = &[
    "head", "script", "style", "noscript", "template", "nav", "header", "footer", "aside",
    "form", "button",
];

/// Tags treated as one text block each. Must stay in sync with
/// `CONTENT_SELECTOR`.
const CONTENT_TAGS: &[&str] = &[
    "h1", "h2", "h3", "h4", "h5", "h6", "p", "li", "td", "pre",
];

const CONTENT_SELECTOR: &str = "h1, h2, h3, h4, h5, h6, p, li, td, pre";

/// Upper bound on characters packed into one document.
const MAX_DOCUMENT_CHARS: usize = 1200;

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("failed to build http client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("failed to fetch {url}: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("fetching {url} returned status {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
    #[error("no readable text found at {url}")]
    EmptyPage { url: String },
}

/// A unit of indexed text with the page it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub content: String,
    pub source: Option<String>,
}

/// Fetches one web page and turns it into plain-text documents.
pub struct PageSource {
    client: reqwest::Client,
    url: String,
}

impl PageSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, ScrapeError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()
            .map_err(ScrapeError::Client)?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }

    /// Fetches the page and splits its readable text into documents.
    pub async fn load(&self) -> Result<Vec<Document>, ScrapeError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|source| ScrapeError::Request {
                url: self.url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::Status {
                url: self.url.clone(),
                status,
            });
        }

        let body = response.text().await.map_err(|source| ScrapeError::Request {
            url: self.url.clone(),
            source,
        })?;

        let blocks = extract_blocks(&body);
        let documents = pack_documents(blocks, &self.url);
        if documents.is_empty() {
            return Err(ScrapeError::EmptyPage {
                url: self.url.clone(),
            });
        }

        tracing::debug!("extracted {} documents from {}", documents.len(), self.url);
        Ok(documents)
    }
}

/// Pulls readable text blocks out of the page, outermost content element
/// first. Falls back to the whole page text when no content element matches.
fn extract_blocks(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse(CONTENT_SELECTOR).expect("valid content selector");

    let mut blocks = Vec::new();
    for element in document.select(&selector) {
        if has_enclosing_block(element) {
            continue;
        }
        let mut buf = String::new();
        collect_text(element, &mut buf);
        let normalized = normalize_whitespace(&buf);
        if !normalized.is_empty() {
            blocks.push(normalized);
        }
    }

    if blocks.is_empty() {
        let mut buf = String::new();
        collect_text(document.root_element(), &mut buf);
        let normalized = normalize_whitespace(&buf);
        if !normalized.is_empty() {
            blocks.push(normalized);
        }
    }

    blocks
}

/// A block nested inside another content block (a `<p>` inside an `<li>`)
/// would repeat text the outer block already carries; a block inside skipped
/// chrome is not content at all.
fn has_enclosing_block(element: ElementRef<'_>) -> bool {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .any(|ancestor| {
            let name = ancestor.value().name();
            CONTENT_TAGS.contains(&name) || SKIPPED_TAGS.contains(&name)
        })
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    if SKIPPED_TAGS.contains(&element.value().name()) {
        return;
    }
    for child in element.children() {
        if let Some(child_element) = ElementRef::wrap(child) {
            collect_text(child_element, out);
        } else if let Node::Text(text) = child.value() {
            out.push_str(text);
        }
    }
}

fn normalize_whitespace(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Packs consecutive blocks into documents of bounded size, preserving page
/// order. A single block longer than the bound becomes its own document.
fn pack_documents(blocks: Vec<String>, url: &str) -> Vec<Document> {
    let mut documents = Vec::new();
    let mut current = String::new();

    let flush = |content: &mut String, documents: &mut Vec<Document>| {
        if !content.is_empty() {
            documents.push(Document {
                content: std::mem::take(content),
                source: Some(url.to_string()),
            });
        }
    };

    for block in blocks {
        if !current.is_empty() && current.len() + 1 + block.len() > MAX_DOCUMENT_CHARS {
            flush(&mut current, &mut documents);
        }
        if !current.is_empty() {
            current.push('\n');
        }
        current.push_str(&block);
    }
    flush(&mut current, &mut documents);

    documents
}

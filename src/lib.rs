//! Retrieval-augmented question answering over a single scraped web page.
//!
//! On startup the configured page is fetched, split into documents, embedded
//! through a hosted model and held in an in-memory vector index. `POST /chat`
//! embeds the incoming question, retrieves the closest documents and asks a
//! hosted chat model to answer from them.

pub mod config;
pub mod embedding;
pub mod errors;
pub mod generation;
pub mod index;
pub mod logging;
pub mod scrape;
pub mod server;
pub mod state;

//! DocQA: per-user question answering over uploaded PDF and Word documents
//!
//! Uploads are extracted, chunked, embedded and stored in PostgreSQL with
//! `pgvector`; questions are answered by retrieving the closest chunks of the
//! asking user's documents and handing them to an LLM as context.

pub mod api;
pub mod cli;
pub mod config;
pub mod database;
pub mod embeddings;
pub mod errors;
pub mod extract;
pub mod ingest;
pub mod llm;
pub mod logging;
pub mod models;
pub mod rag;

#[cfg(test)]
mod config_tests;
#[cfg(test)]
pub(crate) mod tests;

pub use config::AppConfig;
pub use errors::*;

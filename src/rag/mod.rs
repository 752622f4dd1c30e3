//! RAG (Retrieval-Augmented Generation) module
//!
//! This module answers questions over a user's uploaded documents:
//! - Semantic retrieval scoped to one user (and optionally one document)
//! - Context assembly from the retrieved chunks
//! - LLM-based answer generation
//! - An answer cache keyed by the question and its retrieval scope
//!
//! # Examples
//!
//! ```rust,no_run
//! use docqa::rag::RagQuery;
//! use docqa::rag::RagService;
//! use docqa::config::AppConfig;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::load()?;
//!     let service = RagService::new(&config).await?;
//!
//!     let query = RagQuery::new("How many vacation days do I get?", "alice").with_doc("handbook");
//!     let response = service.answer(query).await?;
//!     println!("Answer: {}", response.answer);
//!     println!("Sources: {} chunks", response.sources.len());
//!
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod context;
pub mod pipeline;
pub mod retriever;


pub use cache::AnswerCache;
pub use cache::CacheStats;
pub use context::ContextAssembler;
pub use pipeline::RagQuery;
pub use pipeline::RagResponse;
pub use pipeline::RagService;
pub use pipeline::NO_RELEVANT_INFORMATION;
pub use retriever::Retriever;
pub use retriever::MAX_TOP_K;

//! CLI command handlers module
//!
//! Organized by functional domain:
//! - init: Database schema creation
//! - documents: Ingest, list and remove documents
//! - ask: One-shot questions and the interactive chat loop
//! - serve: API server
//! - info: Information display (stats, config)

pub mod ask;
pub mod documents;
pub mod info;
pub mod init;
pub mod serve;

pub use ask::*;
pub use documents::*;
pub use info::*;
pub use init::*;
pub use serve::*;

//! maintdb-core
//!
//! Domain types, the chunker, the embedder/extractor seams, the error
//! taxonomy and configuration shared by every maintdb crate.

pub mod chunker;
pub mod config;
pub mod error;
pub mod logging;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
pub use types::{BuildStats, Chunk, ChunkId, DocType, PageText, SearchResult};

//! maintdb-vector
//!
//! Flat inner-product index persisted next to a positional chunk log, the
//! loaded retrieval context that serves queries, and the service handle that
//! coordinates rebuilds with concurrent searches.

pub mod citation;
pub mod flat;
pub mod retriever;
pub mod schema;
pub mod search;
pub mod store;

pub use citation::{Citation, RetrievalPolicy};
pub use flat::FlatIndex;
pub use retriever::{RebuildSummary, Retriever};
pub use schema::{ChunkRecord, IndexMeta};
pub use search::RetrievalContext;
pub use store::{IndexStore, LoadedIndex};

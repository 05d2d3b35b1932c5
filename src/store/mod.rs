//! Document-store boundary and the typed cache adapters built on it.

mod adapters;
mod memory;

pub use adapters::{FundamentalsStore, OptionsStore, ProfileStore, SeriesStore};
pub use memory::MemoryStore;

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::MarketDataError;

/// A stored document. Adapters strip the backend `_id` field before
/// deserializing into typed records.
pub type Document = Value;

/// Minimal document-store surface the caches need.
///
/// Databases and collections are addressed by name and created implicitly on
/// first write. Filters are flat JSON objects matched by field equality;
/// an empty filter matches every document.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn find_one(
        &self,
        db: &str,
        collection: &str,
        filter: &Value,
    ) -> Result<Option<Document>, MarketDataError>;

    async fn find_many(
        &self,
        db: &str,
        collection: &str,
        filter: &Value,
    ) -> Result<Vec<Document>, MarketDataError>;

    async fn insert_many(
        &self,
        db: &str,
        collection: &str,
        documents: Vec<Document>,
    ) -> Result<(), MarketDataError>;

    /// Replace the first document matching `filter`, keeping its storage
    /// identity, or insert `document` when nothing matches.
    async fn replace_one(
        &self,
        db: &str,
        collection: &str,
        filter: &Value,
        document: Document,
    ) -> Result<(), MarketDataError>;

    /// Delete every document matching `filter`; returns the count removed.
    async fn delete_many(
        &self,
        db: &str,
        collection: &str,
        filter: &Value,
    ) -> Result<u64, MarketDataError>;
}

/// True when every field of `filter` equals the same field of `document`.
pub(crate) fn matches(document: &Value, filter: &Value) -> bool {
    match filter.as_object() {
        Some(fields) => fields
            .iter()
            .all(|(key, expected)| document.get(key) == Some(expected)),
        None => true,
    }
}

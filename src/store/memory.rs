//! In-memory document store, for embedding and for tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use super::{matches, Document, DocumentStore};
use crate::errors::MarketDataError;

/// Process-local [`DocumentStore`] backed by a map of collections.
///
/// Documents receive a monotonically increasing `_id` on insert;
/// `replace_one` keeps the replaced document's `_id` so repeated upserts of
/// the same logical record never change its identity.
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<(String, String), Vec<Document>>>,
    next_id: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn assign_id(&self, document: &mut Document) {
        if document.get("_id").is_none() {
            let id = self.next_id.fetch_add(1, Ordering::Relaxed);
            if let Some(object) = document.as_object_mut() {
                object.insert("_id".to_string(), Value::from(id));
            }
        }
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn find_one(
        &self,
        db: &str,
        collection: &str,
        filter: &Value,
    ) -> Result<Option<Document>, MarketDataError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(&(db.to_string(), collection.to_string()))
            .and_then(|docs| docs.iter().find(|doc| matches(doc, filter)).cloned()))
    }

    async fn find_many(
        &self,
        db: &str,
        collection: &str,
        filter: &Value,
    ) -> Result<Vec<Document>, MarketDataError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(&(db.to_string(), collection.to_string()))
            .map(|docs| {
                docs.iter()
                    .filter(|doc| matches(doc, filter))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn insert_many(
        &self,
        db: &str,
        collection: &str,
        documents: Vec<Document>,
    ) -> Result<(), MarketDataError> {
        let mut collections = self.collections.write().await;
        let docs = collections
            .entry((db.to_string(), collection.to_string()))
            .or_default();
        for mut document in documents {
            self.assign_id(&mut document);
            docs.push(document);
        }
        Ok(())
    }

    async fn replace_one(
        &self,
        db: &str,
        collection: &str,
        filter: &Value,
        mut document: Document,
    ) -> Result<(), MarketDataError> {
        let mut collections = self.collections.write().await;
        let docs = collections
            .entry((db.to_string(), collection.to_string()))
            .or_default();
        match docs.iter_mut().find(|doc| matches(doc, filter)) {
            Some(slot) => {
                if let (Some(id), Some(object)) = (slot.get("_id").cloned(), document.as_object_mut())
                {
                    object.insert("_id".to_string(), id);
                }
                *slot = document;
            }
            None => {
                self.assign_id(&mut document);
                docs.push(document);
            }
        }
        Ok(())
    }

    async fn delete_many(
        &self,
        db: &str,
        collection: &str,
        filter: &Value,
    ) -> Result<u64, MarketDataError> {
        let mut collections = self.collections.write().await;
        let docs = match collections.get_mut(&(db.to_string(), collection.to_string())) {
            Some(docs) => docs,
            None => return Ok(0),
        };
        let before = docs.len();
        docs.retain(|doc| !matches(doc, filter));
        Ok((before - docs.len()) as u64)
    }
}

//! Typed cache adapters over the raw document store.
//!
//! Layout follows the stored-data convention: one database per domain, one
//! collection per ticker (per ticker+granularity for series), documents
//! keyed by their ticker field.

use std::sync::Arc;

use serde_json::{json, Value};

use super::{Document, DocumentStore};
use crate::errors::MarketDataError;
use crate::models::{
    FundamentalsRecord, Granularity, OptionContract, ProfileRecord, TimeSeriesRecord,
};

const SERIES_DB: &str = "History";
const FUNDAMENTALS_DB: &str = "Financials";
const PROFILE_DB: &str = "Informations";
const OPTIONS_DB: &str = "Options";

fn strip_id(mut document: Document) -> Document {
    if let Some(object) = document.as_object_mut() {
        object.remove("_id");
    }
    document
}

fn decode<T: serde::de::DeserializeOwned>(document: Document) -> Result<T, MarketDataError> {
    serde_json::from_value(strip_id(document))
        .map_err(|e| MarketDataError::Store(format!("Corrupt cached document: {}", e)))
}

fn encode<T: serde::Serialize>(record: &T) -> Result<Document, MarketDataError> {
    serde_json::to_value(record)
        .map_err(|e| MarketDataError::Store(format!("Unencodable record: {}", e)))
}

/// Cached historical series, one record per (ticker, granularity).
#[derive(Clone)]
pub struct SeriesStore {
    store: Arc<dyn DocumentStore>,
}

impl SeriesStore {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    fn collection(ticker: &str, granularity: Granularity) -> String {
        format!("{}_{}", ticker, granularity.storage_label())
    }

    pub async fn get(
        &self,
        ticker: &str,
        granularity: Granularity,
    ) -> Result<Option<TimeSeriesRecord>, MarketDataError> {
        let document = self
            .store
            .find_one(
                SERIES_DB,
                &Self::collection(ticker, granularity),
                &json!({ "Request_Ticker": ticker }),
            )
            .await?;
        document.map(decode).transpose()
    }

    pub async fn put(&self, record: &TimeSeriesRecord) -> Result<(), MarketDataError> {
        self.store
            .replace_one(
                SERIES_DB,
                &Self::collection(&record.ticker, record.granularity),
                &json!({ "Request_Ticker": record.ticker }),
                encode(record)?,
            )
            .await
    }
}

/// Cached fundamentals, one document per ticker.
#[derive(Clone)]
pub struct FundamentalsStore {
    store: Arc<dyn DocumentStore>,
}

impl FundamentalsStore {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn get(&self, ticker: &str) -> Result<Option<FundamentalsRecord>, MarketDataError> {
        let document = self
            .store
            .find_one(FUNDAMENTALS_DB, ticker, &json!({ "Ticker": ticker }))
            .await?;
        document.map(decode).transpose()
    }

    pub async fn put(&self, record: &FundamentalsRecord) -> Result<(), MarketDataError> {
        self.store
            .replace_one(
                FUNDAMENTALS_DB,
                &record.ticker,
                &json!({ "Ticker": record.ticker }),
                encode(record)?,
            )
            .await
    }
}

/// Cached profile sections, one document per ticker.
#[derive(Clone)]
pub struct ProfileStore {
    store: Arc<dyn DocumentStore>,
}

impl ProfileStore {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn get(&self, ticker: &str) -> Result<Option<ProfileRecord>, MarketDataError> {
        let document = self
            .store
            .find_one(PROFILE_DB, ticker, &json!({ "Ticker": ticker }))
            .await?;
        document.map(decode).transpose()
    }

    pub async fn put(&self, record: &ProfileRecord) -> Result<(), MarketDataError> {
        self.store
            .replace_one(
                PROFILE_DB,
                &record.ticker,
                &json!({ "Ticker": record.ticker }),
                encode(record)?,
            )
            .await
    }
}

/// Cached option chains, one document per contract.
///
/// Chains go stale as a whole, so updates replace the entire per-ticker
/// collection instead of merging contract-by-contract.
#[derive(Clone)]
pub struct OptionsStore {
    store: Arc<dyn DocumentStore>,
}

impl OptionsStore {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn get(&self, ticker: &str) -> Result<Vec<OptionContract>, MarketDataError> {
        let documents = self
            .store
            .find_many(OPTIONS_DB, ticker, &Value::Object(Default::default()))
            .await?;
        documents.into_iter().map(decode).collect()
    }

    pub async fn replace_all(
        &self,
        ticker: &str,
        contracts: &[OptionContract],
    ) -> Result<(), MarketDataError> {
        self.store
            .delete_many(OPTIONS_DB, ticker, &Value::Object(Default::default()))
            .await?;
        let documents = contracts
            .iter()
            .map(encode)
            .collect::<Result<Vec<_>, _>>()?;
        self.store.insert_many(OPTIONS_DB, ticker, documents).await
    }
}

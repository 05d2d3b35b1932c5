//! Cached market-data client with gap-aware incremental sync.
//!
//! Historical OHLCV series are cached in a document store and kept current
//! by fetching only the date ranges the cache does not yet cover, merging
//! them idempotently into the stored record. Fundamentals, company profiles
//! and option chains use simpler fetch-if-stale caching.
//!
//! ```no_run
//! use chrono::NaiveDate;
//! use std::sync::Arc;
//! use marketvault::{AuthSession, MarketDataService, ServiceOptions};
//! use marketvault::models::Granularity;
//! use marketvault::remote::YahooSource;
//! use marketvault::store::MemoryStore;
//!
//! # async fn run() -> Result<(), marketvault::MarketDataError> {
//! let session = AuthSession::acquire().await?;
//! let remote = Arc::new(YahooSource::new(session)?);
//! let store = Arc::new(MemoryStore::new());
//! let service = MarketDataService::new(remote, store, ServiceOptions::default());
//!
//! let table = service
//!     .get_series(
//!         &["AAPL", "MSFT"],
//!         Granularity::Daily,
//!         NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
//!         NaiveDate::from_ymd_opt(2020, 12, 31).unwrap(),
//!     )
//!     .await?;
//! println!("{} sessions", table.len());
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod errors;
pub mod models;
pub mod remote;
pub mod series;
pub mod service;
pub mod store;
pub mod table;

pub use auth::AuthSession;
pub use errors::MarketDataError;
pub use service::{MarketDataService, ServiceOptions};
pub use table::{SeriesField, SeriesTable};

//! Historical series records and the transient gap-fill request type.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::granularity::Granularity;

/// Descriptive instrument fields carried on every cached series record.
///
/// Serde names are the display names the provider's camelCase keys rewrite
/// to; stored documents depend on these exact spellings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstrumentMeta {
    #[serde(rename = "Ticker")]
    pub ticker: Option<String>,
    #[serde(rename = "Currency")]
    pub currency: Option<String>,
    #[serde(rename = "Exchange Name")]
    pub exchange_name: Option<String>,
    #[serde(rename = "Full Exchange Name")]
    pub full_exchange_name: Option<String>,
    #[serde(rename = "Exchange Timezone Name")]
    pub exchange_timezone_name: Option<String>,
    #[serde(rename = "Timezone")]
    pub timezone: Option<String>,
    #[serde(rename = "GMT Offset")]
    pub gmt_offset: Option<i64>,
    #[serde(rename = "Instrument Type")]
    pub instrument_type: Option<String>,
    /// Epoch seconds of the instrument's earliest available data point.
    #[serde(rename = "First Trade Date")]
    pub first_trade_date: Option<i64>,
    #[serde(rename = "Regular Market Price")]
    pub regular_market_price: Option<f64>,
    #[serde(rename = "Regular Market Time")]
    pub regular_market_time: Option<i64>,
    #[serde(rename = "Regular Market Volume")]
    pub regular_market_volume: Option<u64>,
    #[serde(rename = "Regular Market High")]
    pub regular_market_high: Option<f64>,
    #[serde(rename = "Regular Market Low")]
    pub regular_market_low: Option<f64>,
    #[serde(rename = "Chart Previous Close")]
    pub chart_previous_close: Option<f64>,
    #[serde(rename = "Previous Close")]
    pub previous_close: Option<f64>,
    #[serde(rename = "Fifty Two Week High")]
    pub fifty_two_week_high: Option<f64>,
    #[serde(rename = "Fifty Two Week Low")]
    pub fifty_two_week_low: Option<f64>,
    #[serde(rename = "Price Hint")]
    pub price_hint: Option<i64>,
    #[serde(rename = "Scale")]
    pub scale: Option<i64>,
    #[serde(rename = "Granularity")]
    pub granularity: Option<String>,
    #[serde(rename = "Range")]
    pub range: Option<String>,
    #[serde(rename = "Valid Ranges")]
    pub valid_ranges: Vec<String>,
    #[serde(rename = "Long Name")]
    pub long_name: Option<String>,
    #[serde(rename = "Short Name")]
    pub short_name: Option<String>,
    #[serde(rename = "Pre/Post Market")]
    pub pre_post_market: Option<bool>,
}

/// A cash dividend reported by the chart endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DividendEvent {
    #[serde(rename = "Amount")]
    pub amount: f64,
    #[serde(rename = "Date")]
    pub date: i64,
}

/// A stock split reported by the chart endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitEvent {
    #[serde(rename = "Date")]
    pub date: i64,
    #[serde(rename = "Numerator")]
    pub numerator: f64,
    #[serde(rename = "Denominator")]
    pub denominator: f64,
    #[serde(rename = "Split Ratio")]
    pub ratio: Option<String>,
}

/// Which side of the cached range a gap-fill request covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GapKind {
    /// Nothing cached: fetch the whole requested range.
    Complete,
    /// Extend the cached range backwards.
    Before,
    /// Extend the cached range forwards.
    After,
}

/// A single gap-fill fetch to perform. Transient, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct GapRequest {
    pub kind: GapKind,
    pub ticker: String,
    pub granularity: Granularity,
    /// Inclusive epoch-second start of the fetch.
    pub start: i64,
    /// Inclusive epoch-second end of the fetch.
    pub end: i64,
}

/// Output of the payload normalizer: one fetched contiguous range, flat and
/// storage-ready, before covered-bound bookkeeping is applied by the merger.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedSeries {
    pub ticker: String,
    pub granularity: Granularity,
    /// Strictly increasing epoch seconds; may be empty for a range with no
    /// trading activity.
    pub timestamps: Vec<i64>,
    pub open: Vec<Option<f64>>,
    pub high: Vec<Option<f64>>,
    pub low: Vec<Option<f64>>,
    pub close: Vec<Option<f64>>,
    pub adjusted_close: Vec<Option<f64>>,
    pub volume: Vec<Option<u64>>,
    pub dividends: BTreeMap<i64, DividendEvent>,
    pub splits: BTreeMap<i64, SplitEvent>,
    pub meta: InstrumentMeta,
    /// Epoch-second bounds this fetch was issued for.
    pub requested_start: i64,
    pub requested_end: i64,
    /// True when this fetch's start bound is at or before the instrument's
    /// first trade date.
    pub reached_earliest_available: bool,
}

impl NormalizedSeries {
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }
}

/// One cached series per (ticker, granularity).
///
/// Invariants: the parallel sequences all have the same length as
/// `timestamps`; `timestamps` is strictly ascending with no duplicates;
/// `covered_start <= covered_end`. Mutated only by the incremental merger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeSeriesRecord {
    #[serde(rename = "Request_Ticker")]
    pub ticker: String,
    #[serde(rename = "Request_Granularity")]
    pub granularity: Granularity,
    #[serde(rename = "Timestamps")]
    pub timestamps: Vec<i64>,
    #[serde(rename = "Open")]
    pub open: Vec<Option<f64>>,
    #[serde(rename = "High")]
    pub high: Vec<Option<f64>>,
    #[serde(rename = "Low")]
    pub low: Vec<Option<f64>>,
    #[serde(rename = "Close")]
    pub close: Vec<Option<f64>>,
    #[serde(rename = "AdjustedClose")]
    pub adjusted_close: Vec<Option<f64>>,
    #[serde(rename = "Volume")]
    pub volume: Vec<Option<u64>>,
    #[serde(rename = "Dividends")]
    pub dividends: BTreeMap<i64, DividendEvent>,
    #[serde(rename = "Stock Splits")]
    pub splits: BTreeMap<i64, SplitEvent>,
    /// Inclusive epoch-second bounds of the contiguous range known to have
    /// been queried, whether or not sessions existed at the edges.
    #[serde(rename = "Request_StartTimestamp")]
    pub covered_start: i64,
    #[serde(rename = "Request_EndTimestamp")]
    pub covered_end: i64,
    #[serde(rename = "TickerMetadatas")]
    pub meta: InstrumentMeta,
    /// True once a fetch starting at or before the first trade date ran.
    #[serde(rename = "MaxPastDateReached")]
    pub reached_earliest_available: bool,
    #[serde(rename = "Request_Timestamp")]
    pub last_requested_at: i64,
    #[serde(rename = "Response_Length")]
    pub row_count: usize,
    #[serde(rename = "Response_Start_Timestamp")]
    pub first_timestamp: Option<i64>,
    #[serde(rename = "Response_End_Timestamp")]
    pub last_timestamp: Option<i64>,
}

impl Default for TimeSeriesRecord {
    fn default() -> Self {
        Self {
            ticker: String::new(),
            granularity: Granularity::Daily,
            timestamps: Vec::new(),
            open: Vec::new(),
            high: Vec::new(),
            low: Vec::new(),
            close: Vec::new(),
            adjusted_close: Vec::new(),
            volume: Vec::new(),
            dividends: BTreeMap::new(),
            splits: BTreeMap::new(),
            covered_start: 0,
            covered_end: 0,
            meta: InstrumentMeta::default(),
            reached_earliest_available: false,
            last_requested_at: 0,
            row_count: 0,
            first_timestamp: None,
            last_timestamp: None,
        }
    }
}

impl TimeSeriesRecord {
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Indices of rows whose timestamp falls within `[start, end]`.
    pub fn rows_in_range(&self, start: i64, end: i64) -> std::ops::Range<usize> {
        let from = self.timestamps.partition_point(|&ts| ts < start);
        let to = self.timestamps.partition_point(|&ts| ts <= end);
        from..to
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_with_timestamps(timestamps: Vec<i64>) -> TimeSeriesRecord {
        let n = timestamps.len();
        TimeSeriesRecord {
            ticker: "AAPL".to_string(),
            timestamps,
            open: vec![Some(1.0); n],
            high: vec![Some(1.0); n],
            low: vec![Some(1.0); n],
            close: vec![Some(1.0); n],
            adjusted_close: vec![Some(1.0); n],
            volume: vec![Some(100); n],
            row_count: n,
            ..TimeSeriesRecord::default()
        }
    }

    #[test]
    fn test_rows_in_range_inclusive() {
        let record = record_with_timestamps(vec![100, 200, 300, 400]);
        assert_eq!(record.rows_in_range(200, 300), 1..3);
        assert_eq!(record.rows_in_range(0, 1000), 0..4);
        assert_eq!(record.rows_in_range(150, 150), 1..1);
    }

    #[test]
    fn test_storage_field_names() {
        let record = record_with_timestamps(vec![100]);
        let value = serde_json::to_value(&record).unwrap();
        assert!(value.get("Request_Ticker").is_some());
        assert!(value.get("Request_StartTimestamp").is_some());
        assert!(value.get("TickerMetadatas").is_some());
        assert!(value.get("MaxPastDateReached").is_some());
        assert_eq!(value["Response_Length"], 1);
    }

    #[test]
    fn test_roundtrip_ignores_store_id() {
        let record = record_with_timestamps(vec![100, 200]);
        let mut value = serde_json::to_value(&record).unwrap();
        value["_id"] = serde_json::json!("42");
        let back: TimeSeriesRecord = serde_json::from_value(value).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_meta_display_names() {
        let meta = InstrumentMeta {
            exchange_name: Some("NMS".to_string()),
            first_trade_date: Some(345_479_400),
            fifty_two_week_high: Some(237.23),
            ..InstrumentMeta::default()
        };
        let value = serde_json::to_value(&meta).unwrap();
        assert_eq!(value["Exchange Name"], "NMS");
        assert_eq!(value["First Trade Date"], 345_479_400);
        assert_eq!(value["Fifty Two Week High"], 237.23);
    }
}

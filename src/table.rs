//! Tabular view over one or more cached series, aligned on the date axis.

use std::collections::{BTreeMap, BTreeSet};
use std::ops::Range;

use serde::Serialize;

use crate::models::TimeSeriesRecord;

/// A price/volume column of the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesField {
    Open,
    High,
    Low,
    Close,
    AdjustedClose,
    Volume,
}

/// One ticker's aligned columns; every vector has the table's row count.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TickerColumns {
    pub open: Vec<Option<f64>>,
    pub high: Vec<Option<f64>>,
    pub low: Vec<Option<f64>>,
    pub close: Vec<Option<f64>>,
    pub adjusted_close: Vec<Option<f64>>,
    pub volume: Vec<Option<u64>>,
}

/// Multi-ticker result table.
///
/// The timestamp axis is the outer join of every contributing series: a
/// session one ticker traded and another did not shows up as a row with
/// `None` in the absent ticker's columns.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SeriesTable {
    pub timestamps: Vec<i64>,
    pub columns: BTreeMap<String, TickerColumns>,
}

impl SeriesTable {
    /// Build the table from records and the row range of each to include.
    pub fn from_records<'a>(
        records: impl IntoIterator<Item = (&'a TimeSeriesRecord, Range<usize>)> + Clone,
    ) -> Self {
        let mut axis = BTreeSet::new();
        for (record, rows) in records.clone() {
            axis.extend(record.timestamps[rows].iter().copied());
        }
        let timestamps: Vec<i64> = axis.into_iter().collect();
        let index: BTreeMap<i64, usize> = timestamps
            .iter()
            .enumerate()
            .map(|(i, &ts)| (ts, i))
            .collect();

        let mut columns = BTreeMap::new();
        for (record, rows) in records {
            let n = timestamps.len();
            let mut ticker_columns = TickerColumns {
                open: vec![None; n],
                high: vec![None; n],
                low: vec![None; n],
                close: vec![None; n],
                adjusted_close: vec![None; n],
                volume: vec![None; n],
            };
            for row in rows {
                let slot = index[&record.timestamps[row]];
                ticker_columns.open[slot] = record.open.get(row).copied().flatten();
                ticker_columns.high[slot] = record.high.get(row).copied().flatten();
                ticker_columns.low[slot] = record.low.get(row).copied().flatten();
                ticker_columns.close[slot] = record.close.get(row).copied().flatten();
                ticker_columns.adjusted_close[slot] =
                    record.adjusted_close.get(row).copied().flatten();
                ticker_columns.volume[slot] = record.volume.get(row).copied().flatten();
            }
            columns.insert(record.ticker.clone(), ticker_columns);
        }

        Self {
            timestamps,
            columns,
        }
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn tickers(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    /// One column as floats; volumes are widened losslessly for display use.
    pub fn column(&self, ticker: &str, field: SeriesField) -> Option<Vec<Option<f64>>> {
        let columns = self.columns.get(ticker)?;
        Some(match field {
            SeriesField::Open => columns.open.clone(),
            SeriesField::High => columns.high.clone(),
            SeriesField::Low => columns.low.clone(),
            SeriesField::Close => columns.close.clone(),
            SeriesField::AdjustedClose => columns.adjusted_close.clone(),
            SeriesField::Volume => columns.volume.iter().map(|v| v.map(|v| v as f64)).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Granularity;

    fn record(ticker: &str, timestamps: Vec<i64>, close: f64) -> TimeSeriesRecord {
        let n = timestamps.len();
        TimeSeriesRecord {
            ticker: ticker.to_string(),
            granularity: Granularity::Daily,
            timestamps,
            open: vec![Some(close - 1.0); n],
            high: vec![Some(close + 1.0); n],
            low: vec![Some(close - 2.0); n],
            close: vec![Some(close); n],
            adjusted_close: vec![Some(close); n],
            volume: vec![Some(100); n],
            row_count: n,
            ..TimeSeriesRecord::default()
        }
    }

    #[test]
    fn test_outer_join_fills_missing_sessions_with_none() {
        let a = record("AAPL", vec![100, 200, 300], 10.0);
        let b = record("MSFT", vec![200, 400], 20.0);
        let table = SeriesTable::from_records(vec![(&a, 0..3), (&b, 0..2)]);

        assert_eq!(table.timestamps, vec![100, 200, 300, 400]);
        let aapl = &table.columns["AAPL"];
        assert_eq!(aapl.close, vec![Some(10.0), Some(10.0), Some(10.0), None]);
        let msft = &table.columns["MSFT"];
        assert_eq!(msft.close, vec![None, Some(20.0), None, Some(20.0)]);
    }

    #[test]
    fn test_row_range_limits_contribution() {
        let a = record("AAPL", vec![100, 200, 300], 10.0);
        let table = SeriesTable::from_records(vec![(&a, 1..2)]);
        assert_eq!(table.timestamps, vec![200]);
        assert_eq!(table.columns["AAPL"].volume, vec![Some(100)]);
    }

    #[test]
    fn test_column_accessor_widens_volume() {
        let a = record("AAPL", vec![100], 10.0);
        let table = SeriesTable::from_records(vec![(&a, 0..1)]);
        assert_eq!(
            table.column("AAPL", SeriesField::Volume),
            Some(vec![Some(100.0)])
        );
        assert_eq!(table.column("MSFT", SeriesField::Close), None);
    }
}

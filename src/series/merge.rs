//! Folds a fetched gap into the cached record for its (ticker, granularity).

use std::collections::BTreeMap;

use crate::models::{GapKind, NormalizedSeries, TimeSeriesRecord};

#[derive(Clone)]
struct Row {
    open: Option<f64>,
    high: Option<f64>,
    low: Option<f64>,
    close: Option<f64>,
    adjusted_close: Option<f64>,
    volume: Option<u64>,
}

/// Merge a normalized gap-fill into the existing record, or promote it to a
/// fresh record when nothing is cached yet.
///
/// Rows are unioned by timestamp with the incoming fetch winning any
/// collision, so a re-fetch of an already-covered range is a no-op apart
/// from row corrections. Covered bounds only widen on the side the gap kind
/// names: a `Before` merge never moves `covered_end` and an `After` merge
/// never moves `covered_start`, which keeps simultaneous Before/After fills
/// order-independent.
///
/// An empty incoming fetch still widens bounds; a range with no trading
/// activity is a valid answer, not an error.
pub fn merge(
    existing: Option<TimeSeriesRecord>,
    incoming: NormalizedSeries,
    kind: GapKind,
    requested_at: i64,
) -> TimeSeriesRecord {
    let existing = match existing {
        Some(existing) => existing,
        None => return promote(incoming, requested_at),
    };

    let mut rows: BTreeMap<i64, Row> = BTreeMap::new();
    for (i, &ts) in existing.timestamps.iter().enumerate() {
        rows.insert(ts, row_at(&existing, i));
    }
    for (i, &ts) in incoming.timestamps.iter().enumerate() {
        rows.insert(
            ts,
            Row {
                open: incoming.open.get(i).copied().flatten(),
                high: incoming.high.get(i).copied().flatten(),
                low: incoming.low.get(i).copied().flatten(),
                close: incoming.close.get(i).copied().flatten(),
                adjusted_close: incoming.adjusted_close.get(i).copied().flatten(),
                volume: incoming.volume.get(i).copied().flatten(),
            },
        );
    }

    let covered_start = match kind {
        GapKind::Before | GapKind::Complete => {
            existing.covered_start.min(incoming.requested_start)
        }
        GapKind::After => existing.covered_start,
    };
    let covered_end = match kind {
        GapKind::After | GapKind::Complete => existing.covered_end.max(incoming.requested_end),
        GapKind::Before => existing.covered_end,
    };

    let mut dividends = existing.dividends;
    dividends.extend(incoming.dividends);
    let mut splits = existing.splits;
    splits.extend(incoming.splits);

    // The latest fetch's metadata is authoritative, but never forget a
    // first-trade-date the provider stopped reporting.
    let mut meta = incoming.meta;
    if meta.first_trade_date.is_none() {
        meta.first_trade_date = existing.meta.first_trade_date;
    }

    let reached_earliest_available =
        existing.reached_earliest_available || incoming.reached_earliest_available;

    let mut record = TimeSeriesRecord {
        ticker: incoming.ticker,
        granularity: incoming.granularity,
        timestamps: Vec::with_capacity(rows.len()),
        open: Vec::with_capacity(rows.len()),
        high: Vec::with_capacity(rows.len()),
        low: Vec::with_capacity(rows.len()),
        close: Vec::with_capacity(rows.len()),
        adjusted_close: Vec::with_capacity(rows.len()),
        volume: Vec::with_capacity(rows.len()),
        dividends,
        splits,
        covered_start,
        covered_end,
        meta,
        reached_earliest_available,
        last_requested_at: requested_at,
        row_count: rows.len(),
        first_timestamp: rows.keys().next().copied(),
        last_timestamp: rows.keys().next_back().copied(),
    };
    for (ts, row) in rows {
        record.timestamps.push(ts);
        record.open.push(row.open);
        record.high.push(row.high);
        record.low.push(row.low);
        record.close.push(row.close);
        record.adjusted_close.push(row.adjusted_close);
        record.volume.push(row.volume);
    }
    record
}

fn promote(incoming: NormalizedSeries, requested_at: i64) -> TimeSeriesRecord {
    let row_count = incoming.len();
    TimeSeriesRecord {
        ticker: incoming.ticker,
        granularity: incoming.granularity,
        first_timestamp: incoming.timestamps.first().copied(),
        last_timestamp: incoming.timestamps.last().copied(),
        timestamps: incoming.timestamps,
        open: incoming.open,
        high: incoming.high,
        low: incoming.low,
        close: incoming.close,
        adjusted_close: incoming.adjusted_close,
        volume: incoming.volume,
        dividends: incoming.dividends,
        splits: incoming.splits,
        covered_start: incoming.requested_start,
        covered_end: incoming.requested_end,
        meta: incoming.meta,
        reached_earliest_available: incoming.reached_earliest_available,
        last_requested_at: requested_at,
        row_count,
    }
}

fn row_at(record: &TimeSeriesRecord, i: usize) -> Row {
    Row {
        open: record.open.get(i).copied().flatten(),
        high: record.high.get(i).copied().flatten(),
        low: record.low.get(i).copied().flatten(),
        close: record.close.get(i).copied().flatten(),
        adjusted_close: record.adjusted_close.get(i).copied().flatten(),
        volume: record.volume.get(i).copied().flatten(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Granularity, InstrumentMeta};

    fn series(timestamps: Vec<i64>, close: f64, start: i64, end: i64) -> NormalizedSeries {
        let n = timestamps.len();
        NormalizedSeries {
            ticker: "AAPL".to_string(),
            granularity: Granularity::Daily,
            timestamps,
            open: vec![Some(close - 1.0); n],
            high: vec![Some(close + 1.0); n],
            low: vec![Some(close - 2.0); n],
            close: vec![Some(close); n],
            adjusted_close: vec![Some(close); n],
            volume: vec![Some(100); n],
            dividends: BTreeMap::new(),
            splits: BTreeMap::new(),
            meta: InstrumentMeta::default(),
            requested_start: start,
            requested_end: end,
            reached_earliest_available: false,
        }
    }

    #[test]
    fn test_promote_sets_bounds_from_requested_range() {
        let record = merge(None, series(vec![120, 150], 10.0, 100, 200), GapKind::Complete, 999);
        assert_eq!(record.covered_start, 100);
        assert_eq!(record.covered_end, 200);
        assert_eq!(record.row_count, 2);
        assert_eq!(record.first_timestamp, Some(120));
        assert_eq!(record.last_timestamp, Some(150));
        assert_eq!(record.last_requested_at, 999);
    }

    #[test]
    fn test_refetch_of_covered_range_is_idempotent() {
        let base = merge(None, series(vec![120, 150], 10.0, 100, 200), GapKind::Complete, 1);
        let again = merge(
            Some(base.clone()),
            series(vec![120, 150], 10.0, 100, 200),
            GapKind::Complete,
            1,
        );
        assert_eq!(again, base);
    }

    #[test]
    fn test_collision_takes_incoming_row() {
        let base = merge(None, series(vec![120, 150], 10.0, 100, 200), GapKind::Complete, 1);
        let merged = merge(
            Some(base),
            series(vec![150, 180], 20.0, 140, 200),
            GapKind::After,
            2,
        );
        assert_eq!(merged.timestamps, vec![120, 150, 180]);
        // 150 collided; the newer fetch wins.
        assert_eq!(merged.close, vec![Some(10.0), Some(20.0), Some(20.0)]);
        assert_eq!(merged.row_count, 3);
    }

    #[test]
    fn test_timestamps_strictly_ascending_after_merge() {
        let base = merge(None, series(vec![150, 300], 10.0, 150, 300), GapKind::Complete, 1);
        let merged = merge(
            Some(base),
            series(vec![100, 150, 200], 20.0, 100, 150),
            GapKind::Before,
            2,
        );
        assert_eq!(merged.timestamps, vec![100, 150, 200, 300]);
        assert!(merged.timestamps.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_before_merge_never_widens_end() {
        let base = merge(None, series(vec![200], 10.0, 200, 300), GapKind::Complete, 1);
        let merged = merge(
            Some(base),
            series(vec![100], 20.0, 100, 400),
            GapKind::Before,
            2,
        );
        assert_eq!(merged.covered_start, 100);
        assert_eq!(merged.covered_end, 300);
    }

    #[test]
    fn test_after_merge_never_widens_start() {
        let base = merge(None, series(vec![200], 10.0, 200, 300), GapKind::Complete, 1);
        let merged = merge(
            Some(base),
            series(vec![350], 20.0, 50, 400),
            GapKind::After,
            2,
        );
        assert_eq!(merged.covered_start, 200);
        assert_eq!(merged.covered_end, 400);
    }

    #[test]
    fn test_before_and_after_merges_commute() {
        let base = merge(None, series(vec![200, 250], 10.0, 200, 300), GapKind::Complete, 1);
        let before = series(vec![100, 150], 20.0, 100, 200);
        let after = series(vec![350], 30.0, 300, 400);

        let before_first = merge(
            Some(merge(Some(base.clone()), before.clone(), GapKind::Before, 2)),
            after.clone(),
            GapKind::After,
            2,
        );
        let after_first = merge(
            Some(merge(Some(base), after, GapKind::After, 2)),
            before,
            GapKind::Before,
            2,
        );
        assert_eq!(before_first, after_first);
        assert_eq!(before_first.covered_start, 100);
        assert_eq!(before_first.covered_end, 400);
    }

    #[test]
    fn test_empty_incoming_still_widens_bounds() {
        let base = merge(None, series(vec![200], 10.0, 200, 300), GapKind::Complete, 1);
        let merged = merge(
            Some(base),
            series(vec![], 0.0, 300, 400),
            GapKind::After,
            2,
        );
        assert_eq!(merged.covered_end, 400);
        assert_eq!(merged.row_count, 1);
    }

    #[test]
    fn test_bounds_monotonic_over_merges() {
        let mut record = merge(None, series(vec![200], 10.0, 200, 300), GapKind::Complete, 1);
        let fills = [
            (series(vec![150], 1.0, 150, 200), GapKind::Before),
            (series(vec![350], 2.0, 300, 400), GapKind::After),
            (series(vec![250], 3.0, 220, 280), GapKind::Complete),
        ];
        for (incoming, kind) in fills {
            let (start, end) = (record.covered_start, record.covered_end);
            record = merge(Some(record), incoming, kind, 2);
            assert!(record.covered_start <= start);
            assert!(record.covered_end >= end);
        }
    }

    #[test]
    fn test_earliest_flag_is_sticky() {
        let mut first = series(vec![100], 10.0, 100, 200);
        first.reached_earliest_available = true;
        let base = merge(None, first, GapKind::Complete, 1);
        assert!(base.reached_earliest_available);

        let merged = merge(
            Some(base),
            series(vec![250], 20.0, 200, 300),
            GapKind::After,
            2,
        );
        assert!(merged.reached_earliest_available);
    }

    #[test]
    fn test_first_trade_date_survives_meta_replacement() {
        let mut first = series(vec![100], 10.0, 100, 200);
        first.meta.first_trade_date = Some(50);
        let base = merge(None, first, GapKind::Complete, 1);

        let merged = merge(
            Some(base),
            series(vec![250], 20.0, 200, 300),
            GapKind::After,
            2,
        );
        assert_eq!(merged.meta.first_trade_date, Some(50));
    }
}

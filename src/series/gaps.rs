//! Decides which sub-ranges of a requested interval need a remote fetch.

use crate::models::{GapKind, GapRequest, Granularity, TimeSeriesRecord};

/// Compare a requested `[start, end]` range against what is already cached
/// and return the fetches needed to cover it.
///
/// With no cached record the whole range is one `Complete` fetch. Otherwise
/// at most one `Before` and one `After` request come back; they carry no
/// ordering dependency and can be processed in either order.
///
/// The first-trade-date floor suppresses a `Before` fetch whose entire range
/// predates the instrument's existence. When only part of the range predates
/// it, the fetch still starts at the requested start and the remote end is
/// expected to clamp.
pub fn detect_gaps(
    ticker: &str,
    granularity: Granularity,
    existing: Option<&TimeSeriesRecord>,
    requested_start: i64,
    requested_end: i64,
) -> Vec<GapRequest> {
    let record = match existing {
        Some(record) => record,
        None => {
            return vec![GapRequest {
                kind: GapKind::Complete,
                ticker: ticker.to_string(),
                granularity,
                start: requested_start,
                end: requested_end,
            }];
        }
    };

    let mut gaps = Vec::new();

    if requested_start >= record.covered_start && requested_end <= record.covered_end {
        return gaps;
    }

    if requested_start < record.covered_start {
        let entirely_before_listing = record
            .meta
            .first_trade_date
            .is_some_and(|first| requested_start < first && requested_end <= first);
        if !entirely_before_listing && !record.reached_earliest_available {
            gaps.push(GapRequest {
                kind: GapKind::Before,
                ticker: ticker.to_string(),
                granularity,
                start: requested_start,
                end: record.covered_start,
            });
        }
    }

    if requested_end > record.covered_end {
        gaps.push(GapRequest {
            kind: GapKind::After,
            ticker: ticker.to_string(),
            granularity,
            start: record.covered_end,
            end: requested_end,
        });
    }

    gaps
}

//! Turns a raw chart payload into a flat, storage-ready series.

use std::collections::BTreeMap;

use crate::models::{
    DividendEvent, Granularity, InstrumentMeta, NormalizedSeries, SplitEvent,
};
use crate::remote::models::{ChartMeta, ChartResult};

/// Flatten one chart result into parallel per-row sequences.
///
/// Pure and total over well-formed payloads: absent indicator blocks, absent
/// adjusted-close and absent event maps all normalize to empty sequences or
/// `None` markers rather than failing. Rows whose OHLCV arrays are shorter
/// than the timestamp axis are padded with `None`.
pub fn normalize(
    ticker: &str,
    granularity: Granularity,
    result: ChartResult,
    requested_start: i64,
    requested_end: i64,
) -> NormalizedSeries {
    let timestamps = result.timestamp.unwrap_or_default();
    let n = timestamps.len();

    let (open, high, low, close, volume) = match result
        .indicators
        .as_ref()
        .and_then(|i| i.quote.first())
    {
        Some(quote) => (
            pad(&quote.open, n),
            pad(&quote.high, n),
            pad(&quote.low, n),
            pad(&quote.close, n),
            pad(&quote.volume, n),
        ),
        None => (
            vec![None; n],
            vec![None; n],
            vec![None; n],
            vec![None; n],
            vec![None; n],
        ),
    };

    let adjusted_close = match result
        .indicators
        .as_ref()
        .and_then(|i| i.adjclose.first())
    {
        Some(block) => pad(&block.adjclose, n),
        None => vec![None; n],
    };

    let mut dividends = BTreeMap::new();
    let mut splits = BTreeMap::new();
    if let Some(events) = result.events {
        for event in events.dividends.into_values() {
            if let Some(amount) = event.amount {
                dividends.insert(event.date, DividendEvent {
                    amount,
                    date: event.date,
                });
            }
        }
        for event in events.splits.into_values() {
            splits.insert(event.date, SplitEvent {
                date: event.date,
                numerator: event.numerator.unwrap_or_default(),
                denominator: event.denominator.unwrap_or_default(),
                ratio: event.split_ratio,
            });
        }
    }

    let meta = instrument_meta(ticker, result.meta);
    let reached_earliest_available = meta
        .first_trade_date
        .is_some_and(|first| requested_start <= first);

    NormalizedSeries {
        ticker: ticker.to_string(),
        granularity,
        timestamps,
        open,
        high,
        low,
        close,
        adjusted_close,
        volume,
        dividends,
        splits,
        meta,
        requested_start,
        requested_end,
        reached_earliest_available,
    }
}

fn pad<T: Clone>(values: &[Option<T>], n: usize) -> Vec<Option<T>> {
    let mut out = values.to_vec();
    out.truncate(n);
    out.resize(n, None);
    out
}

fn instrument_meta(ticker: &str, meta: ChartMeta) -> InstrumentMeta {
    InstrumentMeta {
        ticker: meta.symbol.or_else(|| Some(ticker.to_string())),
        currency: meta.currency,
        exchange_name: meta.exchange_name,
        full_exchange_name: meta.full_exchange_name,
        exchange_timezone_name: meta.exchange_timezone_name,
        timezone: meta.timezone,
        gmt_offset: meta.gmtoffset,
        instrument_type: meta.instrument_type,
        first_trade_date: meta.first_trade_date,
        regular_market_price: meta.regular_market_price,
        regular_market_time: meta.regular_market_time,
        regular_market_volume: meta.regular_market_volume,
        regular_market_high: meta.regular_market_day_high,
        regular_market_low: meta.regular_market_day_low,
        chart_previous_close: meta.chart_previous_close,
        previous_close: meta.previous_close,
        fifty_two_week_high: meta.fifty_two_week_high,
        fifty_two_week_low: meta.fifty_two_week_low,
        price_hint: meta.price_hint,
        scale: meta.scale,
        granularity: meta.data_granularity,
        range: meta.range,
        valid_ranges: meta.valid_ranges.unwrap_or_default(),
        long_name: meta.long_name,
        short_name: meta.short_name,
        pre_post_market: meta.has_pre_post_market_data,
    }
}

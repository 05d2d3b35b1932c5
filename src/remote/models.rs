//! Raw wire payloads from the remote API.
//!
//! These mirror the provider's JSON envelopes field-for-field in camelCase;
//! conversion into domain models happens in the series and service layers.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

/// Top-level envelope of the chart endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ChartResponse {
    pub chart: ChartEnvelope,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartEnvelope {
    #[serde(default)]
    pub result: Option<Vec<ChartResult>>,
    #[serde(default)]
    pub error: Option<ChartError>,
}

/// Error object embedded in a 200 response.
#[derive(Debug, Clone, Deserialize)]
pub struct ChartError {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartResult {
    pub meta: ChartMeta,
    #[serde(default)]
    pub timestamp: Option<Vec<i64>>,
    #[serde(default)]
    pub indicators: Option<Indicators>,
    #[serde(default)]
    pub events: Option<ChartEvents>,
}

/// Instrument metadata attached to every chart result.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChartMeta {
    pub symbol: Option<String>,
    pub currency: Option<String>,
    pub exchange_name: Option<String>,
    pub full_exchange_name: Option<String>,
    pub exchange_timezone_name: Option<String>,
    pub timezone: Option<String>,
    pub gmtoffset: Option<i64>,
    pub instrument_type: Option<String>,
    pub first_trade_date: Option<i64>,
    pub regular_market_price: Option<f64>,
    pub regular_market_time: Option<i64>,
    pub regular_market_day_high: Option<f64>,
    pub regular_market_day_low: Option<f64>,
    pub regular_market_volume: Option<u64>,
    pub chart_previous_close: Option<f64>,
    pub previous_close: Option<f64>,
    pub fifty_two_week_high: Option<f64>,
    pub fifty_two_week_low: Option<f64>,
    pub price_hint: Option<i64>,
    pub scale: Option<i64>,
    pub data_granularity: Option<String>,
    pub range: Option<String>,
    pub valid_ranges: Option<Vec<String>>,
    pub long_name: Option<String>,
    pub short_name: Option<String>,
    pub has_pre_post_market_data: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Indicators {
    #[serde(default)]
    pub quote: Vec<QuoteBlock>,
    #[serde(default)]
    pub adjclose: Vec<AdjCloseBlock>,
}

/// Parallel OHLCV arrays; `null` marks a missing bar component.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct QuoteBlock {
    pub open: Vec<Option<f64>>,
    pub high: Vec<Option<f64>>,
    pub low: Vec<Option<f64>>,
    pub close: Vec<Option<f64>>,
    pub volume: Vec<Option<u64>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AdjCloseBlock {
    pub adjclose: Vec<Option<f64>>,
}

/// Dividend and split events keyed by their timestamp as a string.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ChartEvents {
    pub dividends: BTreeMap<String, RawDividend>,
    pub splits: BTreeMap<String, RawSplit>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawDividend {
    #[serde(default)]
    pub amount: Option<f64>,
    pub date: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawSplit {
    pub date: i64,
    #[serde(default)]
    pub numerator: Option<f64>,
    #[serde(default)]
    pub denominator: Option<f64>,
    #[serde(default, rename = "splitRatio")]
    pub split_ratio: Option<String>,
}

/// Top-level envelope of the fundamentals timeseries endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TimeseriesResponse {
    pub timeseries: TimeseriesEnvelope,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TimeseriesEnvelope {
    #[serde(default)]
    pub result: Option<Vec<TimeseriesResult>>,
    #[serde(default)]
    pub error: Option<ChartError>,
}

/// One metric's result block. The reported points live under a dynamic key
/// equal to the metric name, so everything but the known fields is captured
/// into `data`.
#[derive(Debug, Clone, Deserialize)]
pub struct TimeseriesResult {
    pub meta: TimeseriesMeta,
    #[serde(default)]
    pub timestamp: Option<Vec<i64>>,
    #[serde(flatten)]
    pub data: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TimeseriesMeta {
    #[serde(default, rename = "type")]
    pub metric_types: Vec<String>,
    #[serde(default)]
    pub symbol: Vec<String>,
}

/// One reported value inside a timeseries result block.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawFundamentalsPoint {
    pub data_id: Option<i64>,
    pub as_of_date: Option<String>,
    pub period_type: Option<String>,
    pub currency_code: Option<String>,
    pub reported_value: Option<ReportedValue>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ReportedValue {
    pub raw: Option<f64>,
    pub fmt: Option<String>,
}

/// Top-level envelope of the quoteSummary endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct QuoteSummaryResponse {
    #[serde(rename = "quoteSummary")]
    pub quote_summary: QuoteSummaryEnvelope,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuoteSummaryEnvelope {
    #[serde(default)]
    pub result: Option<Vec<BTreeMap<String, Value>>>,
    #[serde(default)]
    pub error: Option<ChartError>,
}

/// Top-level envelope of the option-chain endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct OptionChainResponse {
    #[serde(rename = "optionChain")]
    pub option_chain: OptionChainEnvelope,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OptionChainEnvelope {
    #[serde(default)]
    pub result: Option<Vec<OptionChainResult>>,
    #[serde(default)]
    pub error: Option<ChartError>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OptionChainResult {
    pub underlying_symbol: Option<String>,
    pub expiration_dates: Vec<i64>,
    pub strikes: Vec<f64>,
    pub quote: Option<UnderlyingQuote>,
    pub options: Vec<OptionsBlock>,
}

/// Quote fields of the underlying carried on the chain response.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UnderlyingQuote {
    pub symbol: Option<String>,
    pub long_name: Option<String>,
    pub short_name: Option<String>,
    pub region: Option<String>,
    pub currency: Option<String>,
    pub full_exchange_name: Option<String>,
    pub quote_source_name: Option<String>,
    pub quote_type: Option<String>,
    pub regular_market_price: Option<f64>,
    pub regular_market_volume: Option<u64>,
    pub regular_market_open: Option<f64>,
    pub regular_market_day_high: Option<f64>,
    pub regular_market_day_low: Option<f64>,
    pub dividend_yield: Option<f64>,
}

/// Calls and puts for one expiration date.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OptionsBlock {
    pub expiration_date: Option<i64>,
    pub calls: Vec<OptionContractRaw>,
    pub puts: Vec<OptionContractRaw>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OptionContractRaw {
    pub contract_symbol: Option<String>,
    pub strike: Option<f64>,
    pub currency: Option<String>,
    pub last_price: Option<f64>,
    pub change: Option<f64>,
    pub percent_change: Option<f64>,
    pub volume: Option<u64>,
    pub open_interest: Option<u64>,
    pub bid: Option<f64>,
    pub ask: Option<f64>,
    pub contract_size: Option<String>,
    pub expiration: Option<i64>,
    pub last_trade_date: Option<i64>,
    pub implied_volatility: Option<f64>,
    pub in_the_money: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_chart_response() {
        let raw = serde_json::json!({
            "chart": {
                "result": [{
                    "meta": {
                        "symbol": "AAPL",
                        "currency": "USD",
                        "firstTradeDate": 345479400,
                        "dataGranularity": "1d"
                    },
                    "timestamp": [1704985200, 1705071600],
                    "indicators": {
                        "quote": [{
                            "open": [185.0, null],
                            "high": [186.4, 187.0],
                            "low": [184.2, 185.1],
                            "close": [186.2, 186.9],
                            "volume": [40000000, 38000000]
                        }],
                        "adjclose": [{ "adjclose": [185.9, 186.6] }]
                    },
                    "events": {
                        "dividends": {
                            "1704985200": { "amount": 0.24, "date": 1704985200 }
                        }
                    }
                }],
                "error": null
            }
        });
        let parsed: ChartResponse = serde_json::from_value(raw).unwrap();
        let result = &parsed.chart.result.unwrap()[0];
        assert_eq!(result.meta.symbol.as_deref(), Some("AAPL"));
        assert_eq!(result.meta.first_trade_date, Some(345479400));
        let quote = &result.indicators.as_ref().unwrap().quote[0];
        assert_eq!(quote.open, vec![Some(185.0), None]);
        let events = result.events.as_ref().unwrap();
        assert_eq!(events.dividends["1704985200"].amount, Some(0.24));
    }

    #[test]
    fn test_parse_chart_error_envelope() {
        let raw = serde_json::json!({
            "chart": {
                "result": null,
                "error": { "code": "Not Found", "description": "No data found" }
            }
        });
        let parsed: ChartResponse = serde_json::from_value(raw).unwrap();
        assert!(parsed.chart.result.is_none());
        let error = parsed.chart.error.unwrap();
        assert_eq!(error.code.as_deref(), Some("Not Found"));
    }

    #[test]
    fn test_parse_timeseries_dynamic_key() {
        let raw = serde_json::json!({
            "timeseries": {
                "result": [{
                    "meta": { "type": ["annualNetIncome"], "symbol": ["AAPL"] },
                    "timestamp": [1703980800],
                    "annualNetIncome": [{
                        "dataId": 20091,
                        "asOfDate": "2023-12-31",
                        "periodType": "12M",
                        "currencyCode": "USD",
                        "reportedValue": { "raw": 96995000000.0, "fmt": "96.99B" }
                    }]
                }],
                "error": null
            }
        });
        let parsed: TimeseriesResponse = serde_json::from_value(raw).unwrap();
        let result = &parsed.timeseries.result.unwrap()[0];
        assert_eq!(result.meta.metric_types, vec!["annualNetIncome"]);
        let points: Vec<RawFundamentalsPoint> =
            serde_json::from_value(result.data["annualNetIncome"].clone()).unwrap();
        assert_eq!(points[0].period_type.as_deref(), Some("12M"));
        assert_eq!(
            points[0].reported_value.as_ref().unwrap().raw,
            Some(96_995_000_000.0)
        );
    }

    #[test]
    fn test_parse_option_chain() {
        let raw = serde_json::json!({
            "optionChain": {
                "result": [{
                    "underlyingSymbol": "AAPL",
                    "expirationDates": [1705622400],
                    "strikes": [190.0],
                    "quote": { "symbol": "AAPL", "regularMarketPrice": 185.5 },
                    "options": [{
                        "expirationDate": 1705622400,
                        "calls": [{ "contractSymbol": "AAPL240119C00190000", "strike": 190.0 }],
                        "puts": []
                    }]
                }],
                "error": null
            }
        });
        let parsed: OptionChainResponse = serde_json::from_value(raw).unwrap();
        let result = &parsed.option_chain.result.unwrap()[0];
        assert_eq!(result.quote.as_ref().unwrap().regular_market_price, Some(185.5));
        assert_eq!(
            result.options[0].calls[0].contract_symbol.as_deref(),
            Some("AAPL240119C00190000")
        );
    }
}

//! Cached option-chain contracts.

use serde::{Deserialize, Serialize};

/// Call or put side of a contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OptionSide {
    Call,
    Put,
}

/// One option contract, enriched with underlying quote fields.
///
/// The options cache is full-refresh: the whole per-ticker collection is
/// deleted and rewritten on every update, one document per contract.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptionContract {
    #[serde(rename = "Contract Symbol")]
    pub contract_symbol: Option<String>,
    #[serde(rename = "Type")]
    pub side: Option<OptionSide>,
    #[serde(rename = "Strike")]
    pub strike: Option<f64>,
    #[serde(rename = "Currency")]
    pub currency: Option<String>,
    #[serde(rename = "Last Price")]
    pub last_price: Option<f64>,
    #[serde(rename = "Change")]
    pub change: Option<f64>,
    #[serde(rename = "Percent Change")]
    pub percent_change: Option<f64>,
    #[serde(rename = "Volume")]
    pub volume: Option<u64>,
    #[serde(rename = "Open Interest")]
    pub open_interest: Option<u64>,
    #[serde(rename = "Bid")]
    pub bid: Option<f64>,
    #[serde(rename = "Ask")]
    pub ask: Option<f64>,
    #[serde(rename = "Contract Size")]
    pub contract_size: Option<String>,
    #[serde(rename = "Expiration")]
    pub expiration: Option<i64>,
    #[serde(rename = "Last Trade Date")]
    pub last_trade_date: Option<i64>,
    #[serde(rename = "Implied Volatility")]
    pub implied_volatility: Option<f64>,
    #[serde(rename = "In The Money")]
    pub in_the_money: Option<bool>,
    /// Underlying price divided by strike, when both are known.
    #[serde(rename = "Moneyness")]
    pub moneyness: Option<f64>,
    #[serde(rename = "Underlying Name")]
    pub underlying_name: Option<String>,
    #[serde(rename = "Underlying Ticker")]
    pub underlying_ticker: Option<String>,
    #[serde(rename = "Underlying Region")]
    pub underlying_region: Option<String>,
    #[serde(rename = "Underlying Price")]
    pub underlying_price: Option<f64>,
    #[serde(rename = "Underlying Currency")]
    pub underlying_currency: Option<String>,
    #[serde(rename = "Underlying Exchange")]
    pub underlying_exchange: Option<String>,
    #[serde(rename = "Underlying Volume")]
    pub underlying_volume: Option<u64>,
    #[serde(rename = "Underlying Open Price")]
    pub underlying_open: Option<f64>,
    #[serde(rename = "Underlying High Price")]
    pub underlying_high: Option<f64>,
    #[serde(rename = "Underlying Low Price")]
    pub underlying_low: Option<f64>,
    #[serde(rename = "Underlying Type")]
    pub underlying_type: Option<String>,
    #[serde(rename = "Underlying Quote Source")]
    pub underlying_quote_source: Option<String>,
    #[serde(rename = "Underlying Dividend Yield")]
    pub underlying_dividend_yield: Option<f64>,
    /// `%Y-%m-%d %H:%M:%S`, UTC.
    #[serde(rename = "Last Update")]
    pub last_update: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contract_display_names() {
        let contract = OptionContract {
            contract_symbol: Some("AAPL240119C00190000".to_string()),
            side: Some(OptionSide::Call),
            strike: Some(190.0),
            underlying_price: Some(185.5),
            moneyness: Some(185.5 / 190.0),
            ..OptionContract::default()
        };
        let value = serde_json::to_value(&contract).unwrap();
        assert_eq!(value["Contract Symbol"], "AAPL240119C00190000");
        assert_eq!(value["Type"], "Call");
        assert_eq!(value["Underlying Price"], 185.5);
    }
}

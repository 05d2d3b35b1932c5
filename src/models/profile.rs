//! Cached company/instrument profile documents.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// quoteSummary modules requested for the profile document.
///
/// Declarative table: the request is built from the camelCase keys and each
/// returned module is stored under its display name.
pub const PROFILE_MODULES: &[&str] = &[
    "assetProfile",
    "calendarEvents",
    "defaultKeyStatistics",
    "earnings",
    "earningsHistory",
    "earningsTrend",
    "esgScores",
    "financialData",
    "fundOwnership",
    "fundPerformance",
    "fundProfile",
    "indexTrend",
    "industryTrend",
    "insiderHolders",
    "insiderTransactions",
    "institutionOwnership",
    "majorHoldersBreakdown",
    "netSharePurchaseActivity",
    "pageViews",
    "price",
    "quoteType",
    "recommendationTrend",
    "secFilings",
    "sectorTrend",
    "summaryDetail",
    "summaryProfile",
    "topHoldings",
    "upgradeDowngradeHistory",
];

/// Cached profile for one ticker; refreshed when older than 24 hours.
///
/// Section content stays as raw JSON: the set of fields inside each module
/// varies wildly by instrument kind, and callers address whole sections.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileRecord {
    #[serde(rename = "Ticker")]
    pub ticker: String,
    /// `%Y-%m-%d %H:%M:%S`, UTC.
    #[serde(rename = "Last Update")]
    pub last_update: String,
    /// Section display name -> raw module payload.
    #[serde(flatten)]
    pub sections: BTreeMap<String, serde_json::Value>,
}

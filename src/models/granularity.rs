//! Sampling intervals for historical series.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Sampling interval of a time series.
///
/// Each granularity maps to the provider's interval code (used in chart
/// queries) and to a storage label (used in cache collection names).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Granularity {
    Minute,
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Granularity {
    /// Provider interval code, e.g. `1d` for daily.
    pub fn interval_code(&self) -> &'static str {
        match self {
            Granularity::Minute => "1m",
            Granularity::Hourly => "1h",
            Granularity::Daily => "1d",
            Granularity::Weekly => "1wk",
            Granularity::Monthly => "1mo",
            Granularity::Yearly => "1y",
        }
    }

    /// Label used in cache collection names, e.g. `AAPL_Daily`.
    pub fn storage_label(&self) -> &'static str {
        match self {
            Granularity::Minute => "Minute",
            Granularity::Hourly => "Hourly",
            Granularity::Daily => "Daily",
            Granularity::Weekly => "Weekly",
            Granularity::Monthly => "Monthly",
            Granularity::Yearly => "Yearly",
        }
    }

    /// Parse either an interval code (`1d`) or a storage label (`Daily`).
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "1m" | "Minute" => Some(Granularity::Minute),
            "1h" | "60m" | "Hourly" => Some(Granularity::Hourly),
            "1d" | "Daily" => Some(Granularity::Daily),
            "1wk" | "Weekly" => Some(Granularity::Weekly),
            "1mo" | "Monthly" => Some(Granularity::Monthly),
            "1y" | "Yearly" => Some(Granularity::Yearly),
            _ => None,
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.storage_label())
    }
}

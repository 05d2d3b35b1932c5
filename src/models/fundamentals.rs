//! Cached fundamentals documents.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Timestamp format used on cached documents' `Last Update` field.
pub const LAST_UPDATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Metric types requested from the fundamentals timeseries endpoint.
///
/// The endpoint only returns metrics that are explicitly asked for, so this
/// list doubles as the declarative schema of the fundamentals document
/// (each entry is stored under its display name).
pub const METRIC_TYPES: &[&str] = &[
    "annualAmortization",
    "annualBasicAverageShares",
    "annualBasicEPS",
    "annualCostOfRevenue",
    "annualDilutedAverageShares",
    "annualDilutedEPS",
    "annualDilutedNIAvailtoComStockholders",
    "annualDividendPerShare",
    "annualEBIT",
    "annualEBITDA",
    "annualGeneralAndAdministrativeExpense",
    "annualGrossProfit",
    "annualInterestExpense",
    "annualInterestIncome",
    "annualNetIncome",
    "annualNetIncomeCommonStockholders",
    "annualNetIncomeContinuousOperations",
    "annualNormalizedEBITDA",
    "annualNormalizedIncome",
    "annualOperatingExpense",
    "annualOperatingIncome",
    "annualOperatingRevenue",
    "annualOtherIncomeExpense",
    "annualPretaxIncome",
    "annualReconciledCostOfRevenue",
    "annualReconciledDepreciation",
    "annualResearchAndDevelopment",
    "annualSellingGeneralAndAdministration",
    "annualTaxProvision",
    "annualTaxRateForCalcs",
    "annualTotalExpenses",
    "annualTotalRevenue",
    "annualAccountsPayable",
    "annualAccountsReceivable",
    "annualAccumulatedDepreciation",
    "annualCapitalStock",
    "annualCashAndCashEquivalents",
    "annualCashCashEquivalentsAndShortTermInvestments",
    "annualCommonStock",
    "annualCommonStockEquity",
    "annualCurrentAssets",
    "annualCurrentDebt",
    "annualCurrentDeferredRevenue",
    "annualCurrentLiabilities",
    "annualGoodwill",
    "annualGoodwillAndOtherIntangibleAssets",
    "annualGrossPPE",
    "annualInventory",
    "annualInvestedCapital",
    "annualInvestmentsAndAdvances",
    "annualLongTermDebt",
    "annualLongTermDebtAndCapitalLeaseObligation",
    "annualNetDebt",
    "annualNetPPE",
    "annualOrdinarySharesNumber",
    "annualOtherCurrentAssets",
    "annualOtherCurrentLiabilities",
    "annualOtherNonCurrentAssets",
    "annualOtherNonCurrentLiabilities",
    "annualRetainedEarnings",
    "annualShareIssued",
    "annualStockholdersEquity",
    "annualTangibleBookValue",
    "annualTotalAssets",
    "annualTotalCapitalization",
    "annualTotalDebt",
    "annualTotalEquityGrossMinorityInterest",
    "annualTotalLiabilitiesNetMinorityInterest",
    "annualTotalNonCurrentAssets",
    "annualTotalNonCurrentLiabilitiesNetMinorityInterest",
    "annualWorkingCapital",
    "annualBeginningCashPosition",
    "annualCapitalExpenditure",
    "annualCashDividendsPaid",
    "annualChangeInCashSupplementalAsReported",
    "annualChangeInInventory",
    "annualChangeInWorkingCapital",
    "annualDepreciationAndAmortization",
    "annualEndCashPosition",
    "annualFreeCashFlow",
    "annualInvestingCashFlow",
    "annualFinancingCashFlow",
    "annualNetOtherFinancingCharges",
    "annualNetOtherInvestingChanges",
    "annualOperatingCashFlow",
    "annualPurchaseOfBusiness",
    "annualPurchaseOfInvestment",
    "annualRepaymentOfDebt",
    "annualRepurchaseOfCapitalStock",
    "annualSaleOfInvestment",
    "annualStockBasedCompensation",
    "quarterlyBasicEPS",
    "quarterlyDilutedEPS",
    "quarterlyNetIncome",
    "quarterlyOperatingIncome",
    "quarterlyTotalRevenue",
    "quarterlyFreeCashFlow",
    "quarterlyOperatingCashFlow",
    "quarterlyTotalAssets",
    "quarterlyTotalDebt",
    "quarterlyStockholdersEquity",
    "trailingBasicEPS",
    "trailingDilutedEPS",
    "trailingNetIncome",
    "trailingOperatingIncome",
    "trailingTotalRevenue",
];

/// One reported value of a fundamentals metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundamentalsPoint {
    #[serde(rename = "Data ID")]
    pub data_id: Option<i64>,
    #[serde(rename = "As Of Date")]
    pub as_of_date: Option<String>,
    #[serde(rename = "Period Type")]
    pub period_type: Option<String>,
    #[serde(rename = "Currency")]
    pub currency: Option<String>,
    #[serde(rename = "Value")]
    pub value: Option<f64>,
    #[serde(rename = "Formatted Value")]
    pub formatted_value: Option<String>,
}

/// Cached fundamentals for one ticker; refreshed when older than 7 days.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FundamentalsRecord {
    #[serde(rename = "Ticker")]
    pub ticker: String,
    /// `%Y-%m-%d %H:%M:%S`, UTC.
    #[serde(rename = "Last Update")]
    pub last_update: String,
    /// Metric display name -> reported points, oldest first as returned.
    #[serde(flatten)]
    pub metrics: BTreeMap<String, Vec<FundamentalsPoint>>,
}

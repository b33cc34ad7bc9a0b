//! IEX Cloud response structures.
//!
//! Field names follow the API payloads. Numeric fields the API sometimes
//! leaves null are `Option<f64>`.

use crate::utils::format_epoch_millis;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Response of `/stock/{symbol}/logo`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Logo {
    pub url: String,
}

/// Response of `/stock/{symbol}/company`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyInfo {
    #[serde(rename = "companyName")]
    pub company_name: String,

    #[serde(default)]
    pub industry: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(rename = "CEO", default)]
    pub ceo: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exchange: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sector: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employees: Option<u64>,
}

/// Response of `/stock/{symbol}/stats` (advanced stats subset)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyStats {
    #[serde(rename = "peRatio")]
    pub pe_ratio: Option<f64>,

    #[serde(rename = "forwardPERatio")]
    pub forward_pe_ratio: Option<f64>,

    #[serde(rename = "pegRatio")]
    pub peg_ratio: Option<f64>,

    #[serde(rename = "priceToSales")]
    pub price_to_sales: Option<f64>,

    #[serde(rename = "priceToBook")]
    pub price_to_book: Option<f64>,

    pub revenue: Option<f64>,

    #[serde(rename = "totalCash")]
    pub total_cash: Option<f64>,

    #[serde(rename = "currentDebt")]
    pub current_debt: Option<f64>,

    #[serde(rename = "day200MovingAvg")]
    pub day_200_moving_avg: Option<f64>,

    #[serde(rename = "day50MovingAvg")]
    pub day_50_moving_avg: Option<f64>,
}

/// One entry of `/time-series/fundamentals/{symbol}/quarterly`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuarterlyFundamentals {
    #[serde(rename = "fiscalQuarter")]
    pub fiscal_quarter: u8,

    #[serde(rename = "fiscalYear")]
    pub fiscal_year: u16,

    #[serde(rename = "filingDate", default)]
    pub filing_date: Option<String>,

    #[serde(default)]
    pub revenue: Option<f64>,

    #[serde(rename = "incomeNet", default)]
    pub income_net: Option<f64>,
}

/// One entry of `/stock/{symbol}/dividends/{range}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dividend {
    #[serde(rename = "paymentDate")]
    pub payment_date: String,

    pub amount: f64,
}

/// One entry of `/stock/{symbol}/news/last/{n}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsArticle {
    pub headline: String,

    /// Publication time, epoch milliseconds
    pub datetime: i64,

    pub source: String,

    pub url: String,

    #[serde(default)]
    pub summary: String,

    #[serde(default)]
    pub image: Option<String>,
}

/// Dates IEX sends either as epoch milliseconds or as preformatted text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ApiDate {
    EpochMillis(i64),
    Text(String),
}

impl fmt::Display for ApiDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiDate::EpochMillis(ms) => f.write_str(&format_epoch_millis(*ms)),
            ApiDate::Text(text) => f.write_str(text),
        }
    }
}

/// One entry of `/stock/{symbol}/institutional-ownership`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstitutionalHolding {
    #[serde(rename = "entityProperName")]
    pub entity_proper_name: String,

    pub date: ApiDate,

    #[serde(rename = "reportedHolding")]
    pub reported_holding: f64,
}

/// One entry of `/stock/{symbol}/insider-transactions`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsiderTransaction {
    #[serde(rename = "fullName")]
    pub full_name: String,

    #[serde(rename = "filingDate")]
    pub filing_date: ApiDate,

    #[serde(rename = "transactionShares", default)]
    pub transaction_shares: Option<f64>,

    #[serde(rename = "transactionPrice", default)]
    pub transaction_price: Option<f64>,
}

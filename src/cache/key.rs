//! Resource keys: `{SYMBOL}_{category}`, e.g. `AAPL_logo`.

use crate::error::RemoteFetchError;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Data categories fetched from the financial-data API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Logo,
    Company,
    Stats,
    Fundamentals,
    Dividends,
    News,
    Institutional,
    InsiderTransactions,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Logo,
        Category::Company,
        Category::Stats,
        Category::Fundamentals,
        Category::Dividends,
        Category::News,
        Category::Institutional,
        Category::InsiderTransactions,
    ];

    pub fn tag(&self) -> &'static str {
        match self {
            Category::Logo => "logo",
            Category::Company => "company",
            Category::Stats => "stats",
            Category::Fundamentals => "fundamentals",
            Category::Dividends => "dividends",
            Category::News => "news",
            Category::Institutional => "institutional",
            Category::InsiderTransactions => "insider_transactions",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Category::ALL
            .into_iter()
            .find(|c| c.tag() == wanted)
            .ok_or_else(|| format!("unknown cache category '{}'", s.trim()))
    }
}

/// Upper-cases a ticker and checks that it can be embedded in a key or URL path.
///
/// `_` is the key separator and is never accepted inside a symbol.
pub fn normalize_symbol(symbol: &str) -> Result<String, RemoteFetchError> {
    let symbol = symbol.trim().to_ascii_uppercase();
    if symbol.is_empty() {
        return Err(RemoteFetchError::InvalidRequest("symbol must not be empty".to_string()));
    }
    if let Some(bad) = symbol
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '.' || *c == '-'))
    {
        return Err(RemoteFetchError::InvalidRequest(format!(
            "symbol '{}' contains unsupported character '{}'",
            symbol, bad
        )));
    }
    Ok(symbol)
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceKey {
    symbol: String,
    category: Category,
}

impl ResourceKey {
    pub fn new(symbol: &str, category: Category) -> Result<Self, RemoteFetchError> {
        Ok(Self {
            symbol: normalize_symbol(symbol)?,
            category,
        })
    }

    pub fn category(&self) -> Category {
        self.category
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.symbol, self.category.tag())
    }
}

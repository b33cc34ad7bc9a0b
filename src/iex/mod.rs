//! IEX Cloud client: one operation per data category.

pub mod types;

pub use types::{
    ApiDate, CompanyInfo, Dividend, InsiderTransaction, InstitutionalHolding, KeyStats, Logo,
    NewsArticle, QuarterlyFundamentals,
};

use crate::{
    cache::normalize_symbol,
    config::Config,
    error::{DashboardError, RemoteFetchError},
    http_utils::{get_json, RequestThrottle},
};
use async_trait::async_trait;
use log::info;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::{fmt, sync::Arc, time::Duration};
use url::Url;

pub const DEFAULT_FUNDAMENTALS_PERIOD: &str = "quarterly";
pub const DEFAULT_DIVIDEND_RANGE: &str = "5y";

/// Source of company data, keyed by ticker symbol.
#[async_trait]
pub trait StockDataSource: Send + Sync {
    async fn get_logo(&self, symbol: &str) -> Result<Logo, RemoteFetchError>;

    async fn get_company_info(&self, symbol: &str) -> Result<CompanyInfo, RemoteFetchError>;

    async fn get_stats(&self, symbol: &str) -> Result<KeyStats, RemoteFetchError>;

    async fn get_fundamentals(
        &self,
        symbol: &str,
        period: &str,
    ) -> Result<Vec<QuarterlyFundamentals>, RemoteFetchError>;

    async fn get_dividends(
        &self,
        symbol: &str,
        range: &str,
    ) -> Result<Vec<Dividend>, RemoteFetchError>;

    async fn get_company_news(
        &self,
        symbol: &str,
        last: usize,
    ) -> Result<Vec<NewsArticle>, RemoteFetchError>;

    async fn get_institutional_ownership(
        &self,
        symbol: &str,
    ) -> Result<Vec<InstitutionalHolding>, RemoteFetchError>;

    async fn get_insider_transactions(
        &self,
        symbol: &str,
    ) -> Result<Vec<InsiderTransaction>, RemoteFetchError>;
}

pub struct IexClient {
    http: Client,
    base_url: Url,
    token: String,
    throttle: Arc<RequestThrottle>,
}

impl fmt::Debug for IexClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IexClient")
            .field("base_url", &self.base_url.as_str())
            .field("token", &"<redacted>")
            .finish()
    }
}

impl IexClient {
    pub fn new(
        base_url: &str,
        token: impl Into<String>,
        timeout: Duration,
        throttle: Arc<RequestThrottle>,
    ) -> Result<Self, DashboardError> {
        let base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(DashboardError::ConfigError(format!(
                "IEX base URL '{}' cannot carry a path",
                base_url
            )));
        }
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                DashboardError::ConfigError(format!("Failed to build HTTP client: {}", e))
            })?;
        info!("IEX client targeting {}", base_url);
        Ok(Self {
            http,
            base_url,
            token: token.into(),
            throttle,
        })
    }

    pub fn from_config(
        config: &Config,
        throttle: Arc<RequestThrottle>,
    ) -> Result<Self, DashboardError> {
        Self::new(
            &config.iex_base_url,
            config.iex_api_token.clone(),
            config.http_timeout(),
            throttle,
        )
    }

    /// `{base}/{segments...}?token=...`
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url, RemoteFetchError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                RemoteFetchError::InvalidRequest(format!("bad base URL {}", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        url.query_pairs_mut().append_pair("token", &self.token);
        Ok(url)
    }

    async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, RemoteFetchError> {
        let url = self.endpoint(segments)?;
        let context = format!("IEX /{}", segments.join("/"));
        get_json(&self.http, &self.throttle, url, &context).await
    }
}

#[async_trait]
impl StockDataSource for IexClient {
    async fn get_logo(&self, symbol: &str) -> Result<Logo, RemoteFetchError> {
        let symbol = normalize_symbol(symbol)?;
        self.get(&["stock", symbol.as_str(), "logo"]).await
    }

    async fn get_company_info(&self, symbol: &str) -> Result<CompanyInfo, RemoteFetchError> {
        let symbol = normalize_symbol(symbol)?;
        self.get(&["stock", symbol.as_str(), "company"]).await
    }

    async fn get_stats(&self, symbol: &str) -> Result<KeyStats, RemoteFetchError> {
        let symbol = normalize_symbol(symbol)?;
        self.get(&["stock", symbol.as_str(), "stats"]).await
    }

    async fn get_fundamentals(
        &self,
        symbol: &str,
        period: &str,
    ) -> Result<Vec<QuarterlyFundamentals>, RemoteFetchError> {
        let symbol = normalize_symbol(symbol)?;
        self.get(&["time-series", "fundamentals", symbol.as_str(), period]).await
    }

    async fn get_dividends(
        &self,
        symbol: &str,
        range: &str,
    ) -> Result<Vec<Dividend>, RemoteFetchError> {
        let symbol = normalize_symbol(symbol)?;
        self.get(&["stock", symbol.as_str(), "dividends", range]).await
    }

    async fn get_company_news(
        &self,
        symbol: &str,
        last: usize,
    ) -> Result<Vec<NewsArticle>, RemoteFetchError> {
        let symbol = normalize_symbol(symbol)?;
        let last = last.to_string();
        self.get(&["stock", symbol.as_str(), "news", "last", last.as_str()]).await
    }

    async fn get_institutional_ownership(
        &self,
        symbol: &str,
    ) -> Result<Vec<InstitutionalHolding>, RemoteFetchError> {
        let symbol = normalize_symbol(symbol)?;
        self.get(&["stock", symbol.as_str(), "institutional-ownership"]).await
    }

    async fn get_insider_transactions(
        &self,
        symbol: &str,
    ) -> Result<Vec<InsiderTransaction>, RemoteFetchError> {
        let symbol = normalize_symbol(symbol)?;
        self.get(&["stock", symbol.as_str(), "insider-transactions"]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> IexClient {
        IexClient::new(
            base,
            "pk_secret",
            Duration::from_secs(5),
            Arc::new(RequestThrottle::new(1, Duration::ZERO)),
        )
        .unwrap()
    }

    #[test]
    fn test_endpoint_building() {
        let iex = client("https://cloud.iexapis.com/stable");
        let url = iex.endpoint(&["stock", "AAPL", "logo"]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://cloud.iexapis.com/stable/stock/AAPL/logo?token=pk_secret"
        );

        let iex = client("https://sandbox.iexapis.com/stable/");
        let url = iex
            .endpoint(&["time-series", "fundamentals", "MSFT", "quarterly"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://sandbox.iexapis.com/stable/time-series/fundamentals/MSFT/quarterly?token=pk_secret"
        );

        let url = iex
            .endpoint(&["stock", "MSFT", "dividends", DEFAULT_DIVIDEND_RANGE])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://sandbox.iexapis.com/stable/stock/MSFT/dividends/5y?token=pk_secret"
        );

        let url = iex.endpoint(&["stock", "BRK.B", "news", "last", "10"]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://sandbox.iexapis.com/stable/stock/BRK.B/news/last/10?token=pk_secret"
        );
    }

    #[test]
    fn test_debug_redacts_token() {
        let rendered = format!("{:?}", client("https://cloud.iexapis.com/stable"));
        assert!(!rendered.contains("pk_secret"));
    }

    #[test]
    fn test_rejects_non_base_url() {
        let result = IexClient::new(
            "mailto:ops@example.com",
            "t",
            Duration::from_secs(1),
            Arc::new(RequestThrottle::new(1, Duration::ZERO)),
        );
        assert!(matches!(result, Err(DashboardError::ConfigError(_))));
    }

    #[tokio::test]
    async fn test_invalid_symbol_rejected_before_request() {
        let iex = client("https://cloud.iexapis.com/stable");
        let err = iex.get_logo("AA PL").await.unwrap_err();
        assert!(matches!(err, RemoteFetchError::InvalidRequest(_)));
    }
}

//! StockTwits symbol stream client. Responses are shown live and never cached.

use crate::{
    cache::normalize_symbol,
    config::Config,
    error::{DashboardError, RemoteFetchError},
    http_utils::{get_json, RequestThrottle},
};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::{sync::Arc, time::Duration};
use url::Url;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamUser {
    pub username: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamMessage {
    pub body: String,
    pub created_at: String,
    pub user: StreamUser,
}

/// Response of `/streams/symbol/{symbol}.json`
#[derive(Debug, Deserialize)]
struct SymbolStreamResponse {
    messages: Vec<StreamMessage>,
}

/// Recent social posts about a symbol.
#[async_trait]
pub trait SocialFeed: Send + Sync {
    async fn symbol_stream(&self, symbol: &str) -> Result<Vec<StreamMessage>, RemoteFetchError>;
}

#[derive(Debug)]
pub struct StockTwitsClient {
    http: Client,
    base_url: Url,
    throttle: Arc<RequestThrottle>,
}

impl StockTwitsClient {
    pub fn new(
        base_url: &str,
        timeout: Duration,
        throttle: Arc<RequestThrottle>,
    ) -> Result<Self, DashboardError> {
        let base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(DashboardError::ConfigError(format!(
                "StockTwits base URL '{}' cannot carry a path",
                base_url
            )));
        }
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                DashboardError::ConfigError(format!("Failed to build HTTP client: {}", e))
            })?;
        Ok(Self {
            http,
            base_url,
            throttle,
        })
    }

    pub fn from_config(
        config: &Config,
        throttle: Arc<RequestThrottle>,
    ) -> Result<Self, DashboardError> {
        Self::new(&config.stocktwits_base_url, config.http_timeout(), throttle)
    }

    pub fn stream_url(&self, symbol: &str) -> Result<Url, RemoteFetchError> {
        let file = format!("{}.json", symbol);
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                RemoteFetchError::InvalidRequest(format!("bad base URL {}", self.base_url))
            })?
            .pop_if_empty()
            .extend(["streams", "symbol", file.as_str()]);
        Ok(url)
    }
}

#[async_trait]
impl SocialFeed for StockTwitsClient {
    async fn symbol_stream(&self, symbol: &str) -> Result<Vec<StreamMessage>, RemoteFetchError> {
        let symbol = normalize_symbol(symbol)?;
        let url = self.stream_url(&symbol)?;
        let context = format!("StockTwits stream {}", symbol);
        let response: SymbolStreamResponse =
            get_json(&self.http, &self.throttle, url, &context).await?;
        Ok(response.messages)
    }
}

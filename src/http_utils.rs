//! Shared async HTTP utilities for the data API clients.
//!
//! Request throttling, status classification and JSON decoding.

use crate::error::RemoteFetchError;
use log::{debug, warn};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::{sync::Arc, time::Duration};
use tokio::sync::{Mutex, Semaphore, SemaphorePermit};
use tokio::time::{sleep, Instant};
use url::Url;

/// Limits in-flight requests and spaces them out, shared across API clients.
///
/// Failed requests are reported to the caller as-is; nothing here retries.
#[derive(Debug)]
pub struct RequestThrottle {
    pub min_delay: Duration,
    semaphore: Arc<Semaphore>,
    last_request: Mutex<Option<Instant>>,
}

impl RequestThrottle {
    pub fn new(max_concurrent: usize, min_delay: Duration) -> Self {
        Self {
            min_delay,
            semaphore: Arc::new(Semaphore::new(max_concurrent.max(1))),
            last_request: Mutex::new(None),
        }
    }

    /// Waits for a free slot and for `min_delay` since the previous request.
    pub async fn acquire(&self) -> Result<SemaphorePermit<'_>, RemoteFetchError> {
        let permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|e| RemoteFetchError::Network(format!("request throttle closed: {}", e)))?;

        let mut last = self.last_request.lock().await;
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.min_delay {
                sleep(self.min_delay - elapsed).await;
            }
        }
        *last = Some(Instant::now());
        Ok(permit)
    }
}

/// Maps a non-success HTTP status onto the remote error taxonomy.
pub fn classify_status(status: StatusCode, context: &str) -> RemoteFetchError {
    let detail = format!("{} returned HTTP {}", context, status);
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => RemoteFetchError::Auth(detail),
        StatusCode::NOT_FOUND => RemoteFetchError::UnknownSymbol(detail),
        StatusCode::TOO_MANY_REQUESTS => RemoteFetchError::RateLimited(detail),
        _ => RemoteFetchError::Network(detail),
    }
}

pub fn decode_body<T: DeserializeOwned>(body: &str, context: &str) -> Result<T, RemoteFetchError> {
    serde_json::from_str(body).map_err(|e| {
        warn!("Unexpected response shape from {}: {}", context, e);
        RemoteFetchError::MalformedResponse(format!("{}: {}", context, e))
    })
}

/// GETs `url` through `throttle` and decodes the JSON body.
///
/// `context` names the request in logs and errors; it must not contain credentials.
pub async fn get_json<T: DeserializeOwned>(
    client: &Client,
    throttle: &RequestThrottle,
    url: Url,
    context: &str,
) -> Result<T, RemoteFetchError> {
    let _permit = throttle.acquire().await?;
    debug!("GET {}", context);

    let response = client.get(url).send().await.map_err(|e| {
        let e = e.without_url();
        warn!("HTTP request error for {}: {}", context, e);
        RemoteFetchError::from(e)
    })?;

    let status = response.status();
    if !status.is_success() {
        warn!("HTTP error {} from {}", status, context);
        return Err(classify_status(status, context));
    }

    let body = response.text().await.map_err(RemoteFetchError::from)?;
    decode_body(&body, context)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[test]
    fn test_classify_status() {
        assert!(matches!(
            classify_status(StatusCode::UNAUTHORIZED, "logo"),
            RemoteFetchError::Auth(_)
        ));
        assert!(matches!(
            classify_status(StatusCode::FORBIDDEN, "logo"),
            RemoteFetchError::Auth(_)
        ));
        assert!(matches!(
            classify_status(StatusCode::NOT_FOUND, "logo"),
            RemoteFetchError::UnknownSymbol(_)
        ));
        assert!(matches!(
            classify_status(StatusCode::TOO_MANY_REQUESTS, "logo"),
            RemoteFetchError::RateLimited(_)
        ));
        assert_eq!(
            classify_status(StatusCode::BAD_GATEWAY, "AAPL stats"),
            RemoteFetchError::Network("AAPL stats returned HTTP 502 Bad Gateway".to_string())
        );
    }

    #[test]
    fn test_decode_body() {
        #[derive(Debug, Deserialize)]
        struct Logo {
            url: String,
        }
        let logo: Logo = decode_body(r#"{"url":"https://x/aapl.png"}"#, "logo").unwrap();
        assert_eq!(logo.url, "https://x/aapl.png");

        let err = decode_body::<Logo>(r#"{"link":"x"}"#, "logo").unwrap_err();
        assert!(matches!(err, RemoteFetchError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_throttle_spaces_requests() {
        let throttle = RequestThrottle::new(2, Duration::from_millis(50));
        let start = Instant::now();
        drop(throttle.acquire().await.unwrap());
        drop(throttle.acquire().await.unwrap());
        assert!(start.elapsed() >= Duration::from_millis(50));
    }
}

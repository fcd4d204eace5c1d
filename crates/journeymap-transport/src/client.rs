// SPDX-FileCopyrightText: 2026 Journeymap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Journeymap event collector.
//!
//! Provides [`CollectorClient`] which handles request construction, bearer
//! authentication, optional per-request timeouts, and bounded retry with
//! exponential backoff for transient errors.

use std::time::Duration;

use async_trait::async_trait;
use journeymap_config::model::DeliveryConfig;
use journeymap_core::{DeliverySink, JourneymapError, TrackingEvent};
use reqwest::header::{HeaderMap, HeaderValue};
use tracing::{debug, warn};

use crate::types::EventsPayload;

/// Collector path appended to the configured API base URL.
const EVENTS_PATH: &str = "/api/events";

/// Bounded retry policy with exponential backoff.
///
/// `max_retries` counts retries after the initial attempt; the delay before
/// retry `n` (1-based) is `initial_backoff * 2^(n-1)`.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_backoff: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, initial_backoff: Duration) -> Self {
        Self {
            max_retries,
            initial_backoff,
        }
    }
}

impl From<&DeliveryConfig> for RetryPolicy {
    fn from(config: &DeliveryConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            initial_backoff: Duration::from_millis(config.initial_backoff_ms),
        }
    }
}

/// HTTP client for collector communication.
///
/// Manages the bearer authentication header, connection pooling, and the
/// transient-error classification used by the retrying delivery path.
#[derive(Debug, Clone)]
pub struct CollectorClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    tracking_id: Option<String>,
    request_timeout: Option<Duration>,
}

impl CollectorClient {
    /// Creates a new collector client.
    ///
    /// Fails with a configuration error when `api_key` is empty; a tracker
    /// cannot be constructed without one.
    pub fn new(api_url: &str, api_key: &str) -> Result<Self, JourneymapError> {
        if api_key.trim().is_empty() {
            return Err(JourneymapError::Config(
                "api.key is required to construct a collector client".to_string(),
            ));
        }

        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {api_key}")).map_err(|e| {
            JourneymapError::Config(format!("invalid API key header value: {e}"))
        })?;
        auth.set_sensitive(true);
        headers.insert("authorization", auth);
        headers.insert("content-type", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| JourneymapError::Delivery {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            endpoint: format!("{}{EVENTS_PATH}", api_url.trim_end_matches('/')),
            api_key: api_key.to_string(),
            tracking_id: None,
            request_timeout: None,
        })
    }

    /// Includes a site/property identifier in each batch payload.
    pub fn with_tracking_id(mut self, tracking_id: Option<String>) -> Self {
        self.tracking_id = tracking_id;
        self
    }

    /// Applies a per-request timeout to every delivery attempt.
    ///
    /// Unset by default, matching the in-process client tracker; the
    /// server-side tracker always sets one.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Full collector endpoint URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Sends one batch with a single delivery attempt.
    ///
    /// Any non-2xx response or request failure is an error; the caller owns
    /// what happens next (re-queue, retry, or drop).
    pub async fn send(&self, events: &[TrackingEvent]) -> Result<(), JourneymapError> {
        let response = self.post(events).await?;
        let status = response.status();
        if status.is_success() {
            debug!(count = events.len(), "batch delivered");
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(JourneymapError::Delivery {
            message: format!("collector returned {status}: {body}"),
            source: None,
        })
    }

    /// Sends one batch, retrying transient failures with exponential backoff.
    ///
    /// Transient failures are request errors (connect, timeout) and the
    /// retryable status codes from [`is_transient_error`]. Non-transient
    /// responses (e.g. 400 or 401) fail immediately.
    pub async fn send_with_retry(
        &self,
        events: &[TrackingEvent],
        policy: &RetryPolicy,
    ) -> Result<(), JourneymapError> {
        let mut last_error = None;

        for attempt in 0..=policy.max_retries {
            if attempt > 0 {
                let delay = policy.initial_backoff * 2u32.pow(attempt - 1);
                warn!(
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "retrying batch delivery after transient error"
                );
                tokio::time::sleep(delay).await;
            }

            let response = match self.post(events).await {
                Ok(response) => response,
                Err(e) => {
                    // Connect errors and timeouts are transient by nature.
                    if attempt < policy.max_retries {
                        warn!(error = %e, attempt, "request failed, will retry");
                        last_error = Some(e);
                        continue;
                    }
                    return Err(e);
                }
            };

            let status = response.status();
            debug!(status = %status, attempt, "collector response received");

            if status.is_success() {
                debug!(count = events.len(), "batch delivered");
                return Ok(());
            }

            let body = response.text().await.unwrap_or_default();
            let err = JourneymapError::Delivery {
                message: format!("collector returned {status}: {body}"),
                source: None,
            };

            if is_transient_error(status) && attempt < policy.max_retries {
                warn!(status = %status, attempt, "transient error, will retry");
                last_error = Some(err);
                continue;
            }

            // Non-transient error or exhausted retries.
            return Err(err);
        }

        Err(last_error.unwrap_or_else(|| JourneymapError::Delivery {
            message: "batch delivery failed after retries".into(),
            source: None,
        }))
    }

    /// Builds and sends the POST request for one batch.
    async fn post(&self, events: &[TrackingEvent]) -> Result<reqwest::Response, JourneymapError> {
        let payload = EventsPayload {
            events,
            api_key: &self.api_key,
            tracking_id: self.tracking_id.as_deref(),
        };

        let mut request = self.client.post(&self.endpoint).json(&payload);
        if let Some(timeout) = self.request_timeout {
            request = request.timeout(timeout);
        }

        request.send().await.map_err(|e| {
            if e.is_timeout()
                && let Some(duration) = self.request_timeout
            {
                JourneymapError::Timeout { duration }
            } else {
                JourneymapError::Delivery {
                    message: format!("HTTP request failed: {e}"),
                    source: Some(Box::new(e)),
                }
            }
        })
    }
}

#[async_trait]
impl DeliverySink for CollectorClient {
    async fn deliver(&self, events: &[TrackingEvent]) -> Result<(), JourneymapError> {
        self.send(events).await
    }
}

/// Returns true for HTTP status codes that indicate transient errors worth retrying.
pub fn is_transient_error(status: reqwest::StatusCode) -> bool {
    matches!(status.as_u16(), 408 | 429 | 500 | 502 | 503 | 504)
}

#[cfg(test)]
mod tests {
    use super::*;
    use journeymap_core::SessionId;
    use serde_json::Map;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(base_url: &str) -> CollectorClient {
        CollectorClient::new(base_url, "jm_test_key").unwrap()
    }

    fn test_events(n: usize) -> Vec<TrackingEvent> {
        (0..n)
            .map(|i| {
                TrackingEvent::new(
                    format!("event_{i}"),
                    Map::new(),
                    SessionId("s-1".into()),
                )
            })
            .collect()
    }

    fn fast_policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy::new(max_retries, Duration::from_millis(10))
    }

    #[test]
    fn empty_api_key_fails_construction() {
        let result = CollectorClient::new("https://collect.example.com", "  ");
        assert!(matches!(result, Err(JourneymapError::Config(_))));
    }

    #[test]
    fn endpoint_joins_without_double_slash() {
        let client = test_client("https://collect.example.com/");
        assert_eq!(client.endpoint(), "https://collect.example.com/api/events");
    }

    #[tokio::test]
    async fn send_success() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/events"))
            .and(header("authorization", "Bearer jm_test_key"))
            .and(header("content-type", "application/json"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        client.send(&test_events(2)).await.unwrap();
    }

    #[tokio::test]
    async fn send_includes_api_key_in_body() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/events"))
            .and(body_partial_json(serde_json::json!({
                "apiKey": "jm_test_key",
                "trackingId": "site-9"
            })))
            .respond_with(ResponseTemplate::new(202))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server.uri()).with_tracking_id(Some("site-9".into()));
        client.send(&test_events(1)).await.unwrap();
    }

    #[tokio::test]
    async fn send_fails_on_non_2xx_without_retry() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/events"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let err = client.send(&test_events(1)).await.unwrap_err();
        assert!(err.to_string().contains("500"), "got: {err}");
    }

    #[tokio::test]
    async fn send_with_retry_recovers_from_transient_error() {
        let server = MockServer::start().await;

        // First request returns 503, second returns 200.
        Mock::given(method("POST"))
            .and(path("/api/events"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/api/events"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        client
            .send_with_retry(&test_events(1), &fast_policy(3))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn send_with_retry_exhausts_and_fails() {
        let server = MockServer::start().await;

        // Initial attempt + 2 retries, all failing.
        Mock::given(method("POST"))
            .and(path("/api/events"))
            .respond_with(ResponseTemplate::new(503))
            .expect(3)
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let result = client
            .send_with_retry(&test_events(1), &fast_policy(2))
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn send_with_retry_does_not_retry_permanent_errors() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/events"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let err = client
            .send_with_retry(&test_events(1), &fast_policy(3))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("401"), "got: {err}");
    }

    #[tokio::test]
    async fn request_timeout_maps_to_timeout_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/events"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
            .mount(&server)
            .await;

        let client = test_client(&server.uri())
            .with_request_timeout(Duration::from_millis(50));
        let err = client.send(&test_events(1)).await.unwrap_err();
        assert!(matches!(err, JourneymapError::Timeout { .. }), "got: {err}");
    }

    #[test]
    fn transient_status_classification() {
        use reqwest::StatusCode;
        assert!(is_transient_error(StatusCode::TOO_MANY_REQUESTS));
        assert!(is_transient_error(StatusCode::INTERNAL_SERVER_ERROR));
        assert!(is_transient_error(StatusCode::SERVICE_UNAVAILABLE));
        assert!(!is_transient_error(StatusCode::BAD_REQUEST));
        assert!(!is_transient_error(StatusCode::UNAUTHORIZED));
        assert!(!is_transient_error(StatusCode::NOT_FOUND));
    }
}

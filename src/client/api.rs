//! HTTP client for the profile backend.

use crate::client::{EventSource, OrderSource};
use crate::error::FeedError;
use crate::models::{EventPage, OrderHistoryResponse, OrderRecord};
use async_trait::async_trait;
use reqwest::Url;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Client for the `/profiles/{id}/...` endpoints.
#[derive(Debug, Clone)]
pub struct ProfileApiClient {
    base_url: Url,
    timeout: Duration,
    http_client: reqwest::Client,
}

impl ProfileApiClient {
    /// Create a client rooted at `base_url` (e.g. `https://host/api`).
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, FeedError> {
        let base_url = Url::parse(base_url).map_err(|e| FeedError::InvalidRequest {
            message: format!("invalid base URL `{}`: {}", base_url, e),
        })?;

        if base_url.cannot_be_a_base() {
            return Err(FeedError::InvalidRequest {
                message: format!("base URL `{}` cannot carry a path", base_url),
            });
        }

        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            base_url,
            timeout,
            http_client,
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// `{base}/profiles/{subject}/{resource}`, with the subject percent-encoded.
    fn profile_endpoint(&self, subject_id: &str, resource: &str) -> Result<Url, FeedError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| FeedError::InvalidRequest {
                message: format!("base URL `{}` cannot carry a path", self.base_url),
            })?
            .pop_if_empty()
            .extend(["profiles", subject_id, resource]);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, String)],
    ) -> Result<T, FeedError> {
        debug!("GET {} {:?}", url, query);

        let response = self
            .http_client
            .get(url.clone())
            .query(query)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    FeedError::Timeout(self.timeout)
                } else {
                    FeedError::from(e)
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!("Profile API returned {} for {}", status, url);
            return Err(FeedError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl EventSource for ProfileApiClient {
    async fn fetch_events(
        &self,
        subject_id: &str,
        page: usize,
        page_size: usize,
    ) -> Result<EventPage, FeedError> {
        let url = self.profile_endpoint(subject_id, "events")?;
        let query = [("page", page.to_string()), ("page_size", page_size.to_string())];
        let page: EventPage = self.get_json(url, &query).await?;
        debug!(
            "Fetched {} of {} events for {}",
            page.data.len(),
            page.total_records,
            subject_id
        );
        Ok(page)
    }
}

#[async_trait]
impl OrderSource for ProfileApiClient {
    async fn fetch_order_history(&self, subject_id: &str) -> Result<Vec<OrderRecord>, FeedError> {
        let url = self.profile_endpoint(subject_id, "order-history")?;
        let response: OrderHistoryResponse = self.get_json(url, &[]).await?;
        Ok(response.into_orders())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> ProfileApiClient {
        ProfileApiClient::new(base, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_profile_endpoint() {
        let url = client("https://example.com/api")
            .profile_endpoint("P1", "events")
            .unwrap();
        assert_eq!(url.as_str(), "https://example.com/api/profiles/P1/events");
    }

    #[test]
    fn test_profile_endpoint_trailing_slash_and_encoding() {
        let url = client("https://example.com/api/")
            .profile_endpoint("a b/c", "order-history")
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://example.com/api/profiles/a%20b%2Fc/order-history"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let err = ProfileApiClient::new("not a url", Duration::from_secs(5)).unwrap_err();
        assert!(matches!(err, FeedError::InvalidRequest { .. }));

        let err = ProfileApiClient::new("mailto:someone@example.com", Duration::from_secs(5))
            .unwrap_err();
        assert!(matches!(err, FeedError::InvalidRequest { .. }));
    }
}

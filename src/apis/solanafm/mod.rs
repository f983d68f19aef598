/// SolanaFM reverse lookup, no credentials required
use crate::apis::client::{ApiRequest, Requester};
use crate::apis::rate_limiter::RateLimiter;
use crate::apis::types::{LookupDirection, ProviderAdapter};
use crate::errors::ResolverResult;
use crate::sns::normalize_domain;
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

pub const SOLANAFM_PROVIDER: &str = "solanafm";

const PROBE_WALLET: &str = "11111111111111111111111111111111";

#[derive(Debug, Clone, Deserialize)]
pub struct SolanaFmSnsResponse {
    #[serde(default)]
    pub domain: Option<String>,
}

pub struct SolanaFmClient {
    base_url: String,
    requester: Arc<Requester>,
    rate_limiter: RateLimiter,
    health_timeout: Duration,
}

impl SolanaFmClient {
    pub fn new(
        base_url: &str,
        requester: Arc<Requester>,
        rate_limiter: RateLimiter,
        health_timeout: Duration,
    ) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            requester,
            rate_limiter,
            health_timeout,
        }
    }

    fn sns_request(&self, wallet: &str) -> ApiRequest {
        ApiRequest::get(format!("{}/v1/sns?wallet={}", self.base_url, wallet))
    }
}

#[async_trait]
impl ProviderAdapter for SolanaFmClient {
    fn key(&self) -> &str {
        SOLANAFM_PROVIDER
    }

    fn supports(&self, direction: LookupDirection) -> bool {
        direction == LookupDirection::Reverse
    }

    async fn reverse_lookup(&self, address: &str) -> ResolverResult<Option<String>> {
        let response: Option<SolanaFmSnsResponse> = self
            .requester
            .call(SOLANAFM_PROVIDER, &self.rate_limiter, &self.sns_request(address))
            .await?;

        Ok(response
            .and_then(|r| r.domain)
            .filter(|domain| !domain.trim().is_empty())
            .map(|domain| normalize_domain(&domain)))
    }

    async fn health_check(&self) -> bool {
        self.requester
            .probe(
                SOLANAFM_PROVIDER,
                &self.rate_limiter,
                &self.sns_request(PROBE_WALLET),
                self.health_timeout,
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apis::client::{HttpClient, RetryPolicy};
    use crate::apis::stats::StatsTracker;
    use crate::errors::ResolverError;
    use mockito::Matcher;

    fn client(url: &str, attempts: u32) -> SolanaFmClient {
        let requester = Arc::new(Requester::new(
            HttpClient::new(Duration::from_secs(5)).unwrap(),
            RetryPolicy::new(attempts, Duration::from_millis(1), 0.0),
            Arc::new(StatsTracker::new()),
        ));
        SolanaFmClient::new(
            url,
            requester,
            RateLimiter::new(SOLANAFM_PROVIDER, 100, Duration::from_secs(1)),
            Duration::from_secs(2),
        )
    }

    #[tokio::test]
    async fn test_reverse_lookup_appends_suffix() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/v1/sns")
            .match_query(Matcher::UrlEncoded("wallet".into(), "Wallet111".into()))
            .with_status(200)
            .with_body(r#"{"domain":"toly"}"#)
            .create_async()
            .await;

        let solanafm = client(&server.url(), 2);
        assert_eq!(
            solanafm.reverse_lookup("Wallet111").await.unwrap(),
            Some("toly.sol".to_string())
        );
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_server_errors_exhaust() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/v1/sns")
            .match_query(Matcher::Any)
            .with_status(502)
            .expect(2)
            .create_async()
            .await;

        let solanafm = client(&server.url(), 2);
        let err = solanafm.reverse_lookup("Wallet111").await.unwrap_err();
        assert!(matches!(err, ResolverError::Exhausted { attempts: 2, .. }));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_null_body_is_a_miss_and_a_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/v1/sns")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("null")
            .expect(1)
            .create_async()
            .await;

        let solanafm = client(&server.url(), 3);
        assert_eq!(solanafm.reverse_lookup("Wallet111").await.unwrap(), None);
        mock.assert_async().await;

        let stats = solanafm.requester.stats().provider(SOLANAFM_PROVIDER).unwrap();
        assert_eq!(stats.calls, 1);
        assert_eq!(stats.successes, 1);
    }

    #[tokio::test]
    async fn test_health_check_treats_not_found_as_reachable() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/v1/sns")
            .match_query(Matcher::UrlEncoded("wallet".into(), PROBE_WALLET.into()))
            .with_status(404)
            .expect(2)
            .create_async()
            .await;

        let solanafm = client(&server.url(), 1);
        assert_eq!(solanafm.reverse_lookup(PROBE_WALLET).await.unwrap(), None);
        assert!(solanafm.health_check().await);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_health_check_unhealthy_on_error_status() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v1/sns")
            .match_query(Matcher::Any)
            .with_status(500)
            .create_async()
            .await;

        assert!(!client(&server.url(), 1).health_check().await);
    }
}

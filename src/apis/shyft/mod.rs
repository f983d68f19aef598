/// Shyft reverse lookup (wallet -> primary domain)
use crate::apis::client::{ApiRequest, Requester};
use crate::apis::rate_limiter::RateLimiter;
use crate::apis::types::{LookupDirection, ProviderAdapter};
use crate::errors::ResolverResult;
use crate::sns::normalize_domain;
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

pub const SHYFT_PROVIDER: &str = "shyft";

const NETWORK: &str = "mainnet-beta";

/// Wallet used for reachability probes (the system program)
const PROBE_WALLET: &str = "11111111111111111111111111111111";

#[derive(Debug, Clone, Deserialize)]
pub struct ShyftResponse {
    #[serde(default)]
    pub result: Option<ShyftReverseResult>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ShyftReverseResult {
    #[serde(default)]
    pub domain: Option<String>,
}

pub struct ShyftClient {
    base_url: String,
    api_key: String,
    requester: Arc<Requester>,
    rate_limiter: RateLimiter,
    health_timeout: Duration,
}

impl ShyftClient {
    pub fn new(
        base_url: &str,
        api_key: &str,
        requester: Arc<Requester>,
        rate_limiter: RateLimiter,
        health_timeout: Duration,
    ) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            requester,
            rate_limiter,
            health_timeout,
        }
    }

    fn reverse_request(&self, wallet: &str) -> ApiRequest {
        ApiRequest::get(format!(
            "{}/sol/v1/names/reverse/{}?network={}",
            self.base_url, wallet, NETWORK
        ))
        .header("x-api-key", self.api_key.clone())
    }
}

#[async_trait]
impl ProviderAdapter for ShyftClient {
    fn key(&self) -> &str {
        SHYFT_PROVIDER
    }

    fn supports(&self, direction: LookupDirection) -> bool {
        direction == LookupDirection::Reverse
    }

    async fn reverse_lookup(&self, address: &str) -> ResolverResult<Option<String>> {
        let response: Option<ShyftResponse> = self
            .requester
            .call(SHYFT_PROVIDER, &self.rate_limiter, &self.reverse_request(address))
            .await?;

        Ok(response
            .and_then(|r| r.result)
            .and_then(|r| r.domain)
            .filter(|domain| !domain.trim().is_empty())
            .map(|domain| normalize_domain(&domain)))
    }

    async fn health_check(&self) -> bool {
        self.requester
            .probe(
                SHYFT_PROVIDER,
                &self.rate_limiter,
                &self.reverse_request(PROBE_WALLET),
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
    use mockito::Matcher;

    fn client(url: &str) -> ShyftClient {
        let requester = Arc::new(Requester::new(
            HttpClient::new(Duration::from_secs(5)).unwrap(),
            RetryPolicy::new(2, Duration::from_millis(1), 0.0),
            Arc::new(StatsTracker::new()),
        ));
        ShyftClient::new(
            url,
            "shyft-key",
            requester,
            RateLimiter::new(SHYFT_PROVIDER, 100, Duration::from_secs(1)),
            Duration::from_secs(2),
        )
    }

    #[tokio::test]
    async fn test_reverse_lookup_sends_key_and_network() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/sol/v1/names/reverse/Wallet111")
            .match_query(Matcher::UrlEncoded("network".into(), "mainnet-beta".into()))
            .match_header("x-api-key", "shyft-key")
            .with_status(200)
            .with_body(r#"{"success":true,"message":"ok","result":{"domain":"solana.sol"}}"#)
            .create_async()
            .await;

        let shyft = client(&server.url());
        assert_eq!(
            shyft.reverse_lookup("Wallet111").await.unwrap(),
            Some("solana.sol".to_string())
        );
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_not_found_is_a_miss() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/sol/v1/names/reverse/Nobody")
            .match_query(Matcher::Any)
            .with_status(404)
            .expect(1)
            .create_async()
            .await;

        let shyft = client(&server.url());
        assert_eq!(shyft.reverse_lookup("Nobody").await.unwrap(), None);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_null_body_and_null_result_are_misses() {
        for body in ["null", r#"{"success":false,"result":null}"#] {
            let mut server = mockito::Server::new_async().await;
            let mock = server
                .mock("GET", "/sol/v1/names/reverse/Wallet111")
                .match_query(Matcher::Any)
                .with_status(200)
                .with_body(body)
                .expect(1)
                .create_async()
                .await;

            let shyft = client(&server.url());
            assert_eq!(shyft.reverse_lookup("Wallet111").await.unwrap(), None, "{}", body);
            mock.assert_async().await;
        }
    }

    #[tokio::test]
    async fn test_health_check_probe_wallet() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", format!("/sol/v1/names/reverse/{}", PROBE_WALLET).as_str())
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"success":true,"result":{}}"#)
            .create_async()
            .await;

        assert!(client(&server.url()).health_check().await);
    }
}

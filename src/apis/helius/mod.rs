/// Helius reverse lookup (wallet -> primary domain)
///
/// JSON-RPC `getNameOwner` against the Helius RPC, authenticated with the
/// `api-key` query parameter.
use crate::apis::client::{ApiRequest, Requester};
use crate::apis::rate_limiter::RateLimiter;
use crate::apis::types::{json_rpc_request, JsonRpcResponse, LookupDirection, ProviderAdapter};
use crate::errors::ResolverResult;
use crate::sns::normalize_domain;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

pub const HELIUS_PROVIDER: &str = "helius";

#[derive(Debug, Clone, Deserialize)]
pub struct NameOwnerResult {
    #[serde(default)]
    pub domain: Option<String>,
}

pub struct HeliusClient {
    endpoint: String,
    requester: Arc<Requester>,
    rate_limiter: RateLimiter,
    health_timeout: Duration,
}

impl HeliusClient {
    pub fn new(
        rpc_url: &str,
        api_key: &str,
        requester: Arc<Requester>,
        rate_limiter: RateLimiter,
        health_timeout: Duration,
    ) -> Self {
        Self {
            endpoint: with_api_key(rpc_url, api_key),
            requester,
            rate_limiter,
            health_timeout,
        }
    }
}

/// Append `api-key` to an RPC URL that may already carry a query string
pub fn with_api_key(url: &str, api_key: &str) -> String {
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{}{}api-key={}", url, separator, api_key)
}

#[async_trait]
impl ProviderAdapter for HeliusClient {
    fn key(&self) -> &str {
        HELIUS_PROVIDER
    }

    fn supports(&self, direction: LookupDirection) -> bool {
        direction == LookupDirection::Reverse
    }

    async fn reverse_lookup(&self, address: &str) -> ResolverResult<Option<String>> {
        let body = json_rpc_request("getNameOwner", json!([address]));
        let request = ApiRequest::post_json(self.endpoint.clone(), body);

        let response: Option<JsonRpcResponse<NameOwnerResult>> = self
            .requester
            .call(HELIUS_PROVIDER, &self.rate_limiter, &request)
            .await?;

        let Some(response) = response else {
            return Ok(None);
        };

        Ok(response
            .into_result(HELIUS_PROVIDER)?
            .and_then(|result| result.domain)
            .filter(|domain| !domain.trim().is_empty())
            .map(|domain| normalize_domain(&domain)))
    }

    async fn health_check(&self) -> bool {
        let request = ApiRequest::post_json(self.endpoint.clone(), json_rpc_request("getHealth", json!([])));
        self.requester
            .probe(HELIUS_PROVIDER, &self.rate_limiter, &request, self.health_timeout)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apis::client::{HttpClient, RetryPolicy};
    use crate::apis::stats::StatsTracker;
    use mockito::Matcher;

    fn client(url: &str) -> HeliusClient {
        let requester = Arc::new(Requester::new(
            HttpClient::new(Duration::from_secs(5)).unwrap(),
            RetryPolicy::new(2, Duration::from_millis(1), 0.0),
            Arc::new(StatsTracker::new()),
        ));
        HeliusClient::new(
            url,
            "test-key",
            requester,
            RateLimiter::new(HELIUS_PROVIDER, 100, Duration::from_secs(1)),
            Duration::from_secs(2),
        )
    }

    #[test]
    fn test_api_key_query() {
        assert_eq!(
            with_api_key("https://rpc.helius.xyz/", "k"),
            "https://rpc.helius.xyz/?api-key=k"
        );
        assert_eq!(
            with_api_key("https://rpc.helius.xyz/?cluster=mainnet", "k"),
            "https://rpc.helius.xyz/?cluster=mainnet&api-key=k"
        );
    }

    #[tokio::test]
    async fn test_reverse_lookup_normalizes_domain() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .match_query(Matcher::UrlEncoded("api-key".into(), "test-key".into()))
            .match_body(Matcher::Regex(r#""method"\s*:\s*"getNameOwner""#.to_string()))
            .with_status(200)
            .with_body(r#"{"jsonrpc":"2.0","result":{"domain":"Bonfida"},"id":1}"#)
            .create_async()
            .await;

        let helius = client(&format!("{}/", server.url()));
        let domain = helius.reverse_lookup("Wallet111").await.unwrap();

        assert_eq!(domain, Some("bonfida.sol".to_string()));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_missing_domain_is_a_miss() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"jsonrpc":"2.0","result":{},"id":1}"#)
            .create_async()
            .await;

        let helius = client(&format!("{}/", server.url()));
        assert_eq!(helius.reverse_lookup("Wallet111").await.unwrap(), None);
    }
}

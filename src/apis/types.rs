/// Provider capability trait and the shared lookup vocabulary
use crate::errors::{ResolverError, ResolverResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which way a lookup goes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LookupDirection {
    /// domain -> owner address
    Forward,
    /// address -> primary domain
    Reverse,
}

impl fmt::Display for LookupDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupDirection::Forward => write!(f, "resolve_name"),
            LookupDirection::Reverse => write!(f, "reverse_lookup"),
        }
    }
}

/// A single lookup, already normalized by the resolver
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LookupQuery {
    Name(String),
    Address(String),
}

impl LookupQuery {
    pub fn direction(&self) -> LookupDirection {
        match self {
            LookupQuery::Name(_) => LookupDirection::Forward,
            LookupQuery::Address(_) => LookupDirection::Reverse,
        }
    }

    pub fn value(&self) -> &str {
        match self {
            LookupQuery::Name(value) | LookupQuery::Address(value) => value,
        }
    }
}

/// One external source of name data
///
/// Adapters implement the directions they support; the rest report
/// `Unsupported`. `Ok(None)` is a definitive "no such record".
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Stable key used for stats and logs
    fn key(&self) -> &str;

    fn supports(&self, direction: LookupDirection) -> bool;

    async fn resolve_name(&self, _domain: &str) -> ResolverResult<Option<String>> {
        Err(ResolverError::Unsupported {
            provider: self.key().to_string(),
            operation: "resolve_name",
        })
    }

    async fn reverse_lookup(&self, _address: &str) -> ResolverResult<Option<String>> {
        Err(ResolverError::Unsupported {
            provider: self.key().to_string(),
            operation: "reverse_lookup",
        })
    }

    /// Single lightweight request, `false` on any failure
    async fn health_check(&self) -> bool;

    async fn lookup(&self, query: &LookupQuery) -> ResolverResult<Option<String>> {
        match query {
            LookupQuery::Name(domain) => self.resolve_name(domain).await,
            LookupQuery::Address(address) => self.reverse_lookup(address).await,
        }
    }
}

/// JSON-RPC 2.0 response envelope
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcResponse<T> {
    pub result: Option<T>,
    #[serde(default)]
    pub error: Option<JsonRpcError>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcError {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
}

impl<T> JsonRpcResponse<T> {
    /// An `error` object becomes `InvalidResponse`, a null result a miss
    pub fn into_result(self, provider: &str) -> ResolverResult<Option<T>> {
        if let Some(error) = self.error {
            return Err(ResolverError::InvalidResponse {
                provider: provider.to_string(),
                message: format!("JSON-RPC error {}: {}", error.code, error.message),
            });
        }
        Ok(self.result)
    }
}

/// JSON-RPC 2.0 request body
pub fn json_rpc_request(method: &str, params: serde_json::Value) -> serde_json::Value {
    serde_json::json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": method,
        "params": params,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ForwardOnly;

    #[async_trait]
    impl ProviderAdapter for ForwardOnly {
        fn key(&self) -> &str {
            "forward-only"
        }
        fn supports(&self, direction: LookupDirection) -> bool {
            direction == LookupDirection::Forward
        }
        async fn resolve_name(&self, _domain: &str) -> ResolverResult<Option<String>> {
            Ok(Some("Owner".to_string()))
        }
        async fn health_check(&self) -> bool {
            true
        }
    }

    #[tokio::test]
    async fn test_lookup_dispatches_by_direction() {
        let adapter = ForwardOnly;
        let forward = adapter
            .lookup(&LookupQuery::Name("a.sol".to_string()))
            .await
            .unwrap();
        assert_eq!(forward, Some("Owner".to_string()));

        let reverse = adapter
            .lookup(&LookupQuery::Address("Addr".to_string()))
            .await;
        assert!(matches!(
            reverse,
            Err(ResolverError::Unsupported {
                operation: "reverse_lookup",
                ..
            })
        ));
    }

    #[test]
    fn test_json_rpc_error_object() {
        let response: JsonRpcResponse<String> = serde_json::from_str(
            r#"{"jsonrpc":"2.0","error":{"code":-32602,"message":"bad params"},"id":1}"#,
        )
        .unwrap();
        assert!(matches!(
            response.into_result("helius"),
            Err(ResolverError::InvalidResponse { .. })
        ));

        let empty: JsonRpcResponse<String> =
            serde_json::from_str(r#"{"jsonrpc":"2.0","result":null,"id":1}"#).unwrap();
        assert_eq!(empty.into_result("helius").unwrap(), None);
    }

    #[test]
    fn test_json_rpc_error_without_details() {
        let response: JsonRpcResponse<String> =
            serde_json::from_str(r#"{"jsonrpc":"2.0","error":{},"id":1}"#).unwrap();
        let err = response.into_result("ledger").unwrap_err();
        assert!(matches!(err, ResolverError::InvalidResponse { .. }));

        let bare: JsonRpcResponse<String> = serde_json::from_str(r#"{"id":1}"#).unwrap();
        assert_eq!(bare.into_result("ledger").unwrap(), None);
    }

    #[test]
    fn test_query_direction() {
        assert_eq!(
            LookupQuery::Address("x".to_string()).direction(),
            LookupDirection::Reverse
        );
        assert_eq!(LookupDirection::Forward.to_string(), "resolve_name");
    }
}

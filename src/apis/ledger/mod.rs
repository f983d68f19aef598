/// Direct ledger lookups over Solana JSON-RPC
///
/// Forward resolution only: derive the name account address, fetch the
/// account with `getAccountInfo`, read the owner out of the registry header.
/// Works against any Solana RPC endpoint, the public one or Helius.
pub mod types;

pub use self::types::{AccountInfoResult, AccountValue};

use crate::apis::client::{ApiRequest, Requester};
use crate::apis::rate_limiter::RateLimiter;
use crate::apis::types::{json_rpc_request, JsonRpcResponse, LookupDirection, ProviderAdapter};
use crate::errors::{ResolverError, ResolverResult};
use crate::logger::{self, LogTag};
use crate::sns::{derive_domain_address, RegistryHeader};
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

pub const LEDGER_PROVIDER: &str = "ledger";
pub const HELIUS_RPC_PROVIDER: &str = "helius-rpc";

pub struct LedgerClient {
    key: String,
    rpc_url: String,
    requester: Arc<Requester>,
    rate_limiter: RateLimiter,
    health_timeout: Duration,
}

impl LedgerClient {
    pub fn new(
        key: &str,
        rpc_url: String,
        requester: Arc<Requester>,
        rate_limiter: RateLimiter,
        health_timeout: Duration,
    ) -> Self {
        Self {
            key: key.to_string(),
            rpc_url,
            requester,
            rate_limiter,
            health_timeout,
        }
    }

    /// Fetch one account, `None` when the ledger has no such account
    pub async fn get_account_info(&self, address: &str) -> ResolverResult<Option<AccountValue>> {
        let body = json_rpc_request("getAccountInfo", json!([address, {"encoding": "base64"}]));
        let request = ApiRequest::post_json(self.rpc_url.clone(), body);

        let response: Option<JsonRpcResponse<AccountInfoResult>> = self
            .requester
            .call(&self.key, &self.rate_limiter, &request)
            .await?;

        let Some(response) = response else {
            return Ok(None);
        };

        Ok(response
            .into_result(&self.key)?
            .and_then(|result| result.value))
    }
}

#[async_trait]
impl ProviderAdapter for LedgerClient {
    fn key(&self) -> &str {
        &self.key
    }

    fn supports(&self, direction: LookupDirection) -> bool {
        direction == LookupDirection::Forward
    }

    async fn resolve_name(&self, domain: &str) -> ResolverResult<Option<String>> {
        let address = derive_domain_address(domain)?;

        let Some(account) = self.get_account_info(&address.to_string()).await? else {
            logger::debug(
                LogTag::Sns,
                &format!("{}: no name account for {} ({})", self.key, domain, address),
            );
            return Ok(None);
        };

        if account.payload().is_none() {
            logger::debug(
                LogTag::Sns,
                &format!("{}: empty name account for {} ({})", self.key, domain, address),
            );
            return Ok(None);
        }

        let data = account
            .decode_data()
            .ok_or_else(|| ResolverError::InvalidResponse {
                provider: self.key.clone(),
                message: format!("undecodable account data for {}", address),
            })?;

        let header = RegistryHeader::parse(&self.key, &data)?;

        Ok(header.active_owner().map(|owner| owner.to_string()))
    }

    async fn health_check(&self) -> bool {
        let request = ApiRequest::post_json(self.rpc_url.clone(), json_rpc_request("getHealth", json!([])));
        self.requester
            .probe(&self.key, &self.rate_limiter, &request, self.health_timeout)
            .await
    }
}

/// Configuration schemas - resolver settings defined once with defaults
use crate::config_struct;
use crate::errors::{ResolverError, ResolverResult};
use std::time::Duration;

/// Longest accepted rate-limit refill period
const MAX_RATE_LIMIT_PERIOD_SECS: f64 = 86_400.0;

// ============================================================================
// RATE LIMIT CONFIGURATION
// ============================================================================

config_struct! {
    /// Token bucket applied to every provider (each provider owns its own bucket)
    pub struct RateLimitConfig {
        /// Burst size, also the number of calls allowed per period
        capacity: u32 = 5,

        /// Refill period in seconds
        period_secs: f64 = 1.0,
    }
}

// ============================================================================
// PROVIDER ENDPOINTS
// ============================================================================

config_struct! {
    /// Base URLs for every provider, overridable for staging and tests
    pub struct EndpointsConfig {
        /// Public Solana JSON-RPC endpoint used for direct ledger lookups
        solana_rpc_url: String = "https://api.mainnet-beta.solana.com".to_string(),

        /// Helius RPC, the API key is appended as `?api-key=`
        helius_rpc_url: String = "https://rpc.helius.xyz/".to_string(),

        shyft_base_url: String = "https://api.shyft.to".to_string(),

        solanafm_base_url: String = "https://api.solana.fm".to_string(),
    }
}

// ============================================================================
// RESOLVER CONFIGURATION
// ============================================================================

config_struct! {
    /// Top-level resolver configuration
    pub struct ResolverConfig {
        // Provider credentials and toggles
        helius_api_key: Option<String> = None,
        shyft_api_key: Option<String> = None,
        solanafm_enabled: bool = true,
        ledger_enabled: bool = true,

        /// SQLite file for the durable cache tier. None or a blank path keeps the
        /// cache in-process only (TOML cannot express None, use "")
        sqlite_cache_path: Option<String> = Some("sns_cache.db".to_string()),

        /// Race providers in parallel (true) or try them in priority order (false)
        parallel_fallbacks: bool = true,

        // Cache lifetimes
        cache_ttl_secs: u64 = 3600,
        negative_cache_ttl_secs: u64 = 3600,
        memory_cache_capacity: usize = 10_000,
        cache_key_max_len: usize = 128,

        // HTTP behavior
        request_timeout_secs: u64 = 15,
        health_check_timeout_secs: u64 = 5,
        max_retries: u32 = 3,
        retry_base_delay_ms: u64 = 500,

        /// Fraction of each backoff delay added as random jitter (0.0 disables)
        retry_jitter_ratio: f64 = 0.0,

        /// Serialize concurrent identical lookups behind one provider round
        dedupe_inflight: bool = true,

        /// Default concurrency bound for batch operations
        batch_concurrency: usize = 10,

        rate_limit: RateLimitConfig = RateLimitConfig::default(),
        endpoints: EndpointsConfig = EndpointsConfig::default(),
    }
}

impl ResolverConfig {
    /// Reject values that would stall or disable the engine
    pub fn validate(&self) -> ResolverResult<()> {
        if self.rate_limit.capacity == 0 {
            return Err(invalid("rate_limit.capacity", "must be at least 1"));
        }
        self.rate_limit_period()?;
        if self.max_retries == 0 {
            return Err(invalid("max_retries", "must be at least 1"));
        }
        if self.batch_concurrency == 0 {
            return Err(invalid("batch_concurrency", "must be at least 1"));
        }
        if self.memory_cache_capacity == 0 {
            return Err(invalid("memory_cache_capacity", "must be at least 1"));
        }
        if !(0.0..=1.0).contains(&self.retry_jitter_ratio) {
            return Err(invalid("retry_jitter_ratio", "must be within 0.0..=1.0"));
        }
        if self.cache_key_max_len < 16 {
            return Err(invalid("cache_key_max_len", "must be at least 16"));
        }
        Ok(())
    }

    /// Refill period of every provider bucket: positive, finite, at most a day
    pub fn rate_limit_period(&self) -> ResolverResult<Duration> {
        let secs = self.rate_limit.period_secs;
        if !(secs > 0.0 && secs <= MAX_RATE_LIMIT_PERIOD_SECS) {
            return Err(invalid(
                "rate_limit.period_secs",
                "must be positive and at most 86400 seconds",
            ));
        }
        Duration::try_from_secs_f64(secs)
            .map_err(|e| invalid("rate_limit.period_secs", &e.to_string()))
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn negative_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.negative_cache_ttl_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn health_check_timeout(&self) -> Duration {
        Duration::from_secs(self.health_check_timeout_secs)
    }

    pub fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.retry_base_delay_ms)
    }

    /// An API key counts only when it is non-blank
    pub fn helius_key(&self) -> Option<&str> {
        non_blank(&self.helius_api_key)
    }

    pub fn shyft_key(&self) -> Option<&str> {
        non_blank(&self.shyft_api_key)
    }

    pub fn sqlite_path(&self) -> Option<&str> {
        non_blank(&self.sqlite_cache_path)
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

fn invalid(field: &str, reason: &str) -> ResolverError {
    ResolverError::Config(format!("Invalid config field '{}': {}", field, reason))
}

//! Outbound provider APIs
//!
//! - `client` - HTTP client and the retrying Requester
//! - `rate_limiter` - per-provider token bucket
//! - `stats` - per-provider call counters
//! - `types` - ProviderAdapter capability trait and lookup vocabulary
//! - `manager` - builds the provider set from configuration
//! - one module per provider: `ledger`, `helius`, `shyft`, `solanafm`

pub mod client;
pub mod helius;
pub mod ledger;
pub mod manager;
pub mod rate_limiter;
pub mod shyft;
pub mod solanafm;
pub mod stats;
pub mod types;

pub use client::{ApiRequest, HttpClient, Requester, RetryPolicy};
pub use manager::ProviderSet;
pub use rate_limiter::RateLimiter;
pub use stats::{ProviderStats, StatsTracker};
pub use types::{LookupDirection, LookupQuery, ProviderAdapter};

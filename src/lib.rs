//! Multi-provider Solana Name Service resolver
//!
//! Forward (domain -> owner) and reverse (address -> domain) lookups raced
//! across several providers, each behind its own rate limiter, with bounded
//! retries and a two-tier (in-process + SQLite) cache.
//!
//! ```rust,ignore
//! use sns_resolver::{ResolverConfig, SnsResolver};
//!
//! let resolver = SnsResolver::new(ResolverConfig::default()).await?;
//! let owner = resolver.resolve_name("bonfida").await?;
//! resolver.close().await;
//! ```

pub mod apis;
pub mod cache;
pub mod config;
pub mod errors; // Crate error taxonomy
pub mod logger;
pub mod resolver;
pub mod sns;

pub use config::ResolverConfig;
pub use errors::{ResolverError, ResolverResult};
pub use resolver::SnsResolver;

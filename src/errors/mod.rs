/// Error taxonomy for name resolution
///
/// "Not found" is never an error here: providers and the ledger report absence
/// as `Ok(None)`, which is a terminal answer that gets negatively cached.
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResolverError {
    /// Network failure, 5xx, 429 or any unexpected status. Retried with backoff.
    #[error("Transient failure from {provider}: {message}")]
    Transient { provider: String, message: String },

    /// Retry budget consumed. The provider lost the race for this lookup.
    #[error("{provider} failed after {attempts} attempts: {last_error}")]
    Exhausted {
        provider: String,
        attempts: u32,
        last_error: String,
    },

    /// A 2xx body that decoded but carried a provider-level error object or
    /// account data that cannot be read
    #[error("Invalid response from {provider}: {message}")]
    InvalidResponse { provider: String, message: String },

    /// Durable cache store unreachable. Logged and degraded, never returned by lookups.
    #[error("Cache unavailable: {0}")]
    CacheUnavailable(String),

    /// Malformed domain handed to the address deriver
    #[error("Cannot derive address: {0}")]
    Derivation(String),

    #[error("Invalid account address: {0}")]
    InvalidAddress(String),

    #[error("{provider} does not support {operation}")]
    Unsupported {
        provider: String,
        operation: &'static str,
    },

    #[error("HTTP client error: {0}")]
    Http(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ResolverError {
    pub fn transient(provider: &str, message: impl Into<String>) -> Self {
        ResolverError::Transient {
            provider: provider.to_string(),
            message: message.into(),
        }
    }

    /// Whether another attempt against the same provider could succeed
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ResolverError::Transient { .. })
    }
}

impl From<rusqlite::Error> for ResolverError {
    fn from(err: rusqlite::Error) -> Self {
        ResolverError::CacheUnavailable(err.to_string())
    }
}

impl From<r2d2::Error> for ResolverError {
    fn from(err: r2d2::Error) -> Self {
        ResolverError::CacheUnavailable(err.to_string())
    }
}

pub type ResolverResult<T> = std::result::Result<T, ResolverError>;

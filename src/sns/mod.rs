//! Solana Name Service primitives
//!
//! Domain normalization, label parsing and the deterministic derivation of a
//! name's account address. Everything here is pure.

pub mod constants;
pub mod derivation;
pub mod domain;
pub mod registry;

pub use derivation::{derive_address, derive_domain_address};
pub use domain::{normalize_domain, DomainName};
pub use registry::RegistryHeader;

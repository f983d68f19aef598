//! Resolver configuration
//!
//! - `schemas` - configuration structs with embedded defaults
//! - `utils` - TOML loading and validation
//! - `macros` - the `config_struct!` declaration macro

pub mod macros;
pub mod schemas;
pub mod utils;

pub use schemas::{EndpointsConfig, RateLimitConfig, ResolverConfig};
pub use utils::{load_config_from_path, parse_config};

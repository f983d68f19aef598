//! Structured, tag-based logging for the resolver
//!
//! ```rust,ignore
//! use sns_resolver::logger::{self, LogTag};
//!
//! logger::warning(LogTag::Cache, "SQLite cache unavailable, using memory only");
//! logger::debug(LogTag::Api, "helius attempt 2/3 failed"); // Only with --debug-api
//! logger::verbose(LogTag::Sns, "derived 7x..."); // Only with --verbose
//! ```
//!
//! `init()` scans the process arguments for `--debug-<tag>`, `--verbose` and
//! `--quiet`. Embedders that own their argument parsing call
//! `set_logger_config` instead.

mod config;
mod core;
mod format;
mod levels;
mod tags;

pub use config::{get_logger_config, init_from_args, set_logger_config, LoggerConfig};
pub use levels::LogLevel;
pub use tags::LogTag;

/// Initialize logger filtering from command-line arguments
pub fn init() {
    config::init_from_args();
}

/// Log at ERROR level (always shown)
pub fn error(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Error, message);
}

/// Log at WARNING level
pub fn warning(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Warning, message);
}

/// Log at INFO level
pub fn info(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Info, message);
}

/// Log at DEBUG level, only shown when debug is enabled for `tag`
pub fn debug(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Debug, message);
}

/// Log at VERBOSE level, only shown with --verbose or --verbose-<tag>
pub fn verbose(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Verbose, message);
}

/// Configuration loading helpers
///
/// Configuration is loaded into a value and handed to the resolver; there is
/// no global instance, so several resolvers with different settings can
/// coexist in one process.
use super::schemas::{EndpointsConfig, RateLimitConfig, ResolverConfig};
use crate::errors::{ResolverError, ResolverResult};
use crate::logger::{self, LogTag};
use std::path::Path;

/// Load configuration from a TOML file
///
/// A missing file yields the defaults (with a warning) so a fresh checkout
/// works without any setup.
pub fn load_config_from_path(path: impl AsRef<Path>) -> ResolverResult<ResolverConfig> {
    let path = path.as_ref();

    if !path.exists() {
        logger::warning(
            LogTag::Config,
            &format!(
                "Config file '{}' not found, using default values",
                path.display()
            ),
        );
        return Ok(ResolverConfig::default());
    }

    let contents = std::fs::read_to_string(path).map_err(|e| {
        ResolverError::Config(format!(
            "Failed to read config file '{}': {}",
            path.display(),
            e
        ))
    })?;

    parse_config(&contents).map_err(|e| match e {
        ResolverError::Config(msg) => {
            ResolverError::Config(format!("{} ({})", msg, path.display()))
        }
        other => other,
    })
}

/// Parse and validate configuration from a TOML string
///
/// Unknown keys are ignored with a warning, so a typo never silently turns
/// into a default.
pub fn parse_config(contents: &str) -> ResolverResult<ResolverConfig> {
    let table = toml::from_str::<toml::Table>(contents)
        .map_err(|e| ResolverError::Config(format!("Failed to parse config: {}", e)))?;

    for key in unknown_keys(&table) {
        logger::warning(
            LogTag::Config,
            &format!("Ignoring unknown config key '{}'", key),
        );
    }

    let config = toml::Value::Table(table)
        .try_into::<ResolverConfig>()
        .map_err(|e| ResolverError::Config(format!("Failed to parse config: {}", e)))?;
    config.validate()?;
    Ok(config)
}

/// Dotted paths of keys no config struct declares
pub fn unknown_keys(table: &toml::Table) -> Vec<String> {
    let mut unknown = Vec::new();

    for (key, value) in table {
        let nested: Option<&[&str]> = match key.as_str() {
            "rate_limit" => Some(RateLimitConfig::FIELDS),
            "endpoints" => Some(EndpointsConfig::FIELDS),
            _ => None,
        };

        if !ResolverConfig::FIELDS.contains(&key.as_str()) {
            unknown.push(key.clone());
            continue;
        }

        if let (Some(fields), Some(section)) = (nested, value.as_table()) {
            for inner in section.keys() {
                if !fields.contains(&inner.as_str()) {
                    unknown.push(format!("{}.{}", key, inner));
                }
            }
        }
    }

    unknown.sort();
    unknown
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_partial_config() {
        let config = parse_config(
            r#"
            shyft_api_key = "key"
            parallel_fallbacks = false
            cache_ttl_secs = 60

            [rate_limit]
            capacity = 10
            "#,
        )
        .unwrap();

        assert_eq!(config.shyft_key(), Some("key"));
        assert!(!config.parallel_fallbacks);
        assert_eq!(config.cache_ttl_secs, 60);
        assert_eq!(config.rate_limit.capacity, 10);
        // untouched fields keep their defaults
        assert_eq!(config.rate_limit.period_secs, 1.0);
        assert_eq!(config.max_retries, 3);
    }

    #[test]
    fn test_parse_rejects_invalid_values() {
        let result = parse_config("batch_concurrency = 0");
        assert!(matches!(result, Err(ResolverError::Config(_))));
    }

    #[test]
    fn test_unknown_keys_are_reported() {
        let table: toml::Table = toml::from_str(
            r#"
            cache_ttl = 60
            max_retries = 2

            [rate_limit]
            capacity = 3
            burst = 9
            "#,
        )
        .unwrap();

        assert_eq!(
            unknown_keys(&table),
            vec!["cache_ttl".to_string(), "rate_limit.burst".to_string()]
        );
    }

    #[test]
    fn test_field_lists_follow_declarations() {
        assert!(ResolverConfig::FIELDS.contains(&"negative_cache_ttl_secs"));
        assert_eq!(RateLimitConfig::FIELDS, &["capacity", "period_secs"]);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = load_config_from_path("/definitely/not/here/resolver.toml").unwrap();
        assert_eq!(config, ResolverConfig::default());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "sqlite_cache_path = \"/tmp/sns.db\"").unwrap();
        writeln!(file, "max_retries = 5").unwrap();

        let config = load_config_from_path(file.path()).unwrap();
        assert_eq!(config.sqlite_cache_path.as_deref(), Some("/tmp/sns.db"));
        assert_eq!(config.max_retries, 5);
    }
}

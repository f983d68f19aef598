/// Domain normalization and label parsing
use super::constants::{MAX_LABEL_LEN, SOL_SUFFIX};
use crate::errors::{ResolverError, ResolverResult};

/// Canonical form of a domain: trimmed, lower-cased, `.sol` appended if absent
///
/// Idempotent: `normalize_domain(normalize_domain(x)) == normalize_domain(x)`.
pub fn normalize_domain(domain: &str) -> String {
    let lowered = domain.trim().to_lowercase();
    if lowered.ends_with(SOL_SUFFIX) {
        lowered
    } else {
        format!("{}{}", lowered, SOL_SUFFIX)
    }
}

/// A normalized, validated domain name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DomainName {
    normalized: String,
}

impl DomainName {
    /// Normalize `input` and check every label is usable for derivation
    pub fn parse(input: &str) -> ResolverResult<Self> {
        let normalized = normalize_domain(input);
        let name = normalized
            .strip_suffix(SOL_SUFFIX)
            .unwrap_or(normalized.as_str());

        if name.is_empty() {
            return Err(ResolverError::Derivation(format!(
                "'{}' has no name before the suffix",
                input.trim()
            )));
        }

        for label in name.split('.') {
            validate_label(label, &normalized)?;
        }

        Ok(Self { normalized })
    }

    pub fn as_str(&self) -> &str {
        &self.normalized
    }

    /// Labels ordered root first (`sub.name.sol` yields `name`, then `sub`)
    pub fn labels_root_first(&self) -> impl Iterator<Item = &str> {
        self.normalized
            .strip_suffix(SOL_SUFFIX)
            .unwrap_or(self.normalized.as_str())
            .rsplit('.')
    }

    pub fn is_subdomain(&self) -> bool {
        self.labels_root_first().count() > 1
    }
}

impl std::fmt::Display for DomainName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.normalized)
    }
}

fn validate_label(label: &str, domain: &str) -> ResolverResult<()> {
    if label.is_empty() {
        return Err(ResolverError::Derivation(format!(
            "'{}' contains an empty label",
            domain
        )));
    }
    if label.len() > MAX_LABEL_LEN {
        return Err(ResolverError::Derivation(format!(
            "label of {} bytes in '{}' exceeds {} bytes",
            label.len(),
            domain,
            MAX_LABEL_LEN
        )));
    }
    if label
        .chars()
        .any(|c| c.is_whitespace() || c.is_control() || c == '/' || c == '\\')
    {
        return Err(ResolverError::Derivation(format!(
            "label '{}' contains whitespace, control or path characters",
            label.escape_default()
        )));
    }
    Ok(())
}

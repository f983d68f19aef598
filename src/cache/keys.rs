/// Namespaced cache keys
///
/// Keys look like `name:<domain>` or `addr:<address>`. A key longer than the
/// configured limit is collapsed to `<namespace>#<sha256-hex>`; `#` never
/// follows the namespace in a literal key, so collapsed and literal keys
/// cannot collide.
use sha2::{Digest, Sha256};

pub const NAME_NAMESPACE: &str = "name";
pub const ADDR_NAMESPACE: &str = "addr";

/// Key for a forward lookup (domain -> address)
pub fn name_key(domain: &str, max_len: usize) -> String {
    bounded_key(NAME_NAMESPACE, domain, max_len)
}

/// Key for a reverse lookup (address -> domain)
pub fn addr_key(address: &str, max_len: usize) -> String {
    bounded_key(ADDR_NAMESPACE, address, max_len)
}

pub fn bounded_key(namespace: &str, identifier: &str, max_len: usize) -> String {
    let key = format!("{}:{}", namespace, identifier);
    if key.len() <= max_len {
        return key;
    }

    let digest = Sha256::digest(identifier.as_bytes());
    format!("{}#{:x}", namespace, digest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_keys_are_literal() {
        assert_eq!(name_key("bonfida.sol", 128), "name:bonfida.sol");
        assert_eq!(
            addr_key("HKKp49qGWXd639QsuH7JiLijfVW5UtCVY4s1n2HANwEA", 128),
            "addr:HKKp49qGWXd639QsuH7JiLijfVW5UtCVY4s1n2HANwEA"
        );
    }

    #[test]
    fn test_long_keys_are_hashed_deterministically() {
        let domain = format!("{}.sol", "a".repeat(300));
        let first = name_key(&domain, 128);
        let second = name_key(&domain, 128);

        assert_eq!(first, second);
        assert!(first.starts_with("name#"));
        // namespace + '#' + 64 hex chars
        assert_eq!(first.len(), "name#".len() + 64);
    }

    #[test]
    fn test_hashed_keys_differ_by_input_and_namespace() {
        let a = format!("{}.sol", "a".repeat(300));
        let b = format!("{}.sol", "b".repeat(300));
        assert_ne!(name_key(&a, 64), name_key(&b, 64));
        assert_ne!(name_key(&a, 64), addr_key(&a, 64));
    }
}

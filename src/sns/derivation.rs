/// Deterministic name-account address derivation
///
/// Walks the labels root first. Each step hashes the label (SHA-256 over
/// `HASH_PREFIX + label`, subdomain labels carry a leading NUL), then derives
/// a program address from `[hashed_label, NAME_CLASS, parent]` under the name
/// program. The result becomes the next parent. Pure: no I/O, no randomness.
use super::constants::{
    HASH_PREFIX, NAME_CLASS, NAME_PROGRAM_ID, ROOT_DOMAIN_ACCOUNT, SUBDOMAIN_PREFIX,
};
use super::domain::DomainName;
use crate::errors::ResolverResult;
use sha2::{Digest, Sha256};
use solana_sdk::pubkey::Pubkey;

/// SHA-256 of the prefixed label
pub fn hash_label(label: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(HASH_PREFIX.as_bytes());
    hasher.update(label.as_bytes());
    hasher.finalize().into()
}

/// Address of the name account for `label` under `parent`
pub fn derive_child(hashed_label: &[u8; 32], parent: &Pubkey) -> Pubkey {
    let (address, _bump) = Pubkey::find_program_address(
        &[hashed_label.as_ref(), NAME_CLASS.as_ref(), parent.as_ref()],
        &NAME_PROGRAM_ID,
    );
    address
}

/// Derive the account address of an already-parsed domain
pub fn derive_address(domain: &DomainName) -> Pubkey {
    let mut parent = ROOT_DOMAIN_ACCOUNT;

    for (depth, label) in domain.labels_root_first().enumerate() {
        let hashed = if depth == 0 {
            hash_label(label)
        } else {
            hash_label(&format!("{}{}", SUBDOMAIN_PREFIX, label))
        };
        parent = derive_child(&hashed, &parent);
    }

    parent
}

/// Parse `domain` and derive its account address
pub fn derive_domain_address(domain: &str) -> ResolverResult<Pubkey> {
    let parsed = DomainName::parse(domain)?;
    Ok(derive_address(&parsed))
}

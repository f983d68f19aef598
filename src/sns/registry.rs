/// Name registry account header
use super::constants::{
    REGISTRY_CLASS_OFFSET, REGISTRY_HEADER_LEN, REGISTRY_OWNER_OFFSET, REGISTRY_PARENT_OFFSET,
};
use crate::errors::{ResolverError, ResolverResult};
use solana_sdk::pubkey::Pubkey;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryHeader {
    pub parent: Pubkey,
    pub owner: Pubkey,
    pub class: Pubkey,
}

impl RegistryHeader {
    /// Decode the header of account data fetched from `provider`
    pub fn parse(provider: &str, data: &[u8]) -> ResolverResult<Self> {
        if data.len() < REGISTRY_HEADER_LEN {
            return Err(ResolverError::InvalidResponse {
                provider: provider.to_string(),
                message: format!(
                    "name account data is {} bytes, header needs {}",
                    data.len(),
                    REGISTRY_HEADER_LEN
                ),
            });
        }

        Ok(Self {
            parent: read_pubkey(data, REGISTRY_PARENT_OFFSET),
            owner: read_pubkey(data, REGISTRY_OWNER_OFFSET),
            class: read_pubkey(data, REGISTRY_CLASS_OFFSET),
        })
    }

    /// Owner, or `None` for a zeroed (unowned) record
    pub fn active_owner(&self) -> Option<Pubkey> {
        if self.owner == Pubkey::default() {
            None
        } else {
            Some(self.owner)
        }
    }
}

fn read_pubkey(data: &[u8], offset: usize) -> Pubkey {
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&data[offset..offset + 32]);
    Pubkey::new_from_array(bytes)
}

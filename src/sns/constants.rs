/// Solana Name Service constants
use solana_sdk::pubkey::Pubkey;
use solana_sdk::pubkey;

/// Canonical top-level suffix
pub const SOL_SUFFIX: &str = ".sol";

/// SPL Name Service program that owns every name account
pub const NAME_PROGRAM_ID: Pubkey = pubkey!("namesLPneVptA9Z5rqUDD9tMTWEJwofgaYwp8cawRkX");

/// `.sol` TLD account, the parent of every second-level name
pub const ROOT_DOMAIN_ACCOUNT: Pubkey = pubkey!("58PwtjSDuFHuUkYjH9BYnnQKHfwo9reZhC2zMJv9JPkx");

/// Prepended to every label before hashing
pub const HASH_PREFIX: &str = "SPL Name Service";

/// Subdomain labels are hashed with a leading NUL byte
pub const SUBDOMAIN_PREFIX: char = '\0';

/// Name class used for every public name (all zeros)
pub const NAME_CLASS: [u8; 32] = [0u8; 32];

// ============================================================================
// NAME REGISTRY ACCOUNT LAYOUT (96-byte header, then user data)
// ============================================================================

pub const REGISTRY_PARENT_OFFSET: usize = 0;
pub const REGISTRY_OWNER_OFFSET: usize = 32;
pub const REGISTRY_CLASS_OFFSET: usize = 64;
pub const REGISTRY_HEADER_LEN: usize = 96;

/// Longest accepted label in bytes
pub const MAX_LABEL_LEN: usize = 255;

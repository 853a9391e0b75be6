//! System-wide constants for the fairdrop distribution engine.

/// Denominator for every vested fraction and vote factor (basis points).
pub const FRACTION_DENOMINATOR: u16 = 10_000;

/// [`FRACTION_DENOMINATOR`] widened for amount arithmetic.
pub const FRACTION_DENOMINATOR_U128: u128 = FRACTION_DENOMINATOR as u128;

/// Latest schedule time accepted (2100-01-01T00:00:00Z in epoch seconds).
///
/// Anything beyond this was almost certainly given in milliseconds.
pub const MAX_VESTING_TIME: u64 = 4_102_444_800;

/// Default vote factor: one vote per unclaimed token.
pub const DEFAULT_VOTE_FACTOR: u128 = 10_000;

/// Grace period after an L2 sequencer comes back up before prices are trusted.
pub const DEFAULT_SEQUENCER_GRACE_PERIOD_SECS: u64 = 3_600;

/// Uptime feed answer meaning "sequencer is up".
pub const SEQUENCER_UP: i128 = 0;

/// Byte length of an [`Address`](crate::Address).
pub const ADDRESS_LEN: usize = 20;

/// Leaf hash prefix (distinguishes leaves from interior nodes).
pub const MERKLE_LEAF_PREFIX: &[u8] = &[0];

/// Interior node hash prefix.
pub const MERKLE_NODE_PREFIX: &[u8] = &[1];

/// Maximum number of sibling hashes accepted in one proof.
pub const MAX_PROOF_DEPTH: usize = 32;

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "fairdrop";

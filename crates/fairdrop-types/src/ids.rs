//! Identifiers used throughout fairdrop.
//!
//! Accounts are 20-byte [`Address`]es derived from ed25519 verifying keys.
//! Bridge transfers carry a [`TransferId`] that every domain derives
//! identically from the sending domain and its nonce.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::constants::ADDRESS_LEN;
use crate::error::FairdropError;

/// 32-byte hash (Merkle roots, leaves, proof siblings, seeds).
pub type Hash32 = [u8; 32];

// ---------------------------------------------------------------------------
// Address
// ---------------------------------------------------------------------------

/// Account address. Serialized as a `0x`-prefixed hex string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Default)]
pub struct Address(pub [u8; ADDRESS_LEN]);

impl Address {
    /// The all-zero address. Used as "no delegate".
    pub const ZERO: Self = Self([0u8; ADDRESS_LEN]);

    /// Derive the address controlled by an ed25519 verifying key:
    /// the last 20 bytes of `sha256(pubkey)`.
    #[must_use]
    pub fn from_verifying_key(key: &ed25519_dalek::VerifyingKey) -> Self {
        let hash = Sha256::digest(key.as_bytes());
        let mut out = [0u8; ADDRESS_LEN];
        out.copy_from_slice(&hash[32 - ADDRESS_LEN..]);
        Self(out)
    }

    /// Address whose low 8 bytes hold `n` big-endian. Handy for fixtures.
    #[must_use]
    pub fn from_low_u64(n: u64) -> Self {
        let mut out = [0u8; ADDRESS_LEN];
        out[ADDRESS_LEN - 8..].copy_from_slice(&n.to_be_bytes());
        Self(out)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; ADDRESS_LEN]
    }

    /// Bytewise XOR of two addresses.
    #[must_use]
    pub fn xor(&self, other: &Self) -> Self {
        let mut out = [0u8; ADDRESS_LEN];
        for (i, byte) in out.iter_mut().enumerate() {
            *byte = self.0[i] ^ other.0[i];
        }
        Self(out)
    }

    /// A random address.
    #[cfg(any(test, feature = "test-helpers"))]
    #[must_use]
    pub fn random() -> Self {
        use rand::RngCore;
        let mut out = [0u8; ADDRESS_LEN];
        rand::thread_rng().fill_bytes(&mut out);
        Self(out)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for Address {
    type Err = FairdropError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let stripped = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(stripped)
            .map_err(|e| FairdropError::Serialization(format!("bad address {s}: {e}")))?;
        let arr: [u8; ADDRESS_LEN] = bytes.try_into().map_err(|_| {
            FairdropError::Serialization(format!("address {s} is not {ADDRESS_LEN} bytes"))
        })?;
        Ok(Self(arr))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Domain
// ---------------------------------------------------------------------------

/// Numeric identifier of a chain/domain reachable through the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct Domain(pub u32);

impl Domain {
    /// Big-endian encoding, as hashed into domain-bound Merkle leaves.
    #[must_use]
    pub fn to_be_bytes(self) -> [u8; 4] {
        self.0.to_be_bytes()
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "domain:{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// TransferId
// ---------------------------------------------------------------------------

/// Identifier of one bridge transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct TransferId(pub Uuid);

impl TransferId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Deterministic `TransferId` from the origin domain and its send nonce.
    ///
    /// Sender and receiver derive the same id, which is what receivers
    /// deduplicate on.
    #[must_use]
    pub fn deterministic(origin: Domain, nonce: u64) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(b"fairdrop:transfer_id:v1:");
        hasher.update(origin.to_be_bytes());
        hasher.update(nonce.to_le_bytes());
        let hash = hasher.finalize();
        let mut bytes = [0u8; 16];
        bytes.copy_from_slice(&hash[..16]);
        Self(Uuid::from_bytes(bytes))
    }
}

impl Default for TransferId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TransferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "xfer:{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! Fair-queue release gate.
//!
//! Each address waits a pseudo-random delay after the distributor is
//! created before it may claim:
//! ```text
//! delay(addr) = (addr XOR seed) * max_delay / (2^160 - 1)
//! ```
//! The seed is fixed at creation, so the order cannot be front-run by
//! watching the funding transaction. The seed address itself waits 0 and
//! its bitwise complement waits `max_delay`.

use fairdrop_types::{Address, FairdropError, Result};
use ruint::aliases::U256;
use sha2::{Digest, Sha256};

/// Deterministic per-address claim delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FairQueue {
    seed: Address,
    max_delay: u64,
    created_at: u64,
}

impl FairQueue {
    /// # Errors
    /// `InvalidSeed` for the zero seed.
    pub fn new(seed: Address, max_delay: u64, created_at: u64) -> Result<Self> {
        if seed.is_zero() {
            return Err(FairdropError::InvalidSeed);
        }
        Ok(Self {
            seed,
            max_delay,
            created_at,
        })
    }

    /// Seed derived from creation-time entropy. Never zero.
    #[must_use]
    pub fn derive_seed(entropy: &[u8]) -> Address {
        let mut hasher = Sha256::new();
        hasher.update(b"fairdrop:fair_queue:v1:");
        hasher.update(entropy);
        let hash = hasher.finalize();
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&hash[12..]);
        let mut seed = Address(bytes);
        if seed.is_zero() {
            seed.0[19] = 1;
        }
        seed
    }

    #[must_use]
    pub fn seed(&self) -> Address {
        self.seed
    }

    #[must_use]
    pub fn max_delay(&self) -> u64 {
        self.max_delay
    }

    #[must_use]
    pub fn created_at(&self) -> u64 {
        self.created_at
    }

    /// Seconds `addr` must wait after creation. Always in `[0, max_delay]`.
    #[must_use]
    pub fn delay(&self, addr: &Address) -> u64 {
        if self.max_delay == 0 {
            return 0;
        }
        let distance = U256::from_be_slice(addr.xor(&self.seed).as_bytes());
        let max_distance = U256::MAX >> 96usize;
        let scaled = distance * U256::from(self.max_delay) / max_distance;
        // distance <= max_distance, so scaled <= max_delay fits one limb.
        let delay = scaled.as_limbs()[0];
        tracing::debug!(addr = %addr, delay, "fair delay");
        delay
    }

    /// Earliest time `addr` may claim.
    #[must_use]
    pub fn ready_at(&self, addr: &Address) -> u64 {
        self.created_at.saturating_add(self.delay(addr))
    }

    /// # Errors
    /// `NoMoreTokensClaimable` until `now >= created_at + delay(addr)`.
    pub fn check_ready(&self, addr: &Address, now: u64) -> Result<()> {
        if now < self.ready_at(addr) {
            return Err(FairdropError::NoMoreTokensClaimable { beneficiary: *addr });
        }
        Ok(())
    }
}

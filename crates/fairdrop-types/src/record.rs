//! Per-beneficiary distribution record.

use serde::{Deserialize, Serialize};

use crate::Address;

/// Ledger entry tracking one beneficiary's entitlement and claims.
///
/// `claimed <= total` holds after every committed operation. `total` is set
/// once at initialization and afterwards moved only by signed adjustments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionRecord {
    pub beneficiary: Address,
    pub total: u128,
    pub claimed: u128,
    pub initialized: bool,
}

impl DistributionRecord {
    /// Record for an address the ledger has never seen.
    #[must_use]
    pub fn empty(beneficiary: Address) -> Self {
        Self {
            beneficiary,
            total: 0,
            claimed: 0,
            initialized: false,
        }
    }

    /// Freshly initialized record with nothing claimed.
    #[must_use]
    pub fn initialized(beneficiary: Address, total: u128) -> Self {
        Self {
            beneficiary,
            total,
            claimed: 0,
            initialized: true,
        }
    }

    /// Tokens not yet claimed. Drives voting weight.
    #[must_use]
    pub fn unclaimed(&self) -> u128 {
        self.total.saturating_sub(self.claimed)
    }
}

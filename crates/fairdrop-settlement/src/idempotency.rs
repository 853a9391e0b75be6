//! Inbound transfer idempotency guard.
//!
//! Bridges deliver at least once. Each [`TransferId`] may be applied on a
//! domain exactly once; a second attempt returns
//! [`FairdropError::TransferAlreadyApplied`].
//!
//! The set is never evicted. Forgetting an id would let a late
//! redelivery apply twice.

use std::collections::HashSet;

use fairdrop_types::{FairdropError, Result, TransferId};

/// Set of transfer ids already applied on this domain.
#[derive(Debug, Default)]
pub struct AppliedTransfers {
    applied: HashSet<TransferId>,
}

impl AppliedTransfers {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check-and-set.
    ///
    /// # Errors
    /// `TransferAlreadyApplied` if `id` was seen before.
    pub fn mark_applied(&mut self, id: TransferId) -> Result<()> {
        if !self.applied.insert(id) {
            return Err(FairdropError::TransferAlreadyApplied(id));
        }
        Ok(())
    }

    #[must_use]
    pub fn is_applied(&self, id: &TransferId) -> bool {
        self.applied.contains(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.applied.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.applied.is_empty()
    }
}

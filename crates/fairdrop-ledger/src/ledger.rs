//! Per-beneficiary distribution records.
//!
//! The ledger is the only owner of [`DistributionRecord`]s. Every mutation
//! validates fully before writing, so a rejected call leaves the ledger
//! exactly as it was.

use std::collections::HashMap;

use fairdrop_types::{
    Address, DistributionRecord, FairdropError, Result, constants::FRACTION_DENOMINATOR_U128,
};

/// `floor(total * fraction / 10000) - claimed`, never below zero.
///
/// A schedule replaced with lower fractions leaves claimable at zero
/// rather than clawing back what was already claimed.
pub fn claimable_amount(total: u128, claimed: u128, fraction: u16) -> Result<u128> {
    let vested = total
        .checked_mul(u128::from(fraction))
        .ok_or(FairdropError::ArithmeticOverflow {
            context: "vested amount",
        })?
        / FRACTION_DENOMINATOR_U128;
    Ok(vested.saturating_sub(claimed))
}

/// Store of distribution records plus distributor-wide totals.
#[derive(Debug)]
pub struct DistributionLedger {
    records: HashMap<Address, DistributionRecord>,
    /// Aggregate entitlement across the distribution.
    total: u128,
    /// Aggregate claimed across all beneficiaries.
    claimed: u128,
}

impl DistributionLedger {
    #[must_use]
    pub fn new(total: u128) -> Self {
        Self {
            records: HashMap::new(),
            total,
            claimed: 0,
        }
    }

    /// The record for `beneficiary`, or an empty uninitialized one.
    #[must_use]
    pub fn record(&self, beneficiary: &Address) -> DistributionRecord {
        self.records
            .get(beneficiary)
            .copied()
            .unwrap_or_else(|| DistributionRecord::empty(*beneficiary))
    }

    #[must_use]
    pub fn is_initialized(&self, beneficiary: &Address) -> bool {
        self.records
            .get(beneficiary)
            .is_some_and(|r| r.initialized)
    }

    /// Record `total` for `beneficiary` if not already initialized.
    ///
    /// Returns `true` if this call initialized the record. A repeat call is
    /// a no-op whatever `total` it carries.
    ///
    /// # Errors
    /// `NoAllocationFound` for a zero total.
    pub fn initialize(&mut self, beneficiary: Address, total: u128) -> Result<bool> {
        if self.is_initialized(&beneficiary) {
            tracing::debug!(beneficiary = %beneficiary, "record already initialized");
            return Ok(false);
        }
        if total == 0 {
            return Err(FairdropError::NoAllocationFound { beneficiary });
        }
        self.records
            .insert(beneficiary, DistributionRecord::initialized(beneficiary, total));
        Ok(true)
    }

    /// Add `amount` to `beneficiary`'s claimed balance.
    ///
    /// # Errors
    /// `RecordNotInitialized`, or `NoMoreTokensClaimable` if `amount` is
    /// zero or would push claimed past total.
    pub fn apply_claim(&mut self, beneficiary: &Address, amount: u128) -> Result<DistributionRecord> {
        let record = self
            .records
            .get(beneficiary)
            .filter(|r| r.initialized)
            .copied()
            .ok_or(FairdropError::RecordNotInitialized {
                beneficiary: *beneficiary,
            })?;
        let claimed = record
            .claimed
            .checked_add(amount)
            .filter(|c| amount > 0 && *c <= record.total)
            .ok_or(FairdropError::NoMoreTokensClaimable {
                beneficiary: *beneficiary,
            })?;
        let aggregate = self
            .claimed
            .checked_add(amount)
            .ok_or(FairdropError::ArithmeticOverflow {
                context: "aggregate claimed",
            })?;

        let updated = DistributionRecord { claimed, ..record };
        self.records.insert(*beneficiary, updated);
        self.claimed = aggregate;
        Ok(updated)
    }

    /// Move `beneficiary`'s total (and the aggregate total) by `delta`.
    ///
    /// `claimed` is untouched.
    ///
    /// # Errors
    /// `RecordNotInitialized`, or `AdjustmentOutOfRange` if the new total
    /// would be negative or below what was already claimed.
    pub fn adjust(&mut self, beneficiary: &Address, delta: i128) -> Result<DistributionRecord> {
        let record = self
            .records
            .get(beneficiary)
            .filter(|r| r.initialized)
            .copied()
            .ok_or(FairdropError::RecordNotInitialized {
                beneficiary: *beneficiary,
            })?;
        let total = apply_delta(record.total, delta).ok_or_else(|| {
            FairdropError::AdjustmentOutOfRange {
                reason: format!("total {} moved by {delta} is out of range", record.total),
            }
        })?;
        if total < record.claimed {
            return Err(FairdropError::AdjustmentOutOfRange {
                reason: format!("new total {total} below claimed {}", record.claimed),
            });
        }
        let aggregate = apply_delta(self.total, delta).ok_or_else(|| {
            FairdropError::AdjustmentOutOfRange {
                reason: format!("distribution total {} moved by {delta} is out of range", self.total),
            }
        })?;

        let updated = DistributionRecord { total, ..record };
        self.records.insert(*beneficiary, updated);
        self.total = aggregate;
        Ok(updated)
    }

    /// Overwrite the aggregate total.
    ///
    /// # Errors
    /// `TotalIsZero`.
    pub fn set_total(&mut self, total: u128) -> Result<()> {
        if total == 0 {
            return Err(FairdropError::TotalIsZero);
        }
        self.total = total;
        Ok(())
    }

    #[must_use]
    pub fn total(&self) -> u128 {
        self.total
    }

    #[must_use]
    pub fn claimed(&self) -> u128 {
        self.claimed
    }
}

fn apply_delta(value: u128, delta: i128) -> Option<u128> {
    if delta >= 0 {
        value.checked_add(delta.unsigned_abs())
    } else {
        value.checked_sub(delta.unsigned_abs())
    }
}

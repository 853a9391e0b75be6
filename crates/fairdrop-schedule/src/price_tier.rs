//! Price-keyed tier vesting inside a start/end window.

use fairdrop_types::{FairdropError, PriceTier, Result, constants::FRACTION_DENOMINATOR};

use crate::check_ceiling;

/// A validated price-tier schedule.
///
/// Before `start` nothing is vested; at or after `end` everything is.
/// In between, the highest tier whose price is at or below the oracle
/// price decides the fraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceTierSchedule {
    start: u64,
    end: u64,
    tiers: Vec<PriceTier>,
}

impl PriceTierSchedule {
    pub fn new(start: u64, end: u64, tiers: Vec<PriceTier>) -> Result<Self> {
        if start >= end {
            return Err(FairdropError::schedule("vesting end must be after start"));
        }
        check_ceiling(end)?;
        Self::validate_tiers(&tiers)?;
        Ok(Self { start, end, tiers })
    }

    fn validate_tiers(tiers: &[PriceTier]) -> Result<()> {
        let Some(highest) = tiers.last() else {
            return Err(FairdropError::schedule("price tiers required"));
        };
        for pair in tiers.windows(2) {
            if pair[1].price <= pair[0].price {
                return Err(FairdropError::schedule("tier prices decrease"));
            }
            if pair[1].vested_fraction <= pair[0].vested_fraction {
                return Err(FairdropError::schedule("vested fraction decreases"));
            }
        }
        if highest.vested_fraction != FRACTION_DENOMINATOR {
            return Err(FairdropError::schedule(
                "highest price tier must vest all tokens",
            ));
        }
        Ok(())
    }

    /// Same window, new tiers.
    pub fn with_tiers(&self, tiers: Vec<PriceTier>) -> Result<Self> {
        Self::new(self.start, self.end, tiers)
    }

    #[must_use]
    pub fn tiers(&self) -> &[PriceTier] {
        &self.tiers
    }

    #[must_use]
    pub fn start(&self) -> u64 {
        self.start
    }

    #[must_use]
    pub fn end(&self) -> u64 {
        self.end
    }

    /// Whether `now` falls inside the window, where the oracle decides.
    #[must_use]
    pub fn needs_price(&self, now: u64) -> bool {
        now >= self.start && now < self.end
    }

    /// Fraction at `now` for oracle price `price`.
    ///
    /// `price` is ignored outside the window.
    #[must_use]
    pub fn fraction_at(&self, now: u64, price: u128) -> u16 {
        if now < self.start {
            return 0;
        }
        if now >= self.end {
            return FRACTION_DENOMINATOR;
        }
        self.fraction_for_price(price)
    }

    /// Fraction of the highest tier at or below `price`, or 0.
    #[must_use]
    pub fn fraction_for_price(&self, price: u128) -> u16 {
        self.tiers
            .iter()
            .rev()
            .find(|tier| tier.price <= price)
            .map_or(0, |tier| tier.vested_fraction)
    }
}

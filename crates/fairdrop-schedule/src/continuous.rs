//! Linear vesting with a cliff.

use fairdrop_types::{
    FairdropError, Result,
    constants::{FRACTION_DENOMINATOR, FRACTION_DENOMINATOR_U128},
};

use crate::check_ceiling;

/// Linear release from `start` to `end`. Nothing vests before `cliff`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContinuousSchedule {
    start: u64,
    cliff: u64,
    end: u64,
}

impl ContinuousSchedule {
    pub fn new(start: u64, cliff: u64, end: u64) -> Result<Self> {
        if start >= end {
            return Err(FairdropError::schedule("vesting end must be after start"));
        }
        if cliff < start || cliff > end {
            return Err(FairdropError::schedule("cliff must be between start and end"));
        }
        check_ceiling(end)?;
        Ok(Self { start, cliff, end })
    }

    #[must_use]
    pub fn start(&self) -> u64 {
        self.start
    }

    #[must_use]
    pub fn cliff(&self) -> u64 {
        self.cliff
    }

    #[must_use]
    pub fn end(&self) -> u64 {
        self.end
    }

    #[must_use]
    pub fn fraction_at(&self, now: u64) -> u16 {
        if now < self.cliff {
            return 0;
        }
        if now >= self.end {
            return FRACTION_DENOMINATOR;
        }
        let elapsed = u128::from(now - self.start);
        let duration = u128::from(self.end - self.start);
        // elapsed < duration, so the quotient is below the denominator.
        u16::try_from(elapsed * FRACTION_DENOMINATOR_U128 / duration).unwrap_or(FRACTION_DENOMINATOR)
    }
}

//! # fairdrop-schedule
//!
//! **Vesting math for fairdrop distributors.**
//!
//! Every strategy answers one question: given the current schedule input
//! (time, or time plus an oracle price), what fraction of a beneficiary's
//! total is vested, in basis points out of 10 000?
//!
//! - [`TrancheSchedule`]: time-keyed steps
//! - [`PriceTierSchedule`]: price-keyed steps inside a start/end window
//! - [`ContinuousSchedule`]: linear release between start and end, with a cliff
//! - [`SequencerCheckedFeed`]: oracle gate that refuses prices while an L2
//!   sequencer is down or just recovered
//! - [`VestingScheduler`]: the versioned, wholesale-replaceable schedule a
//!   distributor consults
//!
//! Schedules are validated at construction. A misconfigured schedule never
//! instantiates.

pub mod continuous;
pub mod oracle;
pub mod price_tier;
pub mod scheduler;
pub mod tranche;

pub use continuous::ContinuousSchedule;
pub use oracle::{PriceFeed, RoundData, SequencerCheckedFeed, read_price};
pub use price_tier::PriceTierSchedule;
pub use scheduler::{Schedule, VestingScheduler};
pub use tranche::TrancheSchedule;

#[cfg(any(test, feature = "test-helpers"))]
pub use oracle::FakeFeed;

use fairdrop_types::{FairdropError, Result, constants::MAX_VESTING_TIME};

/// Reject times that look like epoch milliseconds.
pub(crate) fn check_ceiling(time: u64) -> Result<()> {
    if time > MAX_VESTING_TIME {
        return Err(FairdropError::schedule(format!(
            "vesting ends after {MAX_VESTING_TIME}"
        )));
    }
    Ok(())
}

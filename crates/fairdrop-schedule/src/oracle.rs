//! Price oracle gate.
//!
//! Oracles are external collaborators reached through [`PriceFeed`]. The
//! [`SequencerCheckedFeed`] composes a base price feed with an L2 sequencer
//! uptime feed and refuses to pass prices through while the sequencer is
//! down or inside the grace period after it recovers.

use std::sync::Arc;

use fairdrop_types::{Clock, FairdropError, Result, SequencerGateConfig, constants::SEQUENCER_UP};

/// One oracle round, as reported by `latestRoundData()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundData {
    pub round_id: u128,
    pub answer: i128,
    pub started_at: u64,
    pub updated_at: u64,
    pub answered_in_round: u128,
}

impl RoundData {
    /// Round with every id field set to 1 and both timestamps at `at`.
    #[must_use]
    pub fn simple(answer: i128, at: u64) -> Self {
        Self {
            round_id: 1,
            answer,
            started_at: at,
            updated_at: at,
            answered_in_round: 1,
        }
    }
}

/// A Chainlink-style aggregator.
pub trait PriceFeed: Send + Sync {
    fn latest_round_data(&self) -> Result<RoundData>;
}

impl<F: PriceFeed + ?Sized> PriceFeed for Arc<F> {
    fn latest_round_data(&self) -> Result<RoundData> {
        (**self).latest_round_data()
    }
}

/// Latest answer as an unsigned price.
///
/// # Errors
/// `InvalidOracleAnswer` for non-positive answers, plus anything the feed raises.
pub fn read_price(feed: &dyn PriceFeed) -> Result<u128> {
    let round = feed.latest_round_data()?;
    if round.answer <= 0 {
        return Err(FairdropError::InvalidOracleAnswer {
            answer: round.answer,
        });
    }
    u128::try_from(round.answer).map_err(|_| FairdropError::InvalidOracleAnswer {
        answer: round.answer,
    })
}

// ---------------------------------------------------------------------------
// Sequencer-checked feed
// ---------------------------------------------------------------------------

/// Price feed that consults an L2 sequencer uptime feed first.
///
/// Uptime answers: `0` means up, anything else means down. The round's
/// `started_at` is when the status last changed.
pub struct SequencerCheckedFeed {
    price: Arc<dyn PriceFeed>,
    uptime: Arc<dyn PriceFeed>,
    clock: Arc<dyn Clock>,
    config: SequencerGateConfig,
}

impl SequencerCheckedFeed {
    pub fn new(
        price: Arc<dyn PriceFeed>,
        uptime: Arc<dyn PriceFeed>,
        clock: Arc<dyn Clock>,
        config: SequencerGateConfig,
    ) -> Self {
        Self {
            price,
            uptime,
            clock,
            config,
        }
    }

    fn check_sequencer(&self) -> Result<()> {
        let status = self.uptime.latest_round_data()?;
        if status.answer != SEQUENCER_UP {
            tracing::debug!(answer = status.answer, "sequencer reported down");
            return Err(FairdropError::SequencerDown);
        }
        let since_up = self.clock.now().saturating_sub(status.started_at);
        if since_up <= self.config.grace_period_secs {
            return Err(FairdropError::GracePeriodNotOver {
                remaining_secs: self.config.grace_period_secs - since_up,
            });
        }
        Ok(())
    }
}

impl PriceFeed for SequencerCheckedFeed {
    fn latest_round_data(&self) -> Result<RoundData> {
        self.check_sequencer()?;
        self.price.latest_round_data()
    }
}

impl std::fmt::Debug for SequencerCheckedFeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SequencerCheckedFeed")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Test feed
// ---------------------------------------------------------------------------

/// Settable feed for tests. Serves price and uptime roles alike.
#[cfg(any(test, feature = "test-helpers"))]
#[derive(Debug)]
pub struct FakeFeed {
    round: std::sync::RwLock<RoundData>,
}

#[cfg(any(test, feature = "test-helpers"))]
impl FakeFeed {
    #[must_use]
    pub fn new(answer: i128, at: u64) -> Self {
        Self {
            round: std::sync::RwLock::new(RoundData::simple(answer, at)),
        }
    }

    /// Report `answer`, starting a new round at `at`.
    pub fn set(&self, answer: i128, at: u64) {
        let mut round = self
            .round
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let next = round.round_id + 1;
        *round = RoundData {
            round_id: next,
            answer,
            started_at: at,
            updated_at: at,
            answered_in_round: next,
        };
    }
}

#[cfg(any(test, feature = "test-helpers"))]
impl PriceFeed for FakeFeed {
    fn latest_round_data(&self) -> Result<RoundData> {
        Ok(*self
            .round
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner))
    }
}

//! The schedule a distributor consults.
//!
//! The active [`Schedule`] is an immutable snapshot behind an `Arc`. Admin
//! updates build and validate a complete replacement, then swap it in and
//! bump the version. There is no element-wise mutation, so a half-updated
//! list is never observable.

use std::sync::Arc;

use fairdrop_types::{
    FairdropError, PriceTier, Result, ScheduleConfig, ScheduleKind, Tranche,
};

use crate::{ContinuousSchedule, PriceFeed, PriceTierSchedule, TrancheSchedule, read_price};

/// One validated vesting strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Schedule {
    Tranche(TrancheSchedule),
    PriceTier(PriceTierSchedule),
    Continuous(ContinuousSchedule),
}

impl Schedule {
    pub fn from_config(config: &ScheduleConfig) -> Result<Self> {
        Ok(match config {
            ScheduleConfig::Tranche { tranches } => {
                Self::Tranche(TrancheSchedule::new(tranches.clone())?)
            }
            ScheduleConfig::PriceTier { start, end, tiers } => {
                Self::PriceTier(PriceTierSchedule::new(*start, *end, tiers.clone())?)
            }
            ScheduleConfig::Continuous { start, cliff, end } => {
                Self::Continuous(ContinuousSchedule::new(*start, *cliff, *end)?)
            }
        })
    }

    #[must_use]
    pub fn kind(&self) -> ScheduleKind {
        match self {
            Self::Tranche(_) => ScheduleKind::Tranche,
            Self::PriceTier(_) => ScheduleKind::PriceTier,
            Self::Continuous(_) => ScheduleKind::Continuous,
        }
    }
}

/// Versioned, wholesale-replaceable vesting schedule.
pub struct VestingScheduler {
    current: Arc<Schedule>,
    version: u64,
    oracle: Option<Arc<dyn PriceFeed>>,
}

impl VestingScheduler {
    /// Validate `config` and build the scheduler.
    ///
    /// # Errors
    /// `MisconfiguredSchedule` if the schedule is invalid or a price-tier
    /// schedule has no oracle.
    pub fn new(config: &ScheduleConfig, oracle: Option<Arc<dyn PriceFeed>>) -> Result<Self> {
        let schedule = Schedule::from_config(config)?;
        if schedule.kind() == ScheduleKind::PriceTier && oracle.is_none() {
            return Err(FairdropError::schedule(
                "oracle required for price tier vesting",
            ));
        }
        Ok(Self {
            current: Arc::new(schedule),
            version: 1,
            oracle,
        })
    }

    /// Vested fraction right now, in basis points.
    ///
    /// Price-tier schedules read the oracle only inside their window, so
    /// oracle failures surface verbatim only when the price matters.
    pub fn vested_fraction(&self, now: u64) -> Result<u16> {
        let fraction = match self.current.as_ref() {
            Schedule::Tranche(s) => s.fraction_at(now),
            Schedule::Continuous(s) => s.fraction_at(now),
            Schedule::PriceTier(s) => {
                if s.needs_price(now) {
                    let oracle = self.oracle.as_deref().ok_or_else(|| {
                        FairdropError::Internal("price tier schedule without oracle".into())
                    })?;
                    let price = read_price(oracle)?;
                    tracing::debug!(price, "oracle price read");
                    s.fraction_for_price(price)
                } else {
                    s.fraction_at(now, 0)
                }
            }
        };
        tracing::debug!(now, fraction, version = self.version, "vested fraction");
        Ok(fraction)
    }

    /// Replace the tranche list wholesale. Returns the new version.
    pub fn replace_tranches(&mut self, tranches: Vec<Tranche>) -> Result<u64> {
        if !matches!(self.current.as_ref(), Schedule::Tranche(_)) {
            return Err(self.mismatch(ScheduleKind::Tranche));
        }
        let next = TrancheSchedule::new(tranches)?;
        Ok(self.swap(Schedule::Tranche(next)))
    }

    /// Replace the price tiers wholesale, keeping the start/end window.
    pub fn replace_price_tiers(&mut self, tiers: Vec<PriceTier>) -> Result<u64> {
        let Schedule::PriceTier(current) = self.current.as_ref() else {
            return Err(self.mismatch(ScheduleKind::PriceTier));
        };
        let next = current.with_tiers(tiers)?;
        Ok(self.swap(Schedule::PriceTier(next)))
    }

    fn mismatch(&self, actual: ScheduleKind) -> FairdropError {
        FairdropError::ScheduleKindMismatch {
            expected: self.current.kind(),
            actual,
        }
    }

    fn swap(&mut self, next: Schedule) -> u64 {
        self.current = Arc::new(next);
        self.version += 1;
        self.version
    }

    /// The schedule in force.
    #[must_use]
    pub fn snapshot(&self) -> Arc<Schedule> {
        Arc::clone(&self.current)
    }

    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    #[must_use]
    pub fn kind(&self) -> ScheduleKind {
        self.current.kind()
    }
}

impl std::fmt::Debug for VestingScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VestingScheduler")
            .field("current", &self.current)
            .field("version", &self.version)
            .field("has_oracle", &self.oracle.is_some())
            .finish()
    }
}

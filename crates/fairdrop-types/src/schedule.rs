//! Vesting schedule model.
//!
//! These are the raw, unvalidated shapes. Validation and evaluation live in
//! `fairdrop-schedule`.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One step of a time-based schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tranche {
    /// Seconds since the Unix epoch.
    pub time: u64,
    /// Basis points vested once `time` has passed.
    pub vested_fraction: u16,
}

impl Tranche {
    #[must_use]
    pub fn new(time: u64, vested_fraction: u16) -> Self {
        Self {
            time,
            vested_fraction,
        }
    }
}

/// One step of a price-based schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceTier {
    /// Oracle price at or above which this tier applies.
    pub price: u128,
    pub vested_fraction: u16,
}

impl PriceTier {
    #[must_use]
    pub fn new(price: u128, vested_fraction: u16) -> Self {
        Self {
            price,
            vested_fraction,
        }
    }
}

/// Which vesting strategy a distributor runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleKind {
    Tranche,
    PriceTier,
    Continuous,
}

impl fmt::Display for ScheduleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tranche => write!(f, "tranche"),
            Self::PriceTier => write!(f, "price_tier"),
            Self::Continuous => write!(f, "continuous"),
        }
    }
}

/// Schedule as supplied at construction or in a config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScheduleConfig {
    Tranche {
        tranches: Vec<Tranche>,
    },
    PriceTier {
        start: u64,
        end: u64,
        tiers: Vec<PriceTier>,
    },
    Continuous {
        start: u64,
        cliff: u64,
        end: u64,
    },
}

impl ScheduleConfig {
    #[must_use]
    pub fn kind(&self) -> ScheduleKind {
        match self {
            Self::Tranche { .. } => ScheduleKind::Tranche,
            Self::PriceTier { .. } => ScheduleKind::PriceTier,
            Self::Continuous { .. } => ScheduleKind::Continuous,
        }
    }
}

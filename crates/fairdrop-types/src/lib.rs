//! # fairdrop-types
//!
//! Shared types, errors, and configuration for the **fairdrop** distribution
//! engine.
//!
//! This crate is the leaf dependency of the workspace: every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`Address`], [`Domain`], [`TransferId`], [`Hash32`]
//! - **Ledger model**: [`DistributionRecord`]
//! - **Schedule model**: [`Tranche`], [`PriceTier`], [`ScheduleConfig`], [`ScheduleKind`]
//! - **Claim model**: [`Evidence`], [`MerkleEvidence`], [`CrosschainClaim`], [`SignedClaim`]
//! - **Bridge model**: [`OutboundTransfer`], [`InboundTransfer`], [`BridgeMessage`]
//! - **Events**: [`DistributorEvent`]
//! - **Configuration**: [`DistributorConfig`], [`SequencerGateConfig`]
//! - **Time**: [`Clock`], [`SystemClock`], [`ManualClock`]
//! - **Errors**: [`FairdropError`] with `FD_ERR_` prefix codes
//! - **Constants**: system-wide limits and defaults

pub mod bridge;
pub mod claim;
pub mod clock;
pub mod config;
pub mod constants;
pub mod error;
pub mod event;
pub mod ids;
pub mod record;
pub mod schedule;

// Re-export all primary types at crate root for ergonomic imports:
//   use fairdrop_types::{Address, DistributionRecord, Tranche, ...};

pub use bridge::*;
pub use claim::*;
pub use clock::*;
pub use config::*;
pub use error::*;
pub use event::*;
pub use ids::*;
pub use record::*;
pub use schedule::*;

// Constants are accessed via `fairdrop_types::constants::FOO`
// (not re-exported to avoid name collisions).

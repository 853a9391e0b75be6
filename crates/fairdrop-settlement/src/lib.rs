//! # fairdrop-settlement
//!
//! **Claim routing and cross-domain settlement.**
//!
//! - [`Distributor`]: the claim router for one distribution
//! - [`Satellite`]: claim entrypoint on remote domains
//! - [`DestinationCredits`]: credits bridged tokens on the destination domain
//! - [`BridgeAdapter`] / [`InMemoryBridge`]: the bridge seam
//! - [`AppliedTransfers`]: exactly-once guard for inbound deliveries
//!
//! ## Claim flow
//!
//! ```text
//! Evidence -> EligibilityVerifier -> FairQueue -> VestingScheduler
//!          -> DistributionLedger -> TokenTreasury | BridgeAdapter
//! ```
//!
//! A satellite claim takes two bridge hops: the satellite sends a request to
//! the distributor, and the distributor sends the tokens back.

pub mod bridge;
pub mod distributor;
pub mod idempotency;
pub mod receiver;
pub mod satellite;

pub use bridge::{BridgeAdapter, InMemoryBridge};
pub use distributor::{Distributor, DistributorBuilder, InboundOutcome};
pub use idempotency::AppliedTransfers;
pub use receiver::DestinationCredits;
pub use satellite::Satellite;

//! # fairdrop-ledger
//!
//! **Accounting core for fairdrop distributors.**
//!
//! - [`EligibilityVerifier`] / [`MerkleTree`]: Merkle allocation proofs
//! - [`AllocationSource`]: Merkle root or finished token sale
//! - [`DistributionLedger`]: per-beneficiary records, claims and adjustments
//! - [`FairQueue`]: per-address anti-sniping delay
//! - [`VotingPowerTracker`]: delegated voting weight over unclaimed balances
//! - [`TokenTreasury`]: token balances with supply conservation checks
//!
//! Nothing here moves tokens across domains or reads clocks; callers pass
//! `now` and the vested fraction in.

pub mod allocation;
pub mod fair_queue;
pub mod ledger;
pub mod merkle;
pub mod treasury;
pub mod voting;

pub use allocation::{AllocationSource, SaleAllocation, SaleLedger};
pub use fair_queue::FairQueue;
pub use ledger::{DistributionLedger, claimable_amount};
pub use merkle::{EligibilityVerifier, MerkleTree, hash_leaf, hash_pair, verify_proof};
pub use treasury::TokenTreasury;
pub use voting::VotingPowerTracker;

#[cfg(any(test, feature = "test-helpers"))]
pub use allocation::SalePurchases;

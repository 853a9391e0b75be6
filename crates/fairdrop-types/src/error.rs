//! Error types for the fairdrop distribution engine.
//!
//! All errors use the `FD_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Eligibility errors
//! - 2xx: Claim / ledger errors
//! - 3xx: Schedule / configuration errors
//! - 4xx: Oracle errors
//! - 5xx: Cross-domain errors
//! - 8xx: Access errors
//! - 9xx: General / internal errors
//!
//! Every error aborts the operation that produced it; no partial state is
//! committed.

use thiserror::Error;

use crate::{Address, Domain, TransferId};

/// Central error enum for all fairdrop operations.
#[derive(Debug, Error)]
pub enum FairdropError {
    // =================================================================
    // Eligibility Errors (1xx)
    // =================================================================
    /// The Merkle proof does not connect the claimed leaf to the root.
    #[error("FD_ERR_100: Invalid proof for {beneficiary}")]
    InvalidProof { beneficiary: Address },

    /// The beneficiary has no entitlement in this distribution.
    #[error("FD_ERR_101: No allocation found for {beneficiary}")]
    NoAllocationFound { beneficiary: Address },

    // =================================================================
    // Claim / Ledger Errors (2xx)
    // =================================================================
    /// Nothing is claimable right now (not vested yet, already claimed,
    /// or the fair-queue delay has not elapsed).
    #[error("FD_ERR_200: No more tokens claimable right now for {beneficiary}")]
    NoMoreTokensClaimable { beneficiary: Address },

    /// The operation requires an initialized distribution record.
    #[error("FD_ERR_201: Distribution record not initialized for {beneficiary}")]
    RecordNotInitialized { beneficiary: Address },

    /// An adjustment would push a total below the claimed amount or below zero.
    #[error("FD_ERR_202: Adjustment out of range: {reason}")]
    AdjustmentOutOfRange { reason: String },

    /// The distributor does not hold enough tokens to pay out.
    #[error("FD_ERR_203: Insufficient funds: need {needed}, have {available}")]
    InsufficientFunds { needed: u128, available: u128 },

    /// Checked arithmetic overflowed.
    #[error("FD_ERR_204: Arithmetic overflow in {context}")]
    ArithmeticOverflow { context: &'static str },

    /// Token balances no longer sum to what was minted.
    #[error("FD_ERR_205: Supply invariant violated: {reason}")]
    SupplyInvariantViolation { reason: String },

    // =================================================================
    // Schedule / Configuration Errors (3xx)
    // =================================================================
    /// The vesting schedule violates its invariants.
    #[error("FD_ERR_300: Misconfigured schedule: {reason}")]
    MisconfiguredSchedule { reason: String },

    /// The distribution total must be positive.
    #[error("FD_ERR_301: Distributor: total is 0")]
    TotalIsZero,

    /// A schedule update targeted a different strategy than the one deployed.
    #[error("FD_ERR_302: Schedule kind mismatch: expected {expected}, got {actual}")]
    ScheduleKindMismatch {
        expected: crate::ScheduleKind,
        actual: crate::ScheduleKind,
    },

    /// A purchase-backed distributor cannot be created while its sale is open.
    #[error("FD_ERR_303: Sale not over yet")]
    SaleNotOver,

    /// The fair-queue seed must never be zero.
    #[error("FD_ERR_304: Invalid fair queue seed")]
    InvalidSeed,

    // =================================================================
    // Oracle Errors (4xx)
    // =================================================================
    /// The L2 sequencer uptime feed reports the sequencer as down.
    #[error("FD_ERR_400: SequencerDown")]
    SequencerDown,

    /// The sequencer came back up too recently to trust price data.
    #[error("FD_ERR_401: GracePeriodNotOver: {remaining_secs}s remaining")]
    GracePeriodNotOver { remaining_secs: u64 },

    /// The oracle returned a non-positive or otherwise unusable answer.
    #[error("FD_ERR_402: Invalid oracle answer: {answer}")]
    InvalidOracleAnswer { answer: i128 },

    // =================================================================
    // Cross-domain Errors (5xx)
    // =================================================================
    /// The signer of a claim message is not the beneficiary.
    #[error("FD_ERR_500: SignatureMismatch: signature not from {beneficiary}")]
    SignatureMismatch { beneficiary: Address },

    /// A cross-domain operation was attempted without a bridge adapter.
    #[error("FD_ERR_501: Bridge not configured")]
    BridgeNotConfigured,

    /// The destination domain is not served by this bridge.
    #[error("FD_ERR_502: Unknown domain: {0}")]
    UnknownDomain(Domain),

    /// An inbound bridge payload could not be decoded.
    #[error("FD_ERR_503: Invalid payload: {reason}")]
    InvalidPayload { reason: String },

    /// A bridge transfer was already applied on this domain.
    #[error("FD_ERR_504: Transfer already applied: {0}")]
    TransferAlreadyApplied(TransferId),

    // =================================================================
    // Access Errors (8xx)
    // =================================================================
    /// The caller lacks the role required for this operation.
    #[error("FD_ERR_800: Unauthorized caller {caller}: {action}")]
    Unauthorized {
        caller: Address,
        action: &'static str,
    },

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Unrecoverable internal error.
    #[error("FD_ERR_900: Internal error: {0}")]
    Internal(String),

    /// Serialization / deserialization error.
    #[error("FD_ERR_901: Serialization error: {0}")]
    Serialization(String),

    /// Configuration error (invalid config file, missing fields, etc.).
    #[error("FD_ERR_902: Configuration error: {0}")]
    Configuration(String),

    /// I/O error.
    #[error("FD_ERR_903: I/O error: {0}")]
    Io(String),
}

impl FairdropError {
    /// Whether retrying the same request later can succeed without
    /// changing its inputs.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::NoMoreTokensClaimable { .. }
                | Self::SequencerDown
                | Self::GracePeriodNotOver { .. }
                | Self::InsufficientFunds { .. }
        )
    }

    /// Shorthand for a schedule validation failure.
    pub fn schedule(reason: impl Into<String>) -> Self {
        Self::MisconfiguredSchedule {
            reason: reason.into(),
        }
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, FairdropError>;

impl From<std::io::Error> for FairdropError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for FairdropError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

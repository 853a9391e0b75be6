//! Events emitted by a distributor for every committed transition.

use serde::{Deserialize, Serialize};

use crate::{Address, Domain, ScheduleKind, TransferId};

/// Append-only audit trail entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DistributorEvent {
    /// A beneficiary's entitlement was recorded.
    RecordInitialized { beneficiary: Address, total: u128 },
    /// Tokens were paid out on this domain.
    Claimed { beneficiary: Address, amount: u128 },
    /// Tokens were handed to the bridge for another domain.
    CrosschainClaimed {
        beneficiary: Address,
        recipient: Address,
        recipient_domain: Domain,
        amount: u128,
        transfer_id: TransferId,
    },
    /// An administrator moved a beneficiary's total.
    Adjusted { beneficiary: Address, delta: i128 },
    /// The vesting schedule was replaced.
    ScheduleChanged { kind: ScheduleKind, version: u64 },
    VoteFactorChanged { vote_factor: u128 },
    TotalChanged { total: u128 },
    UriChanged { uri: String },
    DelegateChanged {
        delegator: Address,
        from: Address,
        to: Address,
    },
}

impl std::fmt::Display for DistributorEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RecordInitialized { .. } => write!(f, "RECORD_INITIALIZED"),
            Self::Claimed { .. } => write!(f, "CLAIMED"),
            Self::CrosschainClaimed { .. } => write!(f, "CROSSCHAIN_CLAIMED"),
            Self::Adjusted { .. } => write!(f, "ADJUSTED"),
            Self::ScheduleChanged { .. } => write!(f, "SCHEDULE_CHANGED"),
            Self::VoteFactorChanged { .. } => write!(f, "VOTE_FACTOR_CHANGED"),
            Self::TotalChanged { .. } => write!(f, "TOTAL_CHANGED"),
            Self::UriChanged { .. } => write!(f, "URI_CHANGED"),
            Self::DelegateChanged { .. } => write!(f, "DELEGATE_CHANGED"),
        }
    }
}

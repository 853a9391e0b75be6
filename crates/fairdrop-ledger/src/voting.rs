//! Voting power derived from unclaimed balances.
//!
//! A beneficiary's weight is `floor((total - claimed) * vote_factor / 10000)`.
//! Weight is computed from the ledger at read time, so claims shrink it and a
//! new vote factor reprices every balance with no per-user action. Weight
//! only counts once the beneficiary delegates, to itself or anyone else.

use std::collections::{BTreeSet, HashMap};

use fairdrop_types::{
    Address, DistributionRecord, FairdropError, Result, constants::FRACTION_DENOMINATOR_U128,
};

use crate::DistributionLedger;

/// Delegation graph plus the global vote factor.
#[derive(Debug)]
pub struct VotingPowerTracker {
    vote_factor: u128,
    /// delegator -> delegate
    delegates: HashMap<Address, Address>,
    /// delegate -> delegators
    delegators: HashMap<Address, BTreeSet<Address>>,
}

impl VotingPowerTracker {
    #[must_use]
    pub fn new(vote_factor: u128) -> Self {
        Self {
            vote_factor,
            delegates: HashMap::new(),
            delegators: HashMap::new(),
        }
    }

    #[must_use]
    pub fn vote_factor(&self) -> u128 {
        self.vote_factor
    }

    pub fn set_vote_factor(&mut self, vote_factor: u128) {
        self.vote_factor = vote_factor;
    }

    /// Point `delegator`'s weight at `to`, replacing any earlier delegate.
    ///
    /// Delegating to [`Address::ZERO`] withdraws the weight. Returns the
    /// previous delegate.
    pub fn delegate(&mut self, delegator: Address, to: Address) -> Address {
        let previous = self.delegates(&delegator);
        if previous == to {
            return previous;
        }
        if let Some(set) = self.delegators.get_mut(&previous) {
            set.remove(&delegator);
            if set.is_empty() {
                self.delegators.remove(&previous);
            }
        }
        if to.is_zero() {
            self.delegates.remove(&delegator);
        } else {
            self.delegates.insert(delegator, to);
            self.delegators.entry(to).or_default().insert(delegator);
        }
        previous
    }

    /// Active delegate of `account`, or [`Address::ZERO`].
    #[must_use]
    pub fn delegates(&self, account: &Address) -> Address {
        self.delegates.get(account).copied().unwrap_or(Address::ZERO)
    }

    /// Weight contributed by one record. Zero before initialization.
    pub fn weight(&self, record: &DistributionRecord) -> Result<u128> {
        if !record.initialized {
            return Ok(0);
        }
        record
            .unclaimed()
            .checked_mul(self.vote_factor)
            .map(|w| w / FRACTION_DENOMINATOR_U128)
            .ok_or(FairdropError::ArithmeticOverflow {
                context: "voting weight",
            })
    }

    /// Sum of the weights delegated to `account`.
    pub fn get_votes(&self, account: &Address, ledger: &DistributionLedger) -> Result<u128> {
        let Some(delegators) = self.delegators.get(account) else {
            return Ok(0);
        };
        delegators.iter().try_fold(0u128, |acc, delegator| {
            acc.checked_add(self.weight(&ledger.record(delegator))?)
                .ok_or(FairdropError::ArithmeticOverflow {
                    context: "votes",
                })
        })
    }
}

//! Destination-side token receiver.
//!
//! Credits bridged tokens to their recipient on the destination domain.
//! Deliveries are accepted only from the local bridge account, and each
//! transfer id is credited once.

use fairdrop_ledger::TokenTreasury;
use fairdrop_types::{Address, Domain, FairdropError, InboundTransfer, Result};

use crate::{AppliedTransfers, InboundOutcome};

#[derive(Debug)]
pub struct DestinationCredits {
    domain: Domain,
    bridge_address: Address,
    treasury: TokenTreasury,
    applied: AppliedTransfers,
}

impl DestinationCredits {
    #[must_use]
    pub fn new(domain: Domain, bridge_address: Address) -> Self {
        Self {
            domain,
            bridge_address,
            treasury: TokenTreasury::new(),
            applied: AppliedTransfers::new(),
        }
    }

    #[must_use]
    pub fn domain(&self) -> Domain {
        self.domain
    }

    /// Credit `inbound.amount` of `inbound.asset` to `inbound.recipient`.
    pub fn x_receive(&mut self, caller: Address, inbound: &InboundTransfer) -> Result<InboundOutcome> {
        if caller != self.bridge_address {
            tracing::warn!(caller = %caller, domain = %self.domain, "inbound transfer not from bridge");
            return Err(FairdropError::Unauthorized {
                caller,
                action: "x_receive",
            });
        }
        if self.applied.is_applied(&inbound.transfer_id) {
            tracing::warn!(transfer_id = %inbound.transfer_id, "duplicate inbound transfer");
            return Ok(InboundOutcome::Duplicate);
        }
        if inbound.amount > 0 {
            self.treasury
                .mint(inbound.asset, inbound.recipient, inbound.amount)?;
        }
        self.applied.mark_applied(inbound.transfer_id)?;
        tracing::info!(
            transfer_id = %inbound.transfer_id,
            origin = %inbound.origin_domain,
            recipient = %inbound.recipient,
            amount = inbound.amount,
            "bridged tokens credited"
        );
        Ok(InboundOutcome::Settled {
            amount: inbound.amount,
            forwarded: None,
        })
    }

    #[must_use]
    pub fn balance(&self, asset: &Address, holder: &Address) -> u128 {
        self.treasury.balance(asset, holder)
    }

    /// Tokens of `asset` credited here so far.
    #[must_use]
    pub fn total_credited(&self, asset: &Address) -> u128 {
        self.treasury.total_supply(asset)
    }
}

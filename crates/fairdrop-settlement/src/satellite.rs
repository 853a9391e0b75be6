//! Satellite: claim entrypoint on a domain other than the distributor's.
//!
//! A satellite holds no tokens. It checks the caller's leaf against the
//! shared domain-bound root using its own domain, then sends a zero-value
//! bridge transfer carrying a [`ClaimRequestPayload`] to the distributor.
//! The distributor re-verifies on receipt and sends the tokens back here.

use std::sync::Arc;

use fairdrop_ledger::EligibilityVerifier;
use fairdrop_types::{
    Address, ClaimRequestPayload, Domain, FairdropError, Hash32, OutboundTransfer, Result,
    TransferId,
};

use crate::BridgeAdapter;

pub struct Satellite {
    address: Address,
    distributor_domain: Domain,
    distributor_address: Address,
    verifier: EligibilityVerifier,
    bridge: Arc<dyn BridgeAdapter>,
}

impl Satellite {
    /// # Errors
    /// `Configuration` if the satellite would sit on the distributor's own
    /// domain.
    pub fn new(
        address: Address,
        distributor_domain: Domain,
        distributor_address: Address,
        merkle_root: Hash32,
        bridge: Arc<dyn BridgeAdapter>,
    ) -> Result<Self> {
        if bridge.domain() == distributor_domain {
            return Err(FairdropError::Configuration(format!(
                "satellite must run on a different domain than {distributor_domain}"
            )));
        }
        Ok(Self {
            address,
            distributor_domain,
            distributor_address,
            verifier: EligibilityVerifier::domain_bound(merkle_root),
            bridge,
        })
    }

    /// Domain this satellite serves.
    #[must_use]
    pub fn domain(&self) -> Domain {
        self.bridge.domain()
    }

    #[must_use]
    pub fn address(&self) -> Address {
        self.address
    }

    #[must_use]
    pub fn distributor_domain(&self) -> Domain {
        self.distributor_domain
    }

    #[must_use]
    pub fn distributor_address(&self) -> Address {
        self.distributor_address
    }

    /// Ask the distributor to claim for `caller`.
    ///
    /// `amount` is the caller's full leaf amount, not the amount to claim.
    /// Returns the id of the request transfer.
    pub fn initiate_claim(
        &self,
        caller: Address,
        amount: u128,
        proof: Vec<Hash32>,
        relayer_fee: u128,
    ) -> Result<TransferId> {
        if !self.verifier.verify(&caller, amount, self.domain(), &proof) {
            return Err(FairdropError::InvalidProof {
                beneficiary: caller,
            });
        }
        let payload = ClaimRequestPayload {
            beneficiary: caller,
            amount,
            proof,
        }
        .encode()?;
        let transfer_id = self.bridge.send_transfer(
            self.address,
            OutboundTransfer {
                destination: self.distributor_domain,
                recipient: self.distributor_address,
                asset: Address::ZERO,
                amount: 0,
                relayer_fee,
                payload,
            },
        )?;
        tracing::info!(
            beneficiary = %caller,
            domain = %self.domain(),
            transfer_id = %transfer_id,
            "claim request sent to distributor"
        );
        Ok(transfer_id)
    }
}

impl std::fmt::Debug for Satellite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Satellite")
            .field("address", &self.address)
            .field("domain", &self.domain())
            .field("distributor_domain", &self.distributor_domain)
            .field("distributor_address", &self.distributor_address)
            .finish_non_exhaustive()
    }
}

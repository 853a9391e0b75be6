//! Cross-domain bridge adapter seam.
//!
//! The engine only integrates with a bridge: delivery, ordering and fees
//! are the bridge's business. [`BridgeAdapter`] is what the engine calls on
//! the sending side; the receiving side exposes an `x_receive` entrypoint
//! that only the local bridge account may call.
//!
//! [`InMemoryBridge`] queues messages in process so tests (and single-process
//! simulations) can relay them between domains by hand.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Mutex, PoisonError};

use fairdrop_types::{
    Address, BridgeMessage, Domain, FairdropError, OutboundTransfer, Result, TransferId,
};

/// Sending half of a message bridge on one domain.
pub trait BridgeAdapter: Send + Sync {
    /// Bridge account on this domain. Tokens handed to the bridge are
    /// transferred here, and inbound deliveries arrive from here.
    fn address(&self) -> Address;

    /// Domain this adapter sends from.
    fn domain(&self) -> Domain;

    /// Queue `transfer` for delivery.
    ///
    /// # Errors
    /// `UnknownDomain` if the bridge has no route to the destination.
    fn send_transfer(&self, origin_sender: Address, transfer: OutboundTransfer) -> Result<TransferId>;
}

#[derive(Debug, Default)]
struct BridgeState {
    nonce: u64,
    outbox: VecDeque<BridgeMessage>,
    relayer_fees: HashMap<TransferId, u128>,
    sent: u64,
}

/// Bridge adapter that keeps its outbox in memory.
#[derive(Debug)]
pub struct InMemoryBridge {
    address: Address,
    domain: Domain,
    routes: HashSet<Domain>,
    state: Mutex<BridgeState>,
}

impl InMemoryBridge {
    pub fn new(address: Address, domain: Domain, routes: impl IntoIterator<Item = Domain>) -> Self {
        Self {
            address,
            domain,
            routes: routes.into_iter().collect(),
            state: Mutex::new(BridgeState::default()),
        }
    }

    fn state(&self) -> std::sync::MutexGuard<'_, BridgeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Take every queued message, oldest first.
    pub fn drain(&self) -> Vec<BridgeMessage> {
        self.state().outbox.drain(..).collect()
    }

    /// Queued messages, oldest first, without removing them.
    pub fn pending(&self) -> Vec<BridgeMessage> {
        self.state().outbox.iter().cloned().collect()
    }

    /// Relayer fee paid with `id`, if it was sent here.
    pub fn relayer_fee(&self, id: &TransferId) -> Option<u128> {
        self.state().relayer_fees.get(id).copied()
    }

    /// Sum of relayer fees forwarded so far.
    pub fn total_relayer_fees(&self) -> u128 {
        self.state().relayer_fees.values().sum()
    }

    /// Number of transfers ever sent.
    pub fn sent_count(&self) -> u64 {
        self.state().sent
    }

    pub fn routes(&self) -> impl Iterator<Item = &Domain> {
        self.routes.iter()
    }
}

impl BridgeAdapter for InMemoryBridge {
    fn address(&self) -> Address {
        self.address
    }

    fn domain(&self) -> Domain {
        self.domain
    }

    fn send_transfer(&self, origin_sender: Address, transfer: OutboundTransfer) -> Result<TransferId> {
        if !self.routes.contains(&transfer.destination) {
            return Err(FairdropError::UnknownDomain(transfer.destination));
        }
        let mut state = self.state();
        let transfer_id = TransferId::deterministic(self.domain, state.nonce);
        state.nonce += 1;
        state.sent += 1;
        state.relayer_fees.insert(transfer_id, transfer.relayer_fee);
        tracing::debug!(
            transfer_id = %transfer_id,
            destination = %transfer.destination,
            recipient = %transfer.recipient,
            amount = transfer.amount,
            relayer_fee = transfer.relayer_fee,
            "bridge transfer queued"
        );
        state.outbox.push_back(BridgeMessage {
            transfer_id,
            origin_domain: self.domain,
            origin_sender,
            transfer,
        });
        Ok(transfer_id)
    }
}

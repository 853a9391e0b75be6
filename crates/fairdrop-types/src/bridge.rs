//! Cross-domain bridge message model.
//!
//! The bridge itself is an external collaborator. These types describe what
//! the engine hands it ([`OutboundTransfer`]), what it carries
//! ([`BridgeMessage`]), and what it delivers ([`InboundTransfer`]).

use serde::{Deserialize, Serialize};

use crate::{Address, Domain, TransferId};

/// A transfer the engine asks the bridge to send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundTransfer {
    pub destination: Domain,
    /// Receiver on the destination domain.
    pub recipient: Address,
    /// Token being moved.
    pub asset: Address,
    pub amount: u128,
    /// Native-currency fee for the relayer, forwarded verbatim.
    pub relayer_fee: u128,
    /// Opaque call data for the receiver. Empty for plain token transfers.
    pub payload: Vec<u8>,
}

/// A transfer in flight: the outbound request stamped by the sending bridge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeMessage {
    pub transfer_id: TransferId,
    pub origin_domain: Domain,
    /// Account that called `send_transfer` on the origin domain.
    pub origin_sender: Address,
    pub transfer: OutboundTransfer,
}

impl BridgeMessage {
    /// The delivery the destination-domain receiver observes.
    #[must_use]
    pub fn into_inbound(self) -> InboundTransfer {
        InboundTransfer {
            transfer_id: self.transfer_id,
            amount: self.transfer.amount,
            asset: self.transfer.asset,
            origin_sender: self.origin_sender,
            origin_domain: self.origin_domain,
            recipient: self.transfer.recipient,
            payload: self.transfer.payload,
        }
    }
}

/// A delivery arriving at the destination domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundTransfer {
    pub transfer_id: TransferId,
    pub amount: u128,
    pub asset: Address,
    pub origin_sender: Address,
    pub origin_domain: Domain,
    pub recipient: Address,
    pub payload: Vec<u8>,
}

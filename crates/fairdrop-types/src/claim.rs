//! Claim evidence and signed cross-domain claim messages.
//!
//! A claim is authenticated in one of two ways:
//! - **Merkle evidence**: `(amount, domain?, proof)` proving the beneficiary's
//!   leaf is in the distributor's root. Anyone may relay it.
//! - **Signed claim**: an ed25519 signature by the beneficiary over a
//!   [`CrosschainClaim`], plus Merkle evidence for the entitlement.

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use serde::{Deserialize, Serialize};

use crate::{Address, Domain, FairdropError, Hash32, Result};

// ---------------------------------------------------------------------------
// Merkle evidence
// ---------------------------------------------------------------------------

/// Proof that `(beneficiary, amount[, domain])` is a leaf of the root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleEvidence {
    pub amount: u128,
    /// Present for domain-bound roots.
    pub domain: Option<Domain>,
    pub proof: Vec<Hash32>,
}

impl MerkleEvidence {
    #[must_use]
    pub fn new(amount: u128, proof: Vec<Hash32>) -> Self {
        Self {
            amount,
            domain: None,
            proof,
        }
    }

    #[must_use]
    pub fn with_domain(amount: u128, domain: Domain, proof: Vec<Hash32>) -> Self {
        Self {
            amount,
            domain: Some(domain),
            proof,
        }
    }
}

/// Whatever the allocation source needs to resolve an entitlement.
///
/// Purchase-backed distributors read the sale ledger and need no evidence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Evidence {
    Merkle(MerkleEvidence),
    None,
}

impl From<MerkleEvidence> for Evidence {
    fn from(value: MerkleEvidence) -> Self {
        Self::Merkle(value)
    }
}

// ---------------------------------------------------------------------------
// Signed cross-domain claim
// ---------------------------------------------------------------------------

/// The structured message a beneficiary signs to route a claim elsewhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrosschainClaim {
    /// Final receiver of the tokens.
    pub recipient: Address,
    pub recipient_domain: Domain,
    pub beneficiary: Address,
    /// Domain the beneficiary's leaf is bound to.
    pub beneficiary_domain: Domain,
    /// Entitlement in the beneficiary's Merkle leaf.
    pub amount: u128,
}

impl CrosschainClaim {
    /// Canonical signing payload.
    ///
    /// Format: `"fairdrop:claim:v1:" || recipient || recipient_domain || beneficiary || beneficiary_domain || amount`
    #[must_use]
    pub fn signing_payload(&self) -> Vec<u8> {
        let mut payload = Vec::with_capacity(96);
        payload.extend_from_slice(b"fairdrop:claim:v1:");
        payload.extend_from_slice(self.recipient.as_bytes());
        payload.extend_from_slice(&self.recipient_domain.to_be_bytes());
        payload.extend_from_slice(self.beneficiary.as_bytes());
        payload.extend_from_slice(&self.beneficiary_domain.to_be_bytes());
        payload.extend_from_slice(&self.amount.to_be_bytes());
        payload
    }
}

/// A [`CrosschainClaim`] together with the signer's key and signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedClaim {
    pub message: CrosschainClaim,
    /// Raw ed25519 verifying key of the signer.
    pub signer: [u8; 32],
    /// Raw 64-byte ed25519 signature over [`CrosschainClaim::signing_payload`].
    pub signature: Vec<u8>,
}

impl SignedClaim {
    /// Sign `message` with `key`.
    #[must_use]
    pub fn sign(message: CrosschainClaim, key: &SigningKey) -> Self {
        let signature = key.sign(&message.signing_payload());
        Self {
            message,
            signer: key.verifying_key().to_bytes(),
            signature: signature.to_bytes().to_vec(),
        }
    }

    /// Verify the signature and return the address that produced it.
    ///
    /// # Errors
    /// `SignatureMismatch` if the key or signature is malformed or the
    /// signature does not cover this message.
    pub fn recover_signer(&self) -> Result<Address> {
        let mismatch = || FairdropError::SignatureMismatch {
            beneficiary: self.message.beneficiary,
        };
        let key = VerifyingKey::from_bytes(&self.signer).map_err(|_| mismatch())?;
        let sig_bytes: [u8; 64] = self
            .signature
            .as_slice()
            .try_into()
            .map_err(|_| mismatch())?;
        let signature = Signature::from_bytes(&sig_bytes);
        key.verify(&self.message.signing_payload(), &signature)
            .map_err(|_| mismatch())?;
        Ok(Address::from_verifying_key(&key))
    }
}

// ---------------------------------------------------------------------------
// Satellite request payload
// ---------------------------------------------------------------------------

/// Claim request relayed from a satellite domain back to the distributor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimRequestPayload {
    pub beneficiary: Address,
    pub amount: u128,
    pub proof: Vec<Hash32>,
}

impl ClaimRequestPayload {
    pub fn encode(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).map_err(|e| FairdropError::InvalidPayload {
            reason: e.to_string(),
        })
    }
}

//! Merkle eligibility proofs.
//!
//! Leaves and interior nodes are hashed with distinct one-byte prefixes to
//! rule out second pre-image attacks. Interior nodes hash their children
//! in sorted order, so a proof is just the list of siblings.
//!
//! ```text
//! leaf = sha256(0x00 || beneficiary || amount_be16 [|| domain_be4])
//! node = sha256(0x01 || min(a, b) || max(a, b))
//! ```

use fairdrop_types::{
    Address, Domain, FairdropError, Hash32, Result,
    constants::{MAX_PROOF_DEPTH, MERKLE_LEAF_PREFIX, MERKLE_NODE_PREFIX},
};
use sha2::{Digest, Sha256};

/// Hash of one `(beneficiary, amount[, domain])` leaf.
#[must_use]
pub fn hash_leaf(beneficiary: &Address, amount: u128, domain: Option<Domain>) -> Hash32 {
    let mut hasher = Sha256::new();
    hasher.update(MERKLE_LEAF_PREFIX);
    hasher.update(beneficiary.as_bytes());
    hasher.update(amount.to_be_bytes());
    if let Some(domain) = domain {
        hasher.update(domain.to_be_bytes());
    }
    hasher.finalize().into()
}

/// Hash of an interior node over two children, order-independent.
#[must_use]
pub fn hash_pair(a: &Hash32, b: &Hash32) -> Hash32 {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    let mut hasher = Sha256::new();
    hasher.update(MERKLE_NODE_PREFIX);
    hasher.update(lo);
    hasher.update(hi);
    hasher.finalize().into()
}

/// Replay `proof` from `leaf` and compare against `root`.
#[must_use]
pub fn verify_proof(proof: &[Hash32], root: &Hash32, leaf: Hash32) -> bool {
    if proof.len() > MAX_PROOF_DEPTH {
        return false;
    }
    let computed = proof
        .iter()
        .fold(leaf, |acc, sibling| hash_pair(&acc, sibling));
    computed == *root
}

// ---------------------------------------------------------------------------
// EligibilityVerifier
// ---------------------------------------------------------------------------

/// Checks claimed allocations against one immutable root.
///
/// A domain-bound verifier hashes the domain into every leaf, so a proof
/// issued for one domain is useless on another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EligibilityVerifier {
    root: Hash32,
    domain_bound: bool,
}

impl EligibilityVerifier {
    /// Leaves are `(beneficiary, amount)`.
    #[must_use]
    pub fn new(root: Hash32) -> Self {
        Self {
            root,
            domain_bound: false,
        }
    }

    /// Leaves are `(beneficiary, amount, domain)`.
    #[must_use]
    pub fn domain_bound(root: Hash32) -> Self {
        Self {
            root,
            domain_bound: true,
        }
    }

    #[must_use]
    pub fn root(&self) -> &Hash32 {
        &self.root
    }

    #[must_use]
    pub fn is_domain_bound(&self) -> bool {
        self.domain_bound
    }

    /// Leaf hash this verifier expects for the tuple.
    #[must_use]
    pub fn leaf(&self, beneficiary: &Address, amount: u128, domain: Domain) -> Hash32 {
        hash_leaf(beneficiary, amount, self.domain_bound.then_some(domain))
    }

    /// `domain` is ignored unless the verifier is domain-bound.
    #[must_use]
    pub fn verify(
        &self,
        beneficiary: &Address,
        amount: u128,
        domain: Domain,
        proof: &[Hash32],
    ) -> bool {
        let ok = verify_proof(proof, &self.root, self.leaf(beneficiary, amount, domain));
        if !ok {
            tracing::warn!(
                beneficiary = %beneficiary,
                amount,
                domain = %domain,
                root = %hex::encode(self.root),
                "merkle proof rejected"
            );
        }
        ok
    }
}

// ---------------------------------------------------------------------------
// MerkleTree
// ---------------------------------------------------------------------------

/// In-memory tree over a fixed set of leaf hashes.
///
/// An unpaired node at the end of a level is promoted unchanged, so its
/// proof simply has no sibling for that level.
#[derive(Debug, Clone)]
pub struct MerkleTree {
    levels: Vec<Vec<Hash32>>,
}

impl MerkleTree {
    pub fn from_leaves(leaves: Vec<Hash32>) -> Result<Self> {
        if leaves.is_empty() {
            return Err(FairdropError::Configuration(
                "merkle tree needs at least one leaf".into(),
            ));
        }
        let mut levels = vec![leaves];
        while let Some(level) = levels.last().filter(|l| l.len() > 1) {
            let next = level
                .chunks(2)
                .map(|pair| match pair {
                    [a, b] => hash_pair(a, b),
                    _ => pair[0],
                })
                .collect();
            levels.push(next);
        }
        Ok(Self { levels })
    }

    /// Build from `(beneficiary, amount)` entries with optional domain binding.
    pub fn from_allocations(
        entries: &[(Address, u128)],
        domain: Option<Domain>,
    ) -> Result<Self> {
        Self::from_leaves(
            entries
                .iter()
                .map(|(beneficiary, amount)| hash_leaf(beneficiary, *amount, domain))
                .collect(),
        )
    }

    #[must_use]
    pub fn root(&self) -> Hash32 {
        // `from_leaves` guarantees a non-empty top level.
        self.levels
            .last()
            .and_then(|top| top.first())
            .copied()
            .unwrap_or_default()
    }

    #[must_use]
    pub fn leaf_count(&self) -> usize {
        self.levels.first().map_or(0, Vec::len)
    }

    /// Sibling path for the leaf at `index`.
    #[must_use]
    pub fn proof(&self, index: usize) -> Option<Vec<Hash32>> {
        if index >= self.leaf_count() {
            return None;
        }
        let mut proof = Vec::with_capacity(self.levels.len());
        let mut idx = index;
        for level in &self.levels[..self.levels.len() - 1] {
            if let Some(sibling) = level.get(idx ^ 1) {
                proof.push(*sibling);
            }
            idx /= 2;
        }
        Some(proof)
    }
}

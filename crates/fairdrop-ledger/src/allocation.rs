//! Where a beneficiary's entitlement comes from.
//!
//! A distributor resolves entitlements either from a Merkle root (the
//! beneficiary supplies amount and proof) or from a finished token sale
//! (the sale ledger knows what each buyer spent).

use std::sync::Arc;

use fairdrop_types::{Address, Domain, Evidence, FairdropError, Result};

use crate::EligibilityVerifier;

// ---------------------------------------------------------------------------
// Sale ledger
// ---------------------------------------------------------------------------

/// Read-only view of a finished token sale.
pub trait SaleLedger: Send + Sync {
    /// Amount `buyer` spent, in payment-token base units.
    fn buyer_total(&self, buyer: &Address) -> u128;
    /// Amount spent across all buyers.
    fn total(&self) -> u128;
    fn is_over(&self) -> bool;
}

/// Converts sale purchases into token entitlements at a fixed price.
///
/// `entitlement = spent * 10^decimals / price`, rounded down.
pub struct SaleAllocation {
    sale: Arc<dyn SaleLedger>,
    price: u128,
    scale: u128,
}

impl SaleAllocation {
    /// # Errors
    /// `SaleNotOver` while the sale is open, `TotalIsZero` if the sale
    /// converts to no tokens at all, `Configuration` for a zero price.
    pub fn new(sale: Arc<dyn SaleLedger>, price: u128, decimals: u32) -> Result<Self> {
        if !sale.is_over() {
            return Err(FairdropError::SaleNotOver);
        }
        if price == 0 {
            return Err(FairdropError::Configuration("token price must be positive".into()));
        }
        let scale = 10u128
            .checked_pow(decimals)
            .ok_or(FairdropError::ArithmeticOverflow {
                context: "sale decimals",
            })?;
        let allocation = Self { sale, price, scale };
        if allocation.total()? == 0 {
            return Err(FairdropError::TotalIsZero);
        }
        Ok(allocation)
    }

    fn convert(&self, spent: u128) -> Result<u128> {
        spent
            .checked_mul(self.scale)
            .map(|scaled| scaled / self.price)
            .ok_or(FairdropError::ArithmeticOverflow {
                context: "sale entitlement",
            })
    }

    /// Tokens owed to `buyer`. Zero for non-buyers.
    pub fn entitlement(&self, buyer: &Address) -> Result<u128> {
        self.convert(self.sale.buyer_total(buyer))
    }

    /// Tokens owed across the whole sale.
    pub fn total(&self) -> Result<u128> {
        self.convert(self.sale.total())
    }
}

impl std::fmt::Debug for SaleAllocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SaleAllocation")
            .field("price", &self.price)
            .field("scale", &self.scale)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// AllocationSource
// ---------------------------------------------------------------------------

/// The entitlement oracle a distributor runs against.
#[derive(Debug)]
pub enum AllocationSource {
    Merkle(EligibilityVerifier),
    Sale(SaleAllocation),
}

impl AllocationSource {
    /// Resolve and authenticate `beneficiary`'s entitlement.
    ///
    /// `domain` is the leaf domain for domain-bound roots.
    ///
    /// # Errors
    /// `InvalidProof` if Merkle evidence is missing or wrong,
    /// `NoAllocationFound` if the entitlement is zero.
    pub fn resolve(
        &self,
        beneficiary: &Address,
        evidence: &Evidence,
        domain: Domain,
    ) -> Result<u128> {
        let amount = match (self, evidence) {
            (Self::Merkle(verifier), Evidence::Merkle(merkle)) => {
                let leaf_domain = merkle.domain.unwrap_or(domain);
                if !verifier.verify(beneficiary, merkle.amount, leaf_domain, &merkle.proof) {
                    return Err(FairdropError::InvalidProof {
                        beneficiary: *beneficiary,
                    });
                }
                merkle.amount
            }
            (Self::Merkle(_), Evidence::None) => {
                return Err(FairdropError::InvalidProof {
                    beneficiary: *beneficiary,
                });
            }
            (Self::Sale(sale), _) => sale.entitlement(beneficiary)?,
        };
        if amount == 0 {
            return Err(FairdropError::NoAllocationFound {
                beneficiary: *beneficiary,
            });
        }
        Ok(amount)
    }

    /// Entitlement readable without evidence (sale-backed sources only).
    pub fn inferred_total(&self, beneficiary: &Address) -> Result<Option<u128>> {
        match self {
            Self::Merkle(_) => Ok(None),
            Self::Sale(sale) => sale.entitlement(beneficiary).map(Some),
        }
    }
}

// ---------------------------------------------------------------------------
// In-memory sale ledger
// ---------------------------------------------------------------------------

/// Purchases recorded by an in-memory sale.
#[cfg(any(test, feature = "test-helpers"))]
#[derive(Debug, Default)]
pub struct SalePurchases {
    spent: std::sync::RwLock<std::collections::HashMap<Address, u128>>,
    over: std::sync::atomic::AtomicBool,
}

#[cfg(any(test, feature = "test-helpers"))]
impl SalePurchases {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn buy(&self, buyer: Address, amount: u128) {
        let mut spent = self
            .spent
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        *spent.entry(buyer).or_insert(0) += amount;
    }

    pub fn finish(&self) {
        self.over.store(true, std::sync::atomic::Ordering::SeqCst);
    }
}

#[cfg(any(test, feature = "test-helpers"))]
impl SaleLedger for SalePurchases {
    fn buyer_total(&self, buyer: &Address) -> u128 {
        self.spent
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get(buyer)
            .copied()
            .unwrap_or(0)
    }

    fn total(&self) -> u128 {
        self.spent
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .values()
            .sum()
    }

    fn is_over(&self) -> bool {
        self.over.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MerkleTree;
    use fairdrop_types::MerkleEvidence;

    fn finished_sale() -> Arc<SalePurchases> {
        let sale = Arc::new(SalePurchases::new());
        // 6-decimal payment token: 100 and 250 units spent.
        sale.buy(Address::from_low_u64(1), 100_000_000);
        sale.buy(Address::from_low_u64(2), 250_000_000);
        sale.finish();
        sale
    }

    #[test]
    fn sale_must_be_over() {
        let sale = Arc::new(SalePurchases::new());
        sale.buy(Address::from_low_u64(1), 1);
        assert!(matches!(
            SaleAllocation::new(sale, 1, 0),
            Err(FairdropError::SaleNotOver)
        ));
    }

    #[test]
    fn empty_sale_is_zero_total() {
        let sale = Arc::new(SalePurchases::new());
        sale.finish();
        assert!(matches!(
            SaleAllocation::new(sale, 1, 18),
            Err(FairdropError::TotalIsZero)
        ));
    }

    #[test]
    fn entitlement_converts_at_price() {
        // Price 0.5 payment units per token expressed with 6 decimals.
        let alloc = SaleAllocation::new(finished_sale(), 500_000, 6).unwrap();
        assert_eq!(
            alloc.entitlement(&Address::from_low_u64(1)).unwrap(),
            200_000_000
        );
        assert_eq!(alloc.total().unwrap(), 700_000_000);
        assert_eq!(alloc.entitlement(&Address::from_low_u64(9)).unwrap(), 0);
    }

    #[test]
    fn sale_source_rejects_non_buyers() {
        let source =
            AllocationSource::Sale(SaleAllocation::new(finished_sale(), 1_000_000, 6).unwrap());
        assert_eq!(
            source
                .resolve(&Address::from_low_u64(2), &Evidence::None, Domain(1))
                .unwrap(),
            250_000_000
        );
        assert!(matches!(
            source.resolve(&Address::from_low_u64(3), &Evidence::None, Domain(1)),
            Err(FairdropError::NoAllocationFound { .. })
        ));
        assert_eq!(
            source.inferred_total(&Address::from_low_u64(1)).unwrap(),
            Some(100_000_000)
        );
    }

    #[test]
    fn merkle_source_checks_proof_and_zero() {
        let entries = [(Address::from_low_u64(1), 500), (Address::from_low_u64(2), 0)];
        let tree = MerkleTree::from_allocations(&entries, None).unwrap();
        let source = AllocationSource::Merkle(EligibilityVerifier::new(tree.root()));

        let ok = MerkleEvidence::new(500, tree.proof(0).unwrap()).into();
        assert_eq!(source.resolve(&entries[0].0, &ok, Domain(1)).unwrap(), 500);

        let forged = MerkleEvidence::new(5000, tree.proof(0).unwrap()).into();
        assert!(matches!(
            source.resolve(&entries[0].0, &forged, Domain(1)),
            Err(FairdropError::InvalidProof { .. })
        ));

        let zero = MerkleEvidence::new(0, tree.proof(1).unwrap()).into();
        assert!(matches!(
            source.resolve(&entries[1].0, &zero, Domain(1)),
            Err(FairdropError::NoAllocationFound { .. })
        ));

        assert!(matches!(
            source.resolve(&entries[0].0, &Evidence::None, Domain(1)),
            Err(FairdropError::InvalidProof { .. })
        ));
        assert_eq!(source.inferred_total(&entries[0].0).unwrap(), None);
    }
}

//! Token balances on one domain.
//!
//! Tracks per-(asset, holder) balances and checks after every movement
//! that the supply is conserved:
//! ```text
//! ∀ asset: Σ balances == Σ minted
//! ```

use std::collections::HashMap;

use fairdrop_types::{Address, FairdropError, Result};

/// Per-(asset, holder) token balances.
#[derive(Debug, Default)]
pub struct TokenTreasury {
    balances: HashMap<(Address, Address), u128>,
    minted: HashMap<Address, u128>,
}

impl TokenTreasury {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create `amount` of `asset` in `to`'s balance.
    pub fn mint(&mut self, asset: Address, to: Address, amount: u128) -> Result<()> {
        let overflow = || FairdropError::ArithmeticOverflow {
            context: "token mint",
        };
        let balance = self
            .balance(&asset, &to)
            .checked_add(amount)
            .ok_or_else(overflow)?;
        let minted = self
            .minted
            .get(&asset)
            .copied()
            .unwrap_or(0)
            .checked_add(amount)
            .ok_or_else(overflow)?;
        self.balances.insert((asset, to), balance);
        self.minted.insert(asset, minted);
        Ok(())
    }

    /// Move `amount` of `asset` from `from` to `to`.
    ///
    /// # Errors
    /// `InsufficientFunds` if `from` holds less than `amount`.
    pub fn transfer(
        &mut self,
        asset: Address,
        from: Address,
        to: Address,
        amount: u128,
    ) -> Result<()> {
        let available = self.balance(&asset, &from);
        if available < amount {
            return Err(FairdropError::InsufficientFunds {
                needed: amount,
                available,
            });
        }
        if from == to {
            return Ok(());
        }
        let credited = self
            .balance(&asset, &to)
            .checked_add(amount)
            .ok_or(FairdropError::ArithmeticOverflow {
                context: "token transfer",
            })?;
        self.balances.insert((asset, from), available - amount);
        self.balances.insert((asset, to), credited);
        Ok(())
    }

    #[must_use]
    pub fn balance(&self, asset: &Address, holder: &Address) -> u128 {
        self.balances.get(&(*asset, *holder)).copied().unwrap_or(0)
    }

    /// Sum of all holders' balances of `asset`.
    #[must_use]
    pub fn total_supply(&self, asset: &Address) -> u128 {
        self.balances
            .iter()
            .filter(|((a, _), _)| a == asset)
            .map(|(_, amount)| *amount)
            .sum()
    }

    /// Everything ever minted of `asset`.
    #[must_use]
    pub fn expected_supply(&self, asset: &Address) -> u128 {
        self.minted.get(asset).copied().unwrap_or(0)
    }

    /// # Errors
    /// `SupplyInvariantViolation` if balances and issuance disagree.
    pub fn verify_supply(&self, asset: &Address) -> Result<()> {
        let actual = self.total_supply(asset);
        let expected = self.expected_supply(asset);
        if actual != expected {
            return Err(FairdropError::SupplyInvariantViolation {
                reason: format!("asset {asset}: actual supply {actual} != minted {expected}"),
            });
        }
        Ok(())
    }
}

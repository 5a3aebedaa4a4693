//! Per-token pools and per-(token, provider) stakes

use std::collections::{BTreeMap, BTreeSet};

use fxswap_common::{Address, Amount};
use primitive_types::U256;

use crate::error::{LedgerError, LedgerResult};
use crate::math::{add, sub};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Pool {
    /// Sum of all provider stakes for this token
    pub total_staked: Amount,
    /// Tokens the ledger holds for this pool: deposits + swap inputs - swap outputs
    pub holdings: Amount,
    /// Cumulative provider fee value per unit of stake, scaled by FEE_SCALE
    pub fee_index: U256,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Stake {
    pub amount: Amount,
    /// Pool fee index at the last settlement
    pub fee_checkpoint: U256,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LiquidityLedger {
    pools: BTreeMap<Address, Pool>,
    stakes: BTreeMap<(Address, Address), Stake>,
    providers: BTreeSet<Address>,
}

impl LiquidityLedger {
    pub fn pool(&self, token: &Address) -> Option<&Pool> {
        self.pools.get(token)
    }

    pub fn pool_mut(&mut self, token: &Address) -> &mut Pool {
        self.pools.entry(*token).or_default()
    }

    pub fn stake(&self, token: &Address, provider: &Address) -> Option<&Stake> {
        self.stakes.get(&(*token, *provider))
    }

    /// Stake amount, zero if never deposited
    pub fn stake_amount(&self, token: &Address, provider: &Address) -> Amount {
        self.stake(token, provider).map(|s| s.amount).unwrap_or(0)
    }

    pub fn holdings(&self, token: &Address) -> Amount {
        self.pool(token).map(|p| p.holdings).unwrap_or(0)
    }

    /// True once the provider deposited any token
    pub fn has_history(&self, provider: &Address) -> bool {
        self.providers.contains(provider)
    }

    pub fn providers(&self) -> impl Iterator<Item = &Address> {
        self.providers.iter()
    }

    pub fn pools(&self) -> impl Iterator<Item = (&Address, &Pool)> {
        self.pools.iter()
    }

    pub fn stakes(&self) -> impl Iterator<Item = (&(Address, Address), &Stake)> {
        self.stakes.iter()
    }

    /// Split borrow of a pool and one of its stakes, creating both on demand.
    /// A new stake starts checkpointed at the pool's current fee index.
    pub fn pool_and_stake(&mut self, token: &Address, provider: &Address) -> (&Pool, &mut Stake) {
        let pool = self.pools.entry(*token).or_default();
        let stake = self.stakes.entry((*token, *provider)).or_insert_with(|| Stake {
            amount: 0,
            fee_checkpoint: pool.fee_index,
        });
        (pool, stake)
    }

    pub fn existing_pool_and_stake(&mut self, token: &Address, provider: &Address) -> Option<(&Pool, &mut Stake)> {
        let pool = self.pools.get(token)?;
        let stake = self.stakes.get_mut(&(*token, *provider))?;
        Some((pool, stake))
    }

    /// Credit a deposit. Pending fees must be settled by the caller first.
    pub fn deposit(&mut self, token: &Address, provider: &Address, amount: Amount) -> LedgerResult<Amount> {
        let pool = self.pools.entry(*token).or_default();
        let new_total = add(pool.total_staked, amount)?;
        let new_holdings = add(pool.holdings, amount)?;
        let stake = self.stakes.entry((*token, *provider)).or_insert_with(|| Stake {
            amount: 0,
            fee_checkpoint: pool.fee_index,
        });
        let new_stake = add(stake.amount, amount)?;

        stake.amount = new_stake;
        pool.total_staked = new_total;
        pool.holdings = new_holdings;
        self.providers.insert(*provider);
        Ok(new_stake)
    }

    pub fn receive(&mut self, token: &Address, amount: Amount) -> LedgerResult<()> {
        let pool = self.pool_mut(token);
        pool.holdings = add(pool.holdings, amount)?;
        Ok(())
    }

    pub fn release(&mut self, token: &Address, amount: Amount) -> LedgerResult<()> {
        let available = self.holdings(token);
        if available < amount {
            return Err(LedgerError::InsufficientReserve {
                available,
                required: amount,
            });
        }
        let pool = self.pool_mut(token);
        pool.holdings = sub(pool.holdings, amount)?;
        Ok(())
    }
}

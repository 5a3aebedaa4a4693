//! Fee distributor: reward reserve, accrued balances and payouts
//!
//! Provider fees are attributed through a per-pool cumulative index so a
//! swap never iterates over providers. Balances are kept scaled by
//! `FEE_SCALE`; a payout transfers the whole-unit part and keeps the rest.
//! Rounding residue of a proportional split goes to the administrator, so
//! scaled balances always sum to exactly `outstanding * FEE_SCALE`.

use std::collections::BTreeMap;

use fxswap_common::{Address, Amount};
use primitive_types::U256;

use crate::error::{LedgerError, LedgerResult};
use crate::liquidity::{Pool, Stake};
use crate::math::{add, add_wide, mul_wide, scale, sub, sub_wide, unscale};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FeeDistributor {
    /// Reward tokens held by the ledger
    reserve: Amount,
    /// Reward units accrued but not yet paid
    outstanding: Amount,
    provider_earned: BTreeMap<Address, U256>,
    admin_earned: U256,
    total_accrued: Amount,
    total_paid: Amount,
}

/// Scaled fees a stake earned since its last settlement
pub fn pending(pool: &Pool, stake: &Stake) -> LedgerResult<U256> {
    let growth = sub_wide(pool.fee_index, stake.fee_checkpoint)?;
    mul_wide(U256::from(stake.amount), growth)
}

impl FeeDistributor {
    pub fn reserve(&self) -> Amount {
        self.reserve
    }

    pub fn outstanding(&self) -> Amount {
        self.outstanding
    }

    pub fn total_accrued(&self) -> Amount {
        self.total_accrued
    }

    pub fn total_paid(&self) -> Amount {
        self.total_paid
    }

    /// Settled scaled balance of a provider (excludes pending pool fees)
    pub fn provider_earned(&self, provider: &Address) -> U256 {
        self.provider_earned.get(provider).copied().unwrap_or_default()
    }

    pub fn provider_balances(&self) -> impl Iterator<Item = (&Address, &U256)> {
        self.provider_earned.iter()
    }

    pub fn admin_earned(&self) -> U256 {
        self.admin_earned
    }

    pub fn fund(&mut self, amount: Amount) -> LedgerResult<Amount> {
        self.reserve = add(self.reserve, amount)?;
        Ok(self.reserve)
    }

    /// Fail unless the reserve can back `fee_value` more reward units
    pub fn ensure_coverage(&self, fee_value: Amount) -> LedgerResult<()> {
        let required = add(self.outstanding, fee_value)?;
        if required > self.reserve {
            return Err(LedgerError::InsufficientReserve {
                available: self.reserve.saturating_sub(self.outstanding),
                required: fee_value,
            });
        }
        Ok(())
    }

    /// Book `fee_value` reward units as owed. Callers then attribute the
    /// same total through `credit_admin` and `credit_pool`.
    pub fn record_accrual(&mut self, fee_value: Amount) -> LedgerResult<()> {
        self.ensure_coverage(fee_value)?;
        self.outstanding = add(self.outstanding, fee_value)?;
        self.total_accrued = add(self.total_accrued, fee_value)?;
        Ok(())
    }

    pub fn credit_admin(&mut self, value: Amount) -> LedgerResult<()> {
        self.admin_earned = add_wide(self.admin_earned, scale(value))?;
        Ok(())
    }

    /// Spread `provider_value` over the pool's stakes. A pool without stakes
    /// hands its share to the administrator.
    pub fn credit_pool(&mut self, pool: &mut Pool, provider_value: Amount) -> LedgerResult<()> {
        if provider_value == 0 {
            return Ok(());
        }
        let scaled = scale(provider_value);
        if pool.total_staked == 0 {
            self.admin_earned = add_wide(self.admin_earned, scaled)?;
            return Ok(());
        }

        let total = U256::from(pool.total_staked);
        let delta = scaled / total;
        let dust = sub_wide(scaled, mul_wide(delta, total)?)?;

        pool.fee_index = add_wide(pool.fee_index, delta)?;
        self.admin_earned = add_wide(self.admin_earned, dust)?;
        Ok(())
    }

    /// Move a stake's pending fees into the provider's balance
    pub fn settle(&mut self, provider: &Address, pool: &Pool, stake: &mut Stake) -> LedgerResult<()> {
        let earned = pending(pool, stake)?;
        if !earned.is_zero() {
            let balance = self.provider_earned.entry(*provider).or_default();
            *balance = add_wide(*balance, earned)?;
        }
        stake.fee_checkpoint = pool.fee_index;
        Ok(())
    }

    /// Zero the whole-unit part of a provider's settled balance and
    /// return it
    pub fn take_provider_payout(&mut self, provider: &Address) -> LedgerResult<Amount> {
        let balance = self.provider_earned(provider);
        let payout = unscale(balance)?;
        if payout == 0 {
            return Ok(0);
        }
        let remainder = sub_wide(balance, scale(payout))?;
        self.pay(payout)?;
        self.provider_earned.insert(*provider, remainder);
        Ok(payout)
    }

    pub fn take_admin_payout(&mut self) -> LedgerResult<Amount> {
        let payout = unscale(self.admin_earned)?;
        if payout == 0 {
            return Ok(0);
        }
        let remainder = sub_wide(self.admin_earned, scale(payout))?;
        self.pay(payout)?;
        self.admin_earned = remainder;
        Ok(payout)
    }

    fn pay(&mut self, amount: Amount) -> LedgerResult<()> {
        if self.reserve < amount {
            return Err(LedgerError::InsufficientReserve {
                available: self.reserve,
                required: amount,
            });
        }
        self.reserve = sub(self.reserve, amount)?;
        self.outstanding = sub(self.outstanding, amount)?;
        self.total_paid = add(self.total_paid, amount)?;
        Ok(())
    }
}

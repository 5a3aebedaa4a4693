//! Complete ledger state and its read accessors

use fxswap_common::{Address, Amount};
use primitive_types::U256;
use serde::Serialize;

use crate::error::{LedgerError, LedgerResult};
use crate::fees::{pending, FeeDistributor};
use crate::liquidity::LiquidityLedger;
use crate::math::{add_wide, unscale, Rate};
use crate::rates::RateTable;
use crate::registry::Registry;
use crate::swap::{compute_quote, FeeParams, SwapQuote};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LedgerState {
    pub admin: Address,
    pub registry: Registry,
    pub params: FeeParams,
    pub rates: RateTable,
    pub liquidity: LiquidityLedger,
    pub fees: FeeDistributor,
}

/// Aggregate figures for one token pool
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PoolTotals {
    pub total_staked: Amount,
    pub holdings: Amount,
}

impl LedgerState {
    pub fn new(admin: Address, registry: Registry, params: FeeParams) -> LedgerResult<Self> {
        params.validate()?;
        Ok(Self {
            admin,
            registry,
            params,
            rates: RateTable::default(),
            liquidity: LiquidityLedger::default(),
            fees: FeeDistributor::default(),
        })
    }

    pub fn reward_token(&self) -> Address {
        self.registry.reward_token()
    }

    pub fn rate(&self, token: &Address) -> Rate {
        self.rates.get(token)
    }

    pub fn liquidity_stake(&self, token: &Address, provider: &Address) -> Amount {
        self.liquidity.stake_amount(token, provider)
    }

    pub fn has_stake_history(&self, provider: &Address) -> bool {
        self.liquidity.has_history(provider)
    }

    pub fn holdings(&self, token: &Address) -> Amount {
        self.liquidity.holdings(token)
    }

    pub fn pool_totals(&self, token: &Address) -> PoolTotals {
        self.liquidity
            .pool(token)
            .map(|p| PoolTotals {
                total_staked: p.total_staked,
                holdings: p.holdings,
            })
            .unwrap_or_default()
    }

    pub fn reward_reserve(&self) -> Amount {
        self.fees.reserve()
    }

    /// Settled plus pending scaled fees of a provider across every pool
    pub fn provider_fees_scaled(&self, provider: &Address) -> LedgerResult<U256> {
        let mut total = self.fees.provider_earned(provider);
        for token in self.registry.tokens() {
            if let (Some(pool), Some(stake)) = (self.liquidity.pool(token), self.liquidity.stake(token, provider)) {
                total = add_wide(total, pending(pool, stake)?)?;
            }
        }
        Ok(total)
    }

    /// Whole reward units a provider could withdraw now
    pub fn provider_fees(&self, provider: &Address) -> LedgerResult<Amount> {
        unscale(self.provider_fees_scaled(provider)?)
    }

    pub fn owner_fees(&self) -> LedgerResult<Amount> {
        unscale(self.fees.admin_earned())
    }

    /// Price a swap without applying it. Fails with the same precondition
    /// errors as the swap itself.
    pub fn quote(&self, token_in: &Address, token_out: &Address, amount_in: Amount) -> LedgerResult<SwapQuote> {
        self.registry.require(token_in)?;
        self.registry.require(token_out)?;
        if token_in == token_out {
            return Err(LedgerError::SameToken);
        }
        if amount_in == 0 {
            return Err(LedgerError::ZeroAmount);
        }
        let rate_in = self.rates.get(token_in);
        if rate_in == 0 {
            return Err(LedgerError::UnpricedToken(*token_in));
        }
        let rate_out = self.rates.get(token_out);
        if rate_out == 0 {
            return Err(LedgerError::UnpricedToken(*token_out));
        }
        compute_quote(rate_in, rate_out, amount_in, &self.params)
    }
}

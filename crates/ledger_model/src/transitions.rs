//! State transition functions - all total, no panics
//!
//! Each operation takes the current state by value, checks every
//! precondition, applies its effects and returns the next state together
//! with the token movements the runtime must perform afterwards. A failed
//! precondition returns an error and the caller keeps its untouched state.

use fxswap_common::{Address, Amount};

use crate::access::require_admin;
use crate::error::{LedgerError, LedgerResult};
use crate::math::Rate;
use crate::state::LedgerState;
use crate::swap::{provider_allocation, SwapQuote};

/// A token movement between the ledger and an account
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Interaction {
    /// `from` -> ledger, spending the allowance `from` gave the ledger
    Pull { token: Address, from: Address, amount: Amount },
    /// ledger -> `to`
    Push { token: Address, to: Address, amount: Amount },
}

impl Interaction {
    pub fn token(&self) -> Address {
        match self {
            Interaction::Pull { token, .. } | Interaction::Push { token, .. } => *token,
        }
    }

    pub fn amount(&self) -> Amount {
        match self {
            Interaction::Pull { amount, .. } | Interaction::Push { amount, .. } => *amount,
        }
    }
}

/// Result of a successful transition. Interactions are ordered with every
/// pull before any push.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transition<R> {
    pub state: LedgerState,
    pub output: R,
    pub interactions: Vec<Interaction>,
}

impl<R> Transition<R> {
    fn new(state: LedgerState, output: R) -> Self {
        Self {
            state,
            output,
            interactions: Vec::new(),
        }
    }

    fn pull(mut self, token: Address, from: Address, amount: Amount) -> Self {
        if amount > 0 {
            self.interactions.push(Interaction::Pull { token, from, amount });
        }
        self
    }

    fn push(mut self, token: Address, to: Address, amount: Amount) -> Self {
        if amount > 0 {
            self.interactions.push(Interaction::Push { token, to, amount });
        }
        self
    }
}

/// Overwrite the rate of an accepted token (admin only)
pub fn set_rate(mut s: LedgerState, caller: Address, token: Address, rate: Rate) -> LedgerResult<Transition<()>> {
    require_admin(&s.admin, &caller)?;
    s.registry.require(&token)?;

    s.rates.set(token, rate);
    Ok(Transition::new(s, ()))
}

/// Deposit liquidity; returns the caller's new stake in `token`
pub fn add_liquidity(
    mut s: LedgerState,
    caller: Address,
    token: Address,
    amount: Amount,
) -> LedgerResult<Transition<Amount>> {
    s.registry.require(&token)?;
    if amount == 0 {
        return Err(LedgerError::ZeroAmount);
    }

    // Fees accrued so far belong to the stake as it was
    let (pool, stake) = s.liquidity.pool_and_stake(&token, &caller);
    s.fees.settle(&caller, pool, stake)?;
    let staked = s.liquidity.deposit(&token, &caller, amount)?;

    Ok(Transition::new(s, staked).pull(token, caller, amount))
}

/// Swap `amount_in` of `token_in` for `token_out` at the current rates
pub fn swap(
    mut s: LedgerState,
    caller: Address,
    token_in: Address,
    token_out: Address,
    amount_in: Amount,
) -> LedgerResult<Transition<SwapQuote>> {
    let quote = s.quote(&token_in, &token_out, amount_in)?;

    let available = s.liquidity.holdings(&token_out);
    if available < quote.net_out {
        return Err(LedgerError::InsufficientReserve {
            available,
            required: quote.net_out,
        });
    }

    s.fees.record_accrual(quote.fee_value)?;
    s.fees.credit_admin(quote.admin_value)?;
    for (token, value) in provider_allocation(s.params.fee_source, token_in, token_out, quote.provider_value) {
        let pool = s.liquidity.pool_mut(&token);
        s.fees.credit_pool(pool, value)?;
    }

    s.liquidity.receive(&token_in, amount_in)?;
    s.liquidity.release(&token_out, quote.net_out)?;

    Ok(Transition::new(s, quote)
        .pull(token_in, caller, amount_in)
        .push(token_out, caller, quote.net_out))
}

/// Fund the reward reserve (admin only); returns the new reserve
pub fn add_reward_reserve(mut s: LedgerState, caller: Address, amount: Amount) -> LedgerResult<Transition<Amount>> {
    require_admin(&s.admin, &caller)?;
    if amount == 0 {
        return Err(LedgerError::ZeroAmount);
    }

    let reserve = s.fees.fund(amount)?;
    let reward_token = s.reward_token();
    Ok(Transition::new(s, reserve).pull(reward_token, caller, amount))
}

/// Pay out everything the caller earned as a provider
pub fn withdraw_provider_fees(mut s: LedgerState, caller: Address) -> LedgerResult<Transition<Amount>> {
    if !s.liquidity.has_history(&caller) {
        return Err(LedgerError::NoStakeHistory);
    }

    for token in s.registry.tokens() {
        if let Some((pool, stake)) = s.liquidity.existing_pool_and_stake(token, &caller) {
            s.fees.settle(&caller, pool, stake)?;
        }
    }
    let payout = s.fees.take_provider_payout(&caller)?;

    let reward_token = s.reward_token();
    Ok(Transition::new(s, payout).push(reward_token, caller, payout))
}

/// Pay out the administrator's fee balance (admin only)
pub fn withdraw_owner_fees(mut s: LedgerState, caller: Address) -> LedgerResult<Transition<Amount>> {
    require_admin(&s.admin, &caller)?;

    let payout = s.fees.take_admin_payout()?;

    let reward_token = s.reward_token();
    Ok(Transition::new(s, payout).push(reward_token, caller, payout))
}

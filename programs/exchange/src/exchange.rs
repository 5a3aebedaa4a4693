//! Serialized, atomic ledger runtime
//!
//! All state lives in one slot behind a re-entrant lock. A mutating call
//! locks the slot, computes the next state from a copy, commits it, and only
//! then issues token interactions with the borrow released but the lock still
//! held. Other threads wait on the lock. A token that calls back into the
//! exchange from the same thread can read the committed state but cannot
//! start another mutation.

use std::cell::RefCell;

use fxswap_common::{Address, Amount, TokenInterface};
use ledger_model::{LedgerError, LedgerResult, LedgerState, PoolTotals, Rate, SwapQuote, Transition};
use parking_lot::ReentrantMutex;

use crate::config::ExchangeConfig;
use crate::interactions;

struct Slot {
    state: LedgerState,
    /// Interactions of a committed transition are running
    in_flight: bool,
}

/// Clears `in_flight` when dropped and restores the previous state unless
/// committed, including when the interactions unwind
struct Rollback<'a> {
    slot: &'a RefCell<Slot>,
    previous: Option<LedgerState>,
}

impl Rollback<'_> {
    fn commit(mut self) {
        self.previous = None;
    }
}

impl Drop for Rollback<'_> {
    fn drop(&mut self) {
        if let Ok(mut slot) = self.slot.try_borrow_mut() {
            slot.in_flight = false;
            if let Some(previous) = self.previous.take() {
                slot.state = previous;
            }
        }
    }
}

pub struct Exchange<T> {
    address: Address,
    tokens: T,
    slot: ReentrantMutex<RefCell<Slot>>,
}

impl<T: TokenInterface> Exchange<T> {
    /// `address` is the account that holds the exchange's tokens
    pub fn new(address: Address, state: LedgerState, tokens: T) -> Self {
        log::info!(
            "exchange {} created: admin {}, reward token {}, {} tokens",
            address,
            state.admin,
            state.reward_token(),
            state.registry.tokens().len()
        );
        Self {
            address,
            tokens,
            slot: ReentrantMutex::new(RefCell::new(Slot {
                state,
                in_flight: false,
            })),
        }
    }

    pub fn from_config(address: Address, config: &ExchangeConfig, tokens: T) -> LedgerResult<Self> {
        Ok(Self::new(address, config.build_state()?, tokens))
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn tokens(&self) -> &T {
        &self.tokens
    }

    /// Run one operation atomically. `transition` sees a copy of the current
    /// state; its result is committed before any token moves and rolled back
    /// if a token movement fails.
    pub(crate) fn transact<R>(
        &self,
        op: &'static str,
        caller: &Address,
        transition: impl FnOnce(LedgerState) -> LedgerResult<Transition<R>>,
    ) -> LedgerResult<R> {
        let guard = self.slot.lock();

        let (previous, output, plan) = {
            let mut slot = guard.try_borrow_mut().map_err(|_| LedgerError::Reentrancy)?;
            if slot.in_flight {
                log::warn!("{} from {} rejected: re-entrant call", op, caller);
                return Err(LedgerError::Reentrancy);
            }

            let Transition {
                state,
                output,
                interactions,
            } = transition(slot.state.clone()).map_err(|err| {
                log::warn!("{} from {} rejected: {}", op, caller, err);
                err
            })?;

            let previous = std::mem::replace(&mut slot.state, state);
            slot.in_flight = true;
            (previous, output, interactions)
        };

        let rollback = Rollback {
            slot: &guard,
            previous: Some(previous),
        };
        match interactions::execute(&self.tokens, &self.address, &plan) {
            Ok(()) => {
                rollback.commit();
                Ok(output)
            }
            Err(err) => {
                drop(rollback);
                log::warn!("{} from {} rolled back: {}", op, caller, err);
                Err(LedgerError::TransferFailed(err))
            }
        }
    }

    /// Read the committed state. Callable from inside a token callback.
    pub fn read<R>(&self, f: impl FnOnce(&LedgerState) -> R) -> R {
        let guard = self.slot.lock();
        let slot = guard.borrow();
        f(&slot.state)
    }

    pub fn snapshot(&self) -> LedgerState {
        self.read(|s| s.clone())
    }

    pub fn admin(&self) -> Address {
        self.read(|s| s.admin)
    }

    pub fn reward_token(&self) -> Address {
        self.read(|s| s.reward_token())
    }

    pub fn accepted_tokens(&self) -> Vec<Address> {
        self.read(|s| s.registry.tokens().to_vec())
    }

    pub fn rates(&self, token: &Address) -> Rate {
        self.read(|s| s.rate(token))
    }

    pub fn liquidity_stakes(&self, token: &Address, provider: &Address) -> Amount {
        self.read(|s| s.liquidity_stake(token, provider))
    }

    pub fn provider_fees(&self, provider: &Address) -> LedgerResult<Amount> {
        self.read(|s| s.provider_fees(provider))
    }

    pub fn owner_fees(&self) -> LedgerResult<Amount> {
        self.read(|s| s.owner_fees())
    }

    pub fn reward_reserve(&self) -> Amount {
        self.read(|s| s.reward_reserve())
    }

    pub fn holdings(&self, token: &Address) -> Amount {
        self.read(|s| s.holdings(token))
    }

    pub fn pool_totals(&self, token: &Address) -> PoolTotals {
        self.read(|s| s.pool_totals(token))
    }

    /// Preview a swap at the current rates
    pub fn quote(&self, token_in: &Address, token_out: &Address, amount_in: Amount) -> LedgerResult<SwapQuote> {
        let quote = self.read(|s| s.quote(token_in, token_out, amount_in))?;
        log::debug!(
            "quote {} {} -> {}: gross {}, fee {}, net {}",
            amount_in,
            token_in,
            token_out,
            quote.gross_out,
            quote.fee,
            quote.net_out
        );
        Ok(quote)
    }
}

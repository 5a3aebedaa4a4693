//! Deposit liquidity

use fxswap_common::{Address, Amount, TokenInterface};
use ledger_model::LedgerResult;

use crate::exchange::Exchange;

impl<T: TokenInterface> Exchange<T> {
    /// Pull `amount` of `token` from the caller (who must have approved the
    /// exchange) and credit it to the caller's stake. Returns the new stake.
    pub fn add_liquidity(&self, caller: &Address, token: &Address, amount: Amount) -> LedgerResult<Amount> {
        let stake = self.transact("add_liquidity", caller, |s| {
            ledger_model::add_liquidity(s, *caller, *token, amount)
        })?;
        log::info!("{} added {} of {} (stake {})", caller, amount, token, stake);
        Ok(stake)
    }
}

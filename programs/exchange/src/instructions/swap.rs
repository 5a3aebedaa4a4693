//! Fixed-rate swap

use fxswap_common::{Address, Amount, TokenInterface};
use ledger_model::{LedgerResult, SwapQuote};

use crate::exchange::Exchange;

impl<T: TokenInterface> Exchange<T> {
    /// Swap `amount_in` of `token_in` for `token_out`.
    ///
    /// The caller must have approved `amount_in` to the exchange. Receives
    /// `net_out` of `token_out`; the fee stays in the pool and its value in
    /// reward units is credited to providers and the administrator.
    pub fn swap(
        &self,
        caller: &Address,
        token_in: &Address,
        token_out: &Address,
        amount_in: Amount,
    ) -> LedgerResult<SwapQuote> {
        let quote = self.transact("swap", caller, |s| {
            ledger_model::swap(s, *caller, *token_in, *token_out, amount_in)
        })?;
        log::debug!(
            "{} swapped {} {} for {} {} (fee {}, fee value {})",
            caller,
            amount_in,
            token_in,
            quote.net_out,
            token_out,
            quote.fee,
            quote.fee_value
        );
        Ok(quote)
    }
}

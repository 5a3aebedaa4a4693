//! Set a token's fixed rate

use fxswap_common::{Address, TokenInterface};
use ledger_model::{LedgerResult, Rate};

use crate::exchange::Exchange;

impl<T: TokenInterface> Exchange<T> {
    /// Overwrite the rate of an accepted token. Admin only; a zero rate
    /// disables swaps into and out of the token.
    pub fn set_rate(&self, caller: &Address, token: &Address, rate: Rate) -> LedgerResult<()> {
        self.transact("set_rate", caller, |s| ledger_model::set_rate(s, *caller, *token, rate))?;
        log::info!("rate of {} set to {}", token, rate);
        Ok(())
    }
}

//! Fee payouts

use fxswap_common::{Address, Amount, TokenInterface};
use ledger_model::LedgerResult;

use crate::exchange::Exchange;

impl<T: TokenInterface> Exchange<T> {
    /// Pay the caller everything earned as a liquidity provider
    pub fn withdraw_provider_fees(&self, caller: &Address) -> LedgerResult<Amount> {
        let paid = self.transact("withdraw_provider_fees", caller, |s| {
            ledger_model::withdraw_provider_fees(s, *caller)
        })?;
        log::info!("paid {} provider fees to {}", paid, caller);
        Ok(paid)
    }

    /// Pay the administrator's fee balance
    pub fn withdraw_owner_fees(&self, caller: &Address) -> LedgerResult<Amount> {
        let paid = self.transact("withdraw_owner_fees", caller, |s| {
            ledger_model::withdraw_owner_fees(s, *caller)
        })?;
        log::info!("paid {} owner fees to {}", paid, caller);
        Ok(paid)
    }
}

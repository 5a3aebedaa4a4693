//! Fund the reward reserve

use fxswap_common::{Address, Amount, TokenInterface};
use ledger_model::LedgerResult;

use crate::exchange::Exchange;

impl<T: TokenInterface> Exchange<T> {
    /// Pull `amount` of the reward token from the administrator into the
    /// reserve. Returns the new reserve.
    pub fn add_reward_reserve(&self, caller: &Address, amount: Amount) -> LedgerResult<Amount> {
        let reserve = self.transact("add_reward_reserve", caller, |s| {
            ledger_model::add_reward_reserve(s, *caller, amount)
        })?;
        log::info!("reward reserve funded with {} (now {})", amount, reserve);
        Ok(reserve)
    }
}

//! Fungible token interface the exchange drives

use std::sync::Arc;

use crate::error::TokenResult;
use crate::types::{Address, Amount};

/// Standard fungible-token operations across a set of token contracts.
///
/// Implementations are untrusted collaborators: the exchange only relies on a
/// call either succeeding with the documented effect or returning an error.
pub trait TokenInterface {
    /// Move `amount` of `token` from `from` (the caller) to `to`
    fn transfer(&self, token: &Address, from: &Address, to: &Address, amount: Amount) -> TokenResult<()>;

    /// Move `amount` of `token` from `owner` to `to`, spending the allowance
    /// `owner` granted to `spender`
    fn transfer_from(
        &self,
        token: &Address,
        spender: &Address,
        owner: &Address,
        to: &Address,
        amount: Amount,
    ) -> TokenResult<()>;

    /// Balance of `owner` in `token` (zero for unknown tokens or holders)
    fn balance_of(&self, token: &Address, owner: &Address) -> Amount;
}

impl<T: TokenInterface + ?Sized> TokenInterface for Arc<T> {
    fn transfer(&self, token: &Address, from: &Address, to: &Address, amount: Amount) -> TokenResult<()> {
        (**self).transfer(token, from, to, amount)
    }

    fn transfer_from(
        &self,
        token: &Address,
        spender: &Address,
        owner: &Address,
        to: &Address,
        amount: Amount,
    ) -> TokenResult<()> {
        (**self).transfer_from(token, spender, owner, to, amount)
    }

    fn balance_of(&self, token: &Address, owner: &Address) -> Amount {
        (**self).balance_of(token, owner)
    }
}

impl<T: TokenInterface + ?Sized> TokenInterface for &T {
    fn transfer(&self, token: &Address, from: &Address, to: &Address, amount: Amount) -> TokenResult<()> {
        (**self).transfer(token, from, to, amount)
    }

    fn transfer_from(
        &self,
        token: &Address,
        spender: &Address,
        owner: &Address,
        to: &Address,
        amount: Amount,
    ) -> TokenResult<()> {
        (**self).transfer_from(token, spender, owner, to, amount)
    }

    fn balance_of(&self, token: &Address, owner: &Address) -> Amount {
        (**self).balance_of(token, owner)
    }
}

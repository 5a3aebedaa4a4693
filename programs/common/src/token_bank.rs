//! In-memory fungible token contracts
//!
//! `TokenBank` hosts any number of tokens with ERC-20 style balances and
//! allowances. It backs the simulator and the test suites; every method takes
//! `&self` so one bank can be shared between the exchange and its users.

use std::collections::HashMap;

use parking_lot::Mutex;

use crate::error::{TokenError, TokenResult};
use crate::token::TokenInterface;
use crate::types::{Address, Amount};

#[derive(Debug, Default, Clone)]
struct TokenLedger {
    total_supply: Amount,
    balances: HashMap<Address, Amount>,
    /// (owner, spender) -> remaining allowance
    allowances: HashMap<(Address, Address), Amount>,
}

impl TokenLedger {
    fn balance(&self, owner: &Address) -> Amount {
        self.balances.get(owner).copied().unwrap_or(0)
    }

    fn move_balance(&mut self, from: &Address, to: &Address, amount: Amount) -> TokenResult<()> {
        let have = self.balance(from);
        if have < amount {
            return Err(TokenError::InsufficientBalance { have, need: amount });
        }
        if from == to {
            return Ok(());
        }
        let credited = self
            .balance(to)
            .checked_add(amount)
            .ok_or(TokenError::Overflow)?;
        self.balances.insert(*from, have - amount);
        self.balances.insert(*to, credited);
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct TokenBank {
    tokens: Mutex<HashMap<Address, TokenLedger>>,
}

impl TokenBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a token and mint its initial supply to `holder`
    pub fn create_token(&self, token: Address, holder: Address, supply: Amount) -> TokenResult<()> {
        let mut tokens = self.tokens.lock();
        if tokens.contains_key(&token) {
            return Err(TokenError::Rejected(format!("token {} already exists", token)));
        }
        let mut ledger = TokenLedger {
            total_supply: supply,
            ..TokenLedger::default()
        };
        ledger.balances.insert(holder, supply);
        tokens.insert(token, ledger);
        log::debug!("created token {} with supply {} held by {}", token, supply, holder);
        Ok(())
    }

    /// Set (overwrite) the allowance `owner` grants `spender`
    pub fn approve(&self, token: &Address, owner: &Address, spender: &Address, amount: Amount) -> TokenResult<()> {
        let mut tokens = self.tokens.lock();
        let ledger = tokens
            .get_mut(token)
            .ok_or(TokenError::UnknownToken(*token))?;
        ledger.allowances.insert((*owner, *spender), amount);
        Ok(())
    }

    pub fn allowance(&self, token: &Address, owner: &Address, spender: &Address) -> Amount {
        self.tokens
            .lock()
            .get(token)
            .and_then(|ledger| ledger.allowances.get(&(*owner, *spender)).copied())
            .unwrap_or(0)
    }

    pub fn total_supply(&self, token: &Address) -> Amount {
        self.tokens
            .lock()
            .get(token)
            .map(|ledger| ledger.total_supply)
            .unwrap_or(0)
    }
}

impl TokenInterface for TokenBank {
    fn transfer(&self, token: &Address, from: &Address, to: &Address, amount: Amount) -> TokenResult<()> {
        let mut tokens = self.tokens.lock();
        let ledger = tokens
            .get_mut(token)
            .ok_or(TokenError::UnknownToken(*token))?;
        ledger.move_balance(from, to, amount)
    }

    fn transfer_from(
        &self,
        token: &Address,
        spender: &Address,
        owner: &Address,
        to: &Address,
        amount: Amount,
    ) -> TokenResult<()> {
        let mut tokens = self.tokens.lock();
        let ledger = tokens
            .get_mut(token)
            .ok_or(TokenError::UnknownToken(*token))?;

        let key = (*owner, *spender);
        let allowed = ledger.allowances.get(&key).copied().unwrap_or(0);
        if allowed < amount {
            return Err(TokenError::InsufficientAllowance {
                have: allowed,
                need: amount,
            });
        }

        // Balance check happens inside move_balance; allowance is only spent on success
        ledger.move_balance(owner, to, amount)?;
        ledger.allowances.insert(key, allowed - amount);
        Ok(())
    }

    fn balance_of(&self, token: &Address, owner: &Address) -> Amount {
        self.tokens
            .lock()
            .get(token)
            .map(|ledger| ledger.balance(owner))
            .unwrap_or(0)
    }
}

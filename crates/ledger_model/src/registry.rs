//! Accepted tokens, fixed at construction

use std::collections::BTreeSet;

use fxswap_common::Address;

use crate::error::{LedgerError, LedgerResult};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Registry {
    tokens: Vec<Address>,
    index: BTreeSet<Address>,
    reward_token: Address,
}

impl Registry {
    /// Build a registry from the swappable tokens (declaration order is kept)
    /// and the reward token.
    pub fn new(tokens: Vec<Address>, reward_token: Address) -> LedgerResult<Self> {
        if tokens.is_empty() {
            return Err(LedgerError::InvalidConfig("at least one token is required".into()));
        }
        let mut index = BTreeSet::new();
        for token in &tokens {
            if !index.insert(*token) {
                return Err(LedgerError::InvalidConfig(format!("duplicate token {}", token)));
            }
        }
        if index.contains(&reward_token) {
            return Err(LedgerError::InvalidConfig(format!(
                "reward token {} cannot also be swappable",
                reward_token
            )));
        }
        Ok(Self {
            tokens,
            index,
            reward_token,
        })
    }

    pub fn contains(&self, token: &Address) -> bool {
        self.index.contains(token)
    }

    pub fn require(&self, token: &Address) -> LedgerResult<()> {
        if self.contains(token) {
            Ok(())
        } else {
            Err(LedgerError::UnknownToken(*token))
        }
    }

    pub fn tokens(&self) -> &[Address] {
        &self.tokens
    }

    pub fn reward_token(&self) -> Address {
        self.reward_token
    }
}

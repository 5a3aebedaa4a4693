//! Administrator-set fixed-point rates, in reward-token units per token

use std::collections::BTreeMap;

use fxswap_common::Address;

use crate::math::Rate;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RateTable {
    rates: BTreeMap<Address, Rate>,
}

impl RateTable {
    /// Zero for tokens never priced
    pub fn get(&self, token: &Address) -> Rate {
        self.rates.get(token).copied().unwrap_or(0)
    }

    /// Overwrite; a zero rate unprices the token
    pub fn set(&mut self, token: Address, rate: Rate) {
        self.rates.insert(token, rate);
    }
}

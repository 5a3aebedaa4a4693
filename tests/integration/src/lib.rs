//! fxswap integration test harness
//!
//! `deploy()` builds the standard fixture used by the end-to-end tests:
//! three swappable tokens and a reward token minted to the owner, six
//! accounts, and an exchange whose administrator is the owner.

use std::sync::Arc;

use anyhow::{Context, Result};
use fxswap_common::{parse_units, Address, Amount, TokenBank, TokenInterface, DECIMALS};
use fxswap_exchange::{Exchange, ExchangeConfig};

/// Supply of every token, minted to the owner
pub const INITIAL_SUPPLY: &str = "1000000";

pub type Dex = Exchange<Arc<TokenBank>>;

pub struct Deployment {
    pub bank: Arc<TokenBank>,
    pub dex: Dex,
    /// `users[0]` is the owner
    pub users: Vec<Address>,
    pub owner: Address,
    pub token_a: Address,
    pub token_b: Address,
    pub token_c: Address,
    pub dex_token: Address,
}

/// Base units for a decimal amount with 18 decimals
pub fn units(value: &str) -> Amount {
    parse_units(value, DECIMALS).unwrap_or_else(|e| panic!("bad test amount {:?}: {}", value, e))
}

pub fn deploy() -> Result<Deployment> {
    let users: Vec<Address> = (0..6).map(|i| Address::from_label(&format!("user{}", i))).collect();
    let owner = users[0];
    log::info!("Deploying contracts with the account: {}", owner);

    let bank = Arc::new(TokenBank::new());
    let supply = parse_units(INITIAL_SUPPLY, DECIMALS)?;
    let mut deployed = Vec::new();
    for symbol in ["TokenA", "TokenB", "TokenC", "DexToken"] {
        let token = Address::from_label(symbol);
        bank.create_token(token, owner, supply)
            .with_context(|| format!("failed to deploy {}", symbol))?;
        log::info!("{} deployed to: {}", symbol, token);
        deployed.push(token);
    }
    let (token_a, token_b, token_c, dex_token) = (deployed[0], deployed[1], deployed[2], deployed[3]);

    let config = ExchangeConfig::new(owner, dex_token, vec![token_a, token_b, token_c]);
    let dex = Exchange::from_config(Address::from_label("dex"), &config, Arc::clone(&bank))?;
    log::info!("Dex deployed to: {}", dex.address());

    Ok(Deployment {
        bank,
        dex,
        users,
        owner,
        token_a,
        token_b,
        token_c,
        dex_token,
    })
}

impl Deployment {
    /// Rates A=2, B=4, C=10 and a 100000 reward reserve
    pub fn with_standard_setup(self) -> Result<Self> {
        for (token, rate) in [(self.token_a, "2"), (self.token_b, "4"), (self.token_c, "10")] {
            self.dex.set_rate(&self.owner, &token, units(rate))?;
        }
        self.approve(self.dex_token, self.owner, units("100000"))?;
        self.dex.add_reward_reserve(&self.owner, units("100000"))?;
        Ok(self)
    }

    /// Move tokens from the owner
    pub fn fund(&self, token: Address, to: Address, amount: Amount) -> Result<()> {
        self.bank.transfer(&token, &self.owner, &to, amount)?;
        Ok(())
    }

    /// Approve the exchange to spend `owner`'s tokens
    pub fn approve(&self, token: Address, owner: Address, amount: Amount) -> Result<()> {
        self.bank.approve(&token, &owner, &self.dex.address(), amount)?;
        Ok(())
    }

    pub fn balance(&self, token: Address, account: Address) -> Amount {
        self.bank.balance_of(&token, &account)
    }

    pub fn dex_balance(&self, token: Address) -> Amount {
        self.balance(token, self.dex.address())
    }

    /// The exchange's bookkeeping agrees with the token balances it holds
    pub fn assert_conservation(&self) {
        for token in [self.token_a, self.token_b, self.token_c] {
            assert_eq!(self.dex_balance(token), self.dex.holdings(&token), "holdings of {}", token);
        }
        assert_eq!(self.dex_balance(self.dex_token), self.dex.reward_reserve());
        // The exchange only moves tokens, it never mints or burns them
        let supply = units(INITIAL_SUPPLY);
        for token in [self.token_a, self.token_b, self.token_c, self.dex_token] {
            assert_eq!(self.bank.total_supply(&token), supply, "supply of {}", token);
        }
        let state = self.dex.snapshot();
        assert!(
            ledger_model::invariants::all_ok(&state),
            "violated: {:?}",
            ledger_model::invariants::violations(&state)
        );
    }
}

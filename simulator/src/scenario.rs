//! Deploys a token bank and an exchange, then replays scripted steps

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use fxswap_common::{format_units, parse_units, Address, Amount, TokenBank, TokenInterface, DECIMALS};
use fxswap_exchange::{Exchange, ExchangeConfig, PoolTotals};
use ledger_model::invariants;
use serde::Serialize;

use crate::config::{Config, Step};

pub struct Deployment {
    pub bank: Arc<TokenBank>,
    pub exchange: Exchange<Arc<TokenBank>>,
    accounts: BTreeMap<String, Address>,
    tokens: BTreeMap<String, Address>,
    admin: Address,
}

#[derive(Debug, Serialize)]
pub struct PoolSummary {
    pub symbol: String,
    pub rate: String,
    #[serde(flatten)]
    pub totals: PoolTotals,
    pub bank_balance: Amount,
}

#[derive(Debug, Serialize)]
pub struct Summary {
    pub steps_ok: usize,
    pub steps_failed: usize,
    pub reward_reserve: String,
    pub owner_fees: String,
    pub pools: Vec<PoolSummary>,
    /// account -> symbol -> balance
    pub balances: BTreeMap<String, BTreeMap<String, String>>,
    pub provider_fees: BTreeMap<String, String>,
    pub violations: Vec<String>,
}

fn amount(value: &str) -> Result<Amount> {
    parse_units(value, DECIMALS).with_context(|| format!("invalid amount {:?}", value))
}

impl Deployment {
    /// Create every token, mint supplies to the administrator, deploy the
    /// exchange and apply the configured rates.
    pub fn deploy(config: &Config) -> Result<Self> {
        let admin_name = config.accounts.first().context("at least one account is required")?;

        let mut accounts = BTreeMap::new();
        for name in &config.accounts {
            if accounts.insert(name.clone(), Address::from_label(name)).is_some() {
                bail!("duplicate account {}", name);
            }
        }
        let admin = accounts[admin_name];
        let exchange_address = Address::from_label("exchange");

        let bank = Arc::new(TokenBank::new());
        let mut tokens = BTreeMap::new();
        for spec in config.tokens.iter().chain(std::iter::once(&config.reward_token)) {
            let address = Address::from_label(&spec.symbol);
            if accounts.values().any(|a| *a == address) || address == exchange_address {
                bail!("token symbol {} collides with an account name", spec.symbol);
            }
            if tokens.insert(spec.symbol.clone(), address).is_some() {
                bail!("duplicate token {}", spec.symbol);
            }
            bank.create_token(address, admin, amount(&spec.supply)?)
                .with_context(|| format!("failed to create token {}", spec.symbol))?;
            log::info!("Token {} deployed to: {}", spec.symbol, address);
        }

        let mut exchange_config = ExchangeConfig::new(
            admin,
            tokens[&config.reward_token.symbol],
            config.tokens.iter().map(|t| tokens[&t.symbol]).collect(),
        );
        exchange_config.fees = config.fees;
        let exchange = Exchange::from_config(exchange_address, &exchange_config, Arc::clone(&bank))
            .context("failed to deploy exchange")?;
        log::info!("Exchange deployed to: {}", exchange_address);

        let deployment = Self {
            bank,
            exchange,
            accounts,
            tokens,
            admin,
        };
        for (symbol, rate) in &config.rates {
            deployment.run_step(&Step::SetRate {
                token: symbol.clone(),
                rate: rate.clone(),
                caller: None,
            })?;
        }
        Ok(deployment)
    }

    fn account(&self, name: &str) -> Result<Address> {
        self.accounts.get(name).copied().ok_or_else(|| anyhow!("unknown account {}", name))
    }

    fn caller(&self, name: &Option<String>) -> Result<Address> {
        name.as_deref().map_or(Ok(self.admin), |n| self.account(n))
    }

    fn token(&self, symbol: &str) -> Result<Address> {
        self.tokens.get(symbol).copied().ok_or_else(|| anyhow!("unknown token {}", symbol))
    }

    /// Apply one step; returns a line describing what happened
    pub fn run_step(&self, step: &Step) -> Result<String> {
        let ex = &self.exchange;
        let message = match step {
            Step::Transfer { token, from, to, amount: value } => {
                self.bank
                    .transfer(&self.token(token)?, &self.account(from)?, &self.account(to)?, amount(value)?)?;
                format!("Transferred {} {} from {} to {}", value, token, from, to)
            }
            Step::Approve { token, owner, amount: value } => {
                self.bank
                    .approve(&self.token(token)?, &self.account(owner)?, &ex.address(), amount(value)?)?;
                format!("{} approved {} {} for the exchange", owner, value, token)
            }
            Step::SetRate { token, rate, caller } => {
                ex.set_rate(&self.caller(caller)?, &self.token(token)?, amount(rate)?)?;
                format!("Rate of {} set to {}", token, rate)
            }
            Step::FundReserve { amount: value, caller } => {
                let reserve = ex.add_reward_reserve(&self.caller(caller)?, amount(value)?)?;
                format!("Reward reserve funded with {} (now {})", value, format_units(reserve, DECIMALS))
            }
            Step::AddLiquidity { provider, token, amount: value } => {
                let stake = ex.add_liquidity(&self.account(provider)?, &self.token(token)?, amount(value)?)?;
                format!(
                    "Added {} {} to liquidity from {} (stake {})",
                    value,
                    token,
                    provider,
                    format_units(stake, DECIMALS)
                )
            }
            Step::Swap {
                account,
                token_in,
                token_out,
                amount: value,
            } => {
                let quote = ex.swap(&self.account(account)?, &self.token(token_in)?, &self.token(token_out)?, amount(value)?)?;
                format!(
                    "{} swapped {} {} for {} {} (fee value {})",
                    account,
                    value,
                    token_in,
                    format_units(quote.net_out, DECIMALS),
                    token_out,
                    format_units(quote.fee_value, DECIMALS)
                )
            }
            Step::WithdrawProviderFees { account } => {
                let paid = ex.withdraw_provider_fees(&self.account(account)?)?;
                format!("{} withdrew {} in provider fees", account, format_units(paid, DECIMALS))
            }
            Step::WithdrawOwnerFees { caller } => {
                let paid = ex.withdraw_owner_fees(&self.caller(caller)?)?;
                format!("Owner withdrew {} in fees", format_units(paid, DECIMALS))
            }
        };
        Ok(message)
    }

    /// Internal invariants plus agreement between the ledger and the bank
    pub fn violations(&self) -> Vec<String> {
        let state = self.exchange.snapshot();
        let ledger = self.exchange.address();
        let mut found: Vec<String> = invariants::violations(&state).iter().map(|v| v.to_string()).collect();

        for token in state.registry.tokens() {
            let held = self.bank.balance_of(token, &ledger);
            if held != state.holdings(token) {
                found.push(format!("holdings of {} are {} but the bank holds {}", token, state.holdings(token), held));
            }
        }
        let reward_held = self.bank.balance_of(&state.reward_token(), &ledger);
        if reward_held != state.reward_reserve() {
            found.push(format!(
                "reward reserve is {} but the bank holds {}",
                state.reward_reserve(),
                reward_held
            ));
        }
        found
    }

    pub fn summary(&self, steps_ok: usize, steps_failed: usize) -> Result<Summary> {
        let ex = &self.exchange;
        let ledger = ex.address();

        let pools = self
            .tokens
            .iter()
            .filter(|(_, address)| **address != ex.reward_token())
            .map(|(symbol, address)| PoolSummary {
                symbol: symbol.clone(),
                rate: format_units(ex.rates(address), DECIMALS),
                totals: ex.pool_totals(address),
                bank_balance: self.bank.balance_of(address, &ledger),
            })
            .collect();

        let balances = self
            .accounts
            .iter()
            .map(|(name, account)| {
                let held = self
                    .tokens
                    .iter()
                    .map(|(symbol, token)| (symbol.clone(), format_units(self.bank.balance_of(token, account), DECIMALS)))
                    .collect();
                (name.clone(), held)
            })
            .collect();

        let mut provider_fees = BTreeMap::new();
        for (name, account) in &self.accounts {
            let owed = ex.provider_fees(account)?;
            if owed > 0 || ex.snapshot().has_stake_history(account) {
                provider_fees.insert(name.clone(), format_units(owed, DECIMALS));
            }
        }

        Ok(Summary {
            steps_ok,
            steps_failed,
            reward_reserve: format_units(ex.reward_reserve(), DECIMALS),
            owner_fees: format_units(ex.owner_fees()?, DECIMALS),
            pools,
            balances,
            provider_fees,
            violations: self.violations(),
        })
    }
}

/// Deploy and replay the whole scenario
pub fn run(config: &Config) -> Result<Summary> {
    let deployment = Deployment::deploy(config)?;
    let mut steps_ok = 0;
    let mut steps_failed = 0;

    for (i, step) in config.steps.iter().enumerate() {
        match deployment.run_step(step) {
            Ok(message) => {
                steps_ok += 1;
                log::info!("[{}] {}", i, message);
            }
            Err(e) => {
                steps_failed += 1;
                log::warn!("[{}] step {:?} failed: {:#}", i, step, e);
                if config.stop_on_error {
                    return Err(e.context(format!("step {} failed", i)));
                }
            }
        }
    }

    deployment.summary(steps_ok, steps_failed)
}

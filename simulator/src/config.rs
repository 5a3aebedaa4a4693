//! Simulator configuration

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use fxswap_exchange::FeeParams;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSpec {
    pub symbol: String,

    /// Initial supply minted to the administrator, decimal string
    pub supply: String,
}

/// One scripted action. Amounts and rates are decimal strings scaled by 18
/// decimals; `caller` defaults to the administrator where it is optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    Transfer {
        token: String,
        from: String,
        to: String,
        amount: String,
    },
    /// Approve the exchange to spend `owner`'s tokens
    Approve {
        token: String,
        owner: String,
        amount: String,
    },
    SetRate {
        token: String,
        rate: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        caller: Option<String>,
    },
    FundReserve {
        amount: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        caller: Option<String>,
    },
    AddLiquidity {
        provider: String,
        token: String,
        amount: String,
    },
    Swap {
        account: String,
        token_in: String,
        token_out: String,
        amount: String,
    },
    WithdrawProviderFees {
        account: String,
    },
    WithdrawOwnerFees {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        caller: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Account names; the first one is the administrator
    pub accounts: Vec<String>,

    /// Abort the replay at the first failing step
    #[serde(default)]
    pub stop_on_error: bool,

    /// Token fees are paid in
    pub reward_token: TokenSpec,

    /// Swappable tokens
    pub tokens: Vec<TokenSpec>,

    /// Initial rates by symbol, applied by the administrator at deployment
    #[serde(default)]
    pub rates: BTreeMap<String, String>,

    #[serde(default)]
    pub fees: FeeParams,

    #[serde(default)]
    pub steps: Vec<Step>,
}

impl Config {
    /// Load configuration from the TOML file named by `SIMULATOR_CONFIG`
    pub fn load() -> Result<Self> {
        let config_path = std::env::var("SIMULATOR_CONFIG").unwrap_or_else(|_| "simulator.toml".to_string());
        Self::load_from(&config_path)
    }

    pub fn load_from(config_path: &str) -> Result<Self> {
        let config_str = std::fs::read_to_string(config_path)
            .context(format!("Failed to read config file: {}", config_path))?;

        let config: Config = toml::from_str(&config_str).context("Failed to parse config TOML")?;

        Ok(config)
    }

    /// Three tokens, one reward token, two providers and three swapping users
    pub fn default_scenario() -> Self {
        let token = |symbol: &str| TokenSpec {
            symbol: symbol.to_string(),
            supply: "1000000".to_string(),
        };
        let transfer = |token: &str, to: &str, amount: &str| Step::Transfer {
            token: token.to_string(),
            from: "owner".to_string(),
            to: to.to_string(),
            amount: amount.to_string(),
        };
        let approve = |token: &str, owner: &str, amount: &str| Step::Approve {
            token: token.to_string(),
            owner: owner.to_string(),
            amount: amount.to_string(),
        };
        let add_liquidity = |provider: &str, token: &str, amount: &str| Step::AddLiquidity {
            provider: provider.to_string(),
            token: token.to_string(),
            amount: amount.to_string(),
        };
        let swap = |account: &str, token_in: &str, token_out: &str| Step::Swap {
            account: account.to_string(),
            token_in: token_in.to_string(),
            token_out: token_out.to_string(),
            amount: "5".to_string(),
        };

        let mut steps = vec![
            approve("DEX", "owner", "100000"),
            Step::FundReserve {
                amount: "100000".to_string(),
                caller: None,
            },
        ];
        for (provider, amount) in [("provider1", "100000"), ("provider2", "10000")] {
            for symbol in ["TKA", "TKB", "TKC"] {
                steps.push(transfer(symbol, provider, amount));
                steps.push(approve(symbol, provider, amount));
                steps.push(add_liquidity(provider, symbol, amount));
            }
        }
        for (user, token_in, token_out) in [("user1", "TKA", "TKB"), ("user2", "TKB", "TKC"), ("user3", "TKC", "TKA")] {
            steps.push(transfer(token_in, user, "1000"));
            steps.push(approve(token_in, user, "5"));
            steps.push(swap(user, token_in, token_out));
        }
        for provider in ["provider1", "provider2"] {
            steps.push(Step::WithdrawProviderFees {
                account: provider.to_string(),
            });
        }
        steps.push(Step::WithdrawOwnerFees { caller: None });

        Self {
            accounts: ["owner", "provider1", "provider2", "user1", "user2", "user3"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            stop_on_error: false,
            reward_token: token("DEX"),
            tokens: vec![token("TKA"), token("TKB"), token("TKC")],
            rates: [("TKA", "2"), ("TKB", "5"), ("TKC", "11")]
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            fees: FeeParams::default(),
            steps,
        }
    }

    /// Write default config to file
    pub fn write_default(path: &str) -> Result<()> {
        let config = Self::default_scenario();
        let toml_str = toml::to_string_pretty(&config).context("Failed to serialize config")?;

        std::fs::write(path, toml_str).context(format!("Failed to write config to {}", path))?;

        log::info!("Created default config at {}", path);
        Ok(())
    }
}

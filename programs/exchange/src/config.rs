//! Exchange deployment configuration

use std::path::Path;

use fxswap_common::Address;
use ledger_model::{FeeParams, LedgerError, LedgerResult, LedgerState, Registry};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeConfig {
    /// Sole administrator, fixed for the lifetime of the exchange
    pub admin: Address,

    /// Token fees are paid in; never swappable
    pub reward_token: Address,

    /// Swappable tokens
    pub tokens: Vec<Address>,

    #[serde(default)]
    pub fees: FeeParams,
}

impl ExchangeConfig {
    pub fn new(admin: Address, reward_token: Address, tokens: Vec<Address>) -> Self {
        Self {
            admin,
            reward_token,
            tokens,
            fees: FeeParams::default(),
        }
    }

    pub fn from_toml_str(s: &str) -> LedgerResult<Self> {
        let config: Self = toml::from_str(s).map_err(|e| LedgerError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> LedgerResult<Self> {
        let path = path.as_ref();
        let config_str = std::fs::read_to_string(path)
            .map_err(|e| LedgerError::InvalidConfig(format!("failed to read {}: {}", path.display(), e)))?;
        Self::from_toml_str(&config_str)
    }

    pub fn to_toml_string(&self) -> LedgerResult<String> {
        toml::to_string_pretty(self).map_err(|e| LedgerError::InvalidConfig(e.to_string()))
    }

    pub fn validate(&self) -> LedgerResult<()> {
        self.build_state().map(|_| ())
    }

    /// Initial ledger state for this configuration
    pub fn build_state(&self) -> LedgerResult<LedgerState> {
        let registry = Registry::new(self.tokens.clone(), self.reward_token)?;
        LedgerState::new(self.admin, registry, self.fees)
    }
}

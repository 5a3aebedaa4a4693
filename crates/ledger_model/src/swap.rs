//! Swap pricing and fee split

use fxswap_common::{Address, Amount};
use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, LedgerResult};
use crate::math::{mul_div_floor, sub, Rate, BPS_SCALE, RATE_SCALE};

pub const DEFAULT_SWAP_FEE_BPS: u32 = 400;
pub const DEFAULT_PROVIDER_SHARE_BPS: u32 = 9_000;

/// Which pool's providers earn the provider part of a swap fee
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeeSource {
    #[default]
    OutputPool,
    InputPool,
    /// Half to the input pool, the rest to the output pool
    BothPools,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeeParams {
    pub swap_fee_bps: u32,
    pub provider_share_bps: u32,
    pub fee_source: FeeSource,
}

impl Default for FeeParams {
    fn default() -> Self {
        Self {
            swap_fee_bps: DEFAULT_SWAP_FEE_BPS,
            provider_share_bps: DEFAULT_PROVIDER_SHARE_BPS,
            fee_source: FeeSource::default(),
        }
    }
}

impl FeeParams {
    pub fn validate(&self) -> LedgerResult<()> {
        if u128::from(self.swap_fee_bps) > BPS_SCALE {
            return Err(LedgerError::InvalidConfig(format!(
                "swap_fee_bps {} exceeds {}",
                self.swap_fee_bps, BPS_SCALE
            )));
        }
        if u128::from(self.provider_share_bps) > BPS_SCALE {
            return Err(LedgerError::InvalidConfig(format!(
                "provider_share_bps {} exceeds {}",
                self.provider_share_bps, BPS_SCALE
            )));
        }
        Ok(())
    }
}

/// Figures for one swap. `fee_value`, `provider_value` and `admin_value`
/// are in reward-token units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapQuote {
    pub amount_in: Amount,
    pub gross_out: Amount,
    pub fee: Amount,
    pub net_out: Amount,
    pub fee_value: Amount,
    pub provider_value: Amount,
    pub admin_value: Amount,
}

/// Price a swap at fixed rates. Both rates must be nonzero.
pub fn compute_quote(rate_in: Rate, rate_out: Rate, amount_in: Amount, params: &FeeParams) -> LedgerResult<SwapQuote> {
    let gross_out = mul_div_floor(amount_in, rate_in, rate_out)?;
    let fee = mul_div_floor(gross_out, u128::from(params.swap_fee_bps), BPS_SCALE)?;
    let net_out = sub(gross_out, fee)?;
    let fee_value = mul_div_floor(fee, rate_out, RATE_SCALE)?;
    let provider_value = mul_div_floor(fee_value, u128::from(params.provider_share_bps), BPS_SCALE)?;
    let admin_value = sub(fee_value, provider_value)?;

    Ok(SwapQuote {
        amount_in,
        gross_out,
        fee,
        net_out,
        fee_value,
        provider_value,
        admin_value,
    })
}

/// Pools credited with the provider part of a swap fee
pub fn provider_allocation(
    source: FeeSource,
    token_in: Address,
    token_out: Address,
    provider_value: Amount,
) -> Vec<(Address, Amount)> {
    match source {
        FeeSource::OutputPool => vec![(token_out, provider_value)],
        FeeSource::InputPool => vec![(token_in, provider_value)],
        FeeSource::BothPools => {
            let first = provider_value / 2;
            vec![(token_in, first), (token_out, provider_value - first)]
        }
    }
}

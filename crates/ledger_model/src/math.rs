//! Checked fixed-point arithmetic - no unwrap, no panics, no lossy casts

use primitive_types::U256;

use crate::error::{LedgerError, LedgerResult};

/// Rates carry 18 fractional decimal digits
pub type Rate = u128;

/// 1.0 as a fixed-point rate
pub const RATE_SCALE: u128 = 1_000_000_000_000_000_000;

/// Denominator for basis-point parameters
pub const BPS_SCALE: u128 = 10_000;

/// Fee balances and the per-pool fee index are kept multiplied by this
pub const FEE_SCALE: u128 = 1_000_000_000_000_000_000;

/// Narrow a 256-bit value back to u128
pub fn to_u128(value: U256) -> LedgerResult<u128> {
    if value.bits() > 128 {
        return Err(LedgerError::ArithmeticOverflow);
    }
    Ok(value.low_u128())
}

/// floor(a * b / d) with a 256-bit intermediate product
pub fn mul_div_floor(a: u128, b: u128, d: u128) -> LedgerResult<u128> {
    if d == 0 {
        return Err(LedgerError::ArithmeticOverflow);
    }
    // u128 * u128 always fits in 256 bits
    let product = U256::from(a) * U256::from(b);
    to_u128(product / U256::from(d))
}

pub fn add(a: u128, b: u128) -> LedgerResult<u128> {
    a.checked_add(b).ok_or(LedgerError::ArithmeticOverflow)
}

pub fn sub(a: u128, b: u128) -> LedgerResult<u128> {
    a.checked_sub(b).ok_or(LedgerError::ArithmeticOverflow)
}

pub fn add_wide(a: U256, b: U256) -> LedgerResult<U256> {
    a.checked_add(b).ok_or(LedgerError::ArithmeticOverflow)
}

pub fn sub_wide(a: U256, b: U256) -> LedgerResult<U256> {
    a.checked_sub(b).ok_or(LedgerError::ArithmeticOverflow)
}

pub fn mul_wide(a: U256, b: U256) -> LedgerResult<U256> {
    a.checked_mul(b).ok_or(LedgerError::ArithmeticOverflow)
}

/// Whole units in a scaled balance, floor(value / FEE_SCALE)
pub fn unscale(value: U256) -> LedgerResult<u128> {
    to_u128(value / U256::from(FEE_SCALE))
}

pub fn scale(value: u128) -> U256 {
    U256::from(value) * U256::from(FEE_SCALE)
}

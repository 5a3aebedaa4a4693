//! Decimal string <-> base unit conversion
//!
//! Amounts and rates are entered as decimal strings ("2", "0.5", "1000")
//! and scaled by a fixed number of fractional digits.

use thiserror::Error;

/// Fractional digits used for token amounts and rates
pub const DECIMALS: u32 = 18;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UnitsError {
    #[error("empty amount")]
    Empty,

    #[error("invalid digit in amount {0:?}")]
    InvalidDigit(String),

    #[error("amount {value:?} has more than {decimals} fractional digits")]
    TooPrecise { value: String, decimals: u32 },

    #[error("amount {0:?} does not fit in 128 bits")]
    Overflow(String),
}

/// Parse a decimal string into base units, e.g. `parse_units("2.5", 18)`
pub fn parse_units(value: &str, decimals: u32) -> Result<u128, UnitsError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(UnitsError::Empty);
    }

    let (whole, frac) = match value.split_once('.') {
        Some((w, f)) => (w, f),
        None => (value, ""),
    };
    if whole.is_empty() && frac.is_empty() {
        return Err(UnitsError::InvalidDigit(value.to_string()));
    }
    if !whole.chars().chain(frac.chars()).all(|c| c.is_ascii_digit()) {
        return Err(UnitsError::InvalidDigit(value.to_string()));
    }

    let frac = frac.trim_end_matches('0');
    if frac.len() > decimals as usize {
        return Err(UnitsError::TooPrecise {
            value: value.to_string(),
            decimals,
        });
    }

    let overflow = || UnitsError::Overflow(value.to_string());
    let scale = 10u128.checked_pow(decimals).ok_or_else(overflow)?;

    let whole_units = if whole.is_empty() {
        0
    } else {
        whole.parse::<u128>().map_err(|_| overflow())?
    };
    let frac_units = if frac.is_empty() {
        0
    } else {
        let pad = 10u128
            .checked_pow(decimals - frac.len() as u32)
            .ok_or_else(overflow)?;
        frac.parse::<u128>()
            .map_err(|_| overflow())?
            .checked_mul(pad)
            .ok_or_else(overflow)?
    };

    whole_units
        .checked_mul(scale)
        .and_then(|w| w.checked_add(frac_units))
        .ok_or_else(overflow)
}

/// Render base units as a decimal string without trailing zeros
pub fn format_units(value: u128, decimals: u32) -> String {
    let Some(scale) = 10u128.checked_pow(decimals) else {
        return value.to_string();
    };
    let whole = value / scale;
    let frac = value % scale;
    if frac == 0 {
        return whole.to_string();
    }
    let digits = format!("{:0width$}", frac, width = decimals as usize);
    format!("{}.{}", whole, digits.trim_end_matches('0'))
}

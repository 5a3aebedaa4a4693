//! Ledger error taxonomy
//!
//! Every failure aborts the whole operation; callers can match on the kind
//! to tell precondition failures apart from token and runtime failures.

use fxswap_common::{Address, Amount, DecodeError, TokenError};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("caller is not the administrator")]
    Unauthorized,

    #[error("token {0} is not accepted by this exchange")]
    UnknownToken(Address),

    #[error("input and output token are the same")]
    SameToken,

    #[error("amount must be greater than zero")]
    ZeroAmount,

    #[error("token {0} has no rate")]
    UnpricedToken(Address),

    #[error("token transfer failed: {0}")]
    TransferFailed(#[from] TokenError),

    #[error("insufficient reserve: available {available}, required {required}")]
    InsufficientReserve { available: Amount, required: Amount },

    #[error("caller never provided liquidity")]
    NoStakeHistory,

    #[error("arithmetic overflow")]
    ArithmeticOverflow,

    #[error("re-entrant call rejected")]
    Reentrancy,

    #[error("invalid instruction: {0}")]
    InvalidInstruction(#[from] DecodeError),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type LedgerResult<T> = Result<T, LedgerError>;

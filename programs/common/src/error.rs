//! Error types for token movements, address parsing and instruction decoding

use thiserror::Error;

use crate::types::{Address, Amount};

/// Failure reported by a token implementation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("unknown token: {0}")]
    UnknownToken(Address),

    #[error("insufficient balance: have {have}, need {need}")]
    InsufficientBalance { have: Amount, need: Amount },

    #[error("insufficient allowance: have {have}, need {need}")]
    InsufficientAllowance { have: Amount, need: Amount },

    #[error("token arithmetic overflow")]
    Overflow,

    #[error("transfer rejected: {0}")]
    Rejected(String),
}

/// Result type for token operations
pub type TokenResult<T> = Result<T, TokenError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("invalid base58 address: {0}")]
    InvalidEncoding(String),

    #[error("address must be 32 bytes, got {0}")]
    InvalidLength(usize),
}

/// Malformed instruction data
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("instruction data is empty")]
    Empty,

    #[error("unknown instruction discriminator {0}")]
    UnknownDiscriminator(u8),

    #[error("instruction data truncated: need {needed} bytes at offset {offset}, have {len}")]
    Truncated { offset: usize, needed: usize, len: usize },

    #[error("{0} trailing bytes after instruction payload")]
    TrailingBytes(usize),
}

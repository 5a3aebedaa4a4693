//! Shared types for the fxswap workspace: addresses, amounts, the token
//! interface and its in-memory implementation, instruction encoding helpers.

pub mod error;
pub mod instruction;
pub mod token;
pub mod token_bank;
pub mod types;
pub mod units;

pub use error::*;
pub use instruction::*;
pub use token::*;
pub use token_bank::*;
pub use types::*;
pub use units::*;

//! Fixed-rate multi-asset exchange
//!
//! `Exchange` serializes every operation behind one lock, applies the pure
//! transitions from `ledger_model` and then performs the resulting token
//! movements through a `TokenInterface`.

pub mod config;
pub mod entrypoint;
pub mod exchange;
pub mod instructions;
pub mod interactions;

pub use config::ExchangeConfig;
pub use entrypoint::process_instruction;
pub use exchange::Exchange;
pub use instructions::{ExchangeInstruction, InstructionKind, Receipt};

pub use ledger_model::{FeeParams, FeeSource, LedgerError, LedgerResult, PoolTotals, Rate, SwapQuote, RATE_SCALE};

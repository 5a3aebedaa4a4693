//! Pure ledger model for the fixed-rate exchange
//! No I/O, no unwrap/panic, all transitions total

pub mod access;
pub mod error;
pub mod fees;
pub mod invariants;
pub mod liquidity;
pub mod math;
pub mod rates;
pub mod registry;
pub mod state;
pub mod swap;
pub mod transitions;

// Re-export commonly used types
pub use error::{LedgerError, LedgerResult};
pub use math::{Rate, BPS_SCALE, FEE_SCALE, RATE_SCALE};
pub use registry::Registry;
pub use state::{LedgerState, PoolTotals};
pub use swap::{FeeParams, FeeSource, SwapQuote};
pub use transitions::*;

//! Executes the token movements of a committed transition
//!
//! Pulls run before pushes. If any movement fails, completed pulls are
//! returned to their owners before the error is reported. A token call that
//! panics counts as a rejected movement.

use std::panic::{self, AssertUnwindSafe};

use fxswap_common::{Address, TokenError, TokenInterface, TokenResult};
use ledger_model::Interaction;

fn guarded(call: impl FnOnce() -> TokenResult<()>) -> TokenResult<()> {
    panic::catch_unwind(AssertUnwindSafe(call))
        .unwrap_or_else(|_| Err(TokenError::Rejected("token call panicked".to_string())))
}

pub fn execute<T: TokenInterface>(tokens: &T, ledger: &Address, interactions: &[Interaction]) -> TokenResult<()> {
    for (done, interaction) in interactions.iter().enumerate() {
        let result = guarded(|| match *interaction {
            Interaction::Pull { token, from, amount } => tokens.transfer_from(&token, ledger, &from, ledger, amount),
            Interaction::Push { token, to, amount } => tokens.transfer(&token, ledger, &to, amount),
        });
        if let Err(err) = result {
            log::warn!("interaction {:?} failed: {}", interaction, err);
            unwind(tokens, ledger, &interactions[..done]);
            return Err(err);
        }
    }
    Ok(())
}

fn unwind<T: TokenInterface>(tokens: &T, ledger: &Address, completed: &[Interaction]) {
    for interaction in completed.iter().rev() {
        match *interaction {
            Interaction::Pull { token, from, amount } => {
                if let Err(err) = guarded(|| tokens.transfer(&token, ledger, &from, amount)) {
                    log::error!("could not return {} of {} to {}: {}", amount, token, from, err);
                }
            }
            Interaction::Push { token, to, amount } => {
                log::error!("cannot unwind completed push of {} {} to {}", amount, token, to);
            }
        }
    }
}

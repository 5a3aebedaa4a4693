//! Single fixed administrator

use fxswap_common::Address;

use crate::error::{LedgerError, LedgerResult};

pub fn require_admin(admin: &Address, caller: &Address) -> LedgerResult<()> {
    if admin != caller {
        return Err(LedgerError::Unauthorized);
    }
    Ok(())
}

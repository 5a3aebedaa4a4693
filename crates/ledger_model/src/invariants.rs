//! Invariant checking helpers

use std::collections::BTreeMap;

use fxswap_common::{Address, Amount};
use crate::fees::pending;
use crate::math::{add, scale};
use crate::state::LedgerState;

/// Sum of stakes per token equals each pool's aggregate
pub fn stakes_match_pools(s: &LedgerState) -> bool {
    let mut sums: BTreeMap<Address, Amount> = BTreeMap::new();
    for ((token, _), stake) in s.liquidity.stakes() {
        let entry = sums.entry(*token).or_default();
        match add(*entry, stake.amount) {
            Ok(v) => *entry = v,
            Err(_) => return false,
        }
    }
    s.liquidity
        .pools()
        .all(|(token, pool)| sums.get(token).copied().unwrap_or(0) == pool.total_staked)
}

/// The reward reserve backs every unpaid balance
pub fn reserve_covers_outstanding(s: &LedgerState) -> bool {
    s.fees.reserve() >= s.fees.outstanding()
}

/// Every reward unit accrued is either paid or still outstanding
pub fn accrual_balanced(s: &LedgerState) -> bool {
    add(s.fees.total_paid(), s.fees.outstanding()) == Ok(s.fees.total_accrued())
}

/// Settled balances, pending pool fees and the admin balance add up to
/// exactly the outstanding amount
pub fn fee_accounting_exact(s: &LedgerState) -> bool {
    let mut total = s.fees.admin_earned();
    for (_, earned) in s.fees.provider_balances() {
        total = total.saturating_add(*earned);
    }
    for ((token, _), stake) in s.liquidity.stakes() {
        let Some(pool) = s.liquidity.pool(token) else {
            return false;
        };
        match pending(pool, stake) {
            Ok(p) => total = total.saturating_add(p),
            Err(_) => return false,
        }
    }
    total == scale(s.fees.outstanding())
}

/// The ledger's token balances back its internal holdings and reserve.
/// `balance_of(token)` is the ledger's own balance in `token`.
pub fn holdings_backed<F>(s: &LedgerState, balance_of: F) -> bool
where
    F: Fn(&Address) -> Amount,
{
    let pools_ok = s
        .registry
        .tokens()
        .iter()
        .all(|token| balance_of(token) >= s.liquidity.holdings(token));
    pools_ok && balance_of(&s.reward_token()) >= s.fees.reserve()
}

/// Names of the internal invariants that do not hold
pub fn violations(s: &LedgerState) -> Vec<&'static str> {
    let checks: [(&'static str, fn(&LedgerState) -> bool); 4] = [
        ("stakes_match_pools", stakes_match_pools),
        ("reserve_covers_outstanding", reserve_covers_outstanding),
        ("accrual_balanced", accrual_balanced),
        ("fee_accounting_exact", fee_accounting_exact),
    ];
    checks
        .into_iter()
        .filter(|(_, check)| !check(s))
        .map(|(name, _)| name)
        .collect()
}

pub fn all_ok(s: &LedgerState) -> bool {
    violations(s).is_empty()
}

//! End-to-end exchange scenarios
//!
//! Every test starts from `deploy().with_standard_setup()`: rates A=2, B=4,
//! C=10 and a reward reserve of 100000 units funded by the owner.

use std::sync::{Arc, OnceLock, Weak};
use std::thread;

use fxswap_common::{Address, Amount, TokenBank, TokenInterface, TokenResult};
use fxswap_exchange::{process_instruction, Exchange, ExchangeConfig, ExchangeInstruction, LedgerError, Receipt};
use fxswap_integration_tests::{deploy, units, Deployment};
use parking_lot::Mutex;

fn setup() -> Deployment {
    let _ = env_logger::builder().is_test(true).try_init();
    deploy()
        .and_then(Deployment::with_standard_setup)
        .expect("standard deployment")
}

/// E2E-1: deployment hands out distinct addresses
#[test]
fn test_deploy() {
    let d = setup();
    let mut all = vec![d.owner, d.dex.address(), d.token_a, d.token_b, d.token_c, d.dex_token];
    all.sort();
    all.dedup();
    assert_eq!(all.len(), 6);
    assert_eq!(d.dex.admin(), d.owner);
    assert_eq!(d.dex.reward_token(), d.dex_token);
    assert_eq!(d.dex.reward_reserve(), units("100000"));
    assert_eq!(d.dex_balance(d.dex_token), units("100000"));
}

/// E2E-2: two providers stake the same token
#[test]
fn test_adding_liquidity() {
    let d = setup();
    let provider1 = d.users[1];
    d.fund(d.token_a, provider1, 100).unwrap();
    d.approve(d.token_a, provider1, 100).unwrap();
    d.approve(d.token_a, d.owner, 100).unwrap();

    d.dex.add_liquidity(&provider1, &d.token_a, 100).unwrap();
    d.dex.add_liquidity(&d.owner, &d.token_a, 100).unwrap();

    assert_eq!(d.dex.liquidity_stakes(&d.token_a, &d.owner), 100);
    assert_eq!(d.dex.liquidity_stakes(&d.token_a, &provider1), 100);
    assert_eq!(d.dex.pool_totals(&d.token_a).total_staked, 200);
    d.assert_conservation();
}

/// E2E-3: stakes are tracked per token
#[test]
fn test_adding_liquidity_multiple_tokens() {
    let d = setup();
    let (provider1, provider2) = (d.users[1], d.users[2]);
    d.fund(d.token_a, provider1, 100).unwrap();
    d.approve(d.token_a, provider1, 100).unwrap();
    d.fund(d.token_b, provider2, 50).unwrap();
    d.approve(d.token_b, provider2, 50).unwrap();

    d.dex.add_liquidity(&provider1, &d.token_a, 100).unwrap();
    d.dex.add_liquidity(&provider2, &d.token_b, 50).unwrap();

    assert_eq!(d.dex.liquidity_stakes(&d.token_a, &provider1), 100);
    assert_eq!(d.dex.liquidity_stakes(&d.token_b, &provider2), 50);
    assert_eq!(d.dex.liquidity_stakes(&d.token_b, &provider1), 0);
    d.assert_conservation();
}

/// E2E-4: 50 A at 2/4 nets 24 B after the 4% fee
#[test]
fn test_swap() {
    let d = setup();
    let user1 = d.users[3];
    d.fund(d.token_a, user1, 100).unwrap();
    d.approve(d.token_a, user1, 50).unwrap();
    d.approve(d.token_b, d.owner, 200).unwrap();
    d.dex.add_liquidity(&d.owner, &d.token_b, 200).unwrap();

    let quote = d.dex.swap(&user1, &d.token_a, &d.token_b, 50).unwrap();

    assert_eq!(quote.gross_out, 25);
    assert_eq!(quote.fee, 1);
    assert_eq!(quote.fee_value, 4);
    assert_eq!(d.balance(d.token_b, user1), 24);
    assert_eq!(d.balance(d.token_a, user1), 50);
    assert_eq!(d.dex_balance(d.token_a), 50);
    assert_eq!(d.dex_balance(d.token_b), 176);
    assert_eq!(d.bank.allowance(&d.token_a, &user1, &d.dex.address()), 0);
    d.assert_conservation();
}

/// E2E-5: a deposit without allowance fails and changes nothing
#[test]
fn test_add_liquidity_without_approval_reverts() {
    let d = setup();
    let provider1 = d.users[1];
    d.fund(d.token_a, provider1, 100).unwrap();

    let err = d.dex.add_liquidity(&provider1, &d.token_a, 100).unwrap_err();

    assert!(matches!(err, LedgerError::TransferFailed(_)), "got {:?}", err);
    assert_eq!(d.dex.liquidity_stakes(&d.token_a, &provider1), 0);
    assert_eq!(d.balance(d.token_a, provider1), 100);
    // A failed deposit leaves no stake history behind
    assert_eq!(
        d.dex.withdraw_provider_fees(&provider1),
        Err(LedgerError::NoStakeHistory)
    );
}

/// E2E-6: a sole provider collects every provider share across three pools
#[test]
fn test_withdraw_provider_fees() {
    let d = setup();
    let provider1 = d.users[1];
    let (user1, user2, user3) = (d.users[2], d.users[3], d.users[4]);

    for token in [d.token_a, d.token_b, d.token_c] {
        d.fund(token, provider1, 1000).unwrap();
        d.approve(token, provider1, 1000).unwrap();
        d.dex.add_liquidity(&provider1, &token, 1000).unwrap();
    }

    let trades = [
        (user1, d.token_a, d.token_b),
        (user2, d.token_b, d.token_c),
        (user3, d.token_c, d.token_a),
    ];
    let mut provider_values = Vec::new();
    for (user, token_in, token_out) in trades {
        d.fund(token_in, user, 100).unwrap();
        d.approve(token_in, user, 100).unwrap();
        let quote = d.dex.swap(&user, &token_in, &token_out, 100).unwrap();
        provider_values.push(quote.provider_value);
    }
    assert_eq!(provider_values, vec![7, 9, 36]);
    assert_eq!(d.dex.provider_fees(&provider1).unwrap(), 52);

    let paid = d.dex.withdraw_provider_fees(&provider1).unwrap();

    assert_eq!(paid, 52);
    assert_eq!(d.dex.provider_fees(&provider1).unwrap(), 0);
    assert_eq!(d.balance(d.dex_token, provider1), 52);
    assert_eq!(d.dex.reward_reserve(), units("100000") - 52);
    d.assert_conservation();

    // Nothing new accrued: the second withdrawal pays zero
    assert_eq!(d.dex.withdraw_provider_fees(&provider1).unwrap(), 0);
    assert_eq!(d.balance(d.dex_token, provider1), 52);
}

/// E2E-7: only accounts that ever staked may withdraw provider fees
#[test]
fn test_not_provider() {
    let d = setup();
    let user = d.users[3];
    assert_eq!(d.dex.withdraw_provider_fees(&user), Err(LedgerError::NoStakeHistory));
}

/// E2E-8: only the administrator may withdraw owner fees
#[test]
fn test_not_owner() {
    let d = setup();
    let user = d.users[3];
    assert_eq!(d.dex.withdraw_owner_fees(&user), Err(LedgerError::Unauthorized));
    assert_eq!(d.dex.withdraw_owner_fees(&d.owner).unwrap(), 0);
}

/// E2E-9: the administrator re-prices a token
#[test]
fn test_change_rates() {
    let d = setup();
    d.dex.set_rate(&d.owner, &d.token_a, units("3")).unwrap();
    assert_eq!(d.dex.rates(&d.token_a), units("3"));
    assert_eq!(d.dex.rates(&d.token_b), units("4"));
}

/// E2E-10: rate changes are administrator-only
#[test]
fn test_change_rate_not_owner() {
    let d = setup();
    let user = d.users[3];
    assert_eq!(
        d.dex.set_rate(&user, &d.token_a, units("3")),
        Err(LedgerError::Unauthorized)
    );
    assert_eq!(d.dex.rates(&d.token_a), units("2"));
}

/// E2E-10b: a rate change reprices only later swaps
#[test]
fn test_rate_change_applies_to_later_swaps_only() {
    let d = setup();
    let (provider1, user) = (d.users[1], d.users[3]);
    d.fund(d.token_b, provider1, 1000).unwrap();
    d.approve(d.token_b, provider1, 1000).unwrap();
    d.dex.add_liquidity(&provider1, &d.token_b, 1000).unwrap();
    d.fund(d.token_a, user, 1000).unwrap();
    d.approve(d.token_a, user, 1000).unwrap();

    let first = d.dex.swap(&user, &d.token_a, &d.token_b, 50).unwrap();
    assert_eq!((first.net_out, first.fee_value), (24, 4));
    assert_eq!(d.dex.provider_fees(&provider1).unwrap(), 3);
    assert_eq!(d.dex.owner_fees().unwrap(), 1);

    // Repricing the output token does not revalue fees already accrued
    d.dex.set_rate(&d.owner, &d.token_b, units("8")).unwrap();
    assert_eq!(d.dex.provider_fees(&provider1).unwrap(), 3);
    assert_eq!(d.dex.owner_fees().unwrap(), 1);

    let second = d.dex.swap(&user, &d.token_a, &d.token_b, 100).unwrap();
    assert_eq!((second.gross_out, second.fee, second.net_out), (25, 1, 24));
    assert_eq!(second.fee_value, 8);
    assert_eq!(d.dex.provider_fees(&provider1).unwrap(), 3 + 7);
    assert_eq!(d.dex.owner_fees().unwrap(), 1 + 1);

    // A zeroed rate makes the token unswappable until it is priced again
    d.dex.set_rate(&d.owner, &d.token_a, 0).unwrap();
    let before = d.dex.snapshot();
    assert_eq!(
        d.dex.swap(&user, &d.token_a, &d.token_b, 50),
        Err(LedgerError::UnpricedToken(d.token_a))
    );
    assert_eq!(d.dex.snapshot(), before);
    assert_eq!(d.balance(d.token_a, user), 1000 - 150);
    d.assert_conservation();
}

/// E2E-11: swap with realistic 18-decimal amounts
#[test]
fn test_comprehensive_swap() {
    let d = setup();
    let (provider1, user) = (d.users[1], d.users[3]);

    d.fund(d.token_a, provider1, units("1000")).unwrap();
    d.approve(d.token_a, provider1, units("1000")).unwrap();
    d.dex.add_liquidity(&provider1, &d.token_a, units("1000")).unwrap();
    d.approve(d.token_b, d.owner, units("2000")).unwrap();
    d.dex.add_liquidity(&d.owner, &d.token_b, units("2000")).unwrap();

    d.fund(d.token_a, user, units("100")).unwrap();
    d.approve(d.token_a, user, units("50")).unwrap();
    let quote = d.dex.swap(&user, &d.token_a, &d.token_b, units("50")).unwrap();

    assert_eq!(quote.net_out, units("24"));
    assert_eq!(quote.fee_value, units("4"));
    assert!(d.balance(d.token_b, user) > 0);
    assert_eq!(d.dex_balance(d.token_a), units("1050"));
    assert!(d.dex_balance(d.token_b) < units("2000"));

    // Owner staked B, the output pool, so it earns the provider share
    assert_eq!(d.dex.provider_fees(&d.owner).unwrap(), units("3.6"));
    assert_eq!(d.dex.owner_fees().unwrap(), units("0.4"));
    d.assert_conservation();
}

/// E2E-12: owner fees are paid once and then reset
#[test]
fn test_withdraw_owner_fees() {
    let d = setup();
    let user = d.users[3];
    d.approve(d.token_a, d.owner, 1000).unwrap();
    d.dex.add_liquidity(&d.owner, &d.token_a, 1000).unwrap();
    d.fund(d.token_b, user, 100).unwrap();
    d.approve(d.token_b, user, 100).unwrap();

    let quote = d.dex.swap(&user, &d.token_b, &d.token_a, 100).unwrap();
    assert_eq!((quote.fee_value, quote.provider_value, quote.admin_value), (16, 14, 2));

    let before = d.balance(d.dex_token, d.owner);
    assert_eq!(d.dex.withdraw_owner_fees(&d.owner).unwrap(), 2);
    assert_eq!(d.balance(d.dex_token, d.owner), before + 2);
    assert_eq!(d.dex.withdraw_owner_fees(&d.owner).unwrap(), 0);
    d.assert_conservation();
}

/// E2E-13: the byte-level entrypoint drives the same operations
#[test]
fn test_instruction_entrypoint() {
    let d = setup();
    let user = d.users[3];
    d.approve(d.token_b, d.owner, 200).unwrap();
    d.fund(d.token_a, user, 50).unwrap();
    d.approve(d.token_a, user, 50).unwrap();

    let deposit = ExchangeInstruction::AddLiquidity {
        token: d.token_b,
        amount: 200,
    };
    let receipt = process_instruction(&d.dex, &d.owner, &deposit.pack()).unwrap();
    assert_eq!(
        receipt,
        Receipt::LiquidityAdded {
            token: d.token_b,
            stake: 200
        }
    );

    let swap = ExchangeInstruction::Swap {
        token_in: d.token_a,
        token_out: d.token_b,
        amount_in: 50,
    };
    match process_instruction(&d.dex, &user, &swap.pack()).unwrap() {
        Receipt::Swapped(quote) => assert_eq!(quote.net_out, 24),
        other => panic!("unexpected receipt {:?}", other),
    }
    assert_eq!(d.balance(d.token_b, user), 24);
    d.assert_conservation();
}

/// E2E-14: concurrent traders serialize cleanly
#[test]
fn test_concurrent_swaps_keep_books_balanced() {
    const TRADERS: usize = 4;
    const ROUNDS: usize = 25;

    let d = setup();
    let provider = d.users[1];
    for token in [d.token_a, d.token_b] {
        d.fund(token, provider, 1_000_000).unwrap();
        d.approve(token, provider, 1_000_000).unwrap();
        d.dex.add_liquidity(&provider, &token, 1_000_000).unwrap();
    }
    let traders: Vec<Address> = (0..TRADERS)
        .map(|i| Address::from_label(&format!("trader{}", i)))
        .collect();
    for trader in &traders {
        for token in [d.token_a, d.token_b] {
            d.fund(token, *trader, 100_000).unwrap();
            d.approve(token, *trader, 100_000).unwrap();
        }
    }

    let accrued: Amount = thread::scope(|scope| {
        let handles: Vec<_> = traders
            .iter()
            .map(|trader| {
                let d = &d;
                scope.spawn(move || {
                    let mut fee_value = 0;
                    for round in 0..ROUNDS {
                        let (token_in, token_out) = if round % 2 == 0 {
                            (d.token_a, d.token_b)
                        } else {
                            (d.token_b, d.token_a)
                        };
                        let quote = d.dex.swap(trader, &token_in, &token_out, 1_000).unwrap();
                        fee_value += quote.fee_value;
                    }
                    fee_value
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).sum()
    });

    let state = d.dex.snapshot();
    assert_eq!(state.fees.total_accrued(), accrued);
    assert_eq!(state.fees.outstanding(), accrued);
    let payable = d.dex.provider_fees(&provider).unwrap() + d.dex.owner_fees().unwrap();
    assert!(payable <= accrued);
    d.assert_conservation();
}

/// Token set that calls back into the exchange when paying `target`
struct HookedTokens {
    bank: TokenBank,
    target: Address,
    exchange: OnceLock<Weak<Exchange<Arc<HookedTokens>>>>,
    observed: Mutex<Vec<(Amount, Result<(), LedgerError>)>>,
}

impl HookedTokens {
    fn call_back(&self, token: &Address) {
        let Some(exchange) = self.exchange.get().and_then(Weak::upgrade) else {
            return;
        };
        let holdings = exchange.holdings(token);
        let nested = exchange.withdraw_provider_fees(&self.target).map(|_| ());
        self.observed.lock().push((holdings, nested));
    }
}

impl TokenInterface for HookedTokens {
    fn transfer(&self, token: &Address, from: &Address, to: &Address, amount: Amount) -> TokenResult<()> {
        if *to == self.target {
            self.call_back(token);
        }
        self.bank.transfer(token, from, to, amount)
    }

    fn transfer_from(
        &self,
        token: &Address,
        spender: &Address,
        owner: &Address,
        to: &Address,
        amount: Amount,
    ) -> TokenResult<()> {
        self.bank.transfer_from(token, spender, owner, to, amount)
    }

    fn balance_of(&self, token: &Address, owner: &Address) -> Amount {
        self.bank.balance_of(token, owner)
    }
}

/// E2E-15: a token that calls back mid-swap sees committed state and cannot mutate
#[test]
fn test_reentrant_token_is_rejected() {
    let _ = env_logger::builder().is_test(true).try_init();
    let (admin, a, b, r) = (
        Address::from_label("admin"),
        Address::from_label("A"),
        Address::from_label("B"),
        Address::from_label("R"),
    );
    let attacker = Address::from_label("attacker");
    let dex_address = Address::from_label("dex");

    let bank = TokenBank::new();
    for token in [a, b, r] {
        bank.create_token(token, admin, 1_000_000).unwrap();
    }
    bank.transfer(&a, &admin, &attacker, 1_000).unwrap();
    bank.approve(&a, &attacker, &dex_address, 1_000).unwrap();
    bank.approve(&b, &admin, &dex_address, 10_000).unwrap();
    bank.approve(&r, &admin, &dex_address, 10_000).unwrap();
    // The attacker also holds a stake so the nested withdrawal would otherwise succeed
    bank.transfer(&b, &admin, &attacker, 10).unwrap();
    bank.approve(&b, &attacker, &dex_address, 10).unwrap();

    let tokens = Arc::new(HookedTokens {
        bank,
        target: attacker,
        exchange: OnceLock::new(),
        observed: Mutex::new(Vec::new()),
    });
    let config = ExchangeConfig::new(admin, r, vec![a, b]);
    let dex = Arc::new(Exchange::from_config(dex_address, &config, Arc::clone(&tokens)).unwrap());
    assert!(tokens.exchange.set(Arc::downgrade(&dex)).is_ok());

    dex.set_rate(&admin, &a, units("2")).unwrap();
    dex.set_rate(&admin, &b, units("4")).unwrap();
    dex.add_reward_reserve(&admin, 10_000).unwrap();
    dex.add_liquidity(&admin, &b, 10_000).unwrap();
    dex.add_liquidity(&attacker, &b, 10).unwrap();

    let quote = dex.swap(&attacker, &a, &b, 100).unwrap();

    let observed = tokens.observed.lock().clone();
    assert_eq!(observed.len(), 1);
    let (seen_holdings, nested) = &observed[0];
    // The callback ran after the swap's effects were committed
    assert_eq!(*seen_holdings, 10_010 - quote.net_out);
    assert_eq!(*nested, Err(LedgerError::Reentrancy));

    // The outer swap completed and the lock is free again
    assert_eq!(tokens.bank.balance_of(&b, &attacker), quote.net_out);
    assert_eq!(dex.holdings(&b), tokens.bank.balance_of(&b, &dex_address));
    assert!(ledger_model::invariants::all_ok(&dex.snapshot()));
}

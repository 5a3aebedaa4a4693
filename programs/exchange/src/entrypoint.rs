//! Byte-level entrypoint

use fxswap_common::{Address, TokenInterface};
use ledger_model::LedgerResult;

use crate::exchange::Exchange;
use crate::instructions::{ExchangeInstruction, Receipt};

/// Decode `data` and run it on behalf of `caller`
pub fn process_instruction<T: TokenInterface>(
    exchange: &Exchange<T>,
    caller: &Address,
    data: &[u8],
) -> LedgerResult<Receipt> {
    let instruction = ExchangeInstruction::unpack(data).map_err(|err| {
        log::warn!("invalid instruction from {}: {}", caller, err);
        err
    })?;
    log::debug!("Instruction: {:?}", instruction.kind());

    match instruction {
        ExchangeInstruction::SetRate { token, rate } => {
            exchange.set_rate(caller, &token, rate)?;
            Ok(Receipt::RateSet { token, rate })
        }
        ExchangeInstruction::AddLiquidity { token, amount } => {
            let stake = exchange.add_liquidity(caller, &token, amount)?;
            Ok(Receipt::LiquidityAdded { token, stake })
        }
        ExchangeInstruction::Swap {
            token_in,
            token_out,
            amount_in,
        } => {
            let quote = exchange.swap(caller, &token_in, &token_out, amount_in)?;
            Ok(Receipt::Swapped(quote))
        }
        ExchangeInstruction::AddRewardReserve { amount } => {
            let reserve = exchange.add_reward_reserve(caller, amount)?;
            Ok(Receipt::ReserveFunded { reserve })
        }
        ExchangeInstruction::WithdrawProviderFees => {
            let amount = exchange.withdraw_provider_fees(caller)?;
            Ok(Receipt::ProviderFeesPaid { amount })
        }
        ExchangeInstruction::WithdrawOwnerFees => {
            let amount = exchange.withdraw_owner_fees(caller)?;
            Ok(Receipt::OwnerFeesPaid { amount })
        }
    }
}

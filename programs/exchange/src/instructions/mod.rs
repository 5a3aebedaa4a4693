//! Exchange instruction handlers and their byte encoding

pub mod add_liquidity;
pub mod reserve;
pub mod set_rate;
pub mod swap;
pub mod withdraw;

use fxswap_common::{Address, Amount, DecodeError, InstructionReader, InstructionWriter};
use ledger_model::{Rate, SwapQuote};

/// Instruction discriminator
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstructionKind {
    /// Set a token's rate (admin)
    SetRate = 0,
    /// Deposit liquidity into a token pool
    AddLiquidity = 1,
    /// Swap one accepted token for another
    Swap = 2,
    /// Fund the reward reserve (admin)
    AddRewardReserve = 3,
    /// Pay out the caller's provider fees
    WithdrawProviderFees = 4,
    /// Pay out the administrator's fees (admin)
    WithdrawOwnerFees = 5,
}

impl TryFrom<u8> for InstructionKind {
    type Error = DecodeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Ok(match value {
            0 => Self::SetRate,
            1 => Self::AddLiquidity,
            2 => Self::Swap,
            3 => Self::AddRewardReserve,
            4 => Self::WithdrawProviderFees,
            5 => Self::WithdrawOwnerFees,
            other => return Err(DecodeError::UnknownDiscriminator(other)),
        })
    }
}

/// A decoded instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeInstruction {
    SetRate { token: Address, rate: Rate },
    AddLiquidity { token: Address, amount: Amount },
    Swap { token_in: Address, token_out: Address, amount_in: Amount },
    AddRewardReserve { amount: Amount },
    WithdrawProviderFees,
    WithdrawOwnerFees,
}

impl ExchangeInstruction {
    pub fn kind(&self) -> InstructionKind {
        match self {
            Self::SetRate { .. } => InstructionKind::SetRate,
            Self::AddLiquidity { .. } => InstructionKind::AddLiquidity,
            Self::Swap { .. } => InstructionKind::Swap,
            Self::AddRewardReserve { .. } => InstructionKind::AddRewardReserve,
            Self::WithdrawProviderFees => InstructionKind::WithdrawProviderFees,
            Self::WithdrawOwnerFees => InstructionKind::WithdrawOwnerFees,
        }
    }

    /// Encode as discriminator byte + little-endian payload
    pub fn pack(&self) -> Vec<u8> {
        let writer = InstructionWriter::new(self.kind() as u8);
        match self {
            Self::SetRate { token, rate } => writer.address(token).u128(*rate),
            Self::AddLiquidity { token, amount } => writer.address(token).u128(*amount),
            Self::Swap {
                token_in,
                token_out,
                amount_in,
            } => writer.address(token_in).address(token_out).u128(*amount_in),
            Self::AddRewardReserve { amount } => writer.u128(*amount),
            Self::WithdrawProviderFees | Self::WithdrawOwnerFees => writer,
        }
        .into_bytes()
    }

    /// Decode instruction data. Rejects unknown discriminators, truncated
    /// payloads and trailing bytes.
    pub fn unpack(data: &[u8]) -> Result<Self, DecodeError> {
        if data.is_empty() {
            return Err(DecodeError::Empty);
        }
        let mut reader = InstructionReader::new(data);
        let kind = InstructionKind::try_from(reader.read_u8()?)?;

        let instruction = match kind {
            InstructionKind::SetRate => Self::SetRate {
                token: reader.read_address()?,
                rate: reader.read_u128()?,
            },
            InstructionKind::AddLiquidity => Self::AddLiquidity {
                token: reader.read_address()?,
                amount: reader.read_u128()?,
            },
            InstructionKind::Swap => Self::Swap {
                token_in: reader.read_address()?,
                token_out: reader.read_address()?,
                amount_in: reader.read_u128()?,
            },
            InstructionKind::AddRewardReserve => Self::AddRewardReserve {
                amount: reader.read_u128()?,
            },
            InstructionKind::WithdrawProviderFees => Self::WithdrawProviderFees,
            InstructionKind::WithdrawOwnerFees => Self::WithdrawOwnerFees,
        };
        reader.finish()?;
        Ok(instruction)
    }
}

/// Outcome of a processed instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Receipt {
    RateSet { token: Address, rate: Rate },
    LiquidityAdded { token: Address, stake: Amount },
    Swapped(SwapQuote),
    ReserveFunded { reserve: Amount },
    ProviderFeesPaid { amount: Amount },
    OwnerFeesPaid { amount: Amount },
}

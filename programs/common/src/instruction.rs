//! Instruction data encoding helpers
//!
//! Instruction payloads are a discriminator byte followed by little-endian
//! fields. All readers perform bounds checking and return errors on
//! truncated input.

use crate::error::DecodeError;
use crate::types::{Address, ADDRESS_LEN};

#[inline]
fn check_len(data: &[u8], offset: usize, needed: usize) -> Result<(), DecodeError> {
    match offset.checked_add(needed) {
        Some(end) if end <= data.len() => Ok(()),
        _ => Err(DecodeError::Truncated {
            offset,
            needed,
            len: data.len(),
        }),
    }
}

/// Read a u8 from instruction data
#[inline]
pub fn read_u8(data: &[u8], offset: usize) -> Result<u8, DecodeError> {
    check_len(data, offset, 1)?;
    Ok(data[offset])
}

/// Read a u128 (little-endian) from instruction data
#[inline]
pub fn read_u128(data: &[u8], offset: usize) -> Result<u128, DecodeError> {
    check_len(data, offset, 16)?;
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&data[offset..offset + 16]);
    Ok(u128::from_le_bytes(bytes))
}

/// Read a fixed-size byte array from instruction data
#[inline]
pub fn read_bytes<const N: usize>(data: &[u8], offset: usize) -> Result<[u8; N], DecodeError> {
    check_len(data, offset, N)?;
    let mut bytes = [0u8; N];
    bytes.copy_from_slice(&data[offset..offset + N]);
    Ok(bytes)
}

/// Instruction data reader with tracked offset
pub struct InstructionReader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> InstructionReader<'a> {
    #[inline]
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.offset)
    }

    #[inline]
    pub fn read_u8(&mut self) -> Result<u8, DecodeError> {
        let val = read_u8(self.data, self.offset)?;
        self.offset += 1;
        Ok(val)
    }

    #[inline]
    pub fn read_u128(&mut self) -> Result<u128, DecodeError> {
        let val = read_u128(self.data, self.offset)?;
        self.offset += 16;
        Ok(val)
    }

    #[inline]
    pub fn read_bytes<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let val = read_bytes(self.data, self.offset)?;
        self.offset += N;
        Ok(val)
    }

    #[inline]
    pub fn read_address(&mut self) -> Result<Address, DecodeError> {
        Ok(Address::new(self.read_bytes::<ADDRESS_LEN>()?))
    }

    /// Fail if any bytes were left unread
    pub fn finish(self) -> Result<(), DecodeError> {
        match self.remaining() {
            0 => Ok(()),
            n => Err(DecodeError::TrailingBytes(n)),
        }
    }
}

/// Builds instruction data in the layout `InstructionReader` expects
#[derive(Debug, Default, Clone)]
pub struct InstructionWriter {
    data: Vec<u8>,
}

impl InstructionWriter {
    pub fn new(discriminator: u8) -> Self {
        Self {
            data: vec![discriminator],
        }
    }

    pub fn u128(mut self, value: u128) -> Self {
        self.data.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn address(mut self, address: &Address) -> Self {
        self.data.extend_from_slice(address.as_bytes());
        self
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}

//! Core identity and amount types shared by every crate in the workspace

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AddressError;

/// Token amount in base units
pub type Amount = u128;

/// Length of an address in bytes
pub const ADDRESS_LEN: usize = 32;

/// Opaque 32-byte account/token handle.
///
/// Displayed and serialized as base58, the same way on-chain keys are.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address([u8; ADDRESS_LEN]);

impl Address {
    pub const fn new(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }

    /// Deterministic address for a human label (simulated accounts and tests).
    ///
    /// Labels longer than 32 bytes are truncated, so callers that derive many
    /// addresses must keep labels short and unique.
    pub fn from_label(label: &str) -> Self {
        let mut bytes = [0u8; ADDRESS_LEN];
        let src = label.as_bytes();
        let n = src.len().min(ADDRESS_LEN);
        bytes[..n].copy_from_slice(&src[..n]);
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }

    pub fn to_bytes(self) -> [u8; ADDRESS_LEN] {
        self.0
    }
}

impl From<[u8; ADDRESS_LEN]> for Address {
    fn from(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&bs58::encode(self.0).into_string())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self)
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let decoded = bs58::decode(s)
            .into_vec()
            .map_err(|e| AddressError::InvalidEncoding(e.to_string()))?;
        let bytes: [u8; ADDRESS_LEN] = decoded
            .try_into()
            .map_err(|v: Vec<u8>| AddressError::InvalidLength(v.len()))?;
        Ok(Self(bytes))
    }
}

impl TryFrom<String> for Address {
    type Error = AddressError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.to_string()
    }
}

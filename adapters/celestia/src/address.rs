use std::fmt::{Display, Formatter};
use std::str::FromStr;

use bech32::{FromBase32, ToBase32, Variant};
use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

/// Human readable part of Celestia account addresses
pub const CELESTIA_ADDRESS_PREFIX: &str = "celestia";

#[derive(Debug, thiserror::Error)]
pub enum AddressError {
    #[error("Bech32 error: {0}")]
    Bech32(#[from] bech32::Error),
    #[error("Wrong HRP: {0}")]
    WrongHrp(String),
    #[error("Address must use the bech32 checksum, not bech32m")]
    WrongVariant,
    #[error("Invalid address length {0}, should be 20 or 32")]
    InvalidLength(usize),
}

/// A Celestia account address, rendered as bech32 with the `celestia` prefix.
#[derive(Debug, PartialEq, Clone, Eq, Serialize, Deserialize, BorshDeserialize, BorshSerialize)]
pub struct CelestiaAddress(Vec<u8>);

impl CelestiaAddress {
    /// Accepts 20 byte account addresses and 32 byte module addresses.
    pub fn new(bytes: Vec<u8>) -> Result<Self, AddressError> {
        match bytes.len() {
            20 | 32 => Ok(Self(bytes)),
            len => Err(AddressError::InvalidLength(len)),
        }
    }
}

impl AsRef<[u8]> for CelestiaAddress {
    fn as_ref(&self) -> &[u8] {
        self.0.as_ref()
    }
}

impl<'a> TryFrom<&'a [u8]> for CelestiaAddress {
    type Error = AddressError;

    fn try_from(value: &'a [u8]) -> Result<Self, Self::Error> {
        Self::new(value.to_vec())
    }
}

impl From<[u8; 20]> for CelestiaAddress {
    fn from(value: [u8; 20]) -> Self {
        Self(value.to_vec())
    }
}

impl FromStr for CelestiaAddress {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (hrp, data, variant) = bech32::decode(s)?;
        if hrp != CELESTIA_ADDRESS_PREFIX {
            return Err(AddressError::WrongHrp(hrp));
        }
        if variant != Variant::Bech32 {
            return Err(AddressError::WrongVariant);
        }
        Self::new(Vec::<u8>::from_base32(&data)?)
    }
}

impl Display for CelestiaAddress {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let encoded = bech32::encode(CELESTIA_ADDRESS_PREFIX, self.0.to_base32(), Variant::Bech32)
            .map_err(|_| std::fmt::Error)?;
        f.write_str(&encoded)
    }
}

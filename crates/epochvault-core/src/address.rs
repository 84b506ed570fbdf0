// crates/epochvault-core/src/address.rs

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::crypto::hash_bytes;
use crate::error::VaultError;

/// A 32-byte account or asset address.
///
/// Accounts (depositors, receivers, the vault's own custody account) and
/// assets (the underlying token, reward tokens) share this representation.
/// The all-zero address is reserved and rejected wherever a receiver is
/// required.
///
/// Serialized as a `0x`-prefixed hex string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(pub [u8; 32]);

/// Reward and underlying assets are identified by their token address.
pub type AssetId = Address;

impl Address {
    /// The reserved zero address.
    pub const ZERO: Address = Address([0u8; 32]);

    /// Returns `true` for the reserved zero address.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    /// Derive a deterministic address from a human-readable label.
    ///
    /// Used by fixtures and the simulator so scripts can say `"alice"`
    /// instead of spelling out 64 hex digits.
    pub fn from_label(label: &str) -> Self {
        Address(hash_bytes(label.as_bytes()))
    }

    /// Return a non-zero address or fail with `ZeroAddress`.
    pub fn require_non_zero(self) -> Result<Self, VaultError> {
        if self.is_zero() {
            return Err(VaultError::ZeroAddress);
        }
        Ok(self)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for Address {
    type Err = VaultError;

    /// Parses a `0x`-prefixed 64-digit hex string. Anything else is taken as
    /// a label and hashed with [`Address::from_label`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.strip_prefix("0x") {
            Some(digits) => {
                let bytes = hex::decode(digits)
                    .map_err(|e| VaultError::InvalidConfig(format!("bad address {}: {}", s, e)))?;
                let array: [u8; 32] = bytes.try_into().map_err(|_| {
                    VaultError::InvalidConfig(format!("address {} must be 32 bytes", s))
                })?;
                Ok(Address(array))
            }
            None => Ok(Address::from_label(s)),
        }
    }
}

impl TryFrom<String> for Address {
    type Error = VaultError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_address() {
        assert!(Address::ZERO.is_zero());
        assert!(!Address::from_label("alice").is_zero());
        assert_eq!(Address::ZERO.require_non_zero(), Err(VaultError::ZeroAddress));
    }

    #[test]
    fn test_labels_are_deterministic() {
        assert_eq!(Address::from_label("alice"), Address::from_label("alice"));
        assert_ne!(Address::from_label("alice"), Address::from_label("bob"));
    }

    #[test]
    fn test_hex_round_trip() {
        let alice = Address::from_label("alice");
        let parsed: Address = alice.to_string().parse().unwrap();
        assert_eq!(parsed, alice);
    }

    #[test]
    fn test_label_parse() {
        let parsed: Address = "treasury".parse().unwrap();
        assert_eq!(parsed, Address::from_label("treasury"));
    }

    #[test]
    fn test_bad_hex_rejected() {
        assert!("0x1234".parse::<Address>().is_err());
        assert!("0xzz".parse::<Address>().is_err());
    }

    #[test]
    fn test_serde_as_hex_string() {
        let alice = Address::from_label("alice");
        let json = serde_json::to_string(&alice).unwrap();
        assert!(json.starts_with("\"0x"));
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, alice);
    }
}

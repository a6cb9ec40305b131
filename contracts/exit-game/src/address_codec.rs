//! Child-chain account addresses.
//!
//! Child accounts are 20-byte EVM addresses. They appear in three encodings:
//! - hex strings (`0x` prefixed) in messages and attributes
//! - left-padded 32-byte ABI words and log topics
//! - the keccak hash of an uncompressed secp256k1 public key

use cosmwasm_schema::cw_serde;
use std::fmt;

use crate::error::ContractError;
use crate::hash::keccak256;

/// 20-byte child ledger address
#[cw_serde]
#[derive(Copy, Eq, Hash, PartialOrd, Ord)]
pub struct ChildAddress(pub [u8; 20]);

impl ChildAddress {
    pub const ZERO: ChildAddress = ChildAddress([0u8; 20]);

    /// Parse an EVM hex address, with or without `0x`
    pub fn parse(addr: &str) -> Result<Self, ContractError> {
        let hex_str = addr
            .strip_prefix("0x")
            .or_else(|| addr.strip_prefix("0X"))
            .unwrap_or(addr);

        if hex_str.len() != 40 {
            return Err(ContractError::InvalidChildAddress {
                reason: format!("expected 40 hex chars, got {}", hex_str.len()),
            });
        }

        let bytes = hex::decode(hex_str).map_err(|e| ContractError::InvalidChildAddress {
            reason: format!("invalid hex: {}", e),
        })?;

        let mut out = [0u8; 20];
        out.copy_from_slice(&bytes);
        Ok(ChildAddress(out))
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, ContractError> {
        let out: [u8; 20] = bytes
            .try_into()
            .map_err(|_| ContractError::InvalidChildAddress {
                reason: format!("expected 20 bytes, got {}", bytes.len()),
            })?;
        Ok(ChildAddress(out))
    }

    /// Decode a left-padded 32-byte word; the upper 12 bytes must be zero
    pub fn from_word(word: &[u8]) -> Result<Self, ContractError> {
        if word.len() != 32 || word[..12].iter().any(|b| *b != 0) {
            return Err(ContractError::InvalidChildAddress {
                reason: "word is not a left-padded address".to_string(),
            });
        }
        Self::from_slice(&word[12..])
    }

    /// Address of an uncompressed (65-byte, `0x04` prefixed) public key
    pub fn from_public_key(pubkey: &[u8]) -> Result<Self, ContractError> {
        if pubkey.len() != 65 || pubkey[0] != 0x04 {
            return Err(ContractError::InvalidSignature);
        }
        let hash = keccak256(&pubkey[1..]);
        Self::from_slice(&hash[12..])
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    pub fn to_word(&self) -> [u8; 32] {
        let mut word = [0u8; 32];
        word[12..].copy_from_slice(&self.0);
        word
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl fmt::Display for ChildAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

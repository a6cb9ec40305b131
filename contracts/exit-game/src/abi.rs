//! Minimal Solidity ABI reader for child transaction calldata.
//!
//! Only the head/tail layout of `abi.encode` is needed: static words
//! (`uint256`, `address`, `bytes32`) in the head, and `bytes` as a head offset
//! pointing at a length-prefixed tail.

use cosmwasm_std::Uint256;

use crate::address_codec::ChildAddress;
use crate::error::ContractError;
use crate::hash::keccak256;

/// `transfer(address,uint256)`
pub const TRANSFER_SELECTOR: [u8; 4] = [0xa9, 0x05, 0x9c, 0xbb];
/// `transferFrom(address,address,uint256)`
pub const TRANSFER_FROM_SELECTOR: [u8; 4] = [0x23, 0xb8, 0x72, 0xdd];

/// First four bytes of the keccak of a function signature
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

fn malformed(reason: &str) -> ContractError {
    ContractError::InvalidExitTransaction {
        reason: reason.to_string(),
    }
}

/// Split calldata into its selector and argument reader
pub fn split_calldata(data: &[u8]) -> Result<([u8; 4], AbiReader<'_>), ContractError> {
    if data.len() < 4 {
        return Err(malformed("calldata shorter than a selector"));
    }
    let mut selector = [0u8; 4];
    selector.copy_from_slice(&data[..4]);
    Ok((selector, AbiReader::new(&data[4..])))
}

/// Reader over an ABI-encoded argument tuple
pub struct AbiReader<'a> {
    data: &'a [u8],
}

impl<'a> AbiReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        AbiReader { data }
    }

    /// Head word `index`
    pub fn word(&self, index: usize) -> Result<&'a [u8], ContractError> {
        let start = index
            .checked_mul(32)
            .ok_or_else(|| malformed("argument index overflow"))?;
        self.data
            .get(start..start + 32)
            .ok_or_else(|| malformed("calldata too short"))
    }

    pub fn uint(&self, index: usize) -> Result<Uint256, ContractError> {
        let mut word = [0u8; 32];
        word.copy_from_slice(self.word(index)?);
        Ok(Uint256::from_be_bytes(word))
    }

    pub fn address(&self, index: usize) -> Result<ChildAddress, ContractError> {
        ChildAddress::from_word(self.word(index)?)
            .map_err(|_| malformed("argument is not an address"))
    }

    pub fn bytes32(&self, index: usize) -> Result<[u8; 32], ContractError> {
        let mut word = [0u8; 32];
        word.copy_from_slice(self.word(index)?);
        Ok(word)
    }

    /// Dynamic `bytes` argument whose head word is an offset into the tuple
    pub fn bytes(&self, index: usize) -> Result<&'a [u8], ContractError> {
        let offset = small_usize(self.word(index)?)?;
        let length_word = offset
            .checked_add(32)
            .and_then(|end| self.data.get(offset..end))
            .ok_or_else(|| malformed("bytes offset out of range"))?;
        let length = small_usize(length_word)?;
        let start = offset + 32;
        start
            .checked_add(length)
            .and_then(|end| self.data.get(start..end))
            .ok_or_else(|| malformed("bytes length out of range"))
    }
}

/// A word that must hold a small offset or length
fn small_usize(word: &[u8]) -> Result<usize, ContractError> {
    if word[..24].iter().any(|b| *b != 0) {
        return Err(malformed("offset too large"));
    }
    let mut low = [0u8; 8];
    low.copy_from_slice(&word[24..]);
    usize::try_from(u64::from_be_bytes(low)).map_err(|_| malformed("offset too large"))
}

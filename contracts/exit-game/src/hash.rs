//! Hash computation for child-chain authorizations and identifiers
//!
//! # Order Hash (transferWithSig)
//! A token holder authorizes `spender` to move `amount` by signing
//! ```solidity
//! keccak256(abi.encodePacked(chainId, token, spender, amount, data, expiration))
//! ```
//!
//! # Byte Layout (168 bytes total)
//! - Bytes 0-31:    chainId (uint256, big-endian)
//! - Bytes 32-51:   token (address, 20 bytes)
//! - Bytes 52-71:   spender (address, 20 bytes)
//! - Bytes 72-103:  amount or token id (uint256)
//! - Bytes 104-135: data (bytes32)
//! - Bytes 136-167: expiration (uint256)
//!
//! # Swap Order Data
//! Each side of a marketplace swap binds the other side's asset:
//! `keccak256(orderId ‖ otherToken ‖ otherAmount)` (84 bytes).

use cosmwasm_std::{Addr, Uint256};

use crate::address_codec::ChildAddress;
use crate::error::ContractError;

pub use common::keccak256;

/// Domain prefix for the child-key signature linking a child account to a
/// root-ledger address
pub const LINK_PREFIX: &[u8] = b"\x19Plasma Exit Game Account Link:\n";

/// Log topic for an event signature, e.g. `Withdraw(bytes32,address,uint256,uint256,uint256)`
pub fn event_topic(signature: &str) -> [u8; 32] {
    keccak256(signature.as_bytes())
}

/// 32-byte token key carried as the first indexed topic of child token logs
pub fn token_key(root_token: &str) -> [u8; 32] {
    keccak256(root_token.as_bytes())
}

/// Digest a child key signs to link itself to `root_account`
pub fn link_digest(contract: &Addr, root_account: &Addr) -> [u8; 32] {
    let mut data = Vec::with_capacity(LINK_PREFIX.len() + 128);
    data.extend_from_slice(LINK_PREFIX);
    data.extend_from_slice(contract.as_bytes());
    data.push(b':');
    data.extend_from_slice(root_account.as_bytes());
    keccak256(&data)
}

/// Hash signed by a token holder to authorize a `transferWithSig`
pub fn order_hash(
    chain_id: u64,
    token: &ChildAddress,
    spender: &ChildAddress,
    amount: Uint256,
    data: &[u8; 32],
    expiration: Uint256,
) -> [u8; 32] {
    let mut packed = [0u8; 168];
    packed[24..32].copy_from_slice(&chain_id.to_be_bytes());
    packed[32..52].copy_from_slice(token.as_bytes());
    packed[52..72].copy_from_slice(spender.as_bytes());
    packed[72..104].copy_from_slice(&amount.to_be_bytes());
    packed[104..136].copy_from_slice(data);
    packed[136..168].copy_from_slice(&expiration.to_be_bytes());
    keccak256(&packed)
}

/// Order data one side of a swap signs over: the asset it receives in return
pub fn swap_order_data(order_id: &[u8; 32], other_token: &ChildAddress, other_amount: Uint256) -> [u8; 32] {
    let mut packed = [0u8; 84];
    packed[0..32].copy_from_slice(order_id);
    packed[32..52].copy_from_slice(other_token.as_bytes());
    packed[52..84].copy_from_slice(&other_amount.to_be_bytes());
    keccak256(&packed)
}

/// Format bytes32 as hex string with 0x prefix
pub fn bytes32_to_hex(bytes: &[u8; 32]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Parse a 32-byte hash from raw bytes
pub fn parse_bytes32(bytes: &[u8]) -> Result<[u8; 32], ContractError> {
    bytes
        .try_into()
        .map_err(|_| ContractError::MalformedProof {
            reason: format!("expected 32 bytes, got {}", bytes.len()),
        })
}

/// Uint256 as a 32-byte big-endian storage key
pub fn uint_key(value: Uint256) -> [u8; 32] {
    value.to_be_bytes()
}

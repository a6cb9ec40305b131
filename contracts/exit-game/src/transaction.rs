//! Signed child transactions.
//!
//! The child chain uses legacy EVM transactions
//! `[nonce, gasPrice, gasLimit, to, value, data, v, r, s]`. With EIP-155 the
//! signing payload is `[nonce, gasPrice, gasLimit, to, value, data, chainId, 0, 0]`
//! and `v = chainId * 2 + 35 + recoveryId`; pre-155 transactions sign the first
//! six fields and use `v = 27 + recoveryId`.

use cosmwasm_std::Api;
use rlp::{Rlp, RlpStream};

use crate::address_codec::ChildAddress;
use crate::error::ContractError;
use crate::hash::keccak256;

/// A decoded transaction with its recovered signer
#[derive(Clone, Debug, PartialEq)]
pub struct ChildTransaction {
    pub nonce: u64,
    /// Called contract; `None` for contract creation
    pub to: Option<ChildAddress>,
    pub data: Vec<u8>,
    pub chain_id: Option<u64>,
    pub signer: ChildAddress,
    /// keccak256 of the raw signed encoding
    pub hash: [u8; 32],
}

/// Half the secp256k1 group order. Signatures with a larger `s` are the
/// malleated twin of a low-`s` signature over the same payload.
const SECP256K1_HALF_ORDER: [u8; 32] = [
    0x7f, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0x5d, 0x57, 0x6e, 0x73, 0x57, 0xa4, 0x50, 0x1d, 0xdf, 0xe9, 0x2f, 0x46, 0x68, 0x1b, 0x20, 0xa0,
];

fn invalid(reason: impl Into<String>) -> ContractError {
    ContractError::InvalidExitTransaction {
        reason: reason.into(),
    }
}

/// Decode `raw` and recover its signer. Transactions signed for another chain
/// and high-`s` signatures are rejected, so a transaction has a single hash.
pub fn decode_signed(
    api: &dyn Api,
    raw: &[u8],
    expected_chain_id: u64,
) -> Result<ChildTransaction, ContractError> {
    let rlp = Rlp::new(raw);
    let count = rlp.item_count().map_err(|e| invalid(e.to_string()))?;
    if count != 9 {
        return Err(invalid(format!("expected 9 fields, got {}", count)));
    }

    let field = |i: usize| rlp.at(i).map_err(|e| invalid(e.to_string()));
    let nonce: u64 = field(0)?.as_val().map_err(|e| invalid(e.to_string()))?;
    let to_bytes = field(3)?.data().map_err(|e| invalid(e.to_string()))?;
    let to = match to_bytes.len() {
        0 => None,
        _ => Some(ChildAddress::from_slice(to_bytes).map_err(|_| invalid("bad recipient"))?),
    };
    let data = field(5)?
        .data()
        .map_err(|e| invalid(e.to_string()))?
        .to_vec();
    let v: u64 = field(6)?.as_val().map_err(|e| invalid(e.to_string()))?;

    let (chain_id, recovery_id) = match v {
        27 | 28 => (None, (v - 27) as u8),
        v if v >= 35 => (Some((v - 35) / 2), ((v - 35) % 2) as u8),
        _ => return Err(invalid(format!("unsupported v value {}", v))),
    };
    if let Some(id) = chain_id {
        if id != expected_chain_id {
            return Err(invalid(format!("signed for chain {}", id)));
        }
    }

    let mut signature = [0u8; 64];
    for (slot, i) in [(0usize, 7usize), (32, 8)] {
        let scalar = field(i)?.data().map_err(|e| invalid(e.to_string()))?;
        if scalar.is_empty() || scalar.len() > 32 {
            return Err(invalid("bad signature scalar"));
        }
        signature[slot + 32 - scalar.len()..slot + 32].copy_from_slice(scalar);
    }
    // Byte-wise comparison of equal-length big-endian arrays is numeric
    if signature[32..] > SECP256K1_HALF_ORDER[..] {
        return Err(invalid("signature s value is not canonical"));
    }

    let mut payload = RlpStream::new_list(if chain_id.is_some() { 9 } else { 6 });
    for i in 0..6 {
        payload.append_raw(field(i)?.as_raw(), 1);
    }
    if let Some(id) = chain_id {
        payload.append(&id);
        payload.append_empty_data();
        payload.append_empty_data();
    }
    let signing_hash = keccak256(&payload.out());

    let signer = recover_signer(api, &signing_hash, &signature, recovery_id)?;

    Ok(ChildTransaction {
        nonce,
        to,
        data,
        chain_id,
        signer,
        hash: keccak256(raw),
    })
}

/// Recover the child address that produced a 64-byte compact signature
pub fn recover_signer(
    api: &dyn Api,
    hash: &[u8; 32],
    signature: &[u8; 64],
    recovery_id: u8,
) -> Result<ChildAddress, ContractError> {
    if recovery_id > 1 {
        return Err(ContractError::InvalidSignature);
    }
    let pubkey = api
        .secp256k1_recover_pubkey(hash, signature, recovery_id)
        .map_err(|_| ContractError::InvalidSignature)?;
    ChildAddress::from_public_key(&pubkey)
}

/// Recover from a 65-byte `r ‖ s ‖ v` signature (`v` in {0, 1, 27, 28})
pub fn recover_rsv(
    api: &dyn Api,
    hash: &[u8; 32],
    signature: &[u8],
) -> Result<ChildAddress, ContractError> {
    if signature.len() != 65 {
        return Err(ContractError::InvalidSignature);
    }
    let mut compact = [0u8; 64];
    compact.copy_from_slice(&signature[..64]);
    let v = signature[64];
    let recovery_id = if v >= 27 { v - 27 } else { v };
    recover_signer(api, hash, &compact, recovery_id)
}

//! Exit age and priority encoding.
//!
//! An age is a 256-bit integer whose numeric order is the order in which the
//! referenced log happened on the child chain:
//!
//! | bits    | field                                                  |
//! |---------|--------------------------------------------------------|
//! | 255-128 | checkpoint maturity (`created_at + dispute_period`)    |
//! | 127-64  | child block number                                     |
//! | 63-16   | branch key (transaction index in the block, 48 bits)   |
//! | 15-0    | log index within the receipt                           |
//!
//! Exit ids append one role bit below the age: regular exits and the receiving
//! side of an in-flight transaction use 0, the sending (maker) side uses 1.

use cosmwasm_std::Uint256;
use rlp::Rlp;

use crate::error::ContractError;
use crate::state::Checkpoint;

pub const BRANCH_KEY_BITS: u32 = 48;
pub const LOG_INDEX_BITS: u32 = 16;

/// Which party of the referenced transaction an exit belongs to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExitRole {
    /// Checkpointed burn
    Regular,
    /// Sender (or swap maker) of an in-flight transaction
    Sender,
    /// Receiver (or swap taker) of an in-flight transaction
    Receiver,
}

impl ExitRole {
    pub fn bit(&self) -> u8 {
        match self {
            ExitRole::Sender => 1,
            ExitRole::Regular | ExitRole::Receiver => 0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ExitRole::Regular => "regular",
            ExitRole::Sender => "sender",
            ExitRole::Receiver => "receiver",
        }
    }
}

/// Fields packed into an age
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AgeParts {
    pub maturity: u64,
    pub block_number: u64,
    pub branch_key: u64,
    pub log_index: u64,
}

/// Time at which exits referencing `checkpoint` mature
pub fn checkpoint_maturity(checkpoint: &Checkpoint, dispute_period: u64) -> Result<u64, ContractError> {
    checkpoint
        .created_at
        .checked_add(dispute_period)
        .ok_or(ContractError::InvalidAmount {
            reason: "checkpoint maturity overflows".to_string(),
        })
}

pub fn compute_age(parts: AgeParts) -> Result<Uint256, ContractError> {
    if parts.branch_key >> BRANCH_KEY_BITS != 0 {
        return Err(ContractError::InvalidBranchPath);
    }
    if parts.log_index >> LOG_INDEX_BITS != 0 {
        return Err(ContractError::LogIndexOutOfRange {
            index: parts.log_index,
        });
    }

    let mut bytes = [0u8; 32];
    bytes[8..16].copy_from_slice(&parts.maturity.to_be_bytes());
    bytes[16..24].copy_from_slice(&parts.block_number.to_be_bytes());
    // branch key occupies the upper 48 of the low 64 bits
    let low = (parts.branch_key << LOG_INDEX_BITS) | parts.log_index;
    bytes[24..32].copy_from_slice(&low.to_be_bytes());
    Ok(Uint256::from_be_bytes(bytes))
}

pub fn decode_age(age: Uint256) -> AgeParts {
    let bytes = age.to_be_bytes();
    let word = |range: std::ops::Range<usize>| {
        let mut out = [0u8; 8];
        out.copy_from_slice(&bytes[range]);
        u64::from_be_bytes(out)
    };
    let low = word(24..32);
    AgeParts {
        maturity: word(8..16),
        block_number: word(16..24),
        branch_key: low >> LOG_INDEX_BITS,
        log_index: low & ((1 << LOG_INDEX_BITS) - 1),
    }
}

pub fn exit_id(age: Uint256, role: ExitRole) -> Result<Uint256, ContractError> {
    let shifted = age.checked_mul(Uint256::from(2u8))?;
    Ok(shifted.checked_add(Uint256::from(role.bit()))?)
}

/// Age an exit id was derived from
pub fn age_of(exit_id: Uint256) -> Uint256 {
    exit_id >> 1
}

/// Maturity time carried in an age
pub fn maturity_of(age: Uint256) -> u64 {
    decode_age(age).maturity
}

/// Transaction index from a trie branch path, which is `rlp(txIndex)`
pub fn branch_key_from_path(path: &[u8]) -> Result<u64, ContractError> {
    let index: u64 = Rlp::new(path)
        .as_val()
        .map_err(|_| ContractError::InvalidBranchPath)?;
    if rlp::encode(&index).as_ref() != path || index >> BRANCH_KEY_BITS != 0 {
        return Err(ContractError::InvalidBranchPath);
    }
    Ok(index)
}

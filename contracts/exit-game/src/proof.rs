//! Reference inputs: proofs that a child log is part of checkpointed history.
//!
//! # Wire Format
//! A reference input is a single RLP list:
//! ```text
//! [checkpointId, headerChainProof, blockNumber, blockTimestamp,
//!  transactionsRoot, receiptsRoot, rawReceipt, [receiptProofNode...],
//!  branchPath, logIndex, (rawTransaction, [transactionProofNode...])?]
//! ```
//! The optional pair proves the transaction that produced the receipt; it
//! shares the receipt's trie key (`branchPath`). Challenges must supply it.
//!
//! # Verification
//! 1. header leaf is in the checkpoint's header-chain tree at `block - start`
//! 2. receipt is in `receiptsRoot` under `branchPath`
//! 3. transaction (if any) is in `transactionsRoot` under `branchPath`
//! 4. receipt succeeded and has a log at `logIndex`

use cosmwasm_std::{Storage, Uint256};
use rlp::{DecoderError, Rlp, RlpStream};

use crate::age::{branch_key_from_path, checkpoint_maturity, compute_age, AgeParts};
use crate::error::ContractError;
use crate::hash::parse_bytes32;
use crate::state::CHECKPOINTS;
use common::merkle::{header_leaf, verify_membership};
use common::mpt::verify_proof;
use common::receipt::decode_receipt;
use common::LogEntry;

/// Decoded reference input
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReferenceInput {
    pub checkpoint_id: u64,
    pub header_proof: Vec<u8>,
    pub block_number: u64,
    pub block_timestamp: u64,
    pub transactions_root: [u8; 32],
    pub receipts_root: [u8; 32],
    pub receipt: Vec<u8>,
    pub receipt_proof: Vec<Vec<u8>>,
    pub branch_path: Vec<u8>,
    pub log_index: u64,
    pub transaction: Option<Vec<u8>>,
    pub transaction_proof: Vec<Vec<u8>>,
}

fn malformed(err: DecoderError) -> ContractError {
    ContractError::MalformedProof {
        reason: err.to_string(),
    }
}

impl ReferenceInput {
    pub fn decode(bytes: &[u8]) -> Result<Self, ContractError> {
        let rlp = Rlp::new(bytes);
        let count = rlp.item_count().map_err(malformed)?;
        if count != 10 && count != 12 {
            return Err(ContractError::MalformedProof {
                reason: format!("expected 10 or 12 fields, got {}", count),
            });
        }

        let bytes_at = |i: usize| -> Result<Vec<u8>, ContractError> {
            rlp.at(i)
                .and_then(|item| item.data().map(|d| d.to_vec()))
                .map_err(malformed)
        };
        let u64_at = |i: usize| -> Result<u64, ContractError> { rlp.val_at(i).map_err(malformed) };
        let list_at = |i: usize| -> Result<Vec<Vec<u8>>, ContractError> {
            rlp.at(i)
                .and_then(|item| item.as_list::<Vec<u8>>())
                .map_err(malformed)
        };

        let (transaction, transaction_proof) = if count == 12 {
            (Some(bytes_at(10)?), list_at(11)?)
        } else {
            (None, vec![])
        };

        Ok(ReferenceInput {
            checkpoint_id: u64_at(0)?,
            header_proof: bytes_at(1)?,
            block_number: u64_at(2)?,
            block_timestamp: u64_at(3)?,
            transactions_root: parse_bytes32(&bytes_at(4)?)?,
            receipts_root: parse_bytes32(&bytes_at(5)?)?,
            receipt: bytes_at(6)?,
            receipt_proof: list_at(7)?,
            branch_path: bytes_at(8)?,
            log_index: u64_at(9)?,
            transaction,
            transaction_proof,
        })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut s = RlpStream::new_list(if self.transaction.is_some() { 12 } else { 10 });
        s.append(&self.checkpoint_id);
        s.append(&self.header_proof);
        s.append(&self.block_number);
        s.append(&self.block_timestamp);
        s.append(&self.transactions_root.to_vec());
        s.append(&self.receipts_root.to_vec());
        s.append(&self.receipt);
        s.append_list::<Vec<u8>, Vec<u8>>(&self.receipt_proof);
        s.append(&self.branch_path);
        s.append(&self.log_index);
        if let Some(tx) = &self.transaction {
            s.append(tx);
            s.append_list::<Vec<u8>, Vec<u8>>(&self.transaction_proof);
        }
        s.out().to_vec()
    }
}

/// A reference input that passed every check
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerifiedInput {
    pub checkpoint_id: u64,
    pub block_number: u64,
    pub block_timestamp: u64,
    pub branch_key: u64,
    pub log_index: u64,
    pub log: LogEntry,
    /// Raw transaction, when the proof carried one
    pub transaction: Option<Vec<u8>>,
    pub age: Uint256,
}

/// Verify a reference input against the stored checkpoints.
pub fn verify_reference_input(
    storage: &dyn Storage,
    dispute_period: u64,
    bytes: &[u8],
) -> Result<VerifiedInput, ContractError> {
    let input = ReferenceInput::decode(bytes)?;

    let checkpoint = CHECKPOINTS
        .may_load(storage, input.checkpoint_id)?
        .ok_or(ContractError::CheckpointNotFound {
            id: input.checkpoint_id,
        })?;
    if input.block_number < checkpoint.start_block || input.block_number > checkpoint.end_block {
        return Err(ContractError::BlockOutsideCheckpoint {
            block: input.block_number,
            checkpoint_id: checkpoint.id,
        });
    }

    let leaf = header_leaf(
        input.block_number,
        input.block_timestamp,
        &input.transactions_root,
        &input.receipts_root,
    );
    let index = input.block_number - checkpoint.start_block;
    if !verify_membership(leaf, index, &checkpoint.header_root, &input.header_proof) {
        return Err(ContractError::InvalidHeaderProof);
    }

    let proven_receipt = verify_proof(&input.receipts_root, &input.branch_path, &input.receipt_proof)
        .map_err(|e| ContractError::InvalidReceiptProof {
            reason: e.to_string(),
        })?;
    if proven_receipt != input.receipt {
        return Err(ContractError::InvalidReceiptProof {
            reason: "proven value differs from the supplied receipt".to_string(),
        });
    }

    if let Some(tx) = &input.transaction {
        let proven_tx = verify_proof(
            &input.transactions_root,
            &input.branch_path,
            &input.transaction_proof,
        )
        .map_err(|e| ContractError::InvalidTransactionProof {
            reason: e.to_string(),
        })?;
        if &proven_tx != tx {
            return Err(ContractError::InvalidTransactionProof {
                reason: "proven value differs from the supplied transaction".to_string(),
            });
        }
    }

    let receipt = decode_receipt(&input.receipt).map_err(malformed)?;
    if !receipt.success {
        return Err(ContractError::FailedReceipt);
    }
    let log = usize::try_from(input.log_index)
        .ok()
        .and_then(|i| receipt.logs.get(i))
        .cloned()
        .ok_or(ContractError::LogIndexOutOfRange {
            index: input.log_index,
        })?;

    let branch_key = branch_key_from_path(&input.branch_path)?;
    let age = compute_age(AgeParts {
        maturity: checkpoint_maturity(&checkpoint, dispute_period)?,
        block_number: input.block_number,
        branch_key,
        log_index: input.log_index,
    })?;

    Ok(VerifiedInput {
        checkpoint_id: checkpoint.id,
        block_number: input.block_number,
        block_timestamp: input.block_timestamp,
        branch_key,
        log_index: input.log_index,
        log,
        transaction: input.transaction,
        age,
    })
}

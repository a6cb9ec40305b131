//! Error types for the exit game contract
//!
//! Caller errors (malformed or stale proofs, wrong balances, expired
//! authorizations) each get their own variant so clients can tell rejected
//! paths apart. Storage and arithmetic failures abort the whole call.

use cosmwasm_std::{OverflowError, StdError};
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ContractError {
    #[error("{0}")]
    Std(#[from] StdError),

    #[error("{0}")]
    Overflow(#[from] OverflowError),

    // ========================================================================
    // Authorization Errors
    // ========================================================================

    #[error("Unauthorized: only admin can perform this action")]
    Unauthorized,

    #[error("Unauthorized: only pending admin can accept")]
    UnauthorizedPendingAdmin,

    #[error("Unauthorized: only the checkpoint submitter can append checkpoints")]
    UnauthorizedCheckpointSubmitter,

    #[error("Unauthorized: caller does not own exit {exit_id}")]
    NotExitOwner { exit_id: String },

    // ========================================================================
    // Admin Errors
    // ========================================================================

    #[error("No pending admin change")]
    NoPendingAdmin,

    #[error("Timelock not expired: {remaining_seconds} seconds remaining")]
    TimelockNotExpired { remaining_seconds: u64 },

    #[error("Exit game is paused")]
    Paused,

    // ========================================================================
    // Configuration Errors
    // ========================================================================

    #[error("Invalid dispute period: must be between {min} and {max} seconds")]
    InvalidDisputePeriod { min: u64, max: u64 },

    #[error("Invalid token mapping: {reason}")]
    InvalidTokenMapping { reason: String },

    #[error("Token not mapped: {token}")]
    TokenNotMapped { token: String },

    #[error("Token already mapped: {token}")]
    TokenAlreadyMapped { token: String },

    #[error("Token {token} still has pending exits")]
    TokenHasPendingExits { token: String },

    #[error("Predicate not allowed: {predicate}")]
    PredicateNotAllowed { predicate: String },

    // ========================================================================
    // Child Account Errors
    // ========================================================================

    #[error("Invalid child address: {reason}")]
    InvalidChildAddress { reason: String },

    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Child account {child_address} is not linked to the caller")]
    ChildAccountNotLinked { child_address: String },

    // ========================================================================
    // Funds Errors
    // ========================================================================

    #[error("No funds sent")]
    NoFundsSent,

    #[error("Invalid amount: {reason}")]
    InvalidAmount { reason: String },

    #[error("Exit bond must be exactly {expected}")]
    InvalidBond { expected: String },

    #[error("Insufficient custody balance to settle exit")]
    InsufficientLiquidity,

    #[error("NFT {token_id} of {collection} is not in custody")]
    NftNotInCustody { collection: String, token_id: String },

    // ========================================================================
    // Checkpoint Errors
    // ========================================================================

    #[error("Invalid checkpoint range: {reason}")]
    InvalidCheckpointRange { reason: String },

    #[error("Checkpoint not found: {id}")]
    CheckpointNotFound { id: u64 },

    // ========================================================================
    // Proof Errors
    // ========================================================================

    #[error("Malformed proof: {reason}")]
    MalformedProof { reason: String },

    #[error("Block {block} is outside checkpoint {checkpoint_id}")]
    BlockOutsideCheckpoint { block: u64, checkpoint_id: u64 },

    #[error("Header is not part of the checkpointed header chain")]
    InvalidHeaderProof,

    #[error("Receipt inclusion proof failed: {reason}")]
    InvalidReceiptProof { reason: String },

    #[error("Transaction inclusion proof failed: {reason}")]
    InvalidTransactionProof { reason: String },

    #[error("Referenced receipt has a failed status")]
    FailedReceipt,

    #[error("Log index {index} out of range")]
    LogIndexOutOfRange { index: u64 },

    #[error("Invalid branch path")]
    InvalidBranchPath,

    // ========================================================================
    // Predicate Errors
    // ========================================================================

    #[error("Unknown log shape")]
    UnknownLogShape,

    #[error("Token mismatch")]
    TokenMismatch,

    #[error("Exitor is not a party to the exit transaction")]
    ExitorNotParty,

    #[error("Invalid exit transaction: {reason}")]
    InvalidExitTransaction { reason: String },

    #[error("Unexpected number of inputs: expected {expected}, got {got}")]
    UnexpectedInputCount { expected: String, got: usize },

    #[error("Inputs must be ordered counterparty first")]
    InputOrderViolation,

    #[error("Referenced input does not involve the expected account")]
    ReferenceAccountMismatch,

    #[error("Referenced balance does not cover the transfer")]
    InsufficientReferencedBalance,

    #[error("Signed authorization expired")]
    AuthorizationExpired,

    // ========================================================================
    // Exit Errors
    // ========================================================================

    #[error("Exit {exit_id} already exists")]
    AlreadyExited { exit_id: String },

    #[error("This side of the in-flight transaction already exited")]
    InFlightTxAlreadyExited,

    #[error("Own input {input_age} already backed exit {exit_id}")]
    OwnInputAlreadyExited { input_age: String, exit_id: String },

    #[error("Child account {exitor} already has a pending in-flight exit ({exit_id}) for {token}")]
    ExitAlreadyInProgress {
        exitor: String,
        token: String,
        exit_id: String,
    },

    #[error("Exit not found: {exit_id}")]
    ExitNotFound { exit_id: String },

    #[error("Exit {exit_id} is not pending")]
    ExitNotPending { exit_id: String },

    #[error("Exit input not found")]
    ExitInputNotFound,

    #[error("Predicate does not match the exit")]
    PredicateMismatch,

    // ========================================================================
    // Challenge Errors
    // ========================================================================

    #[error("Challenge proof must include the spending transaction")]
    ChallengeMissingTransaction,

    #[error("Cannot challenge an exit with its own exit transaction")]
    CannotChallengeWithExitTx,

    #[error("Challenge log does not spend the referenced input")]
    ChallengeNotASpend,

    #[error("Challenge is not newer than the referenced input")]
    ChallengeNotNewer,
}

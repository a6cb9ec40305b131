//! Message types for the exit game contract
//!
//! Child addresses travel as `0x` hex strings, proofs and transactions as
//! raw bytes (`Binary`), exit ids and ages as decimal `Uint256`.

use cosmwasm_schema::{cw_serde, QueryResponses};
use cosmwasm_std::{Addr, Binary, Coin, Timestamp, Uint128, Uint256};

use crate::predicates::PredicateKind;
use crate::state::{ExitStatus, SettlementMode};
use common::{AssetInfo, Cw721ReceiveMsg};

// ============================================================================
// Instantiate & Migrate
// ============================================================================

/// Migrate message
#[cw_serde]
pub struct MigrateMsg {}

/// Instantiate message
#[cw_serde]
pub struct InstantiateMsg {
    /// Admin address for contract management
    pub admin: String,
    /// Account allowed to append checkpoints
    pub checkpoint_submitter: String,
    /// Dispute window in seconds (immutable)
    pub dispute_period: u64,
    /// Bond attached to every exit start (immutable)
    pub exit_bond: Coin,
    /// Child chain id used in child signatures
    pub child_chain_id: u64,
    /// Predicates allowed from the start
    pub predicates: Vec<PredicateKind>,
}

// ============================================================================
// Execute Messages
// ============================================================================

#[cw_serde]
pub enum ExecuteMsg {
    // ========================================================================
    // Deposits
    // ========================================================================
    /// Lock native tokens into custody, credited to `child_recipient` on the child chain
    DepositNative { child_recipient: String },

    /// CW20 Receiver interface
    Receive(cw20::Cw20ReceiveMsg),

    /// CW721 Receiver interface
    ReceiveNft(Cw721ReceiveMsg),

    // ========================================================================
    // Child Accounts
    // ========================================================================
    /// Prove control of a child account by a signature of its key over the
    /// link digest for the sender
    LinkChildAccount {
        child_address: String,
        /// 64-byte compact secp256k1 signature
        signature: Binary,
        recovery_id: u8,
    },

    // ========================================================================
    // Checkpoints
    // ========================================================================
    /// Append a checkpoint (checkpoint submitter only)
    SubmitCheckpoint {
        start_block: u64,
        end_block: u64,
        header_root: Binary,
    },

    // ========================================================================
    // Exits
    // ========================================================================
    /// Start a regular exit from a checkpointed burn. Attach the exit bond.
    StartExitWithBurntTokens {
        predicate: PredicateKind,
        /// Child account that burned; must be linked to the sender
        exitor: String,
        reference: Binary,
    },

    /// Start a MoreVP exit from an in-flight transaction. Attach the exit bond.
    StartExitInFlight {
        predicate: PredicateKind,
        /// Child account exiting; must be linked to the sender
        exitor: String,
        /// Reference inputs, counterparty first
        inputs: Vec<Binary>,
        /// Signed child transaction
        exit_tx: Binary,
    },

    /// Show that an exit input was spent later. Pays the exit bond to the caller.
    ChallengeExit {
        exit_id: Uint256,
        input_age: Uint256,
        /// Reference input including the spending transaction
        challenge: Binary,
        predicate: PredicateKind,
    },

    /// Settle matured exits for `token` in priority order
    ProcessExits {
        token: String,
        max_exits: Option<u32>,
    },

    /// Hand the payout of a pending exit to another root address
    TransferExit { exit_id: Uint256, recipient: String },

    // ========================================================================
    // Token & Predicate Registry
    // ========================================================================
    MapToken {
        root_token: AssetInfo,
        child_token: String,
        settlement: SettlementMode,
    },

    UnmapToken { root_token: String },

    AddPredicate { predicate: PredicateKind },

    RemovePredicate { predicate: PredicateKind },

    SetCheckpointSubmitter { address: String },

    // ========================================================================
    // Admin Operations
    // ========================================================================
    /// Pause deposits, exit starts and processing. Challenges stay open.
    Pause {},

    Unpause {},

    /// Propose new admin (starts 7-day timelock)
    ProposeAdmin { new_admin: String },

    /// Accept admin role (after timelock)
    AcceptAdmin {},

    CancelAdminProposal {},
}

/// CW20 / CW721 receive hook payload
#[cw_serde]
pub enum ReceiveMsg {
    Deposit { child_recipient: String },
}

// ============================================================================
// Query Messages
// ============================================================================

#[cw_serde]
#[derive(QueryResponses)]
pub enum QueryMsg {
    #[returns(ConfigResponse)]
    Config {},

    #[returns(CheckpointResponse)]
    Checkpoint { id: u64 },

    #[returns(Option<CheckpointResponse>)]
    LatestCheckpoint {},

    #[returns(ExitResponse)]
    Exit { exit_id: Uint256 },

    #[returns(ExitInputsResponse)]
    ExitInputs { exit_id: Uint256 },

    /// Pending exits for a token in processing order
    #[returns(PendingExitsResponse)]
    PendingExits {
        token: String,
        start_after: Option<Uint256>,
        limit: Option<u32>,
    },

    #[returns(TokenMappingResponse)]
    TokenMapping { root_token: String },

    #[returns(TokenMappingsResponse)]
    TokenMappings {
        start_after: Option<String>,
        limit: Option<u32>,
    },

    #[returns(PredicatesResponse)]
    Predicates {},

    #[returns(LinkedAccountResponse)]
    LinkedAccount { child_address: String },

    #[returns(LockedBalanceResponse)]
    LockedBalance { token: String },

    #[returns(DepositResponse)]
    Deposit { id: u64 },

    /// Age and exit ids for a log position under a checkpoint
    #[returns(AgeResponse)]
    ComputeAge {
        checkpoint_id: u64,
        block_number: u64,
        branch_key: u64,
        log_index: u64,
    },

    /// Dry-run verification of a reference input
    #[returns(VerifyProofResponse)]
    VerifyProof { reference: Binary },

    #[returns(StatsResponse)]
    Stats {},

    #[returns(Option<PendingAdminResponse>)]
    PendingAdmin {},
}

// ============================================================================
// Query Responses
// ============================================================================

#[cw_serde]
pub struct ConfigResponse {
    pub admin: Addr,
    pub paused: bool,
    pub checkpoint_submitter: Addr,
    pub dispute_period: u64,
    pub exit_bond: Coin,
    pub child_chain_id: u64,
}

#[cw_serde]
pub struct CheckpointResponse {
    pub id: u64,
    pub start_block: u64,
    pub end_block: u64,
    pub header_root: Binary,
    pub created_at: u64,
    pub proposer: Addr,
}

#[cw_serde]
pub struct ExitResponse {
    pub exit_id: Uint256,
    pub owner: Addr,
    pub exitor: String,
    pub token: String,
    pub amount_or_token_id: Uint256,
    pub is_regular_exit: bool,
    pub predicate: PredicateKind,
    pub tx_hash: Option<Binary>,
    pub bond: Coin,
    pub started_at: u64,
    pub exitable_at: u64,
    pub status: ExitStatus,
}

#[cw_serde]
pub struct ExitInputEntry {
    pub signer: String,
    pub input_age: Uint256,
}

#[cw_serde]
pub struct ExitInputsResponse {
    pub exit_id: Uint256,
    pub inputs: Vec<ExitInputEntry>,
}

#[cw_serde]
pub struct PendingExitEntry {
    pub exit_id: Uint256,
    pub exitable_at: u64,
}

#[cw_serde]
pub struct PendingExitsResponse {
    pub token: String,
    pub exits: Vec<PendingExitEntry>,
}

#[cw_serde]
pub struct TokenMappingResponse {
    pub root_token: AssetInfo,
    pub child_token: String,
    pub settlement: SettlementMode,
}

#[cw_serde]
pub struct TokenMappingsResponse {
    pub mappings: Vec<TokenMappingResponse>,
}

#[cw_serde]
pub struct PredicatesResponse {
    pub predicates: Vec<PredicateKind>,
}

#[cw_serde]
pub struct LinkedAccountResponse {
    pub child_address: String,
    pub root_address: Option<Addr>,
}

#[cw_serde]
pub struct LockedBalanceResponse {
    pub token: String,
    pub amount: Uint128,
}

#[cw_serde]
pub struct DepositResponse {
    pub id: u64,
    pub depositor: Addr,
    pub child_recipient: String,
    pub token: String,
    pub amount_or_token_id: Uint256,
    pub deposited_at: Timestamp,
}

#[cw_serde]
pub struct AgeResponse {
    pub age: Uint256,
    pub maturity: u64,
    /// Exit id for regular exits and in-flight receivers
    pub receiver_exit_id: Uint256,
    /// Exit id for in-flight senders and swap makers
    pub sender_exit_id: Uint256,
}

#[cw_serde]
pub struct VerifyProofResponse {
    pub checkpoint_id: u64,
    pub block_number: u64,
    pub block_timestamp: u64,
    pub branch_key: u64,
    pub log_index: u64,
    pub age: Uint256,
    pub log_address: String,
    pub log_topics: Vec<Binary>,
    pub log_data: Binary,
    pub transaction: Option<Binary>,
}

#[cw_serde]
pub struct StatsResponse {
    pub total_deposits: u64,
    pub exits_started: u64,
    pub exits_challenged: u64,
    pub exits_processed: u64,
    pub exits_unpayable: u64,
    pub bonds_retained: Uint128,
}

#[cw_serde]
pub struct PendingAdminResponse {
    pub new_address: Addr,
    pub execute_after: Timestamp,
}

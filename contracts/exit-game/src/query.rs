//! Query handlers for the exit game contract.
//!
//! This module contains all query message handlers for retrieving contract state.

use cosmwasm_std::{Binary, Deps, Order, StdError, StdResult, Uint256};
use cw_storage_plus::Bound;

use crate::address_codec::ChildAddress;
use crate::age::{checkpoint_maturity, compute_age, exit_id, AgeParts, ExitRole};
use crate::error::ContractError;
use crate::hash::uint_key;
use crate::msg::{
    AgeResponse, CheckpointResponse, ConfigResponse, DepositResponse, ExitInputEntry,
    ExitInputsResponse, ExitResponse, LinkedAccountResponse, LockedBalanceResponse,
    PendingAdminResponse, PendingExitEntry, PendingExitsResponse, PredicatesResponse,
    StatsResponse, TokenMappingResponse, TokenMappingsResponse, VerifyProofResponse,
};
use crate::predicates::PredicateKind;
use crate::proof::verify_reference_input;
use crate::state::{
    Checkpoint, Exit, TokenMapping, CHECKPOINTS, CONFIG, DEPOSITS, EXITS, EXIT_INPUTS,
    LATEST_CHECKPOINT, LINKED_ACCOUNTS, LOCKED_BALANCES, PENDING_ADMIN, PENDING_EXITS, PREDICATES,
    STATS, TOKEN_MAPPINGS,
};

const DEFAULT_LIMIT: u32 = 10;
const MAX_LIMIT: u32 = 50;

fn std_err(err: ContractError) -> StdError {
    match err {
        ContractError::Std(e) => e,
        other => StdError::generic_err(other.to_string()),
    }
}

// ============================================================================
// Core Queries
// ============================================================================

pub fn query_config(deps: Deps) -> StdResult<ConfigResponse> {
    let config = CONFIG.load(deps.storage)?;
    Ok(ConfigResponse {
        admin: config.admin,
        paused: config.paused,
        checkpoint_submitter: config.checkpoint_submitter,
        dispute_period: config.dispute_period,
        exit_bond: config.exit_bond,
        child_chain_id: config.child_chain_id,
    })
}

pub fn query_stats(deps: Deps) -> StdResult<StatsResponse> {
    let stats = STATS.load(deps.storage)?;
    Ok(StatsResponse {
        total_deposits: stats.total_deposits,
        exits_started: stats.exits_started,
        exits_challenged: stats.exits_challenged,
        exits_processed: stats.exits_processed,
        exits_unpayable: stats.exits_unpayable,
        bonds_retained: stats.bonds_retained,
    })
}

pub fn query_pending_admin(deps: Deps) -> StdResult<Option<PendingAdminResponse>> {
    let pending = PENDING_ADMIN.may_load(deps.storage)?;
    Ok(pending.map(|p| PendingAdminResponse {
        new_address: p.new_address,
        execute_after: p.execute_after,
    }))
}

// ============================================================================
// Checkpoint Queries
// ============================================================================

fn checkpoint_response(checkpoint: Checkpoint) -> CheckpointResponse {
    CheckpointResponse {
        id: checkpoint.id,
        start_block: checkpoint.start_block,
        end_block: checkpoint.end_block,
        header_root: Binary::from(checkpoint.header_root.to_vec()),
        created_at: checkpoint.created_at,
        proposer: checkpoint.proposer,
    }
}

pub fn query_checkpoint(deps: Deps, id: u64) -> StdResult<CheckpointResponse> {
    let checkpoint = CHECKPOINTS.load(deps.storage, id)?;
    Ok(checkpoint_response(checkpoint))
}

pub fn query_latest_checkpoint(deps: Deps) -> StdResult<Option<CheckpointResponse>> {
    let latest = LATEST_CHECKPOINT.load(deps.storage)?;
    if latest == 0 {
        return Ok(None);
    }
    Ok(Some(checkpoint_response(CHECKPOINTS.load(deps.storage, latest)?)))
}

// ============================================================================
// Exit Queries
// ============================================================================

fn exit_response(exit: Exit) -> ExitResponse {
    ExitResponse {
        exit_id: exit.id,
        owner: exit.owner,
        exitor: exit.exitor.to_hex(),
        token: exit.token,
        amount_or_token_id: exit.amount_or_token_id,
        is_regular_exit: exit.is_regular_exit,
        predicate: exit.predicate,
        tx_hash: exit.tx_hash.map(|h| Binary::from(h.to_vec())),
        bond: exit.bond,
        started_at: exit.started_at,
        exitable_at: exit.exitable_at,
        status: exit.status,
    }
}

pub fn query_exit(deps: Deps, exit_id: Uint256) -> StdResult<ExitResponse> {
    let exit = EXITS.load(deps.storage, &uint_key(exit_id))?;
    Ok(exit_response(exit))
}

pub fn query_exit_inputs(deps: Deps, exit_id: Uint256) -> StdResult<ExitInputsResponse> {
    let key = uint_key(exit_id);
    let inputs = EXIT_INPUTS
        .prefix(&key)
        .range(deps.storage, None, None, Order::Ascending)
        .map(|item| {
            let (_, input) = item?;
            Ok(ExitInputEntry {
                signer: input.signer.to_hex(),
                input_age: input.input_age,
            })
        })
        .collect::<StdResult<Vec<_>>>()?;
    Ok(ExitInputsResponse { exit_id, inputs })
}

/// Pending exits for `token` in processing order
pub fn query_pending_exits(
    deps: Deps,
    token: String,
    start_after: Option<Uint256>,
    limit: Option<u32>,
) -> StdResult<PendingExitsResponse> {
    let limit = limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT) as usize;
    let start_key = start_after.map(uint_key);
    let start: Option<Bound<&[u8]>> = start_key
        .as_ref()
        .map(|key| Bound::exclusive(key.as_slice()));

    let exits = PENDING_EXITS
        .prefix(token.as_str())
        .range(deps.storage, start, None, Order::Ascending)
        .take(limit)
        .map(|item| {
            let (key, exitable_at) = item?;
            Ok(PendingExitEntry {
                exit_id: Uint256::from_be_bytes(key_to_word(&key)?),
                exitable_at,
            })
        })
        .collect::<StdResult<Vec<_>>>()?;

    Ok(PendingExitsResponse { token, exits })
}

fn key_to_word(key: &[u8]) -> StdResult<[u8; 32]> {
    key.try_into()
        .map_err(|_| StdError::generic_err("corrupt exit id key"))
}

// ============================================================================
// Registry Queries
// ============================================================================

fn mapping_response(mapping: TokenMapping) -> TokenMappingResponse {
    TokenMappingResponse {
        root_token: mapping.root_token,
        child_token: mapping.child_token.to_hex(),
        settlement: mapping.settlement,
    }
}

pub fn query_token_mapping(deps: Deps, root_token: String) -> StdResult<TokenMappingResponse> {
    let mapping = TOKEN_MAPPINGS.load(deps.storage, &root_token)?;
    Ok(mapping_response(mapping))
}

pub fn query_token_mappings(
    deps: Deps,
    start_after: Option<String>,
    limit: Option<u32>,
) -> StdResult<TokenMappingsResponse> {
    let limit = limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT) as usize;
    let start = start_after.as_deref().map(Bound::exclusive);

    let mappings = TOKEN_MAPPINGS
        .range(deps.storage, start, None, Order::Ascending)
        .take(limit)
        .map(|item| item.map(|(_, mapping)| mapping_response(mapping)))
        .collect::<StdResult<Vec<_>>>()?;

    Ok(TokenMappingsResponse { mappings })
}

pub fn query_predicates(deps: Deps) -> StdResult<PredicatesResponse> {
    let mut predicates = vec![];
    for kind in PredicateKind::ALL {
        if PREDICATES
            .may_load(deps.storage, kind.as_str())?
            .unwrap_or(false)
        {
            predicates.push(kind);
        }
    }
    Ok(PredicatesResponse { predicates })
}

pub fn query_linked_account(deps: Deps, child_address: String) -> StdResult<LinkedAccountResponse> {
    let child = ChildAddress::parse(&child_address).map_err(std_err)?;
    let root_address = LINKED_ACCOUNTS.may_load(deps.storage, child.as_bytes())?;
    Ok(LinkedAccountResponse {
        child_address: child.to_hex(),
        root_address,
    })
}

pub fn query_locked_balance(deps: Deps, token: String) -> StdResult<LockedBalanceResponse> {
    let amount = LOCKED_BALANCES
        .may_load(deps.storage, &token)?
        .unwrap_or_default();
    Ok(LockedBalanceResponse { token, amount })
}

pub fn query_deposit(deps: Deps, id: u64) -> StdResult<DepositResponse> {
    let deposit = DEPOSITS.load(deps.storage, id)?;
    Ok(DepositResponse {
        id: deposit.id,
        depositor: deposit.depositor,
        child_recipient: deposit.child_recipient.to_hex(),
        token: deposit.token,
        amount_or_token_id: deposit.amount_or_token_id,
        deposited_at: deposit.deposited_at,
    })
}

// ============================================================================
// Proof Tooling
// ============================================================================

/// Age and exit ids a log position would get
pub fn query_compute_age(
    deps: Deps,
    checkpoint_id: u64,
    block_number: u64,
    branch_key: u64,
    log_index: u64,
) -> StdResult<AgeResponse> {
    let config = CONFIG.load(deps.storage)?;
    let checkpoint = CHECKPOINTS.load(deps.storage, checkpoint_id)?;
    let maturity = checkpoint_maturity(&checkpoint, config.dispute_period).map_err(std_err)?;
    let age = compute_age(AgeParts {
        maturity,
        block_number,
        branch_key,
        log_index,
    })
    .map_err(std_err)?;

    Ok(AgeResponse {
        age,
        maturity,
        receiver_exit_id: exit_id(age, ExitRole::Receiver).map_err(std_err)?,
        sender_exit_id: exit_id(age, ExitRole::Sender).map_err(std_err)?,
    })
}

/// Run the full reference input verification without touching state
pub fn query_verify_proof(deps: Deps, reference: Binary) -> StdResult<VerifyProofResponse> {
    let config = CONFIG.load(deps.storage)?;
    let verified =
        verify_reference_input(deps.storage, config.dispute_period, &reference).map_err(std_err)?;

    Ok(VerifyProofResponse {
        checkpoint_id: verified.checkpoint_id,
        block_number: verified.block_number,
        block_timestamp: verified.block_timestamp,
        branch_key: verified.branch_key,
        log_index: verified.log_index,
        age: verified.age,
        log_address: format!("0x{}", hex::encode(verified.log.address)),
        log_topics: verified
            .log
            .topics
            .iter()
            .map(|t| Binary::from(t.to_vec()))
            .collect(),
        log_data: Binary::from(verified.log.data),
        transaction: verified.transaction.map(Binary::from),
    })
}

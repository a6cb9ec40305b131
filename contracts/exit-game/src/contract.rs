//! Exit Game Contract - Entry Points
//!
//! The implementation is modularized into:
//! - `execute/` - Execute message handlers
//! - `query` - Query message handlers

use cosmwasm_std::{
    entry_point, to_json_binary, Binary, Deps, DepsMut, Env, MessageInfo, Response, StdResult,
};
use cw2::{get_contract_version, set_contract_version};

use crate::error::ContractError;
use crate::execute::{
    execute_accept_admin, execute_add_predicate, execute_cancel_admin_proposal,
    execute_challenge_exit, execute_deposit_native, execute_link_child_account, execute_map_token,
    execute_process_exits, execute_set_paused, execute_propose_admin, execute_receive,
    execute_receive_nft, execute_remove_predicate, execute_set_checkpoint_submitter,
    execute_start_exit_in_flight, execute_start_exit_with_burnt_tokens,
    execute_submit_checkpoint, execute_transfer_exit, execute_unmap_token,
};
use crate::msg::{ExecuteMsg, InstantiateMsg, MigrateMsg, QueryMsg};
use crate::query::{
    query_checkpoint, query_compute_age, query_config, query_deposit, query_exit,
    query_exit_inputs, query_latest_checkpoint, query_linked_account, query_locked_balance,
    query_pending_admin, query_pending_exits, query_predicates, query_stats, query_token_mapping,
    query_token_mappings, query_verify_proof,
};
use crate::state::{
    Config, Stats, CONFIG, CONTRACT_NAME, CONTRACT_VERSION, DEPOSIT_NONCE, LATEST_CHECKPOINT,
    MAX_DISPUTE_PERIOD, MIN_DISPUTE_PERIOD, PREDICATES, STATS,
};

// ============================================================================
// Instantiate
// ============================================================================

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn instantiate(
    deps: DepsMut,
    _env: Env,
    _info: MessageInfo,
    msg: InstantiateMsg,
) -> Result<Response, ContractError> {
    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;

    let admin = deps.api.addr_validate(&msg.admin)?;
    let checkpoint_submitter = deps.api.addr_validate(&msg.checkpoint_submitter)?;

    if msg.dispute_period < MIN_DISPUTE_PERIOD || msg.dispute_period > MAX_DISPUTE_PERIOD {
        return Err(ContractError::InvalidDisputePeriod {
            min: MIN_DISPUTE_PERIOD,
            max: MAX_DISPUTE_PERIOD,
        });
    }
    if msg.exit_bond.denom.is_empty() {
        return Err(ContractError::InvalidBond {
            expected: "a bond denom".to_string(),
        });
    }

    let config = Config {
        admin,
        paused: false,
        checkpoint_submitter,
        dispute_period: msg.dispute_period,
        exit_bond: msg.exit_bond,
        child_chain_id: msg.child_chain_id,
    };
    CONFIG.save(deps.storage, &config)?;

    for predicate in &msg.predicates {
        PREDICATES.save(deps.storage, predicate.as_str(), &true)?;
    }

    STATS.save(deps.storage, &Stats::default())?;
    LATEST_CHECKPOINT.save(deps.storage, &0u64)?;
    DEPOSIT_NONCE.save(deps.storage, &0u64)?;

    Ok(Response::new()
        .add_attribute("method", "instantiate")
        .add_attribute("admin", config.admin)
        .add_attribute("checkpoint_submitter", config.checkpoint_submitter)
        .add_attribute("dispute_period", config.dispute_period.to_string())
        .add_attribute("exit_bond", config.exit_bond.to_string())
        .add_attribute("child_chain_id", config.child_chain_id.to_string())
        .add_attribute("predicates", msg.predicates.len().to_string()))
}

// ============================================================================
// Execute
// ============================================================================

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn execute(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: ExecuteMsg,
) -> Result<Response, ContractError> {
    match msg {
        // Deposits
        ExecuteMsg::DepositNative { child_recipient } => {
            execute_deposit_native(deps, env, info, child_recipient)
        }
        ExecuteMsg::Receive(cw20_msg) => execute_receive(deps, env, info, cw20_msg),
        ExecuteMsg::ReceiveNft(nft_msg) => execute_receive_nft(deps, env, info, nft_msg),

        // Child accounts
        ExecuteMsg::LinkChildAccount {
            child_address,
            signature,
            recovery_id,
        } => execute_link_child_account(deps, env, info, child_address, signature, recovery_id),

        // Checkpoints
        ExecuteMsg::SubmitCheckpoint {
            start_block,
            end_block,
            header_root,
        } => execute_submit_checkpoint(deps, env, info, start_block, end_block, header_root),

        // Exits
        ExecuteMsg::StartExitWithBurntTokens {
            predicate,
            exitor,
            reference,
        } => execute_start_exit_with_burnt_tokens(deps, env, info, predicate, exitor, reference),
        ExecuteMsg::StartExitInFlight {
            predicate,
            exitor,
            inputs,
            exit_tx,
        } => execute_start_exit_in_flight(deps, env, info, predicate, exitor, inputs, exit_tx),
        ExecuteMsg::ChallengeExit {
            exit_id,
            input_age,
            challenge,
            predicate,
        } => execute_challenge_exit(deps, info, exit_id, input_age, challenge, predicate),
        ExecuteMsg::ProcessExits { token, max_exits } => {
            execute_process_exits(deps, env, token, max_exits)
        }
        ExecuteMsg::TransferExit { exit_id, recipient } => {
            execute_transfer_exit(deps, info, exit_id, recipient)
        }

        // Token & predicate registry
        ExecuteMsg::MapToken {
            root_token,
            child_token,
            settlement,
        } => execute_map_token(deps, info, root_token, child_token, settlement),
        ExecuteMsg::UnmapToken { root_token } => execute_unmap_token(deps, info, root_token),
        ExecuteMsg::AddPredicate { predicate } => execute_add_predicate(deps, info, predicate),
        ExecuteMsg::RemovePredicate { predicate } => {
            execute_remove_predicate(deps, info, predicate)
        }
        ExecuteMsg::SetCheckpointSubmitter { address } => {
            execute_set_checkpoint_submitter(deps, info, address)
        }

        // Admin operations
        ExecuteMsg::Pause {} => execute_set_paused(deps, info, true),
        ExecuteMsg::Unpause {} => execute_set_paused(deps, info, false),
        ExecuteMsg::ProposeAdmin { new_admin } => execute_propose_admin(deps, env, info, new_admin),
        ExecuteMsg::AcceptAdmin {} => execute_accept_admin(deps, env, info),
        ExecuteMsg::CancelAdminProposal {} => execute_cancel_admin_proposal(deps, info),
    }
}

// ============================================================================
// Query
// ============================================================================

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn query(deps: Deps, _env: Env, msg: QueryMsg) -> StdResult<Binary> {
    match msg {
        QueryMsg::Config {} => to_json_binary(&query_config(deps)?),
        QueryMsg::Stats {} => to_json_binary(&query_stats(deps)?),
        QueryMsg::PendingAdmin {} => to_json_binary(&query_pending_admin(deps)?),

        // Checkpoints
        QueryMsg::Checkpoint { id } => to_json_binary(&query_checkpoint(deps, id)?),
        QueryMsg::LatestCheckpoint {} => to_json_binary(&query_latest_checkpoint(deps)?),

        // Exits
        QueryMsg::Exit { exit_id } => to_json_binary(&query_exit(deps, exit_id)?),
        QueryMsg::ExitInputs { exit_id } => to_json_binary(&query_exit_inputs(deps, exit_id)?),
        QueryMsg::PendingExits {
            token,
            start_after,
            limit,
        } => to_json_binary(&query_pending_exits(deps, token, start_after, limit)?),

        // Registry
        QueryMsg::TokenMapping { root_token } => {
            to_json_binary(&query_token_mapping(deps, root_token)?)
        }
        QueryMsg::TokenMappings { start_after, limit } => {
            to_json_binary(&query_token_mappings(deps, start_after, limit)?)
        }
        QueryMsg::Predicates {} => to_json_binary(&query_predicates(deps)?),
        QueryMsg::LinkedAccount { child_address } => {
            to_json_binary(&query_linked_account(deps, child_address)?)
        }
        QueryMsg::LockedBalance { token } => to_json_binary(&query_locked_balance(deps, token)?),
        QueryMsg::Deposit { id } => to_json_binary(&query_deposit(deps, id)?),

        // Proof tooling
        QueryMsg::ComputeAge {
            checkpoint_id,
            block_number,
            branch_key,
            log_index,
        } => to_json_binary(&query_compute_age(
            deps,
            checkpoint_id,
            block_number,
            branch_key,
            log_index,
        )?),
        QueryMsg::VerifyProof { reference } => {
            to_json_binary(&query_verify_proof(deps, reference)?)
        }
    }
}

// ============================================================================
// Migrate
// ============================================================================

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn migrate(deps: DepsMut, _env: Env, _msg: MigrateMsg) -> Result<Response, ContractError> {
    let stored = get_contract_version(deps.storage)?;
    if stored.contract != CONTRACT_NAME {
        return Err(ContractError::Std(cosmwasm_std::StdError::generic_err(
            format!("cannot migrate from {}", stored.contract),
        )));
    }
    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;

    Ok(Response::new()
        .add_attribute("method", "migrate")
        .add_attribute("from_version", stored.version)
        .add_attribute("to_version", CONTRACT_VERSION))
}

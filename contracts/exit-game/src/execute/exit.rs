//! Exit start handlers.
//!
//! Both entry points verify their reference inputs against the stored
//! checkpoints, let the chosen predicate turn them into an [`ExitClaim`] and
//! register the claim in the exit registry and the per-token priority queue.

use std::cmp::max;

use cosmwasm_std::{
    Binary, DepsMut, Env, Event, MessageInfo, Response, StdResult, Storage, Uint256,
};

use super::account::linked_exitor;
use crate::age::{exit_id, maturity_of};
use crate::error::ContractError;
use crate::hash::{bytes32_to_hex, uint_key};
use crate::predicates::{predicate_for, ExitClaim, PredicateContext, PredicateKind};
use crate::proof::verify_reference_input;
use crate::state::{
    Config, Exit, ExitStatus, CONFIG, CONSUMED_OWN_INPUTS, EXITS, EXIT_INPUTS, EXIT_TX_USED,
    OWNER_EXITS, PENDING_EXITS, PREDICATES, STATS,
};
use crate::transaction::decode_signed;

/// Most reference inputs an in-flight exit may carry
pub const MAX_EXIT_INPUTS: usize = 2;

/// Regular exit backed by a checkpointed burn
pub fn execute_start_exit_with_burnt_tokens(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    predicate: PredicateKind,
    exitor: String,
    reference: Binary,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    check_exit_start(deps.storage, &config, &info, predicate)?;
    let exitor = linked_exitor(deps.storage, &info.sender, &exitor)?;

    let claim = {
        let input = verify_reference_input(deps.storage, config.dispute_period, &reference)?;
        let ctx = PredicateContext {
            api: deps.api,
            storage: deps.storage,
            config: &config,
        };
        predicate_for(predicate).start_exit_with_direct_proof(&ctx, &input, exitor)?
    };

    register_exit(deps, &env, &info, &config, predicate, claim)
}

/// MoreVP exit from a signed child transaction that need not be checkpointed
pub fn execute_start_exit_in_flight(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    predicate: PredicateKind,
    exitor: String,
    inputs: Vec<Binary>,
    exit_tx: Binary,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    check_exit_start(deps.storage, &config, &info, predicate)?;
    let exitor = linked_exitor(deps.storage, &info.sender, &exitor)?;

    if inputs.is_empty() || inputs.len() > MAX_EXIT_INPUTS {
        return Err(ContractError::UnexpectedInputCount {
            expected: format!("1 to {}", MAX_EXIT_INPUTS),
            got: inputs.len(),
        });
    }

    let claim = {
        let verified = inputs
            .iter()
            .map(|raw| verify_reference_input(deps.storage, config.dispute_period, raw))
            .collect::<Result<Vec<_>, _>>()?;
        let tx = decode_signed(deps.api, &exit_tx, config.child_chain_id)?;
        let ctx = PredicateContext {
            api: deps.api,
            storage: deps.storage,
            config: &config,
        };
        predicate_for(predicate).start_exit_in_flight(&ctx, &verified, &tx, exitor)?
    };

    register_exit(deps, &env, &info, &config, predicate, claim)
}

/// Hand the payout of a pending exit to another root address
pub fn execute_transfer_exit(
    deps: DepsMut,
    info: MessageInfo,
    exit_id: Uint256,
    recipient: String,
) -> Result<Response, ContractError> {
    let key = uint_key(exit_id);
    let mut exit = EXITS
        .may_load(deps.storage, &key)?
        .ok_or(ContractError::ExitNotFound {
            exit_id: exit_id.to_string(),
        })?;

    if info.sender != exit.owner {
        return Err(ContractError::NotExitOwner {
            exit_id: exit_id.to_string(),
        });
    }
    if exit.status != ExitStatus::Pending {
        return Err(ContractError::ExitNotPending {
            exit_id: exit_id.to_string(),
        });
    }

    let recipient = deps.api.addr_validate(&recipient)?;
    let previous = std::mem::replace(&mut exit.owner, recipient.clone());
    EXITS.save(deps.storage, &key, &exit)?;

    Ok(Response::new()
        .add_attribute("method", "transfer_exit")
        .add_attribute("exit_id", exit_id.to_string())
        .add_attribute("from", previous)
        .add_attribute("to", recipient))
}

// ============================================================================
// Registration
// ============================================================================

/// Free the exitor's in-flight slot once `exit` leaves the queue
pub(crate) fn release_owner_exit(storage: &mut dyn Storage, exit: &Exit) -> StdResult<()> {
    if exit.is_regular_exit {
        return Ok(());
    }
    let owner_key = (exit.exitor.as_bytes().as_slice(), exit.token.as_str());
    if OWNER_EXITS.may_load(storage, owner_key)? == Some(exit.id) {
        OWNER_EXITS.remove(storage, owner_key);
    }
    Ok(())
}

fn check_exit_start(
    storage: &dyn Storage,
    config: &Config,
    info: &MessageInfo,
    predicate: PredicateKind,
) -> Result<(), ContractError> {
    if config.paused {
        return Err(ContractError::Paused);
    }
    if !PREDICATES
        .may_load(storage, predicate.as_str())?
        .unwrap_or(false)
    {
        return Err(ContractError::PredicateNotAllowed {
            predicate: predicate.as_str().to_string(),
        });
    }

    let bond = &config.exit_bond;
    let bond_paid = if bond.amount.is_zero() {
        info.funds.is_empty()
    } else {
        info.funds.len() == 1 && info.funds[0] == *bond
    };
    if !bond_paid {
        return Err(ContractError::InvalidBond {
            expected: bond.to_string(),
        });
    }
    Ok(())
}

/// Record a claim as a pending exit. Fails if the exit id, or the in-flight
/// transaction for the same role, was used before. An exitor holds at most
/// one pending in-flight exit per token, since every such exit may count the
/// exitor's own unspent balance.
fn register_exit(
    deps: DepsMut,
    env: &Env,
    info: &MessageInfo,
    config: &Config,
    predicate: PredicateKind,
    claim: ExitClaim,
) -> Result<Response, ContractError> {
    let id = exit_id(claim.age, claim.role)?;
    let key = uint_key(id);
    if EXITS.has(deps.storage, &key) {
        return Err(ContractError::AlreadyExited {
            exit_id: id.to_string(),
        });
    }

    let token = claim.token.key().to_string();
    if let Some(tx_hash) = claim.tx_hash {
        let used = (tx_hash.as_slice(), claim.role.bit());
        if EXIT_TX_USED.has(deps.storage, used) {
            return Err(ContractError::InFlightTxAlreadyExited);
        }

        let owner_key = (claim.exitor.as_bytes().as_slice(), token.as_str());
        if let Some(pending) = OWNER_EXITS.may_load(deps.storage, owner_key)? {
            return Err(ContractError::ExitAlreadyInProgress {
                exitor: claim.exitor.to_hex(),
                token: token.clone(),
                exit_id: pending.to_string(),
            });
        }
        // An unspent own balance stays unspent after its exit settles, so it
        // may back only one in-flight exit ever
        for input in claim.inputs.iter().filter(|i| i.signer == claim.exitor) {
            let input_key = uint_key(input.input_age);
            let consumed = (claim.exitor.as_bytes().as_slice(), input_key.as_slice());
            if let Some(previous) = CONSUMED_OWN_INPUTS.may_load(deps.storage, consumed)? {
                return Err(ContractError::OwnInputAlreadyExited {
                    input_age: input.input_age.to_string(),
                    exit_id: previous.to_string(),
                });
            }
            CONSUMED_OWN_INPUTS.save(deps.storage, consumed, &id)?;
        }
        EXIT_TX_USED.save(deps.storage, used, &id)?;
        OWNER_EXITS.save(deps.storage, owner_key, &id)?;
    }

    let now = env.block.time.seconds();
    let exitable_at = max(
        maturity_of(claim.age),
        now.saturating_add(config.dispute_period / 2),
    );

    let exit = Exit {
        id,
        owner: info.sender.clone(),
        exitor: claim.exitor,
        token: token.clone(),
        amount_or_token_id: claim.amount_or_token_id,
        is_regular_exit: claim.tx_hash.is_none(),
        predicate,
        tx_hash: claim.tx_hash,
        bond: config.exit_bond.clone(),
        started_at: now,
        exitable_at,
        status: ExitStatus::Pending,
    };
    EXITS.save(deps.storage, &key, &exit)?;
    PENDING_EXITS.save(deps.storage, (&token, &key), &exitable_at)?;

    let mut events = vec![Event::new("exit_started")
        .add_attribute("exit_id", id.to_string())
        .add_attribute("exitor", claim.exitor.to_hex())
        .add_attribute("owner", info.sender.to_string())
        .add_attribute("token", token.clone())
        .add_attribute("amount", claim.amount_or_token_id.to_string())
        .add_attribute("is_regular_exit", exit.is_regular_exit.to_string())
        .add_attribute("role", claim.role.as_str())
        .add_attribute("exitable_at", exitable_at.to_string())];

    for input in &claim.inputs {
        let input_key = uint_key(input.input_age);
        EXIT_INPUTS.save(deps.storage, (&key, &input_key), input)?;
        events.push(
            Event::new("exit_updated")
                .add_attribute("exit_id", id.to_string())
                .add_attribute("signer", input.signer.to_hex())
                .add_attribute("input_age", input.input_age.to_string()),
        );
    }

    let mut stats = STATS.load(deps.storage)?;
    stats.exits_started += 1;
    STATS.save(deps.storage, &stats)?;

    let mut response = Response::new()
        .add_events(events)
        .add_attribute("method", "start_exit")
        .add_attribute("predicate", predicate.as_str())
        .add_attribute("exit_id", id.to_string())
        .add_attribute("token", token);
    if let Some(tx_hash) = claim.tx_hash {
        response = response.add_attribute("tx_hash", bytes32_to_hex(&tx_hash));
    }
    Ok(response)
}

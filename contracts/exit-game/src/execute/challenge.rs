//! Exit challenges.
//!
//! Anyone may challenge a pending exit by proving that one of the inputs it
//! recorded was spent again at a later age. Challenges need no bond, stay
//! open while the contract is paused and pay the exit bond to the caller.

use cosmwasm_std::{BankMsg, Binary, CosmosMsg, DepsMut, Event, MessageInfo, Response, Uint256};

use super::exit::release_owner_exit;
use crate::error::ContractError;
use crate::hash::uint_key;
use crate::predicates::{predicate_for, PredicateContext, PredicateKind};
use crate::proof::verify_reference_input;
use crate::state::{ExitStatus, CONFIG, EXITS, EXIT_INPUTS, PENDING_EXITS, STATS};

pub fn execute_challenge_exit(
    deps: DepsMut,
    info: MessageInfo,
    exit_id: Uint256,
    input_age: Uint256,
    challenge: Binary,
    predicate: PredicateKind,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;

    let key = uint_key(exit_id);
    let mut exit = EXITS
        .may_load(deps.storage, &key)?
        .ok_or(ContractError::ExitNotFound {
            exit_id: exit_id.to_string(),
        })?;
    if exit.status != ExitStatus::Pending {
        return Err(ContractError::ExitNotPending {
            exit_id: exit_id.to_string(),
        });
    }
    if exit.predicate != predicate {
        return Err(ContractError::PredicateMismatch);
    }

    let input = EXIT_INPUTS
        .may_load(deps.storage, (&key, &uint_key(input_age)))?
        .ok_or(ContractError::ExitInputNotFound)?;

    {
        let verified = verify_reference_input(deps.storage, config.dispute_period, &challenge)?;
        let ctx = PredicateContext {
            api: deps.api,
            storage: deps.storage,
            config: &config,
        };
        predicate_for(exit.predicate).verify_deprecation(&ctx, &exit, &input, &verified)?;
    }

    exit.status = ExitStatus::Challenged;
    EXITS.save(deps.storage, &key, &exit)?;
    PENDING_EXITS.remove(deps.storage, (&exit.token, &key));
    release_owner_exit(deps.storage, &exit)?;

    let mut stats = STATS.load(deps.storage)?;
    stats.exits_challenged += 1;
    STATS.save(deps.storage, &stats)?;

    let mut messages: Vec<CosmosMsg> = vec![];
    if !exit.bond.amount.is_zero() {
        messages.push(CosmosMsg::Bank(BankMsg::Send {
            to_address: info.sender.to_string(),
            amount: vec![exit.bond.clone()],
        }));
    }

    Ok(Response::new()
        .add_messages(messages)
        .add_event(
            Event::new("exit_cancelled")
                .add_attribute("exit_id", exit_id.to_string())
                .add_attribute("challenger", info.sender.to_string())
                .add_attribute("input_age", input_age.to_string())
                .add_attribute("signer", input.signer.to_hex()),
        )
        .add_attribute("method", "challenge_exit")
        .add_attribute("exit_id", exit_id.to_string())
        .add_attribute("bond", exit.bond.to_string()))
}

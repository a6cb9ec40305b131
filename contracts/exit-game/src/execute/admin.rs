//! Admin operations handlers.
//!
//! This module handles:
//! - The admin guard shared by every privileged handler
//! - Pause/unpause of deposits, exit starts and processing
//! - Admin transfer (propose/accept/cancel) behind a timelock

use cosmwasm_std::{Addr, DepsMut, Env, Event, MessageInfo, Response, Storage};

use crate::error::ContractError;
use crate::state::{Config, PendingAdmin, ADMIN_TIMELOCK_DURATION, CONFIG, PENDING_ADMIN};

/// Load the config and require `sender` to be its admin
pub(crate) fn ensure_admin(storage: &dyn Storage, sender: &Addr) -> Result<Config, ContractError> {
    let config = CONFIG.load(storage)?;
    if *sender != config.admin {
        return Err(ContractError::Unauthorized);
    }
    Ok(config)
}

// ============================================================================
// Pause/Unpause
// ============================================================================

/// Challenges stay open while paused so a pause never shields a bad exit.
pub fn execute_set_paused(
    deps: DepsMut,
    info: MessageInfo,
    paused: bool,
) -> Result<Response, ContractError> {
    let mut config = ensure_admin(deps.storage, &info.sender)?;
    config.paused = paused;
    CONFIG.save(deps.storage, &config)?;

    let method = if paused { "pause" } else { "unpause" };
    Ok(Response::new()
        .add_event(Event::new("pause_changed").add_attribute("paused", paused.to_string()))
        .add_attribute("method", method))
}

// ============================================================================
// Admin Transfer
// ============================================================================

pub fn execute_propose_admin(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    new_admin: String,
) -> Result<Response, ContractError> {
    ensure_admin(deps.storage, &info.sender)?;

    let proposal = PendingAdmin {
        new_address: deps.api.addr_validate(&new_admin)?,
        execute_after: env.block.time.plus_seconds(ADMIN_TIMELOCK_DURATION),
    };
    PENDING_ADMIN.save(deps.storage, &proposal)?;

    Ok(Response::new()
        .add_event(
            Event::new("admin_proposed")
                .add_attribute("new_admin", proposal.new_address.as_str())
                .add_attribute("execute_after", proposal.execute_after.seconds().to_string()),
        )
        .add_attribute("method", "propose_admin"))
}

/// Only the proposed address may accept, once the timelock has run out.
pub fn execute_accept_admin(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
) -> Result<Response, ContractError> {
    let Some(proposal) = PENDING_ADMIN.may_load(deps.storage)? else {
        return Err(ContractError::NoPendingAdmin);
    };
    if info.sender != proposal.new_address {
        return Err(ContractError::UnauthorizedPendingAdmin);
    }

    let now = env.block.time.seconds();
    let unlocks_at = proposal.execute_after.seconds();
    if now < unlocks_at {
        return Err(ContractError::TimelockNotExpired {
            remaining_seconds: unlocks_at - now,
        });
    }

    CONFIG.update(deps.storage, |mut config| -> Result<_, ContractError> {
        config.admin = proposal.new_address.clone();
        Ok(config)
    })?;
    PENDING_ADMIN.remove(deps.storage);

    Ok(Response::new()
        .add_event(Event::new("admin_changed").add_attribute("admin", proposal.new_address.as_str()))
        .add_attribute("method", "accept_admin"))
}

pub fn execute_cancel_admin_proposal(
    deps: DepsMut,
    info: MessageInfo,
) -> Result<Response, ContractError> {
    ensure_admin(deps.storage, &info.sender)?;
    PENDING_ADMIN.remove(deps.storage);

    Ok(Response::new().add_attribute("method", "cancel_admin_proposal"))
}

//! Configuration management handlers.
//!
//! This module handles:
//! - Token mappings (map/unmap)
//! - Predicate allow-list (add/remove)
//! - Checkpoint submitter rotation

use cosmwasm_std::{DepsMut, MessageInfo, Order, Response};

use super::admin::ensure_admin;
use crate::address_codec::ChildAddress;
use crate::error::ContractError;
use crate::predicates::PredicateKind;
use crate::state::{
    SettlementMode, TokenMapping, CHILD_TOKENS, CONFIG, PENDING_EXITS, PREDICATES, TOKEN_MAPPINGS,
};
use common::AssetInfo;

// ============================================================================
// Token Mappings
// ============================================================================

/// Map a root asset to the child token contract that represents it.
pub fn execute_map_token(
    deps: DepsMut,
    info: MessageInfo,
    root_token: AssetInfo,
    child_token: String,
    settlement: SettlementMode,
) -> Result<Response, ContractError> {
    ensure_admin(deps.storage, &info.sender)?;

    // Contract assets are stored under their validated address
    let root_token = match root_token {
        AssetInfo::NativeToken { denom } => {
            if denom.is_empty() {
                return Err(ContractError::InvalidTokenMapping {
                    reason: "empty denom".to_string(),
                });
            }
            if settlement == SettlementMode::Mint {
                return Err(ContractError::InvalidTokenMapping {
                    reason: "native denoms cannot be minted".to_string(),
                });
            }
            AssetInfo::NativeToken { denom }
        }
        AssetInfo::Token { contract_addr } => AssetInfo::Token {
            contract_addr: deps.api.addr_validate(&contract_addr)?.to_string(),
        },
        AssetInfo::Nft { contract_addr } => AssetInfo::Nft {
            contract_addr: deps.api.addr_validate(&contract_addr)?.to_string(),
        },
    };

    let child = ChildAddress::parse(&child_token)?;
    if child == ChildAddress::ZERO {
        return Err(ContractError::InvalidTokenMapping {
            reason: "child token cannot be the zero address".to_string(),
        });
    }

    let key = root_token.key().to_string();
    if TOKEN_MAPPINGS.has(deps.storage, &key) {
        return Err(ContractError::TokenAlreadyMapped { token: key });
    }
    if CHILD_TOKENS.has(deps.storage, child.as_bytes()) {
        return Err(ContractError::TokenAlreadyMapped {
            token: child.to_hex(),
        });
    }

    let mapping = TokenMapping {
        root_token,
        child_token: child,
        settlement,
    };
    TOKEN_MAPPINGS.save(deps.storage, &key, &mapping)?;
    CHILD_TOKENS.save(deps.storage, child.as_bytes(), &key)?;

    Ok(Response::new()
        .add_attribute("method", "map_token")
        .add_attribute("root_token", key)
        .add_attribute("child_token", child.to_hex())
        .add_attribute("settlement", settlement.as_str()))
}

/// Remove a token mapping. Refused while exits for the token are pending.
pub fn execute_unmap_token(
    deps: DepsMut,
    info: MessageInfo,
    root_token: String,
) -> Result<Response, ContractError> {
    ensure_admin(deps.storage, &info.sender)?;

    let mapping = TOKEN_MAPPINGS
        .may_load(deps.storage, &root_token)?
        .ok_or(ContractError::TokenNotMapped {
            token: root_token.clone(),
        })?;

    let has_pending = PENDING_EXITS
        .prefix(root_token.as_str())
        .keys(deps.storage, None, None, Order::Ascending)
        .next()
        .is_some();
    if has_pending {
        return Err(ContractError::TokenHasPendingExits { token: root_token });
    }

    TOKEN_MAPPINGS.remove(deps.storage, &root_token);
    CHILD_TOKENS.remove(deps.storage, mapping.child_token.as_bytes());

    Ok(Response::new()
        .add_attribute("method", "unmap_token")
        .add_attribute("root_token", root_token)
        .add_attribute("child_token", mapping.child_token.to_hex()))
}

// ============================================================================
// Predicate Allow-list
// ============================================================================

pub fn execute_add_predicate(
    deps: DepsMut,
    info: MessageInfo,
    predicate: PredicateKind,
) -> Result<Response, ContractError> {
    ensure_admin(deps.storage, &info.sender)?;

    PREDICATES.save(deps.storage, predicate.as_str(), &true)?;

    Ok(Response::new()
        .add_attribute("method", "add_predicate")
        .add_attribute("predicate", predicate.as_str()))
}

/// Stop accepting new exits through `predicate`. Its pending exits can still
/// be challenged and processed.
pub fn execute_remove_predicate(
    deps: DepsMut,
    info: MessageInfo,
    predicate: PredicateKind,
) -> Result<Response, ContractError> {
    ensure_admin(deps.storage, &info.sender)?;

    PREDICATES.remove(deps.storage, predicate.as_str());

    Ok(Response::new()
        .add_attribute("method", "remove_predicate")
        .add_attribute("predicate", predicate.as_str()))
}

// ============================================================================
// Checkpoint Submitter
// ============================================================================

pub fn execute_set_checkpoint_submitter(
    deps: DepsMut,
    info: MessageInfo,
    address: String,
) -> Result<Response, ContractError> {
    let mut config = ensure_admin(deps.storage, &info.sender)?;

    config.checkpoint_submitter = deps.api.addr_validate(&address)?;
    CONFIG.save(deps.storage, &config)?;

    Ok(Response::new()
        .add_attribute("method", "set_checkpoint_submitter")
        .add_attribute("checkpoint_submitter", address))
}

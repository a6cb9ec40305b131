//! Deposit handlers (native, CW20 and CW721).
//!
//! Deposits move root assets into custody (or burn them for CW20 tokens in
//! mint mode) and record who is credited on the child chain. The child chain
//! operator mirrors each `deposit` record; the exit game only tracks custody.

use std::str::FromStr;

use cosmwasm_std::{
    from_json, to_json_binary, Addr, CosmosMsg, DepsMut, Env, Event, MessageInfo, Response, Storage,
    Uint128, Uint256, WasmMsg,
};
use cw20::{Cw20ExecuteMsg, Cw20ReceiveMsg};

use crate::address_codec::ChildAddress;
use crate::error::ContractError;
use crate::msg::ReceiveMsg;
use crate::state::{
    DepositRecord, SettlementMode, TokenMapping, CONFIG, DEPOSITS, DEPOSIT_NONCE, LOCKED_BALANCES,
    LOCKED_NFTS, STATS, TOKEN_MAPPINGS,
};
use common::{AssetInfo, Cw721ReceiveMsg};

/// Lock native tokens for `child_recipient`
pub fn execute_deposit_native(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    child_recipient: String,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    if config.paused {
        return Err(ContractError::Paused);
    }

    if info.funds.is_empty() {
        return Err(ContractError::NoFundsSent);
    }
    if info.funds.len() > 1 {
        return Err(ContractError::InvalidAmount {
            reason: "Only one token type allowed per deposit".to_string(),
        });
    }
    let coin = &info.funds[0];
    if coin.amount.is_zero() {
        return Err(ContractError::InvalidAmount {
            reason: "Deposit amount must be non-zero".to_string(),
        });
    }

    let mapping = load_mapping(deps.storage, &coin.denom)?;
    if !mapping.root_token.is_native() {
        return Err(ContractError::TokenMismatch);
    }
    let recipient = ChildAddress::parse(&child_recipient)?;

    add_locked(deps.storage, &coin.denom, coin.amount)?;
    let event = record_deposit(
        deps.storage,
        &env,
        info.sender.clone(),
        recipient,
        &coin.denom,
        Uint256::from(coin.amount),
    )?;

    Ok(Response::new()
        .add_event(event)
        .add_attribute("method", "deposit_native")
        .add_attribute("token", coin.denom.clone())
        .add_attribute("amount", coin.amount.to_string()))
}

/// CW20 receive hook. `info.sender` is the token contract.
pub fn execute_receive(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    cw20_msg: Cw20ReceiveMsg,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    if config.paused {
        return Err(ContractError::Paused);
    }

    let token = info.sender.to_string();
    let amount = cw20_msg.amount;
    let depositor = deps.api.addr_validate(&cw20_msg.sender)?;
    if amount.is_zero() {
        return Err(ContractError::InvalidAmount {
            reason: "Deposit amount must be non-zero".to_string(),
        });
    }

    let receive_msg: ReceiveMsg = from_json(&cw20_msg.msg)?;
    let ReceiveMsg::Deposit { child_recipient } = receive_msg;
    let recipient = ChildAddress::parse(&child_recipient)?;

    let mapping = load_mapping(deps.storage, &token)?;
    if !matches!(mapping.root_token, AssetInfo::Token { .. }) {
        return Err(ContractError::TokenMismatch);
    }

    // Mint-mode tokens leave custody entirely; exits mint them back
    let mut messages: Vec<CosmosMsg> = vec![];
    match mapping.settlement {
        SettlementMode::Lock => add_locked(deps.storage, &token, amount)?,
        SettlementMode::Mint => messages.push(CosmosMsg::Wasm(WasmMsg::Execute {
            contract_addr: token.clone(),
            msg: to_json_binary(&Cw20ExecuteMsg::Burn { amount })?,
            funds: vec![],
        })),
    }

    let event = record_deposit(
        deps.storage,
        &env,
        depositor,
        recipient,
        &token,
        Uint256::from(amount),
    )?;

    Ok(Response::new()
        .add_messages(messages)
        .add_event(event)
        .add_attribute("method", "deposit_cw20")
        .add_attribute("token", token)
        .add_attribute("amount", amount.to_string())
        .add_attribute("settlement", mapping.settlement.as_str()))
}

/// CW721 receive hook. `info.sender` is the collection. Token ids must be
/// decimal so they map onto child uint256 ids.
pub fn execute_receive_nft(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    nft_msg: Cw721ReceiveMsg,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    if config.paused {
        return Err(ContractError::Paused);
    }

    let collection = info.sender.to_string();
    let depositor = deps.api.addr_validate(&nft_msg.sender)?;
    let token_id = Uint256::from_str(&nft_msg.token_id).map_err(|_| ContractError::InvalidAmount {
        reason: format!("token id {} is not a decimal integer", nft_msg.token_id),
    })?;
    if token_id.to_string() != nft_msg.token_id {
        return Err(ContractError::InvalidAmount {
            reason: format!("token id {} is not canonical", nft_msg.token_id),
        });
    }

    let receive_msg: ReceiveMsg = from_json(&nft_msg.msg)?;
    let ReceiveMsg::Deposit { child_recipient } = receive_msg;
    let recipient = ChildAddress::parse(&child_recipient)?;

    let mapping = load_mapping(deps.storage, &collection)?;
    if !mapping.is_nft() {
        return Err(ContractError::TokenMismatch);
    }

    LOCKED_NFTS.save(deps.storage, (&collection, &nft_msg.token_id), &true)?;
    let event = record_deposit(
        deps.storage,
        &env,
        depositor,
        recipient,
        &collection,
        token_id,
    )?;

    Ok(Response::new()
        .add_event(event)
        .add_attribute("method", "deposit_nft")
        .add_attribute("token", collection)
        .add_attribute("token_id", nft_msg.token_id))
}

// ============================================================================
// Helpers
// ============================================================================

fn load_mapping(storage: &dyn Storage, token: &str) -> Result<TokenMapping, ContractError> {
    TOKEN_MAPPINGS
        .may_load(storage, token)?
        .ok_or(ContractError::TokenNotMapped {
            token: token.to_string(),
        })
}

fn add_locked(storage: &mut dyn Storage, token: &str, amount: Uint128) -> Result<(), ContractError> {
    let current = LOCKED_BALANCES
        .may_load(storage, token)?
        .unwrap_or_default();
    LOCKED_BALANCES.save(storage, token, &current.checked_add(amount)?)?;
    Ok(())
}

/// Store the deposit record and return its `deposit` event
fn record_deposit(
    storage: &mut dyn Storage,
    env: &Env,
    depositor: Addr,
    child_recipient: ChildAddress,
    token: &str,
    amount_or_token_id: Uint256,
) -> Result<Event, ContractError> {
    let id = DEPOSIT_NONCE.load(storage)?;
    DEPOSIT_NONCE.save(storage, &(id + 1))?;

    let record = DepositRecord {
        id,
        depositor,
        child_recipient,
        token: token.to_string(),
        amount_or_token_id,
        deposited_at: env.block.time,
    };
    DEPOSITS.save(storage, id, &record)?;

    let mut stats = STATS.load(storage)?;
    stats.total_deposits += 1;
    STATS.save(storage, &stats)?;

    Ok(Event::new("deposit")
        .add_attribute("deposit_id", id.to_string())
        .add_attribute("depositor", record.depositor.to_string())
        .add_attribute("child_recipient", record.child_recipient.to_hex())
        .add_attribute("token", record.token)
        .add_attribute("amount_or_token_id", amount_or_token_id.to_string()))
}

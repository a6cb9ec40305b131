//! Exit processing.
//!
//! Pending exits for a token are settled strictly in ascending exit id order.
//! Processing stops at the first exit that is not yet exitable, so a mature
//! exit is never paid ahead of an older one that can still be challenged.
//! Each exit leaves the queue before its payout message is built; payouts run
//! after the state is committed. An exit that custody cannot cover is marked
//! `Unpayable` and skipped, so it never blocks the exits queued behind it.

use cosmwasm_std::{CosmosMsg, DepsMut, Env, Event, Order, Response, StdResult, Storage, Uint128};

use super::exit::release_owner_exit;
use crate::error::ContractError;
use crate::predicates::{predicate_for, PredicateContext, SettlementInstruction};
use crate::state::{
    Exit, ExitStatus, CONFIG, EXITS, LOCKED_BALANCES, LOCKED_NFTS, PENDING_EXITS, STATS,
};

/// Default number of exits settled per call
pub const DEFAULT_PROCESS_LIMIT: u32 = 10;
/// Maximum number of exits settled per call
pub const MAX_PROCESS_LIMIT: u32 = 50;

pub fn execute_process_exits(
    deps: DepsMut,
    env: Env,
    token: String,
    max_exits: Option<u32>,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    if config.paused {
        return Err(ContractError::Paused);
    }

    let limit = max_exits
        .unwrap_or(DEFAULT_PROCESS_LIMIT)
        .clamp(1, MAX_PROCESS_LIMIT) as usize;
    let now = env.block.time.seconds();

    let head: Vec<(Vec<u8>, u64)> = PENDING_EXITS
        .prefix(token.as_str())
        .range(deps.storage, None, None, Order::Ascending)
        .take(limit)
        .collect::<StdResult<_>>()?;

    let mut messages: Vec<CosmosMsg> = vec![];
    let mut events: Vec<Event> = vec![];
    let mut bonds_retained = Uint128::zero();
    let mut processed = 0u64;
    let mut unpayable = 0u64;

    for (key, exitable_at) in head {
        if exitable_at > now {
            break;
        }

        let mut exit = EXITS.load(deps.storage, &key)?;
        PENDING_EXITS.remove(deps.storage, (token.as_str(), key.as_slice()));
        release_owner_exit(deps.storage, &exit)?;

        let instruction = {
            let ctx = PredicateContext {
                api: deps.api,
                storage: deps.storage,
                config: &config,
            };
            predicate_for(exit.predicate).finalize_exit(&ctx, &exit)?
        };

        // Custody checks run before any write, so a failed settlement leaves
        // balances untouched
        match settle(deps.storage, &exit, instruction) {
            Ok(msg) => {
                messages.extend(msg);
                exit.status = ExitStatus::Processed;
                processed += 1;
                events.push(
                    Event::new("withdraw")
                        .add_attribute("exit_id", exit.id.to_string())
                        .add_attribute("token", exit.token.clone())
                        .add_attribute("user", exit.owner.to_string())
                        .add_attribute("amount", exit.amount_or_token_id.to_string()),
                );
            }
            Err(
                err @ (ContractError::InsufficientLiquidity
                | ContractError::NftNotInCustody { .. }),
            ) => {
                exit.status = ExitStatus::Unpayable;
                unpayable += 1;
                events.push(
                    Event::new("settlement_failed")
                        .add_attribute("exit_id", exit.id.to_string())
                        .add_attribute("token", exit.token.clone())
                        .add_attribute("user", exit.owner.to_string())
                        .add_attribute("reason", err.to_string()),
                );
            }
            Err(err) => return Err(err),
        }
        EXITS.save(deps.storage, &key, &exit)?;
        bonds_retained = bonds_retained.checked_add(exit.bond.amount)?;
    }

    if processed + unpayable > 0 {
        let mut stats = STATS.load(deps.storage)?;
        stats.exits_processed += processed;
        stats.exits_unpayable += unpayable;
        stats.bonds_retained = stats.bonds_retained.checked_add(bonds_retained)?;
        STATS.save(deps.storage, &stats)?;
    }

    Ok(Response::new()
        .add_messages(messages)
        .add_events(events)
        .add_attribute("method", "process_exits")
        .add_attribute("token", token)
        .add_attribute("processed", processed.to_string())
        .add_attribute("unpayable", unpayable.to_string()))
}

/// Apply custody accounting for a settlement instruction and build its payout
fn settle(
    storage: &mut dyn Storage,
    exit: &Exit,
    instruction: SettlementInstruction,
) -> Result<Option<CosmosMsg>, ContractError> {
    let msg = match instruction {
        SettlementInstruction::None => return Ok(None),
        SettlementInstruction::TransferFungible(asset) => {
            let locked = LOCKED_BALANCES
                .may_load(storage, asset.info.key())?
                .unwrap_or_default();
            let remaining = locked
                .checked_sub(asset.amount)
                .map_err(|_| ContractError::InsufficientLiquidity)?;
            LOCKED_BALANCES.save(storage, asset.info.key(), &remaining)?;
            asset.transfer_msg(&exit.owner)?
        }
        SettlementInstruction::MintFungible(asset) => asset.mint_msg(&exit.owner)?,
        SettlementInstruction::TransferNft(nft) => {
            let key = (nft.contract_addr.as_str(), nft.token_id.as_str());
            if !LOCKED_NFTS.may_load(storage, key)?.unwrap_or(false) {
                return Err(ContractError::NftNotInCustody {
                    collection: nft.contract_addr.clone(),
                    token_id: nft.token_id.clone(),
                });
            }
            LOCKED_NFTS.remove(storage, key);
            nft.transfer_msg(&exit.owner)?
        }
        SettlementInstruction::MintNft(nft) => nft.mint_msg(&exit.owner)?,
    };
    Ok(Some(msg))
}

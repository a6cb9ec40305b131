//! Minimal CW721 collection: ownership, transfer, send and mint.

use cosmwasm_schema::cw_serde;
use cosmwasm_std::{
    to_json_binary, Addr, Binary, Deps, DepsMut, Empty, Env, MessageInfo, Response, StdError,
    StdResult, WasmMsg,
};
use cw_multi_test::{Contract, ContractWrapper};
use cw_storage_plus::{Item, Map};

use common::Cw721ReceiveMsg;

const MINTER: Item<Addr> = Item::new("minter");
const OWNERS: Map<&str, Addr> = Map::new("owners");

#[cw_serde]
pub struct InstantiateMsg {
    pub minter: String,
}

#[cw_serde]
pub enum ExecuteMsg {
    TransferNft {
        recipient: String,
        token_id: String,
    },
    SendNft {
        contract: String,
        token_id: String,
        msg: Binary,
    },
    Mint {
        token_id: String,
        owner: String,
        token_uri: Option<String>,
        extension: Empty,
    },
}

#[cw_serde]
pub enum QueryMsg {
    OwnerOf { token_id: String },
}

#[cw_serde]
pub struct OwnerOfResponse {
    pub owner: String,
}

fn instantiate(deps: DepsMut, _env: Env, _info: MessageInfo, msg: InstantiateMsg) -> StdResult<Response> {
    MINTER.save(deps.storage, &deps.api.addr_validate(&msg.minter)?)?;
    Ok(Response::new())
}

fn take_from_owner(deps: &mut DepsMut, sender: &Addr, token_id: &str) -> StdResult<()> {
    let owner = OWNERS.load(deps.storage, token_id)?;
    if owner != *sender {
        return Err(StdError::generic_err("not the token owner"));
    }
    Ok(())
}

fn execute(mut deps: DepsMut, _env: Env, info: MessageInfo, msg: ExecuteMsg) -> StdResult<Response> {
    match msg {
        ExecuteMsg::TransferNft {
            recipient,
            token_id,
        } => {
            take_from_owner(&mut deps, &info.sender, &token_id)?;
            OWNERS.save(deps.storage, &token_id, &deps.api.addr_validate(&recipient)?)?;
            Ok(Response::new())
        }
        ExecuteMsg::SendNft {
            contract,
            token_id,
            msg,
        } => {
            take_from_owner(&mut deps, &info.sender, &token_id)?;
            let contract = deps.api.addr_validate(&contract)?;
            OWNERS.save(deps.storage, &token_id, &contract)?;
            let hook = Cw721ReceiveMsg {
                sender: info.sender.to_string(),
                token_id,
                msg,
            };
            Ok(Response::new().add_message(WasmMsg::Execute {
                contract_addr: contract.to_string(),
                msg: to_json_binary(&exit_game::msg::ExecuteMsg::ReceiveNft(hook))?,
                funds: vec![],
            }))
        }
        ExecuteMsg::Mint {
            token_id, owner, ..
        } => {
            if info.sender != MINTER.load(deps.storage)? {
                return Err(StdError::generic_err("only the minter can mint"));
            }
            if OWNERS.has(deps.storage, &token_id) {
                return Err(StdError::generic_err("token already minted"));
            }
            OWNERS.save(deps.storage, &token_id, &deps.api.addr_validate(&owner)?)?;
            Ok(Response::new())
        }
    }
}

fn query(deps: Deps, _env: Env, msg: QueryMsg) -> StdResult<Binary> {
    match msg {
        QueryMsg::OwnerOf { token_id } => to_json_binary(&OwnerOfResponse {
            owner: OWNERS.load(deps.storage, &token_id)?.to_string(),
        }),
    }
}

pub fn contract_nft() -> Box<dyn Contract<Empty>> {
    Box::new(ContractWrapper::new(execute, instantiate, query))
}

//! Root-ledger asset types.
//!
//! Exits pay out in one of three asset kinds: native bank denoms, CW20
//! contracts and CW721 contracts. The CW721 message shapes are declared here
//! directly since the exit game only needs transfer, mint and the receive hook.

use std::fmt;

use cosmwasm_schema::cw_serde;
use cosmwasm_std::{
    to_json_binary, Addr, BankMsg, Binary, Coin, CosmosMsg, Empty, StdError, StdResult, Uint128,
    WasmMsg,
};
use cw20::Cw20ExecuteMsg;

/// Identifies an asset on the root ledger
#[cw_serde]
pub enum AssetInfo {
    /// Native bank denomination (e.g. "uluna")
    NativeToken { denom: String },
    /// CW20 token contract
    Token { contract_addr: String },
    /// CW721 collection contract
    Nft { contract_addr: String },
}

impl AssetInfo {
    /// Storage key for the asset: the denom or the contract address
    pub fn key(&self) -> &str {
        match self {
            AssetInfo::NativeToken { denom } => denom,
            AssetInfo::Token { contract_addr } | AssetInfo::Nft { contract_addr } => contract_addr,
        }
    }

    pub fn is_native(&self) -> bool {
        matches!(self, AssetInfo::NativeToken { .. })
    }

    pub fn is_nft(&self) -> bool {
        matches!(self, AssetInfo::Nft { .. })
    }
}

impl fmt::Display for AssetInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Fungible amount of a native or CW20 asset
#[cw_serde]
pub struct Asset {
    pub info: AssetInfo,
    pub amount: Uint128,
}

impl Asset {
    /// Message sending `amount` out of the contract's custody to `recipient`.
    pub fn transfer_msg(&self, recipient: &Addr) -> StdResult<CosmosMsg> {
        match &self.info {
            AssetInfo::NativeToken { denom } => Ok(CosmosMsg::Bank(BankMsg::Send {
                to_address: recipient.to_string(),
                amount: vec![Coin {
                    denom: denom.clone(),
                    amount: self.amount,
                }],
            })),
            AssetInfo::Token { contract_addr } => Ok(CosmosMsg::Wasm(WasmMsg::Execute {
                contract_addr: contract_addr.clone(),
                msg: to_json_binary(&Cw20ExecuteMsg::Transfer {
                    recipient: recipient.to_string(),
                    amount: self.amount,
                })?,
                funds: vec![],
            })),
            AssetInfo::Nft { .. } => Err(StdError::generic_err(
                "fungible transfer requested for an NFT collection",
            )),
        }
    }

    /// Message minting `amount` of a CW20 token to `recipient`.
    /// The contract must be a minter of the token.
    pub fn mint_msg(&self, recipient: &Addr) -> StdResult<CosmosMsg> {
        match &self.info {
            AssetInfo::Token { contract_addr } => Ok(CosmosMsg::Wasm(WasmMsg::Execute {
                contract_addr: contract_addr.clone(),
                msg: to_json_binary(&Cw20ExecuteMsg::Mint {
                    recipient: recipient.to_string(),
                    amount: self.amount,
                })?,
                funds: vec![],
            })),
            _ => Err(StdError::generic_err(format!(
                "asset {} cannot be minted",
                self.info
            ))),
        }
    }
}

/// A single token of a CW721 collection
#[cw_serde]
pub struct NftAsset {
    pub contract_addr: String,
    pub token_id: String,
}

impl NftAsset {
    pub fn transfer_msg(&self, recipient: &Addr) -> StdResult<CosmosMsg> {
        Ok(CosmosMsg::Wasm(WasmMsg::Execute {
            contract_addr: self.contract_addr.clone(),
            msg: to_json_binary(&Cw721ExecuteMsg::TransferNft {
                recipient: recipient.to_string(),
                token_id: self.token_id.clone(),
            })?,
            funds: vec![],
        }))
    }

    pub fn mint_msg(&self, recipient: &Addr) -> StdResult<CosmosMsg> {
        Ok(CosmosMsg::Wasm(WasmMsg::Execute {
            contract_addr: self.contract_addr.clone(),
            msg: to_json_binary(&Cw721ExecuteMsg::Mint {
                token_id: self.token_id.clone(),
                owner: recipient.to_string(),
                token_uri: None,
                extension: Empty {},
            })?,
            funds: vec![],
        }))
    }
}

/// Subset of the CW721 execute interface used for payouts
#[cw_serde]
pub enum Cw721ExecuteMsg {
    TransferNft {
        recipient: String,
        token_id: String,
    },
    Mint {
        token_id: String,
        owner: String,
        token_uri: Option<String>,
        extension: Empty,
    },
}

/// CW721 `ReceiveNft` hook payload (`SendNft` on the collection)
#[cw_serde]
pub struct Cw721ReceiveMsg {
    pub sender: String,
    pub token_id: String,
    pub msg: Binary,
}

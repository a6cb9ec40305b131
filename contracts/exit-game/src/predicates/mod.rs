//! Exit predicates.
//!
//! A predicate knows how to read one family of child transactions. It turns
//! verified reference inputs into an exit claim, decides whether a newer log
//! deprecates a recorded input, and says how a matured exit settles:
//! - `fungible` - `transfer(to, value)` on fungible child tokens
//! - `non_fungible` - `transferFrom(from, to, tokenId)` on NFT child tokens
//! - `transfer_with_sig` - `transferWithSig` authorizations signed by the holder
//! - `bundled_swap` - two-sided marketplace orders (`executeOrder`)
//!
//! All predicates accept checkpointed burns (`Withdraw` logs) as regular exits.

mod bundled_swap;
mod fungible;
mod inputs;
pub mod logs;
mod non_fungible;
mod transfer_with_sig;

use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Api, Storage, Uint128, Uint256};

use crate::address_codec::ChildAddress;
use crate::age::ExitRole;
use crate::error::ContractError;
use crate::hash::{keccak256, token_key};
use crate::proof::VerifiedInput;
use crate::state::{
    Config, Exit, ExitInput, SettlementMode, TokenMapping, CHILD_TOKENS, LOCKED_NFTS,
    TOKEN_MAPPINGS,
};
use crate::transaction::ChildTransaction;
use common::{Asset, NftAsset};

use self::logs::{ChildEvent, ChildLog};

pub use bundled_swap::BundledSwapPredicate;
pub use fungible::FungiblePredicate;
pub use non_fungible::NonFungiblePredicate;
pub use transfer_with_sig::TransferWithSigPredicate;

/// Registered predicate kinds
#[cw_serde]
#[derive(Copy, Eq, Hash)]
pub enum PredicateKind {
    Fungible,
    NonFungible,
    BundledSwap,
    TransferWithSig,
}

impl PredicateKind {
    pub const ALL: [PredicateKind; 4] = [
        PredicateKind::Fungible,
        PredicateKind::NonFungible,
        PredicateKind::BundledSwap,
        PredicateKind::TransferWithSig,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PredicateKind::Fungible => "fungible",
            PredicateKind::NonFungible => "non_fungible",
            PredicateKind::BundledSwap => "bundled_swap",
            PredicateKind::TransferWithSig => "transfer_with_sig",
        }
    }
}

/// Read-only view of the chain a predicate works against
pub struct PredicateContext<'a> {
    pub api: &'a dyn Api,
    pub storage: &'a dyn Storage,
    pub config: &'a Config,
}

/// What a predicate proved an exitor may withdraw
#[derive(Clone, Debug, PartialEq)]
pub struct ExitClaim {
    pub exitor: ChildAddress,
    pub token: TokenMapping,
    pub amount_or_token_id: Uint256,
    /// Age the exit id is derived from
    pub age: Uint256,
    pub role: ExitRole,
    pub tx_hash: Option<[u8; 32]>,
    /// Inputs a challenger may show were spent again, counterparty first
    pub inputs: Vec<ExitInput>,
}

/// How a matured exit pays out
#[derive(Clone, Debug, PartialEq)]
pub enum SettlementInstruction {
    /// Nothing to pay (zero-value exit)
    None,
    TransferFungible(Asset),
    MintFungible(Asset),
    TransferNft(NftAsset),
    MintNft(NftAsset),
}

pub trait Predicate {
    fn kind(&self) -> PredicateKind;

    /// Regular exit from a checkpointed burn by `exitor`
    fn start_exit_with_direct_proof(
        &self,
        ctx: &PredicateContext,
        input: &VerifiedInput,
        exitor: ChildAddress,
    ) -> Result<ExitClaim, ContractError>;

    /// MoreVP exit from a transaction that may not be checkpointed yet.
    /// `inputs` reference the balances the transaction consumes, counterparty first.
    fn start_exit_in_flight(
        &self,
        ctx: &PredicateContext,
        inputs: &[VerifiedInput],
        exit_tx: &ChildTransaction,
        exitor: ChildAddress,
    ) -> Result<ExitClaim, ContractError>;

    /// Succeeds when `challenge` shows `input` was spent after it was referenced
    fn verify_deprecation(
        &self,
        ctx: &PredicateContext,
        exit: &Exit,
        input: &ExitInput,
        challenge: &VerifiedInput,
    ) -> Result<(), ContractError> {
        verify_spend(ctx, exit, input, challenge)
    }

    fn finalize_exit(
        &self,
        ctx: &PredicateContext,
        exit: &Exit,
    ) -> Result<SettlementInstruction, ContractError> {
        settlement_for(ctx, exit)
    }
}

pub fn predicate_for(kind: PredicateKind) -> &'static dyn Predicate {
    match kind {
        PredicateKind::Fungible => &FungiblePredicate,
        PredicateKind::NonFungible => &NonFungiblePredicate,
        PredicateKind::BundledSwap => &BundledSwapPredicate,
        PredicateKind::TransferWithSig => &TransferWithSigPredicate,
    }
}

// ============================================================================
// Token Resolution
// ============================================================================

pub fn mapping_for_child_token(
    storage: &dyn Storage,
    child_token: &ChildAddress,
) -> Result<TokenMapping, ContractError> {
    let root = CHILD_TOKENS
        .may_load(storage, child_token.as_bytes())?
        .ok_or(ContractError::TokenNotMapped {
            token: child_token.to_hex(),
        })?;
    Ok(TOKEN_MAPPINGS.load(storage, &root)?)
}

/// Mapping of the token that emitted `log`; the log's token key must agree
pub fn mapping_for_log(storage: &dyn Storage, log: &ChildLog) -> Result<TokenMapping, ContractError> {
    let mapping = mapping_for_child_token(storage, &log.emitter)?;
    if token_key(mapping.key()) != log.token_key {
        return Err(ContractError::TokenMismatch);
    }
    Ok(mapping)
}

// ============================================================================
// Shared Operations
// ============================================================================

/// Regular exit from a `Withdraw` log. `nft` restricts the asset class.
pub(crate) fn burn_exit(
    ctx: &PredicateContext,
    input: &VerifiedInput,
    exitor: ChildAddress,
    nft: Option<bool>,
) -> Result<ExitClaim, ContractError> {
    let log = ChildLog::parse(&input.log)?;
    let (from, amount) = match &log.event {
        ChildEvent::Withdraw {
            from,
            amount_or_token_id,
            ..
        } => (*from, *amount_or_token_id),
        _ => return Err(ContractError::UnknownLogShape),
    };

    let mapping = mapping_for_log(ctx.storage, &log)?;
    if nft.map_or(false, |nft| nft != mapping.is_nft()) {
        return Err(ContractError::TokenMismatch);
    }
    if from != exitor {
        return Err(ContractError::ExitorNotParty);
    }

    Ok(ExitClaim {
        exitor,
        token: mapping,
        amount_or_token_id: amount,
        age: input.age,
        role: ExitRole::Regular,
        tx_hash: None,
        inputs: vec![],
    })
}

/// A challenge deprecates `input` when it proves, at a later age, a transaction
/// other than the exit transaction in which the input's signer spends the
/// exited token.
pub(crate) fn verify_spend(
    ctx: &PredicateContext,
    exit: &Exit,
    input: &ExitInput,
    challenge: &VerifiedInput,
) -> Result<(), ContractError> {
    let tx = challenge
        .transaction
        .as_ref()
        .ok_or(ContractError::ChallengeMissingTransaction)?;
    if exit.tx_hash == Some(keccak256(tx)) {
        return Err(ContractError::CannotChallengeWithExitTx);
    }

    let log = ChildLog::parse(&challenge.log)?;
    let mapping = mapping_for_log(ctx.storage, &log)?;
    if mapping.key() != exit.token {
        return Err(ContractError::TokenMismatch);
    }
    if !log.is_spend_by(&input.signer) {
        return Err(ContractError::ChallengeNotASpend);
    }
    if mapping.is_nft() && log.amount_or_token_id() != exit.amount_or_token_id {
        return Err(ContractError::ChallengeNotASpend);
    }

    if challenge.age <= input.input_age {
        return Err(ContractError::ChallengeNotNewer);
    }
    Ok(())
}

/// Payout for a matured exit. A missing mapping is an invariant violation.
pub(crate) fn settlement_for(
    ctx: &PredicateContext,
    exit: &Exit,
) -> Result<SettlementInstruction, ContractError> {
    let mapping = TOKEN_MAPPINGS
        .may_load(ctx.storage, &exit.token)?
        .ok_or(ContractError::TokenNotMapped {
            token: exit.token.clone(),
        })?;

    if mapping.is_nft() {
        let nft = NftAsset {
            contract_addr: mapping.key().to_string(),
            token_id: exit.amount_or_token_id.to_string(),
        };
        let in_custody = LOCKED_NFTS
            .may_load(ctx.storage, (&nft.contract_addr, &nft.token_id))?
            .unwrap_or(false);
        return Ok(match mapping.settlement {
            SettlementMode::Mint if !in_custody => SettlementInstruction::MintNft(nft),
            _ => SettlementInstruction::TransferNft(nft),
        });
    }

    if exit.amount_or_token_id.is_zero() {
        return Ok(SettlementInstruction::None);
    }
    let asset = Asset {
        info: mapping.root_token.clone(),
        amount: to_uint128(exit.amount_or_token_id)?,
    };
    Ok(match mapping.settlement {
        SettlementMode::Lock => SettlementInstruction::TransferFungible(asset),
        SettlementMode::Mint => SettlementInstruction::MintFungible(asset),
    })
}

/// Child amounts are uint256; root ledger amounts are 128-bit
pub fn to_uint128(value: Uint256) -> Result<Uint128, ContractError> {
    let bytes = value.to_be_bytes();
    if bytes[..16].iter().any(|b| *b != 0) {
        return Err(ContractError::InvalidAmount {
            reason: format!("{} exceeds the root ledger amount range", value),
        });
    }
    let mut low = [0u8; 16];
    low.copy_from_slice(&bytes[16..]);
    Ok(Uint128::new(u128::from_be_bytes(low)))
}

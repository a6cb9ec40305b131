//! Non-fungible token predicate: `transferFrom(address from, address to, uint256 tokenId)`
//! sent by the current owner. Only the receiver can exit an in-flight NFT
//! transfer; the sender has nothing left to claim.

use super::inputs::{receiver_exit, InFlightTransfer};
use super::{burn_exit, mapping_for_child_token, ExitClaim, Predicate, PredicateContext, PredicateKind};
use crate::abi::{split_calldata, TRANSFER_FROM_SELECTOR};
use crate::address_codec::ChildAddress;
use crate::age::ExitRole;
use crate::error::ContractError;
use crate::proof::VerifiedInput;
use crate::transaction::ChildTransaction;

pub struct NonFungiblePredicate;

impl Predicate for NonFungiblePredicate {
    fn kind(&self) -> PredicateKind {
        PredicateKind::NonFungible
    }

    fn start_exit_with_direct_proof(
        &self,
        ctx: &PredicateContext,
        input: &VerifiedInput,
        exitor: ChildAddress,
    ) -> Result<ExitClaim, ContractError> {
        burn_exit(ctx, input, exitor, Some(true))
    }

    fn start_exit_in_flight(
        &self,
        ctx: &PredicateContext,
        inputs: &[VerifiedInput],
        exit_tx: &ChildTransaction,
        exitor: ChildAddress,
    ) -> Result<ExitClaim, ContractError> {
        let token = exit_tx.to.ok_or(ContractError::InvalidExitTransaction {
            reason: "contract creation".to_string(),
        })?;
        let mapping = mapping_for_child_token(ctx.storage, &token)?;
        if !mapping.is_nft() {
            return Err(ContractError::TokenMismatch);
        }

        let (selector, args) = split_calldata(&exit_tx.data)?;
        if selector != TRANSFER_FROM_SELECTOR {
            return Err(ContractError::InvalidExitTransaction {
                reason: "expected transferFrom(address,address,uint256)".to_string(),
            });
        }
        let from = args.address(0)?;
        if from != exit_tx.signer {
            return Err(ContractError::InvalidExitTransaction {
                reason: "transferFrom not sent by the owner".to_string(),
            });
        }
        let to = args.address(1)?;
        if exitor != to {
            return Err(ContractError::ExitorNotParty);
        }

        let transfer = InFlightTransfer {
            mapping,
            from,
            to,
            amount_or_token_id: args.uint(2)?,
            tx_hash: exit_tx.hash,
        };
        receiver_exit(ctx, inputs, &transfer, exitor, ExitRole::Receiver)
    }
}

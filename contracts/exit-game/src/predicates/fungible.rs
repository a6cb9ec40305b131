//! Fungible token predicate: `transfer(address to, uint256 value)` sent by the
//! holder to the child token contract.

use super::inputs::{transfer_exit, InFlightTransfer};
use super::{burn_exit, mapping_for_child_token, ExitClaim, Predicate, PredicateContext, PredicateKind};
use crate::abi::{split_calldata, TRANSFER_SELECTOR};
use crate::address_codec::ChildAddress;
use crate::error::ContractError;
use crate::proof::VerifiedInput;
use crate::transaction::ChildTransaction;

pub struct FungiblePredicate;

impl Predicate for FungiblePredicate {
    fn kind(&self) -> PredicateKind {
        PredicateKind::Fungible
    }

    fn start_exit_with_direct_proof(
        &self,
        ctx: &PredicateContext,
        input: &VerifiedInput,
        exitor: ChildAddress,
    ) -> Result<ExitClaim, ContractError> {
        burn_exit(ctx, input, exitor, Some(false))
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
        if mapping.is_nft() {
            return Err(ContractError::TokenMismatch);
        }

        let (selector, args) = split_calldata(&exit_tx.data)?;
        if selector != TRANSFER_SELECTOR {
            return Err(ContractError::InvalidExitTransaction {
                reason: "expected transfer(address,uint256)".to_string(),
            });
        }

        let transfer = InFlightTransfer {
            mapping,
            from: exit_tx.signer,
            to: args.address(0)?,
            amount_or_token_id: args.uint(1)?,
            tx_hash: exit_tx.hash,
        };
        transfer_exit(ctx, inputs, &transfer, exitor)
    }
}

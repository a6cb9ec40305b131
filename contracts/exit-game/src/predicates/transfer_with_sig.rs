//! Signed-authorization transfer predicate.
//!
//! ```solidity
//! function transferWithSig(bytes sig, uint256 amount, bytes32 data, uint256 expiration, address to)
//! ```
//! The holder signs an order hash naming the transaction sender as spender;
//! the token moves from the recovered holder to `to`. Works for fungible and
//! NFT child tokens (`amount` is the token id for NFTs).

use super::inputs::{check_expiration, receiver_exit, transfer_exit, InFlightTransfer};
use super::{burn_exit, mapping_for_child_token, ExitClaim, Predicate, PredicateContext, PredicateKind};
use crate::abi::{selector, split_calldata};
use crate::address_codec::ChildAddress;
use crate::age::ExitRole;
use crate::error::ContractError;
use crate::hash::order_hash;
use crate::proof::VerifiedInput;
use crate::transaction::{recover_rsv, ChildTransaction};

pub const TRANSFER_WITH_SIG_SIGNATURE: &str = "transferWithSig(bytes,uint256,bytes32,uint256,address)";

pub struct TransferWithSigPredicate;

impl Predicate for TransferWithSigPredicate {
    fn kind(&self) -> PredicateKind {
        PredicateKind::TransferWithSig
    }

    fn start_exit_with_direct_proof(
        &self,
        ctx: &PredicateContext,
        input: &VerifiedInput,
        exitor: ChildAddress,
    ) -> Result<ExitClaim, ContractError> {
        burn_exit(ctx, input, exitor, None)
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

        let (sel, args) = split_calldata(&exit_tx.data)?;
        if sel != selector(TRANSFER_WITH_SIG_SIGNATURE) {
            return Err(ContractError::InvalidExitTransaction {
                reason: "expected transferWithSig".to_string(),
            });
        }
        let signature = args.bytes(0)?;
        let amount = args.uint(1)?;
        let data = args.bytes32(2)?;
        let expiration = args.uint(3)?;
        let to = args.address(4)?;

        check_expiration(expiration, inputs)?;

        let hash = order_hash(
            ctx.config.child_chain_id,
            &token,
            &exit_tx.signer,
            amount,
            &data,
            expiration,
        );
        let from = recover_rsv(ctx.api, &hash, signature)?;

        let transfer = InFlightTransfer {
            mapping,
            from,
            to,
            amount_or_token_id: amount,
            tx_hash: exit_tx.hash,
        };
        if transfer.mapping.is_nft() {
            if exitor != to {
                return Err(ContractError::ExitorNotParty);
            }
            return receiver_exit(ctx, inputs, &transfer, exitor, ExitRole::Receiver);
        }
        transfer_exit(ctx, inputs, &transfer, exitor)
    }
}

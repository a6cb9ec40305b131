//! Marketplace swap predicate.
//!
//! ```solidity
//! function executeOrder(bytes data1, bytes data2, bytes32 orderId, uint256 expiration, address taker)
//! ```
//! with `dataN = abi.encode(address token, bytes sig, uint256 amountOrTokenId)`.
//! The marketplace contract is the spender of both authorizations. The maker
//! signs side 1 over `keccak256(orderId ‖ token2 ‖ amount2)` and the taker
//! signs side 2 over `keccak256(orderId ‖ token1 ‖ amount1)`, so neither side
//! can be replayed into a different trade.
//!
//! Either party may exit the asset it receives: the taker exits side 1 on the
//! receiver role, the maker exits side 2 on the sender role.

use cosmwasm_std::Uint256;

use super::inputs::{check_expiration, receiver_exit, InFlightTransfer};
use super::{burn_exit, mapping_for_child_token, ExitClaim, Predicate, PredicateContext, PredicateKind};
use crate::abi::{selector, split_calldata, AbiReader};
use crate::address_codec::ChildAddress;
use crate::age::ExitRole;
use crate::error::ContractError;
use crate::hash::{order_hash, swap_order_data};
use crate::proof::VerifiedInput;
use crate::transaction::{recover_rsv, ChildTransaction};

pub const EXECUTE_ORDER_SIGNATURE: &str = "executeOrder(bytes,bytes,bytes32,uint256,address)";

pub struct BundledSwapPredicate;

/// One side of a swap order
struct OrderSide<'a> {
    token: ChildAddress,
    signature: &'a [u8],
    amount: Uint256,
}

fn decode_side(data: &[u8]) -> Result<OrderSide<'_>, ContractError> {
    let reader = AbiReader::new(data);
    Ok(OrderSide {
        token: reader.address(0)?,
        signature: reader.bytes(1)?,
        amount: reader.uint(2)?,
    })
}

impl Predicate for BundledSwapPredicate {
    fn kind(&self) -> PredicateKind {
        PredicateKind::BundledSwap
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
        let marketplace = exit_tx.to.ok_or(ContractError::InvalidExitTransaction {
            reason: "contract creation".to_string(),
        })?;

        let (sel, args) = split_calldata(&exit_tx.data)?;
        if sel != selector(EXECUTE_ORDER_SIGNATURE) {
            return Err(ContractError::InvalidExitTransaction {
                reason: "expected executeOrder".to_string(),
            });
        }
        let side1 = decode_side(args.bytes(0)?)?;
        let side2 = decode_side(args.bytes(1)?)?;
        let order_id = args.bytes32(2)?;
        let expiration = args.uint(3)?;
        let taker = args.address(4)?;

        check_expiration(expiration, inputs)?;

        let chain_id = ctx.config.child_chain_id;
        let maker_hash = order_hash(
            chain_id,
            &side1.token,
            &marketplace,
            side1.amount,
            &swap_order_data(&order_id, &side2.token, side2.amount),
            expiration,
        );
        let maker = recover_rsv(ctx.api, &maker_hash, side1.signature)?;

        let taker_hash = order_hash(
            chain_id,
            &side2.token,
            &marketplace,
            side2.amount,
            &swap_order_data(&order_id, &side1.token, side1.amount),
            expiration,
        );
        if recover_rsv(ctx.api, &taker_hash, side2.signature)? != taker {
            return Err(ContractError::InvalidExitTransaction {
                reason: "taker signature does not match taker".to_string(),
            });
        }
        if maker == taker {
            return Err(ContractError::InvalidExitTransaction {
                reason: "maker and taker are the same account".to_string(),
            });
        }

        let (side, from, role) = if exitor == taker {
            (&side1, maker, ExitRole::Receiver)
        } else if exitor == maker {
            (&side2, taker, ExitRole::Sender)
        } else {
            return Err(ContractError::ExitorNotParty);
        };

        let transfer = InFlightTransfer {
            mapping: mapping_for_child_token(ctx.storage, &side.token)?,
            from,
            to: exitor,
            amount_or_token_id: side.amount,
            tx_hash: exit_tx.hash,
        };
        receiver_exit(ctx, inputs, &transfer, exitor, role)
    }
}

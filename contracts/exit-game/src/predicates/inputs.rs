//! Claim building for in-flight transfers.
//!
//! Every in-flight predicate reduces its transaction to one or two transfers
//! of a mapped token and then asks the same question: given the referenced
//! inputs, what does the exiting party own once the transfer lands?

use cosmwasm_std::Uint256;

use super::logs::ChildLog;
use super::{mapping_for_log, ExitClaim, PredicateContext};
use crate::address_codec::ChildAddress;
use crate::age::ExitRole;
use crate::error::ContractError;
use crate::proof::VerifiedInput;
use crate::state::{ExitInput, TokenMapping};

/// A movement of one token made by the in-flight transaction
pub struct InFlightTransfer {
    pub mapping: TokenMapping,
    pub from: ChildAddress,
    pub to: ChildAddress,
    pub amount_or_token_id: Uint256,
    pub tx_hash: [u8; 32],
}

/// Parse an input's log and require it to be for the transferred token
fn input_log(
    ctx: &PredicateContext,
    input: &VerifiedInput,
    mapping: &TokenMapping,
) -> Result<ChildLog, ContractError> {
    let log = ChildLog::parse(&input.log)?;
    if mapping_for_log(ctx.storage, &log)?.key() != mapping.key() {
        return Err(ContractError::TokenMismatch);
    }
    Ok(log)
}

/// Wrong account in an input slot. If it names the other party the inputs
/// were just supplied in the wrong order.
fn account_error(log: &ChildLog, other: &ChildAddress) -> ContractError {
    if log.involves(other) {
        ContractError::InputOrderViolation
    } else {
        ContractError::ReferenceAccountMismatch
    }
}

/// Highest child block among the inputs
pub fn anchor_block(inputs: &[VerifiedInput]) -> u64 {
    inputs.iter().map(|i| i.block_number).max().unwrap_or(0)
}

/// A signed authorization with a non-zero expiration must still be valid at
/// the newest block the exit references.
pub fn check_expiration(expiration: Uint256, inputs: &[VerifiedInput]) -> Result<(), ContractError> {
    if !expiration.is_zero() && expiration <= Uint256::from(anchor_block(inputs)) {
        return Err(ContractError::AuthorizationExpired);
    }
    Ok(())
}

/// Exit for the sender or the receiver of a plain transfer
pub fn transfer_exit(
    ctx: &PredicateContext,
    inputs: &[VerifiedInput],
    transfer: &InFlightTransfer,
    exitor: ChildAddress,
) -> Result<ExitClaim, ContractError> {
    if transfer.from == transfer.to {
        return Err(ContractError::InvalidExitTransaction {
            reason: "sender and receiver are the same account".to_string(),
        });
    }
    if exitor == transfer.to {
        receiver_exit(ctx, inputs, transfer, exitor, ExitRole::Receiver)
    } else if exitor == transfer.from {
        sender_exit(ctx, inputs, transfer, exitor)
    } else {
        Err(ContractError::ExitorNotParty)
    }
}

/// The receiving side: inputs are the counterparty's balance (or token
/// ownership), then optionally the exitor's own prior balance.
pub fn receiver_exit(
    ctx: &PredicateContext,
    inputs: &[VerifiedInput],
    transfer: &InFlightTransfer,
    exitor: ChildAddress,
    role: ExitRole,
) -> Result<ExitClaim, ContractError> {
    if transfer.mapping.is_nft() {
        return nft_receiver_exit(ctx, inputs, transfer, exitor, role);
    }

    if inputs.is_empty() || inputs.len() > 2 {
        return Err(ContractError::UnexpectedInputCount {
            expected: "1 or 2".to_string(),
            got: inputs.len(),
        });
    }

    let counterparty = &inputs[0];
    let log = input_log(ctx, counterparty, &transfer.mapping)?;
    let available = log
        .closing_balance(&transfer.from)
        .ok_or_else(|| account_error(&log, &exitor))?;
    if available < transfer.amount_or_token_id {
        return Err(ContractError::InsufficientReferencedBalance);
    }

    let mut recorded = vec![ExitInput {
        signer: transfer.from,
        input_age: counterparty.age,
    }];
    let mut age = counterparty.age;
    let mut own_balance = Uint256::zero();

    if let Some(own) = inputs.get(1) {
        let log = input_log(ctx, own, &transfer.mapping)?;
        own_balance = log
            .closing_balance(&exitor)
            .ok_or_else(|| account_error(&log, &transfer.from))?;
        recorded.push(ExitInput {
            signer: exitor,
            input_age: own.age,
        });
        // the exit ranks behind the newer of the two balances
        age = age.max(own.age);
    }

    Ok(ExitClaim {
        exitor,
        token: transfer.mapping.clone(),
        amount_or_token_id: own_balance.checked_add(transfer.amount_or_token_id)?,
        age,
        role,
        tx_hash: Some(transfer.tx_hash),
        inputs: recorded,
    })
}

/// The sending side exits what is left after the transfer. Only the exitor's
/// own input is referenced.
fn sender_exit(
    ctx: &PredicateContext,
    inputs: &[VerifiedInput],
    transfer: &InFlightTransfer,
    exitor: ChildAddress,
) -> Result<ExitClaim, ContractError> {
    if transfer.mapping.is_nft() {
        return Err(ContractError::ExitorNotParty);
    }
    if inputs.len() != 1 {
        return Err(ContractError::UnexpectedInputCount {
            expected: "1".to_string(),
            got: inputs.len(),
        });
    }

    let own = &inputs[0];
    let log = input_log(ctx, own, &transfer.mapping)?;
    let balance = log
        .closing_balance(&exitor)
        .ok_or(ContractError::ReferenceAccountMismatch)?;
    let remaining = balance
        .checked_sub(transfer.amount_or_token_id)
        .map_err(|_| ContractError::InsufficientReferencedBalance)?;

    Ok(ExitClaim {
        exitor,
        token: transfer.mapping.clone(),
        amount_or_token_id: remaining,
        age: own.age,
        role: ExitRole::Sender,
        tx_hash: Some(transfer.tx_hash),
        inputs: vec![ExitInput {
            signer: exitor,
            input_age: own.age,
        }],
    })
}

/// The receiver of an NFT references exactly the log that gave the sender
/// the token.
fn nft_receiver_exit(
    ctx: &PredicateContext,
    inputs: &[VerifiedInput],
    transfer: &InFlightTransfer,
    exitor: ChildAddress,
    role: ExitRole,
) -> Result<ExitClaim, ContractError> {
    if inputs.len() != 1 {
        return Err(ContractError::UnexpectedInputCount {
            expected: "1".to_string(),
            got: inputs.len(),
        });
    }

    let counterparty = &inputs[0];
    let log = input_log(ctx, counterparty, &transfer.mapping)?;
    if !log.grants_token(&transfer.from, transfer.amount_or_token_id) {
        return Err(account_error(&log, &exitor));
    }

    Ok(ExitClaim {
        exitor,
        token: transfer.mapping.clone(),
        amount_or_token_id: transfer.amount_or_token_id,
        age: counterparty.age,
        role,
        tx_hash: Some(transfer.tx_hash),
        inputs: vec![ExitInput {
            signer: transfer.from,
            input_age: counterparty.age,
        }],
    })
}

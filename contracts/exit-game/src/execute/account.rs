//! Child account linking.
//!
//! Exits are started on behalf of a child account but paid to a root
//! address. A root address proves it controls a child account by submitting
//! a signature of the child key over [`link_digest`], which binds this
//! contract and the root address so the signature cannot be replayed.

use cosmwasm_std::{Addr, Binary, DepsMut, Env, Event, MessageInfo, Response, Storage};

use crate::address_codec::ChildAddress;
use crate::error::ContractError;
use crate::hash::link_digest;
use crate::state::LINKED_ACCOUNTS;
use crate::transaction::recover_signer;

pub fn execute_link_child_account(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    child_address: String,
    signature: Binary,
    recovery_id: u8,
) -> Result<Response, ContractError> {
    let child = ChildAddress::parse(&child_address)?;
    let compact: [u8; 64] = signature
        .as_slice()
        .try_into()
        .map_err(|_| ContractError::InvalidSignature)?;

    let digest = link_digest(&env.contract.address, &info.sender);
    let recovered = recover_signer(deps.api, &digest, &compact, recovery_id)?;
    if recovered != child {
        return Err(ContractError::InvalidSignature);
    }

    // Re-linking moves the child account to the new root address
    let previous = LINKED_ACCOUNTS.may_load(deps.storage, child.as_bytes())?;
    LINKED_ACCOUNTS.save(deps.storage, child.as_bytes(), &info.sender)?;

    let mut event = Event::new("child_account_linked")
        .add_attribute("child_address", child.to_hex())
        .add_attribute("root_address", info.sender.to_string());
    if let Some(previous) = previous {
        event = event.add_attribute("previous_root_address", previous);
    }
    Ok(Response::new()
        .add_event(event)
        .add_attribute("method", "link_child_account")
        .add_attribute("child_address", child.to_hex()))
}

/// Parse `exitor` and require it to be linked to `sender`
pub(crate) fn linked_exitor(
    storage: &dyn Storage,
    sender: &Addr,
    exitor: &str,
) -> Result<ChildAddress, ContractError> {
    let child = ChildAddress::parse(exitor)?;
    match LINKED_ACCOUNTS.may_load(storage, child.as_bytes())? {
        Some(root) if root == *sender => Ok(child),
        _ => Err(ContractError::ChildAccountNotLinked {
            child_address: child.to_hex(),
        }),
    }
}

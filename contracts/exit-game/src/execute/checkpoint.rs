//! Checkpoint submission.
//!
//! Checkpoints are appended by the checkpoint submitter and must cover a
//! contiguous, non-overlapping block range. Their acceptance time fixes the
//! maturity of every exit that references them.

use cosmwasm_std::{Binary, DepsMut, Env, Event, MessageInfo, Response};

use crate::error::ContractError;
use crate::hash::bytes32_to_hex;
use crate::state::{Checkpoint, CHECKPOINTS, CONFIG, LATEST_CHECKPOINT};

pub fn execute_submit_checkpoint(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    start_block: u64,
    end_block: u64,
    header_root: Binary,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    if info.sender != config.checkpoint_submitter {
        return Err(ContractError::UnauthorizedCheckpointSubmitter);
    }

    let header_root: [u8; 32] =
        header_root
            .as_slice()
            .try_into()
            .map_err(|_| ContractError::InvalidCheckpointRange {
                reason: "header root must be 32 bytes".to_string(),
            })?;
    if end_block < start_block {
        return Err(ContractError::InvalidCheckpointRange {
            reason: format!("end block {} precedes start block {}", end_block, start_block),
        });
    }

    let latest = LATEST_CHECKPOINT.load(deps.storage)?;
    if latest > 0 {
        let previous = CHECKPOINTS.load(deps.storage, latest)?;
        let next = previous.end_block.checked_add(1).ok_or_else(|| {
            ContractError::InvalidCheckpointRange {
                reason: format!("block range ended at {}", previous.end_block),
            }
        })?;
        if start_block != next {
            return Err(ContractError::InvalidCheckpointRange {
                reason: format!("expected start block {}", next),
            });
        }
    }

    let checkpoint = Checkpoint {
        id: latest + 1,
        start_block,
        end_block,
        header_root,
        created_at: env.block.time.seconds(),
        proposer: info.sender,
    };
    CHECKPOINTS.save(deps.storage, checkpoint.id, &checkpoint)?;
    LATEST_CHECKPOINT.save(deps.storage, &checkpoint.id)?;

    Ok(Response::new()
        .add_event(
            Event::new("checkpoint_submitted")
                .add_attribute("checkpoint_id", checkpoint.id.to_string())
                .add_attribute("start_block", start_block.to_string())
                .add_attribute("end_block", end_block.to_string())
                .add_attribute("header_root", bytes32_to_hex(&header_root))
                .add_attribute("created_at", checkpoint.created_at.to_string()),
        )
        .add_attribute("method", "submit_checkpoint")
        .add_attribute("checkpoint_id", checkpoint.id.to_string()))
}

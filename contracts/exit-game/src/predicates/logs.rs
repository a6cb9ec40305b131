//! Child token log shapes.
//!
//! Child token contracts emit three events. The first indexed topic of each
//! is the token key (`keccak256(rootToken)`), the log address is the child
//! token itself, and every balance-changing event reports closing balances:
//!
//! ```solidity
//! event Deposit(bytes32 indexed token, address indexed from, uint256 amountOrTokenId, uint256 input1, uint256 output1);
//! event Withdraw(bytes32 indexed token, address indexed from, uint256 amountOrTokenId, uint256 input1, uint256 output1);
//! event LogTransfer(bytes32 indexed token, address indexed from, address indexed to,
//!     uint256 amountOrTokenId, uint256 input1, uint256 input2, uint256 output1, uint256 output2);
//! ```
//!
//! `input*`/`output*` are the balances of `from` (1) and `to` (2) before and
//! after the event.

use cosmwasm_std::Uint256;

use crate::address_codec::ChildAddress;
use crate::error::ContractError;
use crate::hash::event_topic;
use common::LogEntry;

pub const DEPOSIT_EVENT: &str = "Deposit(bytes32,address,uint256,uint256,uint256)";
pub const WITHDRAW_EVENT: &str = "Withdraw(bytes32,address,uint256,uint256,uint256)";
pub const LOG_TRANSFER_EVENT: &str =
    "LogTransfer(bytes32,address,address,uint256,uint256,uint256,uint256,uint256)";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChildEvent {
    Deposit {
        from: ChildAddress,
        amount_or_token_id: Uint256,
        input1: Uint256,
        output1: Uint256,
    },
    Withdraw {
        from: ChildAddress,
        amount_or_token_id: Uint256,
        input1: Uint256,
        output1: Uint256,
    },
    Transfer {
        from: ChildAddress,
        to: ChildAddress,
        amount_or_token_id: Uint256,
        input1: Uint256,
        input2: Uint256,
        output1: Uint256,
        output2: Uint256,
    },
}

/// A recognised child token log
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChildLog {
    /// Child token contract that emitted the log
    pub emitter: ChildAddress,
    pub token_key: [u8; 32],
    pub event: ChildEvent,
}

fn word(log: &LogEntry, index: usize) -> Result<Uint256, ContractError> {
    let bytes = log.word(index).ok_or(ContractError::UnknownLogShape)?;
    let mut out = [0u8; 32];
    out.copy_from_slice(bytes);
    Ok(Uint256::from_be_bytes(out))
}

fn topic_address(log: &LogEntry, index: usize) -> Result<ChildAddress, ContractError> {
    let topic = log.topic(index).ok_or(ContractError::UnknownLogShape)?;
    ChildAddress::from_word(topic).map_err(|_| ContractError::UnknownLogShape)
}

impl ChildLog {
    pub fn parse(log: &LogEntry) -> Result<Self, ContractError> {
        let signature = log.topic(0).ok_or(ContractError::UnknownLogShape)?;
        let token_key = *log.topic(1).ok_or(ContractError::UnknownLogShape)?;

        let event = if *signature == event_topic(LOG_TRANSFER_EVENT) {
            if log.topics.len() != 4 || log.data.len() != 5 * 32 {
                return Err(ContractError::UnknownLogShape);
            }
            ChildEvent::Transfer {
                from: topic_address(log, 2)?,
                to: topic_address(log, 3)?,
                amount_or_token_id: word(log, 0)?,
                input1: word(log, 1)?,
                input2: word(log, 2)?,
                output1: word(log, 3)?,
                output2: word(log, 4)?,
            }
        } else {
            let is_deposit = *signature == event_topic(DEPOSIT_EVENT);
            if !is_deposit && *signature != event_topic(WITHDRAW_EVENT) {
                return Err(ContractError::UnknownLogShape);
            }
            if log.topics.len() != 3 || log.data.len() != 3 * 32 {
                return Err(ContractError::UnknownLogShape);
            }
            let from = topic_address(log, 2)?;
            let amount_or_token_id = word(log, 0)?;
            let input1 = word(log, 1)?;
            let output1 = word(log, 2)?;
            if is_deposit {
                ChildEvent::Deposit {
                    from,
                    amount_or_token_id,
                    input1,
                    output1,
                }
            } else {
                ChildEvent::Withdraw {
                    from,
                    amount_or_token_id,
                    input1,
                    output1,
                }
            }
        };

        Ok(ChildLog {
            emitter: ChildAddress::from_slice(&log.address)?,
            token_key,
            event,
        })
    }

    pub fn amount_or_token_id(&self) -> Uint256 {
        match &self.event {
            ChildEvent::Deposit {
                amount_or_token_id, ..
            }
            | ChildEvent::Withdraw {
                amount_or_token_id, ..
            }
            | ChildEvent::Transfer {
                amount_or_token_id, ..
            } => *amount_or_token_id,
        }
    }

    /// Balance of `account` after this log, if the log touches it
    pub fn closing_balance(&self, account: &ChildAddress) -> Option<Uint256> {
        match &self.event {
            ChildEvent::Deposit { from, output1, .. } | ChildEvent::Withdraw { from, output1, .. }
                if from == account =>
            {
                Some(*output1)
            }
            ChildEvent::Transfer {
                from,
                to,
                output1,
                output2,
                ..
            } => {
                if from == account {
                    Some(*output1)
                } else if to == account {
                    Some(*output2)
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    /// Whether this log leaves `token_id` with `account`
    pub fn grants_token(&self, account: &ChildAddress, token_id: Uint256) -> bool {
        match &self.event {
            ChildEvent::Deposit {
                from,
                amount_or_token_id,
                ..
            } => from == account && *amount_or_token_id == token_id,
            ChildEvent::Transfer {
                to,
                amount_or_token_id,
                ..
            } => to == account && *amount_or_token_id == token_id,
            ChildEvent::Withdraw { .. } => false,
        }
    }

    /// Whether `account` gives up funds (or a token) in this log
    pub fn is_spend_by(&self, account: &ChildAddress) -> bool {
        match &self.event {
            ChildEvent::Transfer { from, .. } | ChildEvent::Withdraw { from, .. } => {
                from == account
            }
            ChildEvent::Deposit { .. } => false,
        }
    }

    pub fn involves(&self, account: &ChildAddress) -> bool {
        match &self.event {
            ChildEvent::Deposit { from, .. } | ChildEvent::Withdraw { from, .. } => from == account,
            ChildEvent::Transfer { from, to, .. } => from == account || to == account,
        }
    }

    /// Encode back into a raw log entry
    pub fn to_entry(&self) -> LogEntry {
        let mut topics = vec![[0u8; 32], self.token_key];
        let words: Vec<Uint256> = match &self.event {
            ChildEvent::Deposit {
                from,
                amount_or_token_id,
                input1,
                output1,
            }
            | ChildEvent::Withdraw {
                from,
                amount_or_token_id,
                input1,
                output1,
            } => {
                topics.push(from.to_word());
                vec![*amount_or_token_id, *input1, *output1]
            }
            ChildEvent::Transfer {
                from,
                to,
                amount_or_token_id,
                input1,
                input2,
                output1,
                output2,
            } => {
                topics.push(from.to_word());
                topics.push(to.to_word());
                vec![*amount_or_token_id, *input1, *input2, *output1, *output2]
            }
        };
        topics[0] = event_topic(match self.event {
            ChildEvent::Deposit { .. } => DEPOSIT_EVENT,
            ChildEvent::Withdraw { .. } => WITHDRAW_EVENT,
            ChildEvent::Transfer { .. } => LOG_TRANSFER_EVENT,
        });

        LogEntry {
            address: self.emitter.0,
            topics,
            data: words.iter().flat_map(|w| w.to_be_bytes()).collect(),
        }
    }
}

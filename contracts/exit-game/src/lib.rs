//! Plasma Exit Game Contract - Withdrawals from a checkpointed child chain
//!
//! Holders of child chain assets withdraw them to the root ledger without
//! trusting the child chain operator. Every claim is backed by inclusion
//! proofs against checkpointed header roots and can be disputed before it
//! is paid.
//!
//! # Regular Exit
//! 1. User burns tokens on the child chain (`Withdraw` log)
//! 2. Once the block is checkpointed, user calls `StartExitWithBurntTokens`
//!    with a reference input proving the log, attaching the exit bond
//! 3. After the dispute window anyone calls `ProcessExits` for the token
//!
//! # In-flight Exit (MoreVP)
//! 1. A transfer is signed on the child chain but may never be checkpointed
//! 2. Either party calls `StartExitInFlight` with the signed transaction and
//!    proofs of the balances it spends (counterparty first)
//! 3. The exit takes the age of its youngest input, so it ranks behind every
//!    claim those balances were built on
//!
//! # Challenges
//! - Anyone may call `ChallengeExit` with a newer proof showing a recorded
//!   input was spent again; the exit is cancelled and its bond paid to the
//!   challenger
//! - An exit can never be challenged with its own exit transaction
//!
//! # Priority
//! Exit ids are bit-packed ages (checkpoint maturity, block, transaction,
//! log index). Each token's pending exits are settled in ascending id order
//! and processing stops at the first exit still inside its dispute window.

pub mod abi;
pub mod address_codec;
pub mod age;
pub mod contract;
pub mod error;
mod execute;
pub mod hash;
pub mod msg;
pub mod predicates;
pub mod proof;
mod query;
pub mod state;
pub mod transaction;

pub use crate::address_codec::ChildAddress;
pub use crate::age::{compute_age, decode_age, exit_id, AgeParts, ExitRole};
pub use crate::error::ContractError;
pub use crate::hash::{keccak256, link_digest, order_hash};
pub use crate::predicates::{Predicate, PredicateKind};
pub use crate::proof::{verify_reference_input, ReferenceInput, VerifiedInput};

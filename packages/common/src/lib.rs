//! Common - Proof Primitives and Shared Types for the Plasma Exit Game
//!
//! This package holds everything the exit game needs that does not touch
//! contract storage:
//! - `asset` - root-ledger assets and the payout messages that move them
//! - `keccak` - keccak-256 as used by the child ledger
//! - `merkle` - header-chain (checkpoint) Merkle membership
//! - `mpt` - Merkle-Patricia trie inclusion proofs
//! - `receipt` - child receipt and log decoding
//!
//! With the `testing` feature the `testing` module builds matching fixtures
//! (tries, header chains, receipts) so contracts can be exercised end to end.

pub mod asset;
pub mod keccak;
pub mod merkle;
pub mod mpt;
pub mod receipt;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use asset::{Asset, AssetInfo, Cw721ExecuteMsg, Cw721ReceiveMsg, NftAsset};
pub use keccak::keccak256;
pub use mpt::ProofError;
pub use receipt::{LogEntry, Receipt};

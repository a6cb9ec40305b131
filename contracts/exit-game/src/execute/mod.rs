//! Execute handlers for the exit game contract.
//!
//! This module contains all execute message handlers, organized by category:
//! - `deposit` - native, CW20 and CW721 deposits into custody
//! - `account` - child account linking
//! - `checkpoint` - checkpoint submission
//! - `exit` - regular and in-flight exit starts, exit transfer
//! - `challenge` - exit challenges
//! - `process` - priority-ordered settlement of matured exits
//! - `config` - token mappings, predicate allow-list, checkpoint submitter
//! - `admin` - Pause, unpause and admin transfer

mod account;
mod admin;
mod challenge;
mod checkpoint;
mod config;
mod deposit;
mod exit;
mod process;

pub use account::*;
pub use admin::*;
pub use challenge::*;
pub use checkpoint::*;
pub use config::*;
pub use deposit::*;
pub use exit::*;
pub use process::*;

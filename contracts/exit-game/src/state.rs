//! State definitions for the exit game contract

use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, Coin, Timestamp, Uint128, Uint256};
use cw_storage_plus::{Item, Map};

use crate::address_codec::ChildAddress;
use crate::predicates::PredicateKind;
use common::AssetInfo;

/// Contract configuration
#[cw_serde]
pub struct Config {
    /// Admin address for contract management
    pub admin: Addr,
    /// Whether deposits, exit starts and processing are paused
    pub paused: bool,
    /// Account allowed to append checkpoints
    pub checkpoint_submitter: Addr,
    /// Dispute window in seconds. Fixed at instantiation so exit ages stay stable.
    pub dispute_period: u64,
    /// Bond every exit start must attach, paid to a successful challenger
    pub exit_bond: Coin,
    /// Child chain id used in transaction and authorization signatures
    pub child_chain_id: u64,
}

/// Pending admin change proposal
#[cw_serde]
pub struct PendingAdmin {
    /// Proposed new admin address
    pub new_address: Addr,
    /// Block time when the change can be executed
    pub execute_after: Timestamp,
}

/// A committed range of child blocks
#[cw_serde]
pub struct Checkpoint {
    pub id: u64,
    pub start_block: u64,
    pub end_block: u64,
    /// Root of the header-chain Merkle tree over `[start_block, end_block]`
    pub header_root: [u8; 32],
    /// Root-ledger time the checkpoint was accepted (seconds)
    pub created_at: u64,
    pub proposer: Addr,
}

/// How a mapped token is settled on the root ledger
#[cw_serde]
#[derive(Copy)]
pub enum SettlementMode {
    /// Deposits are held in custody, exits release from custody
    Lock,
    /// Deposits are burned (CW20) or held (CW721), exits mint what custody cannot cover
    Mint,
}

impl SettlementMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SettlementMode::Lock => "lock",
            SettlementMode::Mint => "mint",
        }
    }
}

/// Root token ↔ child token mapping
#[cw_serde]
pub struct TokenMapping {
    /// Asset on the root ledger
    pub root_token: AssetInfo,
    /// Child token contract emitting the exit game's log shapes
    pub child_token: ChildAddress,
    pub settlement: SettlementMode,
}

impl TokenMapping {
    pub fn is_nft(&self) -> bool {
        self.root_token.is_nft()
    }

    pub fn key(&self) -> &str {
        self.root_token.key()
    }
}

/// Exit lifecycle. Every status but `Pending` is terminal.
#[cw_serde]
#[derive(Copy)]
pub enum ExitStatus {
    Pending,
    Challenged,
    Processed,
    /// Matured but custody could not cover the payout; dropped from the queue
    Unpayable,
}

impl ExitStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExitStatus::Pending => "pending",
            ExitStatus::Challenged => "challenged",
            ExitStatus::Processed => "processed",
            ExitStatus::Unpayable => "unpayable",
        }
    }
}

/// A registered exit. Records are kept after they reach a terminal status so
/// the same id can never be registered twice.
#[cw_serde]
pub struct Exit {
    /// Priority and identity: `age << 1 | role`
    pub id: Uint256,
    /// Root-ledger address that receives the payout (transferable)
    pub owner: Addr,
    /// Child account the exit is on behalf of
    pub exitor: ChildAddress,
    /// Root token key (denom or contract address)
    pub token: String,
    pub amount_or_token_id: Uint256,
    /// True for exits backed by a checkpointed burn, false for in-flight exits
    pub is_regular_exit: bool,
    pub predicate: PredicateKind,
    /// Hash of the in-flight exit transaction, if any
    pub tx_hash: Option<[u8; 32]>,
    pub bond: Coin,
    pub started_at: u64,
    /// Earliest time the exit may be processed
    pub exitable_at: u64,
    pub status: ExitStatus,
}

/// Input consumed by an exit. A challenge must show this signer spending
/// again at a later age.
#[cw_serde]
pub struct ExitInput {
    pub signer: ChildAddress,
    pub input_age: Uint256,
}

/// Custody deposit, mirrored on the child chain
#[cw_serde]
pub struct DepositRecord {
    pub id: u64,
    pub depositor: Addr,
    pub child_recipient: ChildAddress,
    pub token: String,
    pub amount_or_token_id: Uint256,
    pub deposited_at: Timestamp,
}

/// Exit game statistics
#[cw_serde]
#[derive(Default)]
pub struct Stats {
    pub total_deposits: u64,
    pub exits_started: u64,
    pub exits_challenged: u64,
    pub exits_processed: u64,
    pub exits_unpayable: u64,
    /// Bonds left with the contract by processed exits
    pub bonds_retained: Uint128,
}

/// Contract name for cw2 migration info
pub const CONTRACT_NAME: &str = "crates.io:plasma-exit-game";
/// Contract version for cw2 migration info
pub const CONTRACT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// 7 days in seconds for admin change timelock
pub const ADMIN_TIMELOCK_DURATION: u64 = 604_800;

/// Dispute period bounds (1 hour to 30 days)
pub const MIN_DISPUTE_PERIOD: u64 = 3_600;
pub const MAX_DISPUTE_PERIOD: u64 = 2_592_000;

/// Primary config storage
pub const CONFIG: Item<Config> = Item::new("config");

/// Pending admin proposal (if any)
pub const PENDING_ADMIN: Item<PendingAdmin> = Item::new("pending_admin");

/// Exit game statistics
pub const STATS: Item<Stats> = Item::new("stats");

/// Checkpoints by id (ids start at 1)
pub const CHECKPOINTS: Map<u64, Checkpoint> = Map::new("checkpoints");

/// Id of the latest checkpoint, 0 before the first one
pub const LATEST_CHECKPOINT: Item<u64> = Item::new("latest_checkpoint");

/// Allow-listed predicates
/// Key: predicate kind string
pub const PREDICATES: Map<&str, bool> = Map::new("predicates");

/// Token mappings
/// Key: root token key (denom or contract address)
pub const TOKEN_MAPPINGS: Map<&str, TokenMapping> = Map::new("token_mappings");

/// Reverse token lookup
/// Key: child token address, Value: root token key
pub const CHILD_TOKENS: Map<&[u8], String> = Map::new("child_tokens");

/// Child accounts proven to be controlled by a root-ledger address
/// Key: child address, Value: root address
pub const LINKED_ACCOUNTS: Map<&[u8], Addr> = Map::new("linked_accounts");

/// All exits ever registered
/// Key: 32-byte big-endian exit id
pub const EXITS: Map<&[u8], Exit> = Map::new("exits");

/// Inputs consumed by each exit
/// Key: (exit id, input age), both 32-byte big-endian
pub const EXIT_INPUTS: Map<(&[u8], &[u8]), ExitInput> = Map::new("exit_inputs");

/// Per-token priority queue of pending exits. Fixed-width big-endian keys make
/// ascending key order equal ascending exit id.
/// Key: (root token key, exit id), Value: exitable_at
pub const PENDING_EXITS: Map<(&str, &[u8]), u64> = Map::new("pending_exits");

/// In-flight transactions already used to start an exit
/// Key: (tx hash, role bit), Value: exit id
pub const EXIT_TX_USED: Map<(&[u8], u8), Uint256> = Map::new("exit_tx_used");

/// Pending in-flight exit of a child account, at most one per token
/// Key: (exitor child address, root token key), Value: exit id
pub const OWNER_EXITS: Map<(&[u8], &str), Uint256> = Map::new("owner_exits");

/// Own balances already counted by an in-flight exit of their holder
/// Key: (exitor child address, input age), Value: exit id
pub const CONSUMED_OWN_INPUTS: Map<(&[u8], &[u8]), Uint256> = Map::new("consumed_own_inputs");

/// Fungible custody per root token
/// Key: root token key
pub const LOCKED_BALANCES: Map<&str, Uint128> = Map::new("locked_balances");

/// CW721 custody
/// Key: (collection, token id)
pub const LOCKED_NFTS: Map<(&str, &str), bool> = Map::new("locked_nfts");

/// Deposit counter
pub const DEPOSIT_NONCE: Item<u64> = Item::new("deposit_nonce");

/// Deposit records by id
pub const DEPOSITS: Map<u64, DepositRecord> = Map::new("deposits");

//! Shared integration test fixtures.
//!
//! - `ChildKey` - secp256k1 child accounts that sign transactions and orders
//! - `ChildToken` - log builders for a mapped child token
//! - `ChildChain` - mines blocks, submits checkpoints and builds reference inputs
//! - `TestEnv` - a multi-test app running the exit game

#![allow(dead_code)]

pub mod nft;

use std::str::FromStr;

use cosmwasm_std::{coin, coins, Addr, Binary, Coin, Empty, StdResult, Uint128, Uint256};
use cw20::{Cw20Coin, MinterResponse};
use cw_multi_test::{App, AppResponse, Contract, ContractWrapper, Executor};
use rlp::{Rlp, RlpStream};
use secp256k1::{Message, PublicKey, Secp256k1, SecretKey};

use common::merkle::header_leaf;
use common::testing::{encode_receipt, HeaderTree, TrieBuilder};
use common::{AssetInfo, LogEntry};
use exit_game::address_codec::ChildAddress;
use exit_game::error::ContractError;
use exit_game::hash::{keccak256, link_digest, token_key};
use exit_game::msg::{
    ExecuteMsg, ExitInputsResponse, ExitResponse, InstantiateMsg, LockedBalanceResponse,
    PendingExitsResponse, QueryMsg, StatsResponse,
};
use exit_game::predicates::logs::{ChildEvent, ChildLog};
use exit_game::predicates::PredicateKind;
use exit_game::proof::ReferenceInput;
use exit_game::state::SettlementMode;

pub const CHILD_CHAIN_ID: u64 = 15001;
pub const DISPUTE_PERIOD: u64 = 7 * 86_400;
pub const BOND_DENOM: &str = "uusd";
pub const BOND_AMOUNT: u128 = 1_000_000;
pub const LUNA: &str = "uluna";

/// Child token mapped to `uluna` in every test environment
pub fn luna_child() -> ChildToken {
    ChildToken::new(0x11, LUNA)
}

// ============================================================================
// Child Accounts
// ============================================================================

pub struct ChildKey {
    secret: SecretKey,
    pub address: ChildAddress,
}

impl ChildKey {
    pub fn new(seed: u8) -> Self {
        let secret = SecretKey::from_slice(&[seed; 32]).unwrap();
        let public = PublicKey::from_secret_key(&Secp256k1::new(), &secret);
        let address = ChildAddress::from_public_key(&public.serialize_uncompressed()).unwrap();
        ChildKey { secret, address }
    }

    /// Compact signature and recovery id over a 32-byte digest
    pub fn sign(&self, digest: &[u8; 32]) -> ([u8; 64], u8) {
        let message = Message::from_digest_slice(digest).unwrap();
        let signature = Secp256k1::new().sign_ecdsa_recoverable(&message, &self.secret);
        let (recovery_id, compact) = signature.serialize_compact();
        (compact, recovery_id.to_i32() as u8)
    }

    /// 65-byte `r ‖ s ‖ v` signature with `v` in {27, 28}
    pub fn sign_rsv(&self, digest: &[u8; 32]) -> Vec<u8> {
        let (compact, recovery_id) = self.sign(digest);
        let mut out = compact.to_vec();
        out.push(27 + recovery_id);
        out
    }

    /// EIP-155 legacy transaction calling `to` with `data`
    pub fn sign_tx(&self, nonce: u64, to: &ChildAddress, data: &[u8]) -> Vec<u8> {
        let mut unsigned = RlpStream::new_list(9);
        append_tx_fields(&mut unsigned, nonce, to, data);
        unsigned.append(&CHILD_CHAIN_ID);
        unsigned.append_empty_data();
        unsigned.append_empty_data();
        let (compact, recovery_id) = self.sign(&keccak256(&unsigned.out()));

        let mut signed = RlpStream::new_list(9);
        append_tx_fields(&mut signed, nonce, to, data);
        signed.append(&(CHILD_CHAIN_ID * 2 + 35 + recovery_id as u64));
        signed.append(&trim_leading_zeros(&compact[..32]));
        signed.append(&trim_leading_zeros(&compact[32..]));
        signed.out().to_vec()
    }
}

fn append_tx_fields(s: &mut RlpStream, nonce: u64, to: &ChildAddress, data: &[u8]) {
    s.append(&nonce);
    s.append(&1_000_000_000u64);
    s.append(&200_000u64);
    s.append(&to.as_bytes().to_vec());
    s.append(&0u64);
    s.append(&data.to_vec());
}

fn trim_leading_zeros(bytes: &[u8]) -> Vec<u8> {
    bytes.iter().skip_while(|b| **b == 0).copied().collect()
}

/// The malleated twin of a signed transaction: `s` replaced by `n - s` and the
/// recovery parity flipped. It recovers the same signer but hashes differently.
pub fn high_s_copy(raw: &[u8]) -> Vec<u8> {
    const ORDER: [u8; 32] = [
        0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
        0xfe, 0xba, 0xae, 0xdc, 0xe6, 0xaf, 0x48, 0xa0, 0x3b, 0xbf, 0xd2, 0x5e, 0x8c, 0xd0, 0x36,
        0x41, 0x41,
    ];
    let tx = Rlp::new(raw);
    let mut out = RlpStream::new_list(9);
    for i in 0..6 {
        out.append_raw(tx.at(i).unwrap().as_raw(), 1);
    }
    let v: u64 = tx.val_at(6).unwrap();
    out.append(&if (v - 35) % 2 == 0 { v + 1 } else { v - 1 });
    out.append_raw(tx.at(7).unwrap().as_raw(), 1);

    let s_bytes: Vec<u8> = tx.val_at(8).unwrap();
    let mut padded = [0u8; 32];
    padded[32 - s_bytes.len()..].copy_from_slice(&s_bytes);
    let s = Uint256::from_be_bytes(ORDER) - Uint256::from_be_bytes(padded);
    out.append(&trim_leading_zeros(&s.to_be_bytes()));
    out.out().to_vec()
}

// ============================================================================
// Calldata
// ============================================================================

pub fn word(value: u128) -> [u8; 32] {
    Uint256::from(value).to_be_bytes()
}

fn bytes_tail(bytes: &[u8]) -> Vec<u8> {
    let mut out = word(bytes.len() as u128).to_vec();
    out.extend_from_slice(bytes);
    out.resize(32 + bytes.len().div_ceil(32) * 32, 0);
    out
}

/// ABI-encode a tuple of head words followed by dynamic `bytes` tails.
/// `None` head entries are replaced with the offset of the next tail.
fn encode_tuple(head: &[Option<[u8; 32]>], tails: &[&[u8]]) -> Vec<u8> {
    let mut offset = head.len() * 32;
    let mut out = Vec::new();
    let mut tail_data = Vec::new();
    let mut next_tail = tails.iter();
    for entry in head {
        match entry {
            Some(w) => out.extend_from_slice(w),
            None => {
                let tail = bytes_tail(next_tail.next().unwrap());
                out.extend_from_slice(&word(offset as u128));
                offset += tail.len();
                tail_data.extend(tail);
            }
        }
    }
    out.extend(tail_data);
    out
}

fn with_selector(signature: &str, args: Vec<u8>) -> Vec<u8> {
    let mut data = exit_game::abi::selector(signature).to_vec();
    data.extend(args);
    data
}

pub fn transfer_calldata(to: &ChildAddress, amount: u128) -> Vec<u8> {
    with_selector(
        "transfer(address,uint256)",
        encode_tuple(&[Some(to.to_word()), Some(word(amount))], &[]),
    )
}

pub fn transfer_from_calldata(from: &ChildAddress, to: &ChildAddress, token_id: u128) -> Vec<u8> {
    with_selector(
        "transferFrom(address,address,uint256)",
        encode_tuple(
            &[Some(from.to_word()), Some(to.to_word()), Some(word(token_id))],
            &[],
        ),
    )
}

pub fn transfer_with_sig_calldata(
    signature: &[u8],
    amount: u128,
    data: [u8; 32],
    expiration: u128,
    to: &ChildAddress,
) -> Vec<u8> {
    with_selector(
        "transferWithSig(bytes,uint256,bytes32,uint256,address)",
        encode_tuple(
            &[
                None,
                Some(word(amount)),
                Some(data),
                Some(word(expiration)),
                Some(to.to_word()),
            ],
            &[signature],
        ),
    )
}

/// `abi.encode(address token, bytes sig, uint256 amountOrTokenId)`
pub fn order_side(token: &ChildAddress, signature: &[u8], amount: u128) -> Vec<u8> {
    encode_tuple(
        &[Some(token.to_word()), None, Some(word(amount))],
        &[signature],
    )
}

pub fn execute_order_calldata(
    side1: &[u8],
    side2: &[u8],
    order_id: [u8; 32],
    expiration: u128,
    taker: &ChildAddress,
) -> Vec<u8> {
    with_selector(
        "executeOrder(bytes,bytes,bytes32,uint256,address)",
        encode_tuple(
            &[
                None,
                None,
                Some(order_id),
                Some(word(expiration)),
                Some(taker.to_word()),
            ],
            &[side1, side2],
        ),
    )
}

// ============================================================================
// Child Tokens
// ============================================================================

#[derive(Clone)]
pub struct ChildToken {
    pub address: ChildAddress,
    /// Root token key the child token is mapped to
    pub root: String,
}

impl ChildToken {
    pub fn new(byte: u8, root: &str) -> Self {
        ChildToken {
            address: ChildAddress([byte; 20]),
            root: root.to_string(),
        }
    }

    pub fn hex(&self) -> String {
        self.address.to_hex()
    }

    fn log(&self, event: ChildEvent) -> LogEntry {
        ChildLog {
            emitter: self.address,
            token_key: token_key(&self.root),
            event,
        }
        .to_entry()
    }

    pub fn deposit(&self, to: &ChildAddress, amount: u128, before: u128) -> LogEntry {
        self.log(ChildEvent::Deposit {
            from: *to,
            amount_or_token_id: Uint256::from(amount),
            input1: Uint256::from(before),
            output1: Uint256::from(before + amount),
        })
    }

    pub fn withdraw(&self, from: &ChildAddress, amount: u128, before: u128) -> LogEntry {
        self.log(ChildEvent::Withdraw {
            from: *from,
            amount_or_token_id: Uint256::from(amount),
            input1: Uint256::from(before),
            output1: Uint256::from(before - amount),
        })
    }

    /// `from_before` / `to_before` are the balances before the transfer
    pub fn transfer(
        &self,
        from: &ChildAddress,
        to: &ChildAddress,
        amount: u128,
        from_before: u128,
        to_before: u128,
    ) -> LogEntry {
        self.log(ChildEvent::Transfer {
            from: *from,
            to: *to,
            amount_or_token_id: Uint256::from(amount),
            input1: Uint256::from(from_before),
            input2: Uint256::from(to_before),
            output1: Uint256::from(from_before - amount),
            output2: Uint256::from(to_before + amount),
        })
    }

    pub fn nft_deposit(&self, to: &ChildAddress, token_id: u128) -> LogEntry {
        self.log(ChildEvent::Deposit {
            from: *to,
            amount_or_token_id: Uint256::from(token_id),
            input1: Uint256::zero(),
            output1: Uint256::zero(),
        })
    }

    pub fn nft_withdraw(&self, from: &ChildAddress, token_id: u128) -> LogEntry {
        self.log(ChildEvent::Withdraw {
            from: *from,
            amount_or_token_id: Uint256::from(token_id),
            input1: Uint256::zero(),
            output1: Uint256::zero(),
        })
    }

    pub fn nft_transfer(&self, from: &ChildAddress, to: &ChildAddress, token_id: u128) -> LogEntry {
        self.log(ChildEvent::Transfer {
            from: *from,
            to: *to,
            amount_or_token_id: Uint256::from(token_id),
            input1: Uint256::zero(),
            input2: Uint256::zero(),
            output1: Uint256::zero(),
            output2: Uint256::zero(),
        })
    }
}

// ============================================================================
// Child Chain
// ============================================================================

/// A transaction to mine: raw signed bytes and the logs of its receipt
pub struct ChildTx {
    pub raw: Vec<u8>,
    pub logs: Vec<LogEntry>,
    pub success: bool,
}

impl ChildTx {
    pub fn new(raw: Vec<u8>, logs: Vec<LogEntry>) -> Self {
        ChildTx {
            raw,
            logs,
            success: true,
        }
    }

    pub fn failed(raw: Vec<u8>, logs: Vec<LogEntry>) -> Self {
        ChildTx {
            raw,
            logs,
            success: false,
        }
    }
}

struct MinedBlock {
    number: u64,
    timestamp: u64,
    transactions: TrieBuilder,
    receipts: TrieBuilder,
    raw_txs: Vec<Vec<u8>>,
    raw_receipts: Vec<Vec<u8>>,
}

impl MinedBlock {
    fn leaf(&self) -> [u8; 32] {
        header_leaf(
            self.number,
            self.timestamp,
            &self.transactions.root(),
            &self.receipts.root(),
        )
    }
}

struct SubmittedCheckpoint {
    id: u64,
    start: u64,
    end: u64,
    tree: HeaderTree,
}

/// Position of a log on the child chain
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LogRef {
    pub block: u64,
    pub tx_index: u64,
    pub log_index: u64,
}

impl LogRef {
    pub fn at(block: u64, tx_index: u64, log_index: u64) -> Self {
        LogRef {
            block,
            tx_index,
            log_index,
        }
    }
}

pub fn branch_path(tx_index: u64) -> Vec<u8> {
    rlp::encode(&tx_index).to_vec()
}

pub struct ChildChain {
    blocks: Vec<MinedBlock>,
    checkpoints: Vec<SubmittedCheckpoint>,
    system_nonce: u64,
}

impl Default for ChildChain {
    fn default() -> Self {
        Self::new()
    }
}

impl ChildChain {
    pub fn new() -> Self {
        ChildChain {
            blocks: vec![],
            checkpoints: vec![],
            system_nonce: 0,
        }
    }

    pub fn latest_block(&self) -> u64 {
        self.blocks.last().map(|b| b.number).unwrap_or(0)
    }

    /// Unsigned state-sync transaction carrying `logs` (deposits)
    pub fn system_tx(&mut self, logs: Vec<LogEntry>) -> ChildTx {
        self.system_nonce += 1;
        let mut s = RlpStream::new_list(2);
        s.append(&b"state-sync".to_vec());
        s.append(&self.system_nonce);
        ChildTx::new(s.out().to_vec(), logs)
    }

    /// Mine a block; returns its number (blocks start at 1)
    pub fn mine(&mut self, txs: Vec<ChildTx>) -> u64 {
        let number = self.latest_block() + 1;
        let mut transactions = TrieBuilder::default();
        let mut receipts = TrieBuilder::default();
        let mut raw_txs = vec![];
        let mut raw_receipts = vec![];
        for (i, tx) in txs.into_iter().enumerate() {
            let receipt = encode_receipt(tx.success, 21_000 * (i as u64 + 1), &tx.logs, None);
            transactions.insert(branch_path(i as u64), tx.raw.clone());
            receipts.insert(branch_path(i as u64), receipt.clone());
            raw_txs.push(tx.raw);
            raw_receipts.push(receipt);
        }
        self.blocks.push(MinedBlock {
            number,
            timestamp: 1_600_000_000 + number * 2,
            transactions,
            receipts,
            raw_txs,
            raw_receipts,
        });
        number
    }

    /// Mine a single transaction and return the position of its first log
    pub fn mine_one(&mut self, tx: ChildTx) -> LogRef {
        LogRef::at(self.mine(vec![tx]), 0, 0)
    }

    /// Submit every block since the last checkpoint as a new checkpoint
    pub fn checkpoint(&mut self, env: &mut TestEnv) -> u64 {
        let start = self.checkpoints.last().map(|c| c.end + 1).unwrap_or(1);
        let end = self.latest_block();
        assert!(end >= start, "no new blocks to checkpoint");

        let leaves: Vec<[u8; 32]> = (start..=end).map(|n| self.block(n).leaf()).collect();
        let tree = HeaderTree::new(&leaves);
        let root = tree.root();

        env.app
            .execute_contract(
                env.submitter.clone(),
                env.contract_addr.clone(),
                &ExecuteMsg::SubmitCheckpoint {
                    start_block: start,
                    end_block: end,
                    header_root: Binary::from(root.to_vec()),
                },
                &[],
            )
            .unwrap();

        let id = self.checkpoints.len() as u64 + 1;
        self.checkpoints.push(SubmittedCheckpoint {
            id,
            start,
            end,
            tree,
        });
        id
    }

    fn block(&self, number: u64) -> &MinedBlock {
        &self.blocks[(number - 1) as usize]
    }

    pub fn raw_tx(&self, at: LogRef) -> Vec<u8> {
        self.block(at.block).raw_txs[at.tx_index as usize].clone()
    }

    /// Decoded reference input for a log, optionally proving its transaction
    pub fn reference_input(&self, at: LogRef, with_tx: bool) -> ReferenceInput {
        let checkpoint = self
            .checkpoints
            .iter()
            .find(|c| c.start <= at.block && at.block <= c.end)
            .expect("block is not checkpointed");
        let block = self.block(at.block);
        let path = branch_path(at.tx_index);

        let (transaction, transaction_proof) = if with_tx {
            (
                Some(block.raw_txs[at.tx_index as usize].clone()),
                block.transactions.proof(&path),
            )
        } else {
            (None, vec![])
        };

        ReferenceInput {
            checkpoint_id: checkpoint.id,
            header_proof: checkpoint
                .tree
                .proof((at.block - checkpoint.start) as usize),
            block_number: block.number,
            block_timestamp: block.timestamp,
            transactions_root: block.transactions.root(),
            receipts_root: block.receipts.root(),
            receipt: block.raw_receipts[at.tx_index as usize].clone(),
            receipt_proof: block.receipts.proof(&path),
            branch_path: path,
            log_index: at.log_index,
            transaction,
            transaction_proof,
        }
    }

    pub fn reference(&self, at: LogRef) -> Binary {
        Binary::from(self.reference_input(at, false).encode())
    }

    pub fn reference_with_tx(&self, at: LogRef) -> Binary {
        Binary::from(self.reference_input(at, true).encode())
    }
}

// ============================================================================
// Test Environment
// ============================================================================

pub fn contract_exit_game() -> Box<dyn Contract<Empty>> {
    let contract = ContractWrapper::new(
        exit_game::contract::execute,
        exit_game::contract::instantiate,
        exit_game::contract::query,
    )
    .with_migrate(exit_game::contract::migrate);
    Box::new(contract)
}

pub fn contract_cw20() -> Box<dyn Contract<Empty>> {
    let contract = ContractWrapper::new(
        cw20_base::contract::execute,
        cw20_base::contract::instantiate,
        cw20_base::contract::query,
    );
    Box::new(contract)
}

pub struct TestEnv {
    pub app: App,
    pub contract_addr: Addr,
    pub admin: Addr,
    pub submitter: Addr,
    pub alice: Addr,
    pub bob: Addr,
    pub carol: Addr,
    pub challenger: Addr,
}

pub fn bond() -> Vec<Coin> {
    coins(BOND_AMOUNT, BOND_DENOM)
}

/// Exit game with every predicate allowed and `uluna` mapped (lock mode)
pub fn setup() -> TestEnv {
    let mut app = App::default();
    let admin = Addr::unchecked("terra1admin");
    let submitter = Addr::unchecked("terra1submitter");
    let alice = Addr::unchecked("terra1alice");
    let bob = Addr::unchecked("terra1bob");
    let carol = Addr::unchecked("terra1carol");
    let challenger = Addr::unchecked("terra1challenger");

    app.init_modules(|router, _, storage| {
        for user in [&admin, &alice, &bob, &carol, &challenger] {
            router
                .bank
                .init_balance(
                    storage,
                    user,
                    vec![
                        coin(10_000_000_000, LUNA),
                        coin(10_000_000_000, BOND_DENOM),
                    ],
                )
                .unwrap();
        }
    });

    let code_id = app.store_code(contract_exit_game());
    let contract_addr = app
        .instantiate_contract(
            code_id,
            admin.clone(),
            &InstantiateMsg {
                admin: admin.to_string(),
                checkpoint_submitter: submitter.to_string(),
                dispute_period: DISPUTE_PERIOD,
                exit_bond: coin(BOND_AMOUNT, BOND_DENOM),
                child_chain_id: CHILD_CHAIN_ID,
                predicates: PredicateKind::ALL.to_vec(),
            },
            &[],
            "plasma-exit-game",
            Some(admin.to_string()),
        )
        .unwrap();

    let mut env = TestEnv {
        app,
        contract_addr,
        admin,
        submitter,
        alice,
        bob,
        carol,
        challenger,
    };
    env.map_token(
        AssetInfo::NativeToken {
            denom: LUNA.to_string(),
        },
        &luna_child(),
        SettlementMode::Lock,
    );
    env
}

impl TestEnv {
    pub fn execute(
        &mut self,
        sender: &Addr,
        msg: &ExecuteMsg,
        funds: &[Coin],
    ) -> anyhow::Result<AppResponse> {
        self.app
            .execute_contract(sender.clone(), self.contract_addr.clone(), msg, funds)
    }

    pub fn map_token(&mut self, root_token: AssetInfo, child: &ChildToken, settlement: SettlementMode) {
        let admin = self.admin.clone();
        self.execute(
            &admin,
            &ExecuteMsg::MapToken {
                root_token,
                child_token: child.hex(),
                settlement,
            },
            &[],
        )
        .unwrap();
    }

    /// Link `key` to `root` with a signature over the link digest
    pub fn link(&mut self, root: &Addr, key: &ChildKey) {
        let (signature, recovery_id) = key.sign(&link_digest(&self.contract_addr, root));
        self.execute(
            root,
            &ExecuteMsg::LinkChildAccount {
                child_address: key.address.to_hex(),
                signature: Binary::from(signature.to_vec()),
                recovery_id,
            },
            &[],
        )
        .unwrap();
    }

    pub fn deposit_native(&mut self, from: &Addr, child: &ChildAddress, amount: u128) {
        self.execute(
            from,
            &ExecuteMsg::DepositNative {
                child_recipient: child.to_hex(),
            },
            &coins(amount, LUNA),
        )
        .unwrap();
    }

    pub fn start_burn_exit(
        &mut self,
        sender: &Addr,
        predicate: PredicateKind,
        exitor: &ChildAddress,
        reference: Binary,
    ) -> anyhow::Result<AppResponse> {
        self.execute(
            sender,
            &ExecuteMsg::StartExitWithBurntTokens {
                predicate,
                exitor: exitor.to_hex(),
                reference,
            },
            &bond(),
        )
    }

    pub fn start_in_flight_exit(
        &mut self,
        sender: &Addr,
        predicate: PredicateKind,
        exitor: &ChildAddress,
        inputs: Vec<Binary>,
        exit_tx: Vec<u8>,
    ) -> anyhow::Result<AppResponse> {
        self.execute(
            sender,
            &ExecuteMsg::StartExitInFlight {
                predicate,
                exitor: exitor.to_hex(),
                inputs,
                exit_tx: Binary::from(exit_tx),
            },
            &bond(),
        )
    }

    pub fn challenge(
        &mut self,
        challenger: &Addr,
        exit_id: Uint256,
        input_age: Uint256,
        challenge: Binary,
        predicate: PredicateKind,
    ) -> anyhow::Result<AppResponse> {
        self.execute(
            challenger,
            &ExecuteMsg::ChallengeExit {
                exit_id,
                input_age,
                challenge,
                predicate,
            },
            &[],
        )
    }

    pub fn process(&mut self, token: &str) -> anyhow::Result<AppResponse> {
        let caller = self.carol.clone();
        self.execute(
            &caller,
            &ExecuteMsg::ProcessExits {
                token: token.to_string(),
                max_exits: None,
            },
            &[],
        )
    }

    pub fn advance(&mut self, seconds: u64) {
        self.app.update_block(|block| {
            block.time = block.time.plus_seconds(seconds);
            block.height += 1;
        });
    }

    pub fn now(&self) -> u64 {
        self.app.block_info().time.seconds()
    }

    pub fn query_exit(&self, exit_id: Uint256) -> ExitResponse {
        self.app
            .wrap()
            .query_wasm_smart(&self.contract_addr, &QueryMsg::Exit { exit_id })
            .unwrap()
    }

    pub fn exit_inputs(&self, exit_id: Uint256) -> ExitInputsResponse {
        self.app
            .wrap()
            .query_wasm_smart(&self.contract_addr, &QueryMsg::ExitInputs { exit_id })
            .unwrap()
    }

    pub fn pending_exits(&self, token: &str) -> PendingExitsResponse {
        self.app
            .wrap()
            .query_wasm_smart(
                &self.contract_addr,
                &QueryMsg::PendingExits {
                    token: token.to_string(),
                    start_after: None,
                    limit: None,
                },
            )
            .unwrap()
    }

    pub fn stats(&self) -> StatsResponse {
        self.app
            .wrap()
            .query_wasm_smart(&self.contract_addr, &QueryMsg::Stats {})
            .unwrap()
    }

    pub fn locked(&self, token: &str) -> Uint128 {
        let res: LockedBalanceResponse = self
            .app
            .wrap()
            .query_wasm_smart(
                &self.contract_addr,
                &QueryMsg::LockedBalance {
                    token: token.to_string(),
                },
            )
            .unwrap();
        res.amount
    }

    pub fn balance(&self, addr: &Addr, denom: &str) -> u128 {
        self.app.wrap().query_balance(addr, denom).unwrap().amount.u128()
    }

    pub fn query<T: serde::de::DeserializeOwned>(&self, msg: &QueryMsg) -> StdResult<T> {
        self.app.wrap().query_wasm_smart(&self.contract_addr, msg)
    }

    /// CW20 root token mapped to a fresh child token. Alice holds the
    /// initial supply; in mint mode the exit game is the minter.
    pub fn setup_cw20(&mut self, settlement: SettlementMode) -> (Addr, ChildToken) {
        let code_id = self.app.store_code(contract_cw20());
        let minter = match settlement {
            SettlementMode::Lock => self.admin.to_string(),
            SettlementMode::Mint => self.contract_addr.to_string(),
        };
        let token = self
            .app
            .instantiate_contract(
                code_id,
                self.admin.clone(),
                &cw20_base::msg::InstantiateMsg {
                    name: "Wrapped Luna".to_string(),
                    symbol: "WLUNA".to_string(),
                    decimals: 6,
                    initial_balances: vec![Cw20Coin {
                        address: self.alice.to_string(),
                        amount: Uint128::new(1_000_000),
                    }],
                    mint: Some(MinterResponse { minter, cap: None }),
                    marketing: None,
                },
                &[],
                "wluna",
                None,
            )
            .unwrap();

        let child = ChildToken::new(0x22, token.as_str());
        self.map_token(
            AssetInfo::Token {
                contract_addr: token.to_string(),
            },
            &child,
            settlement,
        );
        (token, child)
    }

    /// CW721 collection mapped to a fresh child token. In lock mode the
    /// admin mints; in mint mode the exit game does.
    pub fn setup_nft(&mut self, settlement: SettlementMode) -> (Addr, ChildToken) {
        let code_id = self.app.store_code(nft::contract_nft());
        let minter = match settlement {
            SettlementMode::Lock => self.admin.to_string(),
            SettlementMode::Mint => self.contract_addr.to_string(),
        };
        let collection = self
            .app
            .instantiate_contract(
                code_id,
                self.admin.clone(),
                &nft::InstantiateMsg { minter },
                &[],
                "punks",
                None,
            )
            .unwrap();

        let child = ChildToken::new(0x33, collection.as_str());
        self.map_token(
            AssetInfo::Nft {
                contract_addr: collection.to_string(),
            },
            &child,
            settlement,
        );
        (collection, child)
    }

    pub fn cw20_balance(&self, token: &Addr, addr: &Addr) -> u128 {
        let res: cw20::BalanceResponse = self
            .app
            .wrap()
            .query_wasm_smart(
                token,
                &cw20::Cw20QueryMsg::Balance {
                    address: addr.to_string(),
                },
            )
            .unwrap();
        res.balance.u128()
    }

    pub fn nft_owner(&self, collection: &Addr, token_id: &str) -> String {
        let res: nft::OwnerOfResponse = self
            .app
            .wrap()
            .query_wasm_smart(
                collection,
                &nft::QueryMsg::OwnerOf {
                    token_id: token_id.to_string(),
                },
            )
            .unwrap();
        res.owner
    }
}

// ============================================================================
// Response Helpers
// ============================================================================

/// Attribute of the first custom event of type `ty`
pub fn event_attr(res: &AppResponse, ty: &str, key: &str) -> String {
    let wasm_ty = format!("wasm-{}", ty);
    res.events
        .iter()
        .find(|e| e.ty == wasm_ty)
        .and_then(|e| e.attributes.iter().find(|a| a.key == key))
        .map(|a| a.value.clone())
        .unwrap_or_else(|| panic!("missing {}.{}", ty, key))
}

pub fn events_of(res: &AppResponse, ty: &str) -> Vec<cosmwasm_std::Event> {
    let wasm_ty = format!("wasm-{}", ty);
    res.events.iter().filter(|e| e.ty == wasm_ty).cloned().collect()
}

pub fn started_exit_id(res: &AppResponse) -> Uint256 {
    Uint256::from_str(&event_attr(res, "exit_started", "exit_id")).unwrap()
}

/// Assert that a failed execution was rejected with `expected`
pub fn assert_contract_err(err: anyhow::Error, expected: ContractError) {
    assert_eq!(
        err.downcast_ref::<ContractError>(),
        Some(&expected),
        "{:?}",
        err
    );
}

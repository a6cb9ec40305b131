//! Child-ledger fixture builders for tests.
//!
//! Produces the same byte structures a child node would hand to an exitor:
//! header-chain trees for checkpoints, Patricia tries for transactions and
//! receipts, and RLP receipts carrying arbitrary logs.

mod trie;

use rlp::RlpStream;

use crate::merkle::hash_pair;
use crate::receipt::LogEntry;

pub use trie::TrieBuilder;

/// Binary Merkle tree over header leaves, padded with zero leaves to a power
/// of two.
pub struct HeaderTree {
    levels: Vec<Vec<[u8; 32]>>,
}

impl HeaderTree {
    pub fn new(leaves: &[[u8; 32]]) -> Self {
        let width = leaves.len().max(1).next_power_of_two();
        let mut level = leaves.to_vec();
        level.resize(width, [0u8; 32]);

        let mut levels = vec![level];
        while levels[levels.len() - 1].len() > 1 {
            let next = levels[levels.len() - 1]
                .chunks_exact(2)
                .map(|pair| hash_pair(&pair[0], &pair[1]))
                .collect();
            levels.push(next);
        }
        HeaderTree { levels }
    }

    pub fn root(&self) -> [u8; 32] {
        self.levels[self.levels.len() - 1][0]
    }

    /// Concatenated siblings of leaf `index`, leaf level first
    pub fn proof(&self, index: usize) -> Vec<u8> {
        let mut proof = Vec::new();
        let mut position = index;
        for level in &self.levels[..self.levels.len() - 1] {
            proof.extend_from_slice(&level[position ^ 1]);
            position >>= 1;
        }
        proof
    }
}

pub fn encode_log(log: &LogEntry) -> Vec<u8> {
    let mut s = RlpStream::new_list(3);
    s.append(&log.address.to_vec());
    s.begin_list(log.topics.len());
    for topic in &log.topics {
        s.append(&topic.to_vec());
    }
    s.append(&log.data);
    s.out().to_vec()
}

/// RLP receipt with an all-zero bloom. `tx_type` adds a typed envelope.
pub fn encode_receipt(
    success: bool,
    cumulative_gas: u64,
    logs: &[LogEntry],
    tx_type: Option<u8>,
) -> Vec<u8> {
    let mut s = RlpStream::new_list(4);
    if success {
        s.append(&1u8);
    } else {
        s.append_empty_data();
    }
    s.append(&cumulative_gas);
    s.append(&vec![0u8; 256]);
    s.begin_list(logs.len());
    for log in logs {
        s.append_raw(&encode_log(log), 1);
    }
    let body = s.out().to_vec();

    match tx_type {
        Some(kind) => {
            let mut typed = vec![kind];
            typed.extend_from_slice(&body);
            typed
        }
        None => body,
    }
}

//! Header-chain Merkle membership.
//!
//! A checkpoint commits to the contiguous block range `[start, end]` with a
//! binary keccak Merkle tree whose leaves are block headers in height order.
//!
//! # Leaf Layout (128 bytes)
//! - Bytes 0-31:   block number (uint256, big-endian)
//! - Bytes 32-63:  block timestamp (uint256, big-endian)
//! - Bytes 64-95:  transactions root
//! - Bytes 96-127: receipts root
//!
//! The leaf index is `block_number - start`. The proof is the concatenation of
//! the 32-byte siblings from the leaf upwards; bit `i` of the index says
//! whether the node at level `i` is a right child.

use crate::keccak::{keccak256, keccak256_concat};

/// Header leaf committed by a checkpoint
pub fn header_leaf(
    block_number: u64,
    block_timestamp: u64,
    transactions_root: &[u8; 32],
    receipts_root: &[u8; 32],
) -> [u8; 32] {
    let mut data = [0u8; 128];
    data[24..32].copy_from_slice(&block_number.to_be_bytes());
    data[56..64].copy_from_slice(&block_timestamp.to_be_bytes());
    data[64..96].copy_from_slice(transactions_root);
    data[96..128].copy_from_slice(receipts_root);
    keccak256(&data)
}

/// Hash of an interior node
pub fn hash_pair(left: &[u8; 32], right: &[u8; 32]) -> [u8; 32] {
    keccak256_concat(&[left.as_slice(), right.as_slice()])
}

/// Recompute the root for `leaf` at `index` from a concatenated sibling list.
///
/// Returns `None` when the proof is not a whole number of hashes or the index
/// does not fit in a tree of the proof's depth.
pub fn compute_root(leaf: [u8; 32], index: u64, proof: &[u8]) -> Option<[u8; 32]> {
    if proof.len() % 32 != 0 {
        return None;
    }
    let depth = proof.len() / 32;
    if depth < 64 && index >> depth != 0 {
        return None;
    }

    let mut node = leaf;
    let mut position = index;
    for chunk in proof.chunks_exact(32) {
        let mut sibling = [0u8; 32];
        sibling.copy_from_slice(chunk);
        node = if position & 1 == 0 {
            hash_pair(&node, &sibling)
        } else {
            hash_pair(&sibling, &node)
        };
        position >>= 1;
    }
    Some(node)
}

/// Check that `leaf` sits at `index` of the tree with root `root`.
pub fn verify_membership(leaf: [u8; 32], index: u64, root: &[u8; 32], proof: &[u8]) -> bool {
    compute_root(leaf, index, proof).map_or(false, |computed| &computed == root)
}

//! Merkle-Patricia trie inclusion proofs.
//!
//! Verifies that `value` is stored at `key` in the trie with root hash `root`,
//! given the RLP-encoded nodes on the path from the root. Nodes whose encoding
//! is shorter than 32 bytes are embedded in their parent and are walked
//! inline rather than taken from the proof list.

use rlp::{DecoderError, Rlp};
use thiserror::Error;

use crate::keccak::keccak256;

#[derive(Error, Debug, PartialEq)]
pub enum ProofError {
    #[error("Malformed trie node: {0}")]
    Decode(#[from] DecoderError),

    #[error("Proof ended before reaching the key")]
    MissingNode,

    #[error("Trie node does not hash to its reference")]
    HashMismatch,

    #[error("Key not present in trie")]
    KeyNotFound,

    #[error("Invalid trie node")]
    InvalidNode,

    #[error("Proof carries nodes beyond the key")]
    TrailingNodes,
}

/// How a parent refers to its child
enum NodeRef {
    Hash([u8; 32]),
    Inline(Vec<u8>),
}

/// Walk the proof from `root` along `key` and return the stored value.
pub fn verify_proof(root: &[u8; 32], key: &[u8], proof: &[Vec<u8>]) -> Result<Vec<u8>, ProofError> {
    let path = to_nibbles(key);
    let mut cursor = 0usize;
    let mut expected = NodeRef::Hash(*root);
    let mut nodes = proof.iter();

    loop {
        let node = match expected {
            NodeRef::Hash(hash) => {
                let node = nodes.next().ok_or(ProofError::MissingNode)?;
                if keccak256(node) != hash {
                    return Err(ProofError::HashMismatch);
                }
                node.clone()
            }
            NodeRef::Inline(node) => node,
        };

        let rlp = Rlp::new(&node);
        match rlp.item_count()? {
            17 => {
                if cursor == path.len() {
                    let value = rlp.at(16)?.data()?.to_vec();
                    if value.is_empty() {
                        return Err(ProofError::KeyNotFound);
                    }
                    return finish(value, nodes.next().is_some());
                }
                let child = rlp.at(path[cursor] as usize)?;
                cursor += 1;
                expected = child_ref(&child)?;
            }
            2 => {
                let (segment, is_leaf) = decode_compact(rlp.at(0)?.data()?)?;
                if !path[cursor..].starts_with(&segment) {
                    return Err(ProofError::KeyNotFound);
                }
                cursor += segment.len();
                if is_leaf {
                    if cursor != path.len() {
                        return Err(ProofError::KeyNotFound);
                    }
                    let value = rlp.at(1)?.data()?.to_vec();
                    return finish(value, nodes.next().is_some());
                }
                expected = child_ref(&rlp.at(1)?)?;
            }
            _ => return Err(ProofError::InvalidNode),
        }
    }
}

fn finish(value: Vec<u8>, trailing: bool) -> Result<Vec<u8>, ProofError> {
    if trailing {
        return Err(ProofError::TrailingNodes);
    }
    Ok(value)
}

fn child_ref(item: &Rlp) -> Result<NodeRef, ProofError> {
    if item.is_list() {
        return Ok(NodeRef::Inline(item.as_raw().to_vec()));
    }
    let data = item.data()?;
    match data.len() {
        0 => Err(ProofError::KeyNotFound),
        32 => {
            let mut hash = [0u8; 32];
            hash.copy_from_slice(data);
            Ok(NodeRef::Hash(hash))
        }
        _ => Err(ProofError::InvalidNode),
    }
}

/// Split bytes into high/low nibbles
pub fn to_nibbles(key: &[u8]) -> Vec<u8> {
    key.iter().flat_map(|b| [b >> 4, b & 0x0f]).collect()
}

/// Decode a hex-prefix encoded path. Returns the nibbles and the leaf flag.
pub fn decode_compact(encoded: &[u8]) -> Result<(Vec<u8>, bool), ProofError> {
    let first = *encoded.first().ok_or(ProofError::InvalidNode)?;
    let flag = first >> 4;
    if flag > 3 {
        return Err(ProofError::InvalidNode);
    }
    let is_leaf = flag & 2 != 0;
    let odd = flag & 1 != 0;

    let mut nibbles = Vec::with_capacity(encoded.len() * 2);
    if odd {
        nibbles.push(first & 0x0f);
    } else if first & 0x0f != 0 {
        return Err(ProofError::InvalidNode);
    }
    nibbles.extend(to_nibbles(&encoded[1..]));
    Ok((nibbles, is_leaf))
}

/// Hex-prefix encode a nibble path
pub fn encode_compact(nibbles: &[u8], is_leaf: bool) -> Vec<u8> {
    let flag = if is_leaf { 2u8 } else { 0u8 };
    let mut out = Vec::with_capacity(nibbles.len() / 2 + 1);
    let rest = if nibbles.len() % 2 == 1 {
        out.push(((flag | 1) << 4) | nibbles[0]);
        &nibbles[1..]
    } else {
        out.push(flag << 4);
        nibbles
    };
    for pair in rest.chunks_exact(2) {
        out.push((pair[0] << 4) | pair[1]);
    }
    out
}

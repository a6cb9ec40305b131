use std::collections::BTreeMap;

use rlp::RlpStream;

use crate::keccak::keccak256;
use crate::mpt::{encode_compact, to_nibbles};

enum Node {
    Empty,
    Leaf {
        path: Vec<u8>,
        value: Vec<u8>,
    },
    Extension {
        path: Vec<u8>,
        child: Box<Node>,
    },
    Branch {
        children: Vec<Node>,
        value: Option<Vec<u8>>,
    },
}

/// In-memory Merkle-Patricia trie that produces roots and proofs the way the
/// child ledger does for its transaction and receipt tries.
#[derive(Default)]
pub struct TrieBuilder {
    entries: BTreeMap<Vec<u8>, Vec<u8>>,
}

impl TrieBuilder {
    pub fn insert(&mut self, key: Vec<u8>, value: Vec<u8>) {
        self.entries.insert(key, value);
    }

    pub fn root(&self) -> [u8; 32] {
        keccak256(&encode(&self.build()))
    }

    /// Hashed nodes on the path to `key`, root first. Embedded nodes travel
    /// inside their parent.
    pub fn proof(&self, key: &[u8]) -> Vec<Vec<u8>> {
        let root = self.build();
        let path = to_nibbles(key);
        let mut proof = vec![encode(&root)];
        let mut node = &root;
        let mut cursor = 0usize;
        loop {
            let next = match node {
                Node::Extension { path: segment, child } if path[cursor..].starts_with(segment) => {
                    cursor += segment.len();
                    child.as_ref()
                }
                Node::Branch { children, .. } if cursor < path.len() => {
                    let child = &children[path[cursor] as usize];
                    cursor += 1;
                    child
                }
                _ => break,
            };
            let encoded = encode(next);
            if encoded.len() >= 32 {
                proof.push(encoded);
            }
            node = next;
        }
        proof
    }

    fn build(&self) -> Node {
        let entries: Vec<(Vec<u8>, Vec<u8>)> = self
            .entries
            .iter()
            .map(|(k, v)| (to_nibbles(k), v.clone()))
            .collect();
        build_node(&entries)
    }
}

fn build_node(entries: &[(Vec<u8>, Vec<u8>)]) -> Node {
    match entries {
        [] => Node::Empty,
        [(path, value)] => Node::Leaf {
            path: path.clone(),
            value: value.clone(),
        },
        _ => {
            let prefix = common_prefix(entries);
            if prefix > 0 {
                let stripped: Vec<_> = entries
                    .iter()
                    .map(|(k, v)| (k[prefix..].to_vec(), v.clone()))
                    .collect();
                return Node::Extension {
                    path: entries[0].0[..prefix].to_vec(),
                    child: Box::new(build_node(&stripped)),
                };
            }

            let value = entries
                .iter()
                .find(|(k, _)| k.is_empty())
                .map(|(_, v)| v.clone());
            let children = (0u8..16)
                .map(|nibble| {
                    let group: Vec<_> = entries
                        .iter()
                        .filter(|(k, _)| k.first() == Some(&nibble))
                        .map(|(k, v)| (k[1..].to_vec(), v.clone()))
                        .collect();
                    build_node(&group)
                })
                .collect();
            Node::Branch { children, value }
        }
    }
}

fn common_prefix(entries: &[(Vec<u8>, Vec<u8>)]) -> usize {
    let first = &entries[0].0;
    entries[1..].iter().fold(first.len(), |len, (k, _)| {
        first
            .iter()
            .zip(k.iter())
            .take(len)
            .take_while(|(a, b)| a == b)
            .count()
    })
}

fn encode(node: &Node) -> Vec<u8> {
    match node {
        Node::Empty => rlp::encode(&Vec::<u8>::new()).to_vec(),
        Node::Leaf { path, value } => {
            let mut s = RlpStream::new_list(2);
            s.append(&encode_compact(path, true));
            s.append(value);
            s.out().to_vec()
        }
        Node::Extension { path, child } => {
            let mut s = RlpStream::new_list(2);
            s.append(&encode_compact(path, false));
            append_ref(&mut s, child);
            s.out().to_vec()
        }
        Node::Branch { children, value } => {
            let mut s = RlpStream::new_list(17);
            for child in children {
                append_ref(&mut s, child);
            }
            match value {
                Some(value) => s.append(value),
                None => s.append_empty_data(),
            };
            s.out().to_vec()
        }
    }
}

fn append_ref(s: &mut RlpStream, child: &Node) {
    if let Node::Empty = child {
        s.append_empty_data();
        return;
    }
    let encoded = encode(child);
    if encoded.len() < 32 {
        s.append_raw(&encoded, 1);
    } else {
        s.append(&keccak256(&encoded).to_vec());
    }
}

//! An in-memory zk-trie which produces proofs.
//!
//! This is a testing aid for verifiers: it rebuilds the whole trie on every query and makes no
//! attempt at efficiency.

use alloc::{boxed::Box, collections::BTreeMap, vec::Vec};

use crate::hasher::{hash_key, HashOracle};
use crate::leaf::{encode_leaf, LeafKind};
use crate::proof::encode_branch;
use crate::trie::{self, KeyHash, Node, NodeType, Word, EMPTY, KEY_BITS, MAGIC_SMT_BYTES};
use crate::wire;

enum Tree {
    Empty,
    Leaf {
        hash: Node,
        bytes: Vec<u8>,
    },
    Branch {
        hash: Node,
        node_type: NodeType,
        children: Box<[Tree; 2]>,
    },
}

impl Tree {
    fn hash(&self) -> Node {
        match self {
            Tree::Empty => EMPTY,
            Tree::Leaf { hash, .. } | Tree::Branch { hash, .. } => *hash,
        }
    }

    fn is_terminal(&self) -> bool {
        !matches!(self, Tree::Branch { .. })
    }
}

struct Entry {
    key_hash: KeyHash,
    hash: Node,
    bytes: Vec<u8>,
}

/// A zk-trie holding leaves of kind `K`, hashed with `O`.
pub struct ReferenceTrie<K, O> {
    oracle: O,
    leaves: BTreeMap<Word, K>,
}

impl<K: LeafKind, O: HashOracle> ReferenceTrie<K, O> {
    /// Create an empty trie.
    pub fn new(oracle: O) -> Self {
        ReferenceTrie {
            oracle,
            leaves: BTreeMap::new(),
        }
    }

    /// The hash oracle of the trie.
    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    /// Insert or replace the leaf stored under `key`.
    pub fn insert(&mut self, key: Word, leaf: K) {
        self.leaves.insert(key, leaf);
    }

    /// Remove the leaf stored under `key`.
    pub fn remove(&mut self, key: &Word) -> Option<K> {
        self.leaves.remove(key)
    }

    /// The current root.
    pub fn root(&self) -> Node {
        self.build().hash()
    }

    /// The nodes along the path of `key`, from the root to the terminal node.
    pub fn prove(&self, key: &Word) -> Vec<Vec<u8>> {
        let key_hash = hash_key(&self.oracle, key);
        let tree = self.build();

        let mut proof = Vec::new();
        let mut node = &tree;
        let mut depth = 0;
        loop {
            match node {
                Tree::Empty => {
                    proof.push(alloc::vec![NodeType::Empty.tag()]);
                    break;
                }
                Tree::Leaf { bytes, .. } => {
                    proof.push(bytes.clone());
                    break;
                }
                Tree::Branch {
                    node_type,
                    children,
                    ..
                } => {
                    let [left, right] = &**children;
                    proof.push(encode_branch(*node_type, &left.hash(), &right.hash()).to_vec());
                    node = if trie::path_bit(&key_hash, depth) {
                        right
                    } else {
                        left
                    };
                    depth += 1;
                }
            }
        }
        proof
    }

    /// Like [`Self::prove`], with the magic node appended as served by zk-trie nodes.
    pub fn prove_with_magic(&self, key: &Word) -> Vec<Vec<u8>> {
        let mut proof = self.prove(key);
        proof.push(MAGIC_SMT_BYTES.to_vec());
        proof
    }

    /// The ABI-encoded proof for `key`.
    pub fn prove_encoded(&self, key: &Word) -> Vec<u8> {
        wire::encode_proof(&self.prove(key))
    }

    fn build(&self) -> Tree {
        let entries: Vec<Entry> = self
            .leaves
            .iter()
            .map(|(key, leaf)| {
                let key_hash = hash_key(&self.oracle, key);
                Entry {
                    key_hash,
                    hash: leaf.leaf_hash(&self.oracle, &key_hash),
                    bytes: encode_leaf(leaf, &key_hash, key),
                }
            })
            .collect();
        let entries: Vec<&Entry> = entries.iter().collect();
        self.build_subtree(&entries, 0)
    }

    fn build_subtree(&self, entries: &[&Entry], depth: usize) -> Tree {
        match entries {
            [] => Tree::Empty,
            [entry] => Tree::Leaf {
                hash: entry.hash,
                bytes: entry.bytes.clone(),
            },
            _ => {
                assert!(depth < KEY_BITS, "distinct keys with equal key-hashes");
                let (right, left): (Vec<&Entry>, Vec<&Entry>) = entries
                    .iter()
                    .copied()
                    .partition(|entry| trie::path_bit(&entry.key_hash, depth));
                let left = self.build_subtree(&left, depth + 1);
                let right = self.build_subtree(&right, depth + 1);
                let node_type = NodeType::branch(left.is_terminal(), right.is_terminal());
                Tree::Branch {
                    hash: self
                        .oracle
                        .hash(&left.hash(), &right.hash(), node_type.domain()),
                    node_type,
                    children: Box::new([left, right]),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ReferenceTrie;
    use crate::hasher::{hash_key, Blake3Oracle};
    use crate::leaf::StorageLeaf;
    use crate::proof::{walk, ProofNode};
    use crate::trie::{NodeType, EMPTY};

    fn slot(i: u8) -> [u8; 32] {
        let mut slot = [0u8; 32];
        slot[31] = i;
        slot
    }

    #[test]
    fn empty_trie() {
        let trie = ReferenceTrie::<StorageLeaf, _>::new(Blake3Oracle::new());
        assert_eq!(trie.root(), EMPTY);
        assert_eq!(trie.prove(&slot(1)), vec![vec![NodeType::Empty.tag()]]);
    }

    #[test]
    fn proofs_walk_to_their_leaf() {
        let mut trie = ReferenceTrie::new(Blake3Oracle::new());
        for i in 0..32 {
            trie.insert(slot(i), StorageLeaf { value: [i + 1; 32] });
        }
        let root = trie.root();

        for i in 0..32 {
            let proof = trie.prove(&slot(i));
            let walked = walk(
                trie.oracle(),
                &slot(i),
                &proof,
                &root,
                102,
                &Default::default(),
            )
            .unwrap();
            assert!(walked.exists);
            assert_eq!(walked.depth, proof.len() - 1);
            assert_eq!(walked.key_hash, hash_key(trie.oracle(), &slot(i)));
        }
    }

    #[test]
    fn branch_kinds_reflect_children() {
        let mut trie = ReferenceTrie::new(Blake3Oracle::new());
        for i in 0..8 {
            trie.insert(slot(i), StorageLeaf { value: [i; 32] });
        }
        let proof = trie.prove(&slot(0));
        let leaf_len = 102;
        for pair in proof.windows(2) {
            let parent = ProofNode::parse(&pair[0], leaf_len).unwrap();
            let child = ProofNode::parse(&pair[1], leaf_len).unwrap();
            let ProofNode::Branch { node_type, .. } = parent else {
                panic!("non-terminal node is not a branch");
            };
            let child_terminal = !matches!(child, ProofNode::Branch { .. });
            match node_type {
                NodeType::LeafLeaf => assert!(child_terminal),
                NodeType::BranchBranch => assert!(!child_terminal),
                _ => {}
            }
        }
    }
}

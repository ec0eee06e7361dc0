//! Walking a proof from the root down to its terminal node.

use super::{LeafNode, Malformed, ProofError, ProofNode};
use crate::hasher::{hash_key, HashOracle};
use crate::trie::{self, KeyHash, Node, Word, EMPTY, KEY_BITS, MAGIC_SMT_BYTES};

/// How nodes following the terminal node are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Framing {
    /// Ignore anything after the terminal node, as well as leaf compression flags.
    #[default]
    Lenient,
    /// Require exactly one trailing node holding [`MAGIC_SMT_BYTES`] and canonical compression
    /// flags on leaves.
    Strict,
}

/// Parameters of a walk which do not depend on the proof.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalkParams {
    /// The depth at which the walk gives up. Never more than [`KEY_BITS`].
    pub max_depth: usize,
    /// The framing rules.
    pub framing: Framing,
}

impl Default for WalkParams {
    fn default() -> Self {
        WalkParams {
            max_depth: KEY_BITS,
            framing: Framing::Lenient,
        }
    }
}

/// The outcome of a successful walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Walk<'a> {
    /// The key-hash a leaf hash must be recomputed with. This is the key-hash of the requested key
    /// unless the walk ended in a leaf for a different key, in which case it is that leaf's
    /// key-hash.
    pub key_hash: KeyHash,
    /// The hash the terminal node must reproduce. [`EMPTY`] if the walk ended in an empty node.
    pub terminal: Node,
    /// The terminal leaf, if the walk ended in one.
    pub leaf: Option<LeafNode<'a>>,
    /// Whether the terminal leaf holds the requested key.
    pub exists: bool,
    /// The depth of the terminal node.
    pub depth: usize,
}

/// Walk `proof` from `root` along the path of `key`.
///
/// Each branch is checked against the hash committed by its parent and the child to descend into
/// is selected by the key-hash bit at the branch's depth. The walk ends at the first leaf or empty
/// node. A leaf hash is not checked here: it depends on the leaf kind and must be recomputed by the
/// caller and compared against [`Walk::terminal`]. A leaf for another key must carry a key preimage
/// which hashes to its key-hash.
///
/// Leaves must have length `leaf_len`. The number of hash invocations is bounded by
/// `params.max_depth` regardless of the length of `proof`.
pub fn walk<'a, O, N>(
    oracle: &O,
    key: &Word,
    proof: &'a [N],
    root: &Node,
    leaf_len: usize,
    params: &WalkParams,
) -> Result<Walk<'a>, ProofError>
where
    O: HashOracle + ?Sized,
    N: AsRef<[u8]>,
{
    let max_depth = core::cmp::min(params.max_depth, KEY_BITS);
    let mut key_hash = hash_key(oracle, key);
    let mut expected = *root;
    let mut depth = 0;

    let walked = loop {
        let Some(bytes) = proof.get(depth) else {
            return Err(ProofError::ProofExhausted { len: proof.len() });
        };
        if depth >= max_depth {
            return Err(Malformed::DepthExceeded(depth).into());
        }

        match ProofNode::parse(bytes.as_ref(), leaf_len)? {
            ProofNode::Empty => {
                if expected != EMPTY {
                    return Err(ProofError::HashMismatch { depth });
                }
                break Walk {
                    key_hash,
                    terminal: EMPTY,
                    leaf: None,
                    exists: false,
                    depth,
                };
            }
            ProofNode::Leaf(leaf) => {
                let exists = if leaf.key_hash == key_hash {
                    if leaf.key_preimage != *key {
                        return Err(ProofError::KeyMismatch { depth });
                    }
                    true
                } else {
                    // a leaf for another key proves absence only if it sits on our path.
                    if !trie::shares_prefix(&leaf.key_hash, &key_hash, depth) {
                        return Err(ProofError::KeyMismatch { depth });
                    }
                    // the preimage is not covered by the leaf hash.
                    if hash_key(oracle, &leaf.key_preimage) != leaf.key_hash {
                        return Err(ProofError::KeyMismatch { depth });
                    }
                    key_hash = leaf.key_hash;
                    false
                };
                break Walk {
                    key_hash,
                    terminal: expected,
                    leaf: Some(leaf),
                    exists,
                    depth,
                };
            }
            ProofNode::Branch {
                node_type,
                left,
                right,
            } => {
                if oracle.hash(&left, &right, node_type.domain()) != expected {
                    return Err(ProofError::HashMismatch { depth });
                }
                expected = if trie::path_bit(&key_hash, depth) {
                    right
                } else {
                    left
                };
                depth += 1;
            }
        }
    };

    if params.framing == Framing::Strict {
        match &proof[walked.depth + 1..] {
            [magic] if magic.as_ref() == MAGIC_SMT_BYTES => {}
            _ => return Err(Malformed::TrailingNodes.into()),
        }
    }

    Ok(walked)
}

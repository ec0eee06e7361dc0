//! This module defines the types of a binary sparse zk-trie.
//!
//! Every key is a 256-bit word. The trie is keyed by the key-hash, the digest of the key under
//! [`hash_key`](crate::hasher::hash_key), and the lookup path of a key is the bit sequence of its
//! key-hash read as a big-endian integer, starting from the least-significant bit: bit `d` selects
//! the child taken at depth `d`, `0` for left and `1` for right.
//!
//! There are three kinds of nodes.
//!   1. Branch nodes, which each have two children. A branch is hashed over both child hashes
//!      under a domain equal to its [`NodeType`], which records whether each child is terminal.
//!   2. Leaf nodes, which carry a full key-hash, a payload and the raw key they were created for.
//!   3. Empty nodes, which stand in for an empty sub-trie and hash to [`EMPTY`].
//!
//! The trie does not compress paths: keys sharing a long prefix are separated by a chain of
//! branches whose other child is empty.

use bitvec::prelude::*;

/// A 256-bit word. Hashes, keys and leaf fields are all words.
pub type Word = [u8; 32];

/// The hash of a node.
pub type Node = Word;

/// The key-hash which determines the lookup path of a key.
pub type KeyHash = Word;

/// A 160-bit account address.
pub type Address = [u8; 20];

/// The hash of the empty sub-trie.
pub const EMPTY: Node = [0u8; 32];

/// The bit width of a key-hash, and therefore the maximum depth of the trie.
pub const KEY_BITS: usize = 256;

/// Length of the raw-key preimage carried at the end of every leaf.
pub const KEY_PREIMAGE_LEN: u8 = 32;

/// Length of a serialized branch node: the tag and two child hashes.
pub const BRANCH_NODE_LEN: usize = 65;

/// Length of a serialized empty node: the tag alone.
pub const EMPTY_NODE_LEN: usize = 1;

/// The trailing node appended to proofs served by zk-trie nodes. It carries no information.
pub const MAGIC_SMT_BYTES: &[u8] = b"THIS IS SOME MAGIC BYTES FOR SMT m1rRXgP2xpDI";

/// The tag byte of a proof node.
///
/// The four branch kinds double as the hash domain of the branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum NodeType {
    /// A leaf node.
    Leaf = 4,
    /// An empty sub-trie.
    Empty = 5,
    /// A branch whose children are both terminal (leaf or empty).
    LeafLeaf = 6,
    /// A branch with a terminal left child and a branch right child.
    LeafBranch = 7,
    /// A branch with a branch left child and a terminal right child.
    BranchLeaf = 8,
    /// A branch whose children are both branches.
    BranchBranch = 9,
}

impl NodeType {
    /// Interpret a tag byte. Unknown tags, including deprecated node types, yield `None`.
    pub fn from_tag(tag: u8) -> Option<Self> {
        Some(match tag {
            4 => NodeType::Leaf,
            5 => NodeType::Empty,
            6 => NodeType::LeafLeaf,
            7 => NodeType::LeafBranch,
            8 => NodeType::BranchLeaf,
            9 => NodeType::BranchBranch,
            _ => return None,
        })
    }

    /// The branch kind for a pair of children, given whether each of them is terminal.
    pub fn branch(left_terminal: bool, right_terminal: bool) -> Self {
        match (left_terminal, right_terminal) {
            (true, true) => NodeType::LeafLeaf,
            (true, false) => NodeType::LeafBranch,
            (false, true) => NodeType::BranchLeaf,
            (false, false) => NodeType::BranchBranch,
        }
    }

    /// The tag byte.
    pub fn tag(self) -> u8 {
        self as u8
    }

    /// The hash domain of this node type.
    pub fn domain(self) -> u64 {
        self as u64
    }

    /// Whether this is one of the four branch kinds.
    pub fn is_branch(self) -> bool {
        !matches!(self, NodeType::Leaf | NodeType::Empty)
    }
}

/// The key of an account: the address in the leading 20 bytes of a word.
pub fn account_key(address: &Address) -> Word {
    let mut key = [0u8; 32];
    key[..20].copy_from_slice(address);
    key
}

/// View a key-hash as its lookup path. Index `d` of the result is the bit consulted at depth
/// `d`.
pub fn path_bits(key_hash: &KeyHash) -> BitArray<Word, Lsb0> {
    let mut little_endian = *key_hash;
    little_endian.reverse();
    BitArray::new(little_endian)
}

/// The direction taken at `depth` along the path of `key_hash`. `true` is right.
///
/// Panics if `depth` is not less than [`KEY_BITS`].
pub fn path_bit(key_hash: &KeyHash, depth: usize) -> bool {
    path_bits(key_hash)[depth]
}

/// Whether two key-hashes share their first `depth` path bits.
///
/// Panics if `depth` exceeds [`KEY_BITS`].
pub fn shares_prefix(a: &KeyHash, b: &KeyHash, depth: usize) -> bool {
    path_bits(a)[..depth] == path_bits(b)[..depth]
}

/// The number of path bits two key-hashes share.
pub fn shared_bits(a: &KeyHash, b: &KeyHash) -> usize {
    let (a, b) = (path_bits(a), path_bits(b));
    a.iter().zip(b.iter()).take_while(|(a, b)| a == b).count()
}

#[cfg(test)]
mod tests {
    use super::{account_key, path_bit, shared_bits, shares_prefix, NodeType, KEY_BITS};
    use quickcheck::{QuickCheck, TestResult};
    use ruint::aliases::U256;

    #[test]
    fn path_bits_follow_integer_bits() {
        let mut key_hash = [0u8; 32];
        key_hash[31] = 0b0000_0101;
        key_hash[0] = 0b1000_0000;

        let as_int = U256::from_be_bytes(key_hash);
        for depth in 0..256 {
            assert_eq!(path_bit(&key_hash, depth), as_int.bit(depth), "depth {depth}");
        }
        assert!(path_bit(&key_hash, 0));
        assert!(!path_bit(&key_hash, 1));
        assert!(path_bit(&key_hash, 2));
        assert!(path_bit(&key_hash, 255));
    }

    #[test]
    fn prefix_matches_low_bit_mask() {
        let mut a = [0u8; 32];
        let mut b = [0u8; 32];
        a[31] = 0b0001_0110;
        b[31] = 0b0000_0110;

        assert!(shares_prefix(&a, &b, 0));
        assert!(shares_prefix(&a, &b, 4));
        assert!(!shares_prefix(&a, &b, 5));
        assert_eq!(shared_bits(&a, &b), 4);
        assert_eq!(shared_bits(&a, &a), 256);

        for depth in 0..256 {
            let mask = (U256::from(1u8) << depth) - U256::from(1u8);
            let expected =
                U256::from_be_bytes(a) & mask == U256::from_be_bytes(b) & mask;
            assert_eq!(shares_prefix(&a, &b, depth), expected, "depth {depth}");
        }
    }

    #[test]
    fn shared_bits_bound_shared_prefixes() {
        fn prop(a: Vec<u8>, b: Vec<u8>, depth: usize) -> TestResult {
            if a.len() < 32 || b.len() < 32 {
                return TestResult::discard();
            }
            let mut x = [0u8; 32];
            let mut y = [0u8; 32];
            x.copy_from_slice(&a[..32]);
            y.copy_from_slice(&b[..32]);
            // make prefixes of interesting lengths likely.
            y[16..].copy_from_slice(&x[16..]);

            let depth = depth % (KEY_BITS + 1);
            let shared = shared_bits(&x, &y);
            TestResult::from_bool(shares_prefix(&x, &y, depth) == (depth <= shared))
        }

        QuickCheck::new()
            .gen(quickcheck::Gen::new(64))
            .tests(10000)
            .quickcheck(prop as fn(Vec<u8>, Vec<u8>, usize) -> TestResult);
    }

    #[test]
    fn branch_kinds_and_tags() {
        assert_eq!(NodeType::branch(true, true), NodeType::LeafLeaf);
        assert_eq!(NodeType::branch(true, false), NodeType::LeafBranch);
        assert_eq!(NodeType::branch(false, true), NodeType::BranchLeaf);
        assert_eq!(NodeType::branch(false, false), NodeType::BranchBranch);

        for tag in 0..=u8::MAX {
            match NodeType::from_tag(tag) {
                Some(node_type) => {
                    assert!((4..=9).contains(&tag));
                    assert_eq!(node_type.tag(), tag);
                    assert_eq!(node_type.is_branch(), tag >= 6);
                }
                None => assert!(!(4..=9).contains(&tag)),
            }
        }
    }

    #[test]
    fn account_key_is_left_aligned() {
        let key = account_key(&[0xFF; 20]);
        assert_eq!(key[..20], [0xFF; 20]);
        assert_eq!(key[20..], [0u8; 12]);
    }
}

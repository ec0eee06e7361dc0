//! Parsing of serialized proof nodes.
//!
//! Nodes are parsed in full before any of their fields are used: a node either has exactly the
//! shape its tag demands or it is rejected.

use core::fmt;

use super::Malformed;
use crate::trie::{
    KeyHash, Node, NodeType, Word, BRANCH_NODE_LEN, EMPTY_NODE_LEN, KEY_PREIMAGE_LEN,
};

/// Offset of the key-hash within a leaf node.
pub const LEAF_KEY_HASH_OFFSET: usize = 1;

/// Offset of the compression flags within a leaf node.
pub const LEAF_FLAGS_OFFSET: usize = 33;

/// Offset of the leaf payload within a leaf node.
pub const LEAF_PAYLOAD_OFFSET: usize = 37;

/// Length of the trailer of a leaf node: the preimage-length marker and the key preimage.
pub const LEAF_TRAILER_LEN: usize = 33;

/// Length of a leaf node without its payload.
pub const LEAF_FRAMING_LEN: usize = LEAF_PAYLOAD_OFFSET + LEAF_TRAILER_LEN;

/// A parsed leaf node, borrowing its payload from the proof.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct LeafNode<'a> {
    /// The key-hash the leaf is stored under.
    pub key_hash: KeyHash,
    /// The compression flags of the payload. These are not part of the leaf hash.
    pub flags: [u8; 4],
    /// The payload region, whose layout depends on the leaf kind.
    pub payload: &'a [u8],
    /// The raw key the leaf was created for.
    pub key_preimage: Word,
}

impl<'a> LeafNode<'a> {
    /// Parse a leaf node of the given total length, including its tag.
    pub fn parse(bytes: &'a [u8], leaf_len: usize) -> Result<Self, Malformed> {
        if bytes.len() != leaf_len || leaf_len < LEAF_FRAMING_LEN {
            return Err(Malformed::LeafLength {
                expected: leaf_len,
                actual: bytes.len(),
            });
        }

        let marker = bytes[leaf_len - LEAF_TRAILER_LEN];
        if marker != KEY_PREIMAGE_LEN {
            return Err(Malformed::KeyPreimageLength(marker));
        }

        let mut flags = [0u8; 4];
        flags.copy_from_slice(&bytes[LEAF_FLAGS_OFFSET..LEAF_PAYLOAD_OFFSET]);

        Ok(LeafNode {
            key_hash: word_at(bytes, LEAF_KEY_HASH_OFFSET),
            flags,
            payload: &bytes[LEAF_PAYLOAD_OFFSET..leaf_len - LEAF_TRAILER_LEN],
            key_preimage: word_at(bytes, leaf_len - 32),
        })
    }
}

impl fmt::Debug for LeafNode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LeafNode")
            .field("key_hash", &hex::encode(self.key_hash))
            .field("flags", &hex::encode(self.flags))
            .field("payload", &hex::encode(self.payload))
            .field("key_preimage", &hex::encode(self.key_preimage))
            .finish()
    }
}

/// A parsed proof node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProofNode<'a> {
    /// The empty sub-trie.
    Empty,
    /// A leaf.
    Leaf(LeafNode<'a>),
    /// A branch, with its kind and both child hashes.
    Branch {
        /// The branch kind, which is also its hash domain.
        node_type: NodeType,
        /// The hash of the left child.
        left: Node,
        /// The hash of the right child.
        right: Node,
    },
}

impl<'a> ProofNode<'a> {
    /// Parse a node. Leaves are expected to have length `leaf_len`.
    pub fn parse(bytes: &'a [u8], leaf_len: usize) -> Result<Self, Malformed> {
        let tag = *bytes.first().ok_or(Malformed::EmptyNode)?;
        let node_type = NodeType::from_tag(tag).ok_or(Malformed::UnknownNodeType(tag))?;

        match node_type {
            NodeType::Empty if bytes.len() == EMPTY_NODE_LEN => Ok(ProofNode::Empty),
            NodeType::Empty => Err(Malformed::EmptyLength(bytes.len())),
            NodeType::Leaf => LeafNode::parse(bytes, leaf_len).map(ProofNode::Leaf),
            _ if bytes.len() != BRANCH_NODE_LEN => Err(Malformed::BranchLength(bytes.len())),
            _ => Ok(ProofNode::Branch {
                node_type,
                left: word_at(bytes, 1),
                right: word_at(bytes, 33),
            }),
        }
    }
}

/// Read the word starting at `offset`. Callers check the length beforehand.
fn word_at(bytes: &[u8], offset: usize) -> Word {
    let mut word = [0u8; 32];
    word.copy_from_slice(&bytes[offset..offset + 32]);
    word
}

/// Serialize a branch node.
pub fn encode_branch(node_type: NodeType, left: &Node, right: &Node) -> [u8; BRANCH_NODE_LEN] {
    let mut bytes = [0u8; BRANCH_NODE_LEN];
    bytes[0] = node_type.tag();
    bytes[1..33].copy_from_slice(left);
    bytes[33..65].copy_from_slice(right);
    bytes
}

#[cfg(test)]
mod tests {
    use super::{encode_branch, LeafNode, ProofNode, LEAF_FRAMING_LEN};
    use crate::proof::Malformed;
    use crate::trie::NodeType;

    const LEAF_LEN: usize = LEAF_FRAMING_LEN + 32;

    fn leaf_bytes() -> Vec<u8> {
        let mut bytes = vec![0u8; LEAF_LEN];
        bytes[0] = NodeType::Leaf.tag();
        bytes[1..33].copy_from_slice(&[0x11; 32]);
        bytes[33..37].copy_from_slice(&[1, 1, 0, 0]);
        bytes[37..69].copy_from_slice(&[0x22; 32]);
        bytes[69] = 32;
        bytes[70..102].copy_from_slice(&[0x33; 32]);
        bytes
    }

    #[test]
    fn parse_leaf_fields() {
        let bytes = leaf_bytes();
        let leaf = LeafNode::parse(&bytes, LEAF_LEN).unwrap();
        assert_eq!(leaf.key_hash, [0x11; 32]);
        assert_eq!(leaf.flags, [1, 1, 0, 0]);
        assert_eq!(leaf.payload, &[0x22; 32][..]);
        assert_eq!(leaf.key_preimage, [0x33; 32]);
    }

    #[test]
    fn leaf_length_checked_before_fields() {
        let mut bytes = leaf_bytes();
        bytes.push(0);
        assert_eq!(
            ProofNode::parse(&bytes, LEAF_LEN),
            Err(Malformed::LeafLength {
                expected: LEAF_LEN,
                actual: LEAF_LEN + 1
            })
        );
        bytes.truncate(10);
        assert!(matches!(
            ProofNode::parse(&bytes, LEAF_LEN),
            Err(Malformed::LeafLength { actual: 10, .. })
        ));
    }

    #[test]
    fn leaf_length_below_framing_rejected() {
        let bytes = [NodeType::Leaf.tag(); 8];
        assert!(matches!(
            LeafNode::parse(&bytes, 8),
            Err(Malformed::LeafLength { .. })
        ));
    }

    #[test]
    fn preimage_marker_checked() {
        let mut bytes = leaf_bytes();
        bytes[69] = 20;
        assert_eq!(
            ProofNode::parse(&bytes, LEAF_LEN),
            Err(Malformed::KeyPreimageLength(20))
        );
    }

    #[test]
    fn parse_branch() {
        let bytes = encode_branch(NodeType::BranchLeaf, &[1; 32], &[2; 32]);
        assert_eq!(
            ProofNode::parse(&bytes, LEAF_LEN),
            Ok(ProofNode::Branch {
                node_type: NodeType::BranchLeaf,
                left: [1; 32],
                right: [2; 32],
            })
        );
        assert_eq!(
            ProofNode::parse(&bytes[..64], LEAF_LEN),
            Err(Malformed::BranchLength(64))
        );
    }

    #[test]
    fn parse_empty_and_unknown() {
        assert_eq!(ProofNode::parse(&[], LEAF_LEN), Err(Malformed::EmptyNode));
        assert_eq!(ProofNode::parse(&[5], LEAF_LEN), Ok(ProofNode::Empty));
        assert_eq!(
            ProofNode::parse(&[5, 0], LEAF_LEN),
            Err(Malformed::EmptyLength(2))
        );
        for tag in [0u8, 1, 2, 3, 10, 0xFF] {
            assert_eq!(
                ProofNode::parse(&[tag; 65], LEAF_LEN),
                Err(Malformed::UnknownNodeType(tag))
            );
        }
    }
}

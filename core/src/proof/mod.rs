//! Trie proofs and proof verification.
//!
//! A proof is the ordered list of serialized nodes met when looking up a key, from the root down
//! to the terminal node: either a leaf (for the key itself, or for another key occupying its path)
//! or an empty node. [`walk`] checks every branch along the way; the terminal leaf is
//! authenticated by the leaf-kind-specific routines in [`crate::state`].

pub use error::{Malformed, ProofError};
pub use node::{
    encode_branch, LeafNode, ProofNode, LEAF_FLAGS_OFFSET, LEAF_FRAMING_LEN, LEAF_KEY_HASH_OFFSET,
    LEAF_PAYLOAD_OFFSET, LEAF_TRAILER_LEN,
};
pub use walk::{walk, Framing, Walk, WalkParams};

mod error;
mod node;
mod walk;

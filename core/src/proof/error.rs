use core::fmt;

/// The ways in which a proof can fail to be well-formed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Malformed {
    /// A node was an empty byte string.
    EmptyNode,
    /// A node carried a tag that is not a known node type.
    UnknownNodeType(u8),
    /// A branch node did not have the fixed branch length.
    BranchLength(usize),
    /// An empty node carried bytes after its tag.
    EmptyLength(usize),
    /// A leaf node did not have the length of the expected leaf kind.
    LeafLength {
        /// The length of the expected leaf kind.
        expected: usize,
        /// The length of the supplied node.
        actual: usize,
    },
    /// The preimage-length marker of a leaf was not 32.
    KeyPreimageLength(u8),
    /// The walk would have descended to or past the depth limit.
    DepthExceeded(usize),
    /// Strict framing: the nodes following the terminal node were not exactly the magic node.
    TrailingNodes,
    /// Strict framing: a leaf carried non-canonical compression flags.
    CompressionFlags([u8; 4]),
}

/// Errors in proof verification.
///
/// Every error is fatal: verification yields no partial result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProofError {
    /// The proof is not structurally valid.
    MalformedProof(Malformed),
    /// A node did not hash to the value committed by its parent (or the root).
    HashMismatch {
        /// Depth of the offending node.
        depth: usize,
    },
    /// A leaf's key preimage did not match the requested key, or an absence leaf diverged from
    /// the requested key above its own depth or carried a preimage of another key-hash.
    KeyMismatch {
        /// Depth of the offending leaf.
        depth: usize,
    },
    /// The proof ended before a leaf or empty node was reached.
    ProofExhausted {
        /// Number of nodes in the proof.
        len: usize,
    },
    /// The fields of an account leaf do not hash to the walked leaf hash.
    InvalidAccountLeafHash,
    /// The value of a storage leaf does not hash to the walked leaf hash.
    InvalidStorageLeafHash,
}

impl From<Malformed> for ProofError {
    fn from(malformed: Malformed) -> Self {
        ProofError::MalformedProof(malformed)
    }
}

impl fmt::Display for Malformed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Malformed::EmptyNode => f.write_str("empty node"),
            Malformed::UnknownNodeType(tag) => write!(f, "unknown node type {tag}"),
            Malformed::BranchLength(len) => write!(f, "branch node of length {len}"),
            Malformed::EmptyLength(len) => write!(f, "empty node of length {len}"),
            Malformed::LeafLength { expected, actual } => {
                write!(f, "leaf node of length {actual}, expected {expected}")
            }
            Malformed::KeyPreimageLength(len) => write!(f, "key preimage length {len}"),
            Malformed::DepthExceeded(depth) => write!(f, "depth {depth} exceeds the limit"),
            Malformed::TrailingNodes => f.write_str("unexpected nodes after the terminal node"),
            Malformed::CompressionFlags(flags) => {
                write!(f, "non-canonical compression flags 0x{}", hex::encode(flags))
            }
        }
    }
}

impl fmt::Display for ProofError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProofError::MalformedProof(malformed) => write!(f, "malformed proof: {malformed}"),
            ProofError::HashMismatch { depth } => write!(f, "hash mismatch at depth {depth}"),
            ProofError::KeyMismatch { depth } => write!(f, "key mismatch at depth {depth}"),
            ProofError::ProofExhausted { len } => {
                write!(f, "proof of {len} nodes ended before a terminal node")
            }
            ProofError::InvalidAccountLeafHash => f.write_str("invalid account leaf hash"),
            ProofError::InvalidStorageLeafHash => f.write_str("invalid storage leaf hash"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Malformed {}

#[cfg(feature = "std")]
impl std::error::Error for ProofError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ProofError::MalformedProof(malformed) => Some(malformed),
            _ => None,
        }
    }
}

use zktrie_core::proof::{Framing, WalkParams};
use zktrie_core::trie::KEY_BITS;

/// Options when creating a [`crate::Verifier`].
#[derive(Debug, Clone)]
pub struct Options {
    /// The depth at which a walk is abandoned. Values over 256 are treated as 256.
    pub(crate) max_depth: usize,
    pub(crate) strict_framing: bool,
}

impl Options {
    /// Create a new `Options` instance with the default values.
    pub fn new() -> Self {
        Self {
            max_depth: KEY_BITS,
            strict_framing: false,
        }
    }

    /// Set the depth at which proofs are rejected as malformed.
    ///
    /// Values over 256 will be rounded down to 256.
    ///
    /// Default: 256.
    pub fn max_depth(&mut self, max_depth: usize) {
        self.max_depth = std::cmp::min(max_depth, KEY_BITS);
    }

    /// Set strict framing on or off.
    ///
    /// With strict framing, a proof must end with exactly one magic node after its terminal node
    /// and leaves must carry the canonical compression flags of their kind. Neither is covered by
    /// any hash, so proofs served by deployed zk-trie nodes are accepted either way.
    ///
    /// Default: off.
    pub fn strict_framing(&mut self, strict_framing: bool) {
        self.strict_framing = strict_framing;
    }

    pub(crate) fn walk_params(&self) -> WalkParams {
        WalkParams {
            max_depth: self.max_depth,
            framing: if self.strict_framing {
                Framing::Strict
            } else {
                Framing::Lenient
            },
        }
    }
}

impl Default for Options {
    fn default() -> Self {
        Self::new()
    }
}

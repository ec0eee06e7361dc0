//! The hash oracle and the domain-separated helpers built on top of it.
//!
//! Every hash in a zk-trie is a two-to-one compression of 256-bit field elements under a small
//! integer domain tag. The primitive itself (Poseidon, in deployed tries) lives outside of this
//! crate and is injected through [`HashOracle`].
//!
//! Domain tags in use:
//!   - `4`: leaf nodes, see [`DOMAIN_LEAF`].
//!   - `6..=9`: branch nodes, tagged by their [`NodeType`](crate::trie::NodeType).
//!   - `512`: a single 256-bit value split into two 128-bit halves, see [`DOMAIN_SINGLE`].
//!   - `1280`: the field fold of an account leaf, see [`DOMAIN_ACCOUNT_FIELDS`].
//!
//! These tags never overlap, so a digest produced for one structural role cannot be replayed as
//! a valid digest for another one.

use crate::trie::{KeyHash, Word};

/// Domain tag of a leaf node hash. Equal to the tag byte of a leaf node.
pub const DOMAIN_LEAF: u64 = 4;

/// Domain tag used to fold a lone 256-bit value into a single digest.
pub const DOMAIN_SINGLE: u64 = 512;

/// Domain tag used at every step of the account field fold.
pub const DOMAIN_ACCOUNT_FIELDS: u64 = 1280;

/// A deterministic two-to-one hash over 256-bit words with a domain tag.
///
/// Implementations must be pure: the same inputs always produce the same output, and no state is
/// shared between invocations that could influence the result.
pub trait HashOracle {
    /// Hash two words under the given domain.
    fn hash(&self, left: &Word, right: &Word, domain: u64) -> Word;
}

impl<T: HashOracle + ?Sized> HashOracle for &T {
    fn hash(&self, left: &Word, right: &Word, domain: u64) -> Word {
        (**self).hash(left, right, domain)
    }
}

/// Fold a single 256-bit value into a digest.
///
/// The value is split into its high and low 128-bit halves, each zero-extended to a full word,
/// and hashed under [`DOMAIN_SINGLE`].
pub fn hash_single<O: HashOracle + ?Sized>(oracle: &O, value: &Word) -> Word {
    let mut high = [0u8; 32];
    let mut low = [0u8; 32];
    high[16..].copy_from_slice(&value[..16]);
    low[16..].copy_from_slice(&value[16..]);
    oracle.hash(&high, &low, DOMAIN_SINGLE)
}

/// Derive the trie key-hash of a raw key.
pub fn hash_key<O: HashOracle + ?Sized>(oracle: &O, key: &Word) -> KeyHash {
    hash_single(oracle, key)
}

/// A simple trait for representing binary hash functions.
pub trait BinaryHash {
    /// Given a bit-string, produce a 32-byte hash.
    fn hash(input: &[u8]) -> [u8; 32];
}

/// A [`HashOracle`] constructed from a simple binary hasher.
///
/// The preimage is the big-endian domain tag followed by both words. This is not compatible with
/// tries committed under an algebraic hash and exists for tooling and testing, where a fast,
/// collision-resistant stand-in is all that is needed.
pub struct DigestOracle<H>(core::marker::PhantomData<H>);

impl<H> DigestOracle<H> {
    /// Create a new oracle.
    pub const fn new() -> Self {
        DigestOracle(core::marker::PhantomData)
    }
}

impl<H> Default for DigestOracle<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> Clone for DigestOracle<H> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<H> Copy for DigestOracle<H> {}

impl<H> core::fmt::Debug for DigestOracle<H> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("DigestOracle")
    }
}

impl<H: BinaryHash> HashOracle for DigestOracle<H> {
    fn hash(&self, left: &Word, right: &Word, domain: u64) -> Word {
        let mut buf = [0u8; 72];
        buf[0..8].copy_from_slice(&domain.to_be_bytes());
        buf[8..40].copy_from_slice(left);
        buf[40..72].copy_from_slice(right);
        H::hash(&buf)
    }
}

#[cfg(any(feature = "blake3-hasher", test))]
pub use self::blake3::Blake3Oracle;

/// A hash oracle making use of blake3.
#[cfg(any(feature = "blake3-hasher", test))]
pub mod blake3 {
    use super::{BinaryHash, DigestOracle};

    /// A [`BinaryHash`] implementation for Blake3.
    pub struct Blake3BinaryHasher;

    /// A wrapper around Blake3 for use as a hash oracle.
    pub type Blake3Oracle = DigestOracle<Blake3BinaryHasher>;

    impl BinaryHash for Blake3BinaryHasher {
        fn hash(value: &[u8]) -> [u8; 32] {
            blake3::hash(value).into()
        }
    }
}

#[cfg(feature = "sha2-hasher")]
pub use self::sha2::Sha2Oracle;

/// A hash oracle making use of sha2-256.
#[cfg(feature = "sha2-hasher")]
pub mod sha2 {
    use super::{BinaryHash, DigestOracle};
    use sha2::{Digest, Sha256};

    /// A [`BinaryHash`] implementation for Sha2.
    pub struct Sha2BinaryHasher;

    /// A wrapper around sha2-256 for use as a hash oracle.
    pub type Sha2Oracle = DigestOracle<Sha2BinaryHasher>;

    impl BinaryHash for Sha2BinaryHasher {
        fn hash(value: &[u8]) -> [u8; 32] {
            let mut hasher = Sha256::new();
            hasher.update(value);
            hasher.finalize().into()
        }
    }
}

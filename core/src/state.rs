//! Account and storage verification.
//!
//! Both entry points run the same [`walk`] and differ only in the leaf kind they expect at the
//! end of it. A walk ending in an empty sub-trie proves absence without any leaf hashing; a walk
//! ending in a leaf is only accepted once the leaf's decoded fields hash back to the value the
//! walk committed to.

use crate::hasher::HashOracle;
use crate::leaf::{AccountLeaf, LeafKind, StorageLeaf};
use crate::proof::{walk, Framing, Malformed, ProofError, WalkParams};
use crate::trie::{account_key, Address, KeyHash, Word, EMPTY};

/// The storage root reported for an account which is absent or has no code.
pub const NOT_A_CONTRACT: Word = EMPTY;

/// A leaf, or the lack of one, authenticated against a root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerifiedLeaf<K> {
    /// The key-hash of the terminal leaf: the requested key's hash unless the proof ended in a
    /// leaf for a different key.
    pub key_hash: KeyHash,
    /// The decoded terminal leaf. `None` if the path ended in an empty sub-trie.
    pub leaf: Option<K>,
    /// Whether `leaf` holds the requested key.
    pub exists: bool,
    /// The depth of the terminal node.
    pub depth: usize,
}

/// The result of verifying an account proof.
pub type AccountProof = VerifiedLeaf<AccountLeaf>;

/// The result of verifying a storage proof.
pub type StorageProof = VerifiedLeaf<StorageLeaf>;

impl<K> VerifiedLeaf<K> {
    /// The leaf stored under the requested key, if there is one.
    pub fn found(&self) -> Option<&K> {
        self.leaf.as_ref().filter(|_| self.exists)
    }
}

impl AccountProof {
    /// The storage root of the account, or [`NOT_A_CONTRACT`] if the account does not exist or
    /// has no code.
    pub fn storage_root(&self) -> Word {
        match self.found() {
            Some(account) if account.has_code() => account.storage_root,
            _ => NOT_A_CONTRACT,
        }
    }
}

impl StorageProof {
    /// The stored value, zero if the slot is absent.
    pub fn value(&self) -> Word {
        self.found().map_or(EMPTY, |leaf| leaf.value)
    }
}

/// Walk `proof` for `key` and authenticate the terminal leaf as a leaf of kind `K`.
pub fn verify_leaf<K, O, N>(
    oracle: &O,
    root: &Word,
    key: &Word,
    proof: &[N],
    params: &WalkParams,
) -> Result<VerifiedLeaf<K>, ProofError>
where
    K: LeafKind,
    O: HashOracle + ?Sized,
    N: AsRef<[u8]>,
{
    let walked = walk(oracle, key, proof, root, K::LEN, params)?;

    let leaf = match walked.leaf {
        Some(node) if walked.terminal != EMPTY => {
            if params.framing == Framing::Strict && node.flags != K::FLAGS {
                return Err(Malformed::CompressionFlags(node.flags).into());
            }
            let leaf = K::from_node(&node)?;
            if leaf.leaf_hash(oracle, &walked.key_hash) != walked.terminal {
                return Err(K::HASH_ERROR);
            }
            Some(leaf)
        }
        _ => None,
    };

    Ok(VerifiedLeaf {
        key_hash: walked.key_hash,
        exists: walked.exists && leaf.is_some(),
        leaf,
        depth: walked.depth,
    })
}

/// Verify an account proof against a state root, returning the full account.
pub fn verify_account<O, N>(
    oracle: &O,
    state_root: &Word,
    account: &Address,
    proof: &[N],
    params: &WalkParams,
) -> Result<AccountProof, ProofError>
where
    O: HashOracle + ?Sized,
    N: AsRef<[u8]>,
{
    verify_leaf(oracle, state_root, &account_key(account), proof, params)
}

/// Verify a storage proof against a storage root, returning the full leaf.
pub fn verify_storage<O, N>(
    oracle: &O,
    storage_root: &Word,
    slot: &Word,
    proof: &[N],
    params: &WalkParams,
) -> Result<StorageProof, ProofError>
where
    O: HashOracle + ?Sized,
    N: AsRef<[u8]>,
{
    verify_leaf(oracle, storage_root, slot, proof, params)
}

/// Verify an account proof against a state root and return the account's storage root, or
/// [`NOT_A_CONTRACT`].
pub fn verify_account_state<O, N>(
    oracle: &O,
    state_root: &Word,
    account: &Address,
    proof: &[N],
    params: &WalkParams,
) -> Result<Word, ProofError>
where
    O: HashOracle + ?Sized,
    N: AsRef<[u8]>,
{
    verify_account(oracle, state_root, account, proof, params).map(|p| p.storage_root())
}

/// Verify a storage proof against a storage root and return the stored value, or zero.
pub fn verify_storage_value<O, N>(
    oracle: &O,
    storage_root: &Word,
    slot: &Word,
    proof: &[N],
    params: &WalkParams,
) -> Result<Word, ProofError>
where
    O: HashOracle + ?Sized,
    N: AsRef<[u8]>,
{
    verify_storage(oracle, storage_root, slot, proof, params).map(|p| p.value())
}

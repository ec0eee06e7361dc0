//! Verification of zk-trie account and storage proofs.
//!
//! [`Verifier`] pairs a [`HashOracle`] with [`Options`] and exposes the two verification entry
//! points over ABI-encoded proofs, along with variants taking already decoded proof nodes and
//! variants returning the full decoded leaf.

#![warn(missing_docs)]

use tracing::{debug, warn};

use zktrie_core::proof::WalkParams;
use zktrie_core::state::{self, AccountProof, StorageProof};
use zktrie_core::trie::{Address, Word};
use zktrie_core::wire;

pub use zktrie_core::hasher::{Blake3Oracle, HashOracle, Sha2Oracle};
pub use zktrie_core::leaf::{AccountLeaf, StorageLeaf, NULL_CODE_HASH};
pub use zktrie_core::proof::{Malformed, ProofError};
pub use zktrie_core::state::NOT_A_CONTRACT;

pub use error::VerifyError;
pub use options::Options;

mod error;
mod options;

/// Verifies proofs against roots using a hash oracle.
pub struct Verifier<O> {
    oracle: O,
    params: WalkParams,
}

impl<O: HashOracle> Verifier<O> {
    /// Create a verifier with the given oracle and options.
    pub fn new(oracle: O, options: Options) -> Self {
        Verifier {
            oracle,
            params: options.walk_params(),
        }
    }

    /// The hash oracle in use.
    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    /// Verify an ABI-encoded account proof against `state_root`.
    ///
    /// Returns the storage root of the account, or [`NOT_A_CONTRACT`] if the account does not
    /// exist or has no code.
    pub fn verify_account_state(
        &self,
        state_root: &Word,
        account: &Address,
        proof: &[u8],
    ) -> Result<Word, VerifyError> {
        self.prove_account(state_root, account, proof)
            .map(|p| p.storage_root())
    }

    /// Like [`Self::verify_account_state`], over decoded proof nodes.
    pub fn verify_account_state_nodes<N: AsRef<[u8]>>(
        &self,
        state_root: &Word,
        account: &Address,
        proof: &[N],
    ) -> Result<Word, VerifyError> {
        self.prove_account_nodes(state_root, account, proof)
            .map(|p| p.storage_root())
    }

    /// Verify an ABI-encoded storage proof against `storage_root`.
    ///
    /// Returns the value stored in `slot`, or zero if the slot is empty.
    pub fn verify_storage_value(
        &self,
        storage_root: &Word,
        slot: &Word,
        proof: &[u8],
    ) -> Result<Word, VerifyError> {
        self.prove_storage(storage_root, slot, proof)
            .map(|p| p.value())
    }

    /// Like [`Self::verify_storage_value`], over decoded proof nodes.
    pub fn verify_storage_value_nodes<N: AsRef<[u8]>>(
        &self,
        storage_root: &Word,
        slot: &Word,
        proof: &[N],
    ) -> Result<Word, VerifyError> {
        self.prove_storage_nodes(storage_root, slot, proof)
            .map(|p| p.value())
    }

    /// Verify an ABI-encoded account proof and return the decoded terminal leaf.
    pub fn prove_account(
        &self,
        state_root: &Word,
        account: &Address,
        proof: &[u8],
    ) -> Result<AccountProof, VerifyError> {
        let nodes = decode(proof)?;
        self.prove_account_nodes(state_root, account, &nodes)
    }

    /// Like [`Self::prove_account`], over decoded proof nodes.
    pub fn prove_account_nodes<N: AsRef<[u8]>>(
        &self,
        state_root: &Word,
        account: &Address,
        proof: &[N],
    ) -> Result<AccountProof, VerifyError> {
        let _span = tracing::debug_span!("account", account = %hex::encode(account)).entered();
        match state::verify_account(&self.oracle, state_root, account, proof, &self.params) {
            Ok(verified) => {
                debug!(
                    exists = verified.exists,
                    depth = verified.depth,
                    "account proof verified"
                );
                Ok(verified)
            }
            Err(e) => {
                warn!(root = %hex::encode(state_root), "account proof rejected: {}", e);
                Err(e.into())
            }
        }
    }

    /// Verify an ABI-encoded storage proof and return the decoded terminal leaf.
    pub fn prove_storage(
        &self,
        storage_root: &Word,
        slot: &Word,
        proof: &[u8],
    ) -> Result<StorageProof, VerifyError> {
        let nodes = decode(proof)?;
        self.prove_storage_nodes(storage_root, slot, &nodes)
    }

    /// Like [`Self::prove_storage`], over decoded proof nodes.
    pub fn prove_storage_nodes<N: AsRef<[u8]>>(
        &self,
        storage_root: &Word,
        slot: &Word,
        proof: &[N],
    ) -> Result<StorageProof, VerifyError> {
        let _span = tracing::debug_span!("storage", slot = %hex::encode(slot)).entered();
        match state::verify_storage(&self.oracle, storage_root, slot, proof, &self.params) {
            Ok(verified) => {
                debug!(
                    exists = verified.exists,
                    depth = verified.depth,
                    "storage proof verified"
                );
                Ok(verified)
            }
            Err(e) => {
                warn!(root = %hex::encode(storage_root), "storage proof rejected: {}", e);
                Err(e.into())
            }
        }
    }
}

fn decode(proof: &[u8]) -> Result<Vec<Vec<u8>>, VerifyError> {
    wire::decode_proof(proof).map_err(|e| {
        warn!(len = proof.len(), "proof decoding failed: {}", e);
        VerifyError::Decode(e)
    })
}

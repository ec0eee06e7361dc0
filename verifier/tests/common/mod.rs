#![allow(dead_code)]

use ruint::aliases::U256;
use zktrie_core::reference::ReferenceTrie;
use zktrie_core::trie::{Address, Word};
use zktrie_verifier::{
    AccountLeaf, Blake3Oracle, Options, StorageLeaf, Verifier, NULL_CODE_HASH,
};

pub fn slot(id: u64) -> Word {
    let mut slot = [0u8; 32];
    slot[24..32].copy_from_slice(&id.to_be_bytes());
    slot
}

pub fn address(id: u64) -> Address {
    let mut address = [0xAA; 20];
    address[12..20].copy_from_slice(&id.to_be_bytes());
    address
}

pub fn value(id: u64) -> Word {
    *blake3::hash(&id.to_le_bytes()).as_bytes()
}

/// Even accounts are externally owned, odd ones are contracts.
pub fn account(id: u64) -> AccountLeaf {
    if id % 2 == 0 {
        AccountLeaf::new(id, 0, U256::from(1000u64 + id), [0; 32], NULL_CODE_HASH, [0; 32])
    } else {
        AccountLeaf::new(
            id,
            100 + id,
            U256::from(id) << 100,
            value(id),
            value(id + 1),
            value(id + 2),
        )
    }
}

pub fn storage_trie(ids: impl IntoIterator<Item = u64>) -> ReferenceTrie<StorageLeaf, Blake3Oracle> {
    let mut trie = ReferenceTrie::new(Blake3Oracle::new());
    for id in ids {
        trie.insert(slot(id), StorageLeaf { value: value(id) });
    }
    trie
}

pub fn account_trie(ids: impl IntoIterator<Item = u64>) -> ReferenceTrie<AccountLeaf, Blake3Oracle> {
    let mut trie = ReferenceTrie::new(Blake3Oracle::new());
    for id in ids {
        trie.insert(zktrie_core::trie::account_key(&address(id)), account(id));
    }
    trie
}

pub fn verifier() -> Verifier<Blake3Oracle> {
    Verifier::new(Blake3Oracle::new(), Options::new())
}

pub fn strict_verifier() -> Verifier<Blake3Oracle> {
    let mut o = Options::new();
    o.strict_framing(true);
    Verifier::new(Blake3Oracle::new(), o)
}

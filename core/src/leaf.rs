//! Leaf payload layouts and leaf hashing.
//!
//! Every leaf node is framed the same way (see [`crate::proof::LeafNode`]); what differs between
//! leaf kinds is the payload between the compression flags and the key preimage, and how that
//! payload is folded into the leaf hash. Both layouts are fixed-length.

use alloc::vec::Vec;
use core::fmt;

use ruint::aliases::U256;

use crate::hasher::{hash_single, HashOracle, DOMAIN_ACCOUNT_FIELDS, DOMAIN_LEAF};
use crate::proof::{
    LeafNode, Malformed, ProofError, LEAF_FLAGS_OFFSET, LEAF_FRAMING_LEN, LEAF_KEY_HASH_OFFSET,
    LEAF_PAYLOAD_OFFSET, LEAF_TRAILER_LEN,
};
use crate::trie::{KeyHash, NodeType, Word, KEY_PREIMAGE_LEN};

/// keccak256 of the empty byte string: the code hash of an account without code.
pub const NULL_CODE_HASH: Word = [
    0xc5, 0xd2, 0x46, 0x01, 0x86, 0xf7, 0x23, 0x3c, 0x92, 0x7e, 0x7d, 0xb2, 0xdc, 0xc7, 0x03, 0xc0,
    0xe5, 0x00, 0xb6, 0x53, 0xca, 0x82, 0x27, 0x3b, 0x7b, 0xfa, 0xd8, 0x04, 0x5d, 0x85, 0xa4, 0x70,
];

/// A kind of leaf payload.
pub trait LeafKind: Sized {
    /// The total length of a leaf node of this kind.
    const LEN: usize;
    /// The canonical compression flags of a leaf of this kind.
    const FLAGS: [u8; 4];
    /// The error reported when a leaf of this kind does not hash to the walked hash.
    const HASH_ERROR: ProofError;

    /// Decode a payload. Fails unless it is exactly `LEN - LEAF_FRAMING_LEN` bytes long.
    fn decode(payload: &[u8]) -> Result<Self, Malformed>;

    /// Write the payload into a buffer of length `LEN - LEAF_FRAMING_LEN`.
    fn encode(&self, payload: &mut [u8]);

    /// Fold the payload into the single word which is hashed alongside the key-hash.
    fn value_hash<O: HashOracle + ?Sized>(&self, oracle: &O) -> Word;

    /// The hash of a leaf with this payload, stored under `key_hash`.
    fn leaf_hash<O: HashOracle + ?Sized>(&self, oracle: &O, key_hash: &KeyHash) -> Word {
        oracle.hash(key_hash, &self.value_hash(oracle), DOMAIN_LEAF)
    }

    /// Decode the payload of a parsed leaf node.
    fn from_node(leaf: &LeafNode<'_>) -> Result<Self, Malformed> {
        Self::decode(leaf.payload)
    }
}

/// Serialize a full leaf node holding `leaf` under `key_hash`, with the raw `key` as preimage.
pub fn encode_leaf<K: LeafKind>(leaf: &K, key_hash: &KeyHash, key: &Word) -> Vec<u8> {
    let mut bytes = alloc::vec![0u8; K::LEN];
    bytes[0] = NodeType::Leaf.tag();
    bytes[LEAF_KEY_HASH_OFFSET..LEAF_FLAGS_OFFSET].copy_from_slice(key_hash);
    bytes[LEAF_FLAGS_OFFSET..LEAF_PAYLOAD_OFFSET].copy_from_slice(&K::FLAGS);
    leaf.encode(&mut bytes[LEAF_PAYLOAD_OFFSET..K::LEN - LEAF_TRAILER_LEN]);
    bytes[K::LEN - LEAF_TRAILER_LEN] = KEY_PREIMAGE_LEN;
    bytes[K::LEN - 32..].copy_from_slice(key);
    bytes
}

fn words<const N: usize>(payload: &[u8]) -> [Word; N] {
    let mut words = [[0u8; 32]; N];
    for (word, chunk) in words.iter_mut().zip(payload.chunks_exact(32)) {
        word.copy_from_slice(chunk);
    }
    words
}

/// The payload of an account leaf.
#[derive(Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "borsh",
    derive(borsh::BorshDeserialize, borsh::BorshSerialize)
)]
pub struct AccountLeaf {
    /// 16 zero bytes, the code size and the nonce, both big-endian.
    pub nonce_code_size: Word,
    /// The balance, big-endian.
    pub balance: Word,
    /// The root of the account's storage trie.
    pub storage_root: Word,
    /// The keccak256 hash of the account's code.
    pub code_hash: Word,
    /// The code hash under the trie's own hash. Only used for authentication.
    pub poseidon_code_hash: Word,
}

impl AccountLeaf {
    /// Number of payload bytes.
    pub const PAYLOAD_LEN: usize = 5 * 32;

    /// Build an account leaf from its typed fields.
    pub fn new(
        nonce: u64,
        code_size: u64,
        balance: U256,
        storage_root: Word,
        code_hash: Word,
        poseidon_code_hash: Word,
    ) -> Self {
        let mut nonce_code_size = [0u8; 32];
        nonce_code_size[16..24].copy_from_slice(&code_size.to_be_bytes());
        nonce_code_size[24..32].copy_from_slice(&nonce.to_be_bytes());
        AccountLeaf {
            nonce_code_size,
            balance: balance.to_be_bytes(),
            storage_root,
            code_hash,
            poseidon_code_hash,
        }
    }

    /// The account nonce.
    pub fn nonce(&self) -> u64 {
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&self.nonce_code_size[24..32]);
        u64::from_be_bytes(bytes)
    }

    /// The size of the account's code in bytes.
    pub fn code_size(&self) -> u64 {
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&self.nonce_code_size[16..24]);
        u64::from_be_bytes(bytes)
    }

    /// The account balance.
    pub fn balance(&self) -> U256 {
        U256::from_be_bytes(self.balance)
    }

    /// Whether the account has code.
    pub fn has_code(&self) -> bool {
        self.code_hash != NULL_CODE_HASH
    }
}

impl fmt::Debug for AccountLeaf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountLeaf")
            .field("nonce", &self.nonce())
            .field("code_size", &self.code_size())
            .field("balance", &hex::encode(self.balance))
            .field("storage_root", &hex::encode(self.storage_root))
            .field("code_hash", &hex::encode(self.code_hash))
            .field("poseidon_code_hash", &hex::encode(self.poseidon_code_hash))
            .finish()
    }
}

impl LeafKind for AccountLeaf {
    const LEN: usize = LEAF_FRAMING_LEN + Self::PAYLOAD_LEN;
    const FLAGS: [u8; 4] = [5, 8, 0, 0];
    const HASH_ERROR: ProofError = ProofError::InvalidAccountLeafHash;

    fn decode(payload: &[u8]) -> Result<Self, Malformed> {
        if payload.len() != Self::PAYLOAD_LEN {
            return Err(Malformed::LeafLength {
                expected: Self::LEN,
                actual: payload.len() + LEAF_FRAMING_LEN,
            });
        }
        let [nonce_code_size, balance, storage_root, code_hash, poseidon_code_hash] =
            words::<5>(payload);
        Ok(AccountLeaf {
            nonce_code_size,
            balance,
            storage_root,
            code_hash,
            poseidon_code_hash,
        })
    }

    fn encode(&self, payload: &mut [u8]) {
        let fields = [
            &self.nonce_code_size,
            &self.balance,
            &self.storage_root,
            &self.code_hash,
            &self.poseidon_code_hash,
        ];
        for (chunk, field) in payload.chunks_exact_mut(32).zip(fields) {
            chunk.copy_from_slice(field);
        }
    }

    fn value_hash<O: HashOracle + ?Sized>(&self, oracle: &O) -> Word {
        let fold = |left: &Word, right: &Word| oracle.hash(left, right, DOMAIN_ACCOUNT_FIELDS);

        let code = fold(&self.storage_root, &hash_single(oracle, &self.code_hash));
        let h = fold(&fold(&self.nonce_code_size, &self.balance), &code);
        fold(&h, &self.poseidon_code_hash)
    }
}

/// The payload of a storage leaf.
#[derive(Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "borsh",
    derive(borsh::BorshDeserialize, borsh::BorshSerialize)
)]
pub struct StorageLeaf {
    /// The stored value.
    pub value: Word,
}

impl fmt::Debug for StorageLeaf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageLeaf")
            .field("value", &hex::encode(self.value))
            .finish()
    }
}

impl LeafKind for StorageLeaf {
    const LEN: usize = LEAF_FRAMING_LEN + 32;
    const FLAGS: [u8; 4] = [1, 1, 0, 0];
    const HASH_ERROR: ProofError = ProofError::InvalidStorageLeafHash;

    fn decode(payload: &[u8]) -> Result<Self, Malformed> {
        if payload.len() != 32 {
            return Err(Malformed::LeafLength {
                expected: Self::LEN,
                actual: payload.len() + LEAF_FRAMING_LEN,
            });
        }
        let [value] = words::<1>(payload);
        Ok(StorageLeaf { value })
    }

    fn encode(&self, payload: &mut [u8]) {
        payload.copy_from_slice(&self.value);
    }

    fn value_hash<O: HashOracle + ?Sized>(&self, oracle: &O) -> Word {
        hash_single(oracle, &self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::{encode_leaf, AccountLeaf, LeafKind, StorageLeaf, NULL_CODE_HASH};
    use crate::hasher::{hash_single, Blake3Oracle, HashOracle};
    use crate::proof::{LeafNode, Malformed};
    use hex_literal::hex;
    use ruint::aliases::U256;
    use std::cell::RefCell;

    #[test]
    fn null_code_hash_is_keccak_of_nothing() {
        use sha3::{Digest, Keccak256};
        let digest: [u8; 32] = Keccak256::digest(b"").into();
        assert_eq!(digest, NULL_CODE_HASH);
        assert_eq!(
            NULL_CODE_HASH,
            hex!("c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470")
        );
    }

    #[test]
    fn layout_lengths() {
        assert_eq!(AccountLeaf::LEN, 230);
        assert_eq!(StorageLeaf::LEN, 102);
    }

    #[test]
    fn account_fields_at_fixed_offsets() {
        let account = AccountLeaf::new(
            7,
            1024,
            U256::from(1_000_000u64),
            [0x11; 32],
            [0x22; 32],
            [0x33; 32],
        );
        let key = [0xAB; 32];
        let bytes = encode_leaf(&account, &[0x99; 32], &key);

        assert_eq!(bytes.len(), 230);
        assert_eq!(bytes[0], 4);
        assert_eq!(bytes[1..33], [0x99; 32]);
        assert_eq!(bytes[33..37], [5, 8, 0, 0]);
        assert_eq!(bytes[37..53], [0u8; 16]);
        assert_eq!(bytes[53..61], 1024u64.to_be_bytes());
        assert_eq!(bytes[61..69], 7u64.to_be_bytes());
        assert_eq!(bytes[69..101], U256::from(1_000_000u64).to_be_bytes::<32>());
        assert_eq!(bytes[101..133], [0x11; 32]);
        assert_eq!(bytes[133..165], [0x22; 32]);
        assert_eq!(bytes[165..197], [0x33; 32]);
        assert_eq!(bytes[197], 32);
        assert_eq!(bytes[198..230], key);

        let node = LeafNode::parse(&bytes, AccountLeaf::LEN).unwrap();
        let decoded = AccountLeaf::from_node(&node).unwrap();
        assert_eq!(decoded, account);
        assert_eq!(decoded.nonce(), 7);
        assert_eq!(decoded.code_size(), 1024);
        assert_eq!(decoded.balance(), U256::from(1_000_000u64));
        assert!(decoded.has_code());
    }

    #[test]
    fn storage_fields_at_fixed_offsets() {
        let leaf = StorageLeaf { value: [0x5A; 32] };
        let bytes = encode_leaf(&leaf, &[0x01; 32], &[0x02; 32]);

        assert_eq!(bytes.len(), 102);
        assert_eq!(bytes[33..37], [1, 1, 0, 0]);
        assert_eq!(bytes[37..69], [0x5A; 32]);
        assert_eq!(bytes[69], 32);
        assert_eq!(bytes[70..102], [0x02; 32]);

        let node = LeafNode::parse(&bytes, StorageLeaf::LEN).unwrap();
        assert_eq!(StorageLeaf::from_node(&node).unwrap(), leaf);
    }

    #[test]
    fn payload_length_checked() {
        assert_eq!(
            StorageLeaf::decode(&[0u8; 31]),
            Err(Malformed::LeafLength {
                expected: 102,
                actual: 101
            })
        );
        assert!(AccountLeaf::decode(&[0u8; 32]).is_err());
    }

    struct Recorder(Blake3Oracle, RefCell<Vec<u64>>);

    impl HashOracle for Recorder {
        fn hash(&self, left: &[u8; 32], right: &[u8; 32], domain: u64) -> [u8; 32] {
            self.1.borrow_mut().push(domain);
            self.0.hash(left, right, domain)
        }
    }

    #[test]
    fn account_fold_order_and_domains() {
        let oracle = Blake3Oracle::new();
        let account = AccountLeaf::new(1, 2, U256::from(3u8), [4; 32], [5; 32], [6; 32]);
        let key_hash = [7u8; 32];

        let fold = |l: &[u8; 32], r: &[u8; 32]| oracle.hash(l, r, 1280);
        let h = fold(&account.storage_root, &hash_single(&oracle, &account.code_hash));
        let h = fold(&fold(&account.nonce_code_size, &account.balance), &h);
        let h = fold(&h, &account.poseidon_code_hash);
        let expected = oracle.hash(&key_hash, &h, 4);

        let recorder = Recorder(oracle, RefCell::new(Vec::new()));
        assert_eq!(account.leaf_hash(&recorder, &key_hash), expected);
        assert_eq!(
            recorder.1.into_inner(),
            vec![512, 1280, 1280, 1280, 1280, 4]
        );
    }

    #[test]
    fn storage_leaf_hash() {
        let oracle = Blake3Oracle::new();
        let leaf = StorageLeaf { value: [9; 32] };
        let expected = oracle.hash(&[1; 32], &hash_single(&oracle, &[9; 32]), 4);
        assert_eq!(leaf.leaf_hash(&oracle, &[1; 32]), expected);
    }
}

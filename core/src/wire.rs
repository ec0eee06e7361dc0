//! The wire format of proofs: the Solidity ABI encoding of `bytes[]`, as produced by
//! `abi.encode(nodes)`.

use alloc::vec::Vec;

use alloy_sol_types::{sol_data, SolType};

pub use alloy_sol_types::Error as DecodeError;

type EncodedProof = sol_data::Array<sol_data::Bytes>;

/// Decode an ABI-encoded proof into its nodes.
pub fn decode_proof(encoded: &[u8]) -> Result<Vec<Vec<u8>>, DecodeError> {
    let nodes = EncodedProof::abi_decode(encoded)?;
    Ok(nodes.into_iter().map(|node| node.to_vec()).collect())
}

/// ABI-encode a list of proof nodes.
pub fn encode_proof<N: AsRef<[u8]>>(nodes: &[N]) -> Vec<u8> {
    let nodes: Vec<&[u8]> = nodes.iter().map(AsRef::as_ref).collect();
    EncodedProof::abi_encode(&nodes)
}

use std::fmt;

use zktrie_core::proof::ProofError;
use zktrie_core::wire::DecodeError;

/// Errors in proof verification.
#[derive(Debug)]
pub enum VerifyError {
    /// The proof is not a valid ABI encoding of `bytes[]`.
    Decode(DecodeError),
    /// The proof was rejected.
    Proof(ProofError),
}

impl VerifyError {
    /// The underlying proof error, if the proof was decoded.
    pub fn proof_error(&self) -> Option<&ProofError> {
        match self {
            VerifyError::Decode(_) => None,
            VerifyError::Proof(e) => Some(e),
        }
    }
}

impl From<DecodeError> for VerifyError {
    fn from(e: DecodeError) -> Self {
        VerifyError::Decode(e)
    }
}

impl From<ProofError> for VerifyError {
    fn from(e: ProofError) -> Self {
        VerifyError::Proof(e)
    }
}

impl fmt::Display for VerifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerifyError::Decode(e) => write!(f, "Proof decoding failed: {}", e),
            VerifyError::Proof(e) => write!(f, "Proof rejected: {}", e),
        }
    }
}

impl std::error::Error for VerifyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            VerifyError::Decode(e) => Some(e),
            VerifyError::Proof(e) => Some(e),
        }
    }
}

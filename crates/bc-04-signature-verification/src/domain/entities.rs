//! # Domain Entities

use serde::{Deserialize, Serialize};
use shared_types::{Address, Hash};

use super::errors::SignatureError;

/// ECDSA signature on the secp256k1 curve.
///
/// `v` is kept wide: replay-protected values grow with the network id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EcdsaSignature {
    /// R component (32 bytes)
    pub r: [u8; 32],
    /// S component (32 bytes)
    pub s: [u8; 32],
    /// 0/1, 27/28, or `2·network_id + 35 + recid`
    pub v: u64,
}

impl EcdsaSignature {
    pub fn new(r: [u8; 32], s: [u8; 32], v: u64) -> Self {
        Self { r, s, v }
    }

    /// Parse the 65-byte `r ‖ s ‖ v` form.
    pub fn from_rsv(bytes: &[u8]) -> Result<Self, SignatureError> {
        if bytes.len() != 65 {
            return Err(SignatureError::InvalidFormat);
        }
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&bytes[..32]);
        s.copy_from_slice(&bytes[32..64]);
        Ok(Self::new(r, s, u64::from(bytes[64])))
    }

    /// Parse `0x`-prefixed hex of the 65-byte form.
    pub fn from_hex(text: &str) -> Result<Self, SignatureError> {
        let digits = text.strip_prefix("0x").unwrap_or(text);
        let bytes = hex::decode(digits).map_err(|_| SignatureError::InvalidFormat)?;
        Self::from_rsv(&bytes)
    }
}

/// One signature to check against a claimed signer.
#[derive(Clone, Debug)]
pub struct VerificationRequest {
    pub payload_hash: Hash,
    pub signature: EcdsaSignature,
    pub network_id: u64,
    /// Compared verbatim with the derived lowercase address
    pub claimed_address: String,
}

/// Result of checking one request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerificationResult {
    pub valid: bool,
    pub recovered_address: Option<Address>,
    pub error: Option<SignatureError>,
}

impl VerificationResult {
    pub fn valid(recovered_address: Address) -> Self {
        Self {
            valid: true,
            recovered_address: Some(recovered_address),
            error: None,
        }
    }

    /// Failed check; `recovered_address` is set when recovery itself worked.
    pub fn invalid(error: SignatureError, recovered_address: Option<Address>) -> Self {
        Self {
            valid: false,
            recovered_address,
            error: Some(error),
        }
    }
}

/// Result of batch verification.
#[derive(Clone, Debug)]
pub struct BatchVerificationResult {
    /// Individual results, in request order
    pub results: Vec<VerificationResult>,
    pub all_valid: bool,
    pub valid_count: usize,
    pub invalid_count: usize,
}

impl BatchVerificationResult {
    pub fn from_results(results: Vec<VerificationResult>) -> Self {
        let valid_count = results.iter().filter(|r| r.valid).count();
        let invalid_count = results.len() - valid_count;

        Self {
            all_valid: invalid_count == 0,
            results,
            valid_count,
            invalid_count,
        }
    }
}

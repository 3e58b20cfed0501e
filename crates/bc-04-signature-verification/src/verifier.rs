//! # Signature Verifier
//!
//! Entry point bound to one network id, as held by the client façade.

use shared_types::{Address, Hash};

use crate::domain::ecdsa;
use crate::domain::entities::{BatchVerificationResult, EcdsaSignature, VerificationRequest};
use crate::domain::errors::SignatureError;

/// ECDSA verifier for a fixed network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignatureVerifier {
    network_id: u64,
}

impl SignatureVerifier {
    pub fn new(network_id: u64) -> Self {
        Self { network_id }
    }

    pub fn network_id(&self) -> u64 {
        self.network_id
    }

    /// See [`ecdsa::verify`].
    pub fn verify(
        &self,
        payload_hash: &Hash,
        v: u64,
        r: &[u8; 32],
        s: &[u8; 32],
        claimed_address: &str,
    ) -> bool {
        ecdsa::verify(payload_hash, v, r, s, self.network_id, claimed_address)
    }

    /// Verify a signature in its serialized 65-byte hex form.
    pub fn verify_hex(&self, payload_hash: &Hash, signature_hex: &str, claimed_address: &str) -> bool {
        match EcdsaSignature::from_hex(signature_hex) {
            Ok(sig) => self.verify(payload_hash, sig.v, &sig.r, &sig.s, claimed_address),
            Err(_) => false,
        }
    }

    pub fn recover_address(
        &self,
        payload_hash: &Hash,
        signature: &EcdsaSignature,
    ) -> Result<Address, SignatureError> {
        ecdsa::recover_address(payload_hash, signature, self.network_id)
    }

    /// Requests keep their own network id.
    pub fn batch_verify(&self, requests: &[VerificationRequest]) -> BatchVerificationResult {
        ecdsa::batch_verify(requests)
    }
}

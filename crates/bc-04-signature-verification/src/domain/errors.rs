//! # Signature Errors

use thiserror::Error;

/// Reasons a signature fails to verify.
///
/// `verify` collapses all of these to `false`; `recover_address` and the
/// batch results expose them.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SignatureError {
    /// R or S out of range, R not on the curve, or wrong byte length
    #[error("Invalid signature format")]
    InvalidFormat,

    /// Signature has high S value (EIP-2 malleability protection)
    #[error("Malleable signature (high S value)")]
    MalleableSignature,

    /// `v` maps to no recovery id for the given network
    #[error("Invalid recovery ID: {v} (network {network_id})")]
    InvalidRecoveryId { v: u64, network_id: u64 },

    /// Failed to recover public key from signature
    #[error("Failed to recover public key")]
    RecoveryFailed,

    /// Recovered signer differs from the claimed one
    #[error("Signer mismatch: claimed {claimed}, recovered {recovered}")]
    SignerMismatch { claimed: String, recovered: String },
}

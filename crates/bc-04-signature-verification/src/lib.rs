//! # BC-04 Signature Verification
//!
//! Recovers the signer of a payload hash from an ECDSA (secp256k1) signature
//! and checks it against a claimed address.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): pure cryptographic logic, no I/O
//! - **Verifier** (`verifier.rs`): network-bound entry point used by the client
//!
//! ## Security Notes
//!
//! - **Malleability Prevention (EIP-2)**: signatures with high S are rejected
//! - **Replay Protection**: `v` may carry the network id (`2·id + 35 + recid`)
//! - **Exact Comparison**: the derived address is lowercase `0x` hex and must
//!   equal the claimed string byte for byte; checksummed claims never match

pub mod domain;
pub mod verifier;

pub use domain::ecdsa::{
    address_from_pubkey, batch_verify, keccak256, parse_recovery_id, recover_address, verify,
    verify_request,
};
pub use domain::entities::{
    BatchVerificationResult, EcdsaSignature, VerificationRequest, VerificationResult,
};
pub use domain::errors::SignatureError;
pub use verifier::SignatureVerifier;

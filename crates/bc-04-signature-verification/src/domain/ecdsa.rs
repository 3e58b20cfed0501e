//! # ECDSA Signer Recovery (secp256k1)
//!
//! ## Checks, in order
//!
//! 1. R and S in `[1, n-1]`
//! 2. R is an x-coordinate on the curve
//! 3. S strictly below `n/2` (EIP-2)
//! 4. `v` maps to a recovery id for the network
//! 5. Public key recovery over the prehashed payload
//!
//! Range and low-S comparisons run in constant time via `subtle`.

use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};
use k256::elliptic_curve::sec1::FromEncodedPoint;
use k256::{AffinePoint, EncodedPoint};
use rayon::prelude::*;
use sha3::{Digest, Keccak256};
use shared_types::{Address, Hash};
use subtle::{Choice, ConstantTimeEq};
use tracing::debug;
use zeroize::Zeroize;

use super::entities::{
    BatchVerificationResult, EcdsaSignature, VerificationRequest, VerificationResult,
};
use super::errors::SignatureError;

/// secp256k1 curve order n
const SECP256K1_ORDER: [u8; 32] = [
    0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFE,
    0xBA, 0xAE, 0xDC, 0xE6, 0xAF, 0x48, 0xA0, 0x3B, 0xBF, 0xD2, 0x5E, 0x8C, 0xD0, 0x36, 0x41, 0x41,
];

/// n/2, rounded down
const SECP256K1_HALF_ORDER: [u8; 32] = [
    0x7F, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0x5D, 0x57, 0x6E, 0x73, 0x57, 0xA4, 0x50, 0x1D, 0xDF, 0xE9, 0x2F, 0x46, 0x68, 0x1B, 0x20, 0xA0,
];

/// Offset of replay-protected `v`: `v = 2·network_id + 35 + recid`.
const REPLAY_PROTECTED_OFFSET: u64 = 35;

/// Legacy `v` base: `v = 27 + recid`.
const LEGACY_OFFSET: u64 = 27;

// =============================================================================
// ENTRY POINTS
// =============================================================================

/// Check that `claimed_address` signed `payload_hash`.
///
/// True iff recovery succeeds and the derived address, rendered as
/// lowercase `0x` hex, equals `claimed_address` exactly.
pub fn verify(
    payload_hash: &Hash,
    v: u64,
    r: &[u8; 32],
    s: &[u8; 32],
    network_id: u64,
    claimed_address: &str,
) -> bool {
    let signature = EcdsaSignature::new(*r, *s, v);
    match recover_address(payload_hash, &signature, network_id) {
        Ok(recovered) => {
            let derived = recovered.to_hex();
            let matches = derived == claimed_address;
            if !matches {
                debug!(
                    claimed = %claimed_address,
                    recovered = %derived,
                    "Recovered signer differs from claim"
                );
            }
            matches
        }
        Err(e) => {
            debug!(error = %e, v, network_id, "Signature rejected");
            false
        }
    }
}

/// Recover the signer's address.
pub fn recover_address(
    payload_hash: &Hash,
    signature: &EcdsaSignature,
    network_id: u64,
) -> Result<Address, SignatureError> {
    if !is_valid_scalar(&signature.r) || !is_valid_r_coordinate(&signature.r) {
        return Err(SignatureError::InvalidFormat);
    }
    if !is_valid_scalar(&signature.s) {
        return Err(SignatureError::InvalidFormat);
    }
    if !is_low_s(&signature.s) {
        return Err(SignatureError::MalleableSignature);
    }

    let recovery_id = parse_recovery_id(signature.v, network_id)?;

    let mut sig_bytes = [0u8; 64];
    sig_bytes[..32].copy_from_slice(&signature.r);
    sig_bytes[32..].copy_from_slice(&signature.s);
    let parsed = Signature::from_slice(&sig_bytes);
    sig_bytes.zeroize();
    let sig = parsed.map_err(|_| SignatureError::InvalidFormat)?;

    let recovered_key = VerifyingKey::recover_from_prehash(payload_hash, &sig, recovery_id)
        .map_err(|_| SignatureError::RecoveryFailed)?;

    Ok(address_from_pubkey(&recovered_key))
}

/// Check one request, keeping the failure reason.
pub fn verify_request(request: &VerificationRequest) -> VerificationResult {
    match recover_address(
        &request.payload_hash,
        &request.signature,
        request.network_id,
    ) {
        Ok(recovered) => {
            let derived = recovered.to_hex();
            if derived == request.claimed_address {
                VerificationResult::valid(recovered)
            } else {
                VerificationResult::invalid(
                    SignatureError::SignerMismatch {
                        claimed: request.claimed_address.clone(),
                        recovered: derived,
                    },
                    Some(recovered),
                )
            }
        }
        Err(e) => VerificationResult::invalid(e, None),
    }
}

/// Check many requests in parallel; results keep request order.
pub fn batch_verify(requests: &[VerificationRequest]) -> BatchVerificationResult {
    let results: Vec<VerificationResult> = requests.par_iter().map(verify_request).collect();
    let batch = BatchVerificationResult::from_results(results);
    debug!(
        total = requests.len(),
        valid = batch.valid_count,
        invalid = batch.invalid_count,
        "Batch verification complete"
    );
    batch
}

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

pub fn keccak256(data: &[u8]) -> Hash {
    Keccak256::digest(data).into()
}

/// Low 20 bytes of keccak256 over the uncompressed key without its `0x04` tag.
pub fn address_from_pubkey(public_key: &VerifyingKey) -> Address {
    let encoded = public_key.to_encoded_point(false);
    let hash = keccak256(&encoded.as_bytes()[1..]);
    Address::from_hash_tail(&hash)
}

/// Map `v` to a recovery id.
///
/// Accepted: `0`/`1`, legacy `27`/`28`, and `2·network_id + 35 + {0,1}`.
pub fn parse_recovery_id(v: u64, network_id: u64) -> Result<RecoveryId, SignatureError> {
    let invalid = || SignatureError::InvalidRecoveryId { v, network_id };

    let id = match v {
        0 | 1 => v,
        27 | 28 => v - LEGACY_OFFSET,
        _ => {
            let base = network_id
                .checked_mul(2)
                .and_then(|doubled| doubled.checked_add(REPLAY_PROTECTED_OFFSET))
                .ok_or_else(invalid)?;
            match v.checked_sub(base) {
                Some(id @ (0 | 1)) => id,
                _ => return Err(invalid()),
            }
        }
    };

    RecoveryId::from_byte(id as u8).ok_or_else(invalid)
}

/// `a < b` over big-endian 32-byte integers, constant time.
fn ct_less_than(a: &[u8; 32], b: &[u8; 32]) -> Choice {
    let mut less = Choice::from(0u8);
    let mut greater = Choice::from(0u8);

    for (x, y) in a.iter().zip(b.iter()) {
        let undecided = !(less | greater);
        less |= undecided & Choice::from((x < y) as u8);
        greater |= undecided & Choice::from((x > y) as u8);
    }

    less
}

/// S strictly below n/2 (EIP-2).
fn is_low_s(s: &[u8; 32]) -> bool {
    ct_less_than(s, &SECP256K1_HALF_ORDER).into()
}

/// Scalar in `[1, n-1]`.
fn is_valid_scalar(scalar: &[u8; 32]) -> bool {
    let is_zero = scalar
        .iter()
        .fold(Choice::from(1u8), |acc, byte| acc & byte.ct_eq(&0u8));
    (!is_zero & ct_less_than(scalar, &SECP256K1_ORDER)).into()
}

/// R decompresses to a curve point (either parity works for the check).
fn is_valid_r_coordinate(r: &[u8; 32]) -> bool {
    let mut compressed = [0u8; 33];
    compressed[0] = 0x02;
    compressed[1..].copy_from_slice(r);

    match EncodedPoint::from_bytes(compressed) {
        Ok(encoded) => AffinePoint::from_encoded_point(&encoded).is_some().into(),
        Err(_) => false,
    }
}

/// `n - s`, the malleable twin of S.
pub fn invert_s(s: &[u8; 32]) -> [u8; 32] {
    let mut result = [0u8; 32];
    let mut borrow = 0i16;

    for i in (0..32).rev() {
        let mut diff = i16::from(SECP256K1_ORDER[i]) - i16::from(s[i]) - borrow;
        borrow = 0;
        if diff < 0 {
            diff += 256;
            borrow = 1;
        }
        result[i] = diff as u8;
    }

    result
}

// =============================================================================
// TEST HELPERS
// =============================================================================

#[cfg(test)]
pub mod test_helpers {
    use super::*;
    use k256::ecdsa::SigningKey;

    pub fn generate_keypair() -> (SigningKey, VerifyingKey) {
        let signing_key = SigningKey::random(&mut rand::thread_rng());
        let verifying_key = *signing_key.verifying_key();
        (signing_key, verifying_key)
    }

    /// Sign with low S; `v` is replay-protected when `network_id` is given,
    /// legacy otherwise.
    pub fn sign(payload_hash: &Hash, key: &SigningKey, network_id: Option<u64>) -> EcdsaSignature {
        let (sig, recid) = key
            .sign_prehash_recoverable(payload_hash)
            .expect("signing failed");

        let bytes = sig.to_bytes();
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&bytes[..32]);
        s.copy_from_slice(&bytes[32..]);

        let mut recid = u64::from(recid.to_byte());
        if !is_low_s(&s) {
            s = invert_s(&s);
            recid ^= 1;
        }

        let v = match network_id {
            Some(id) => 2 * id + REPLAY_PROTECTED_OFFSET + recid,
            None => LEGACY_OFFSET + recid,
        };
        EcdsaSignature::new(r, s, v)
    }
}

// =============================================================================
// UNIT TESTS
// =============================================================================

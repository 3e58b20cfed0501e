//! # BC-03 Merkle Prover
//!
//! Binary keccak-256 hash trees over an ordered batch of payload leaves, with
//! inclusion proofs a consumer can check against the root alone.
//!
//! ## Hashing
//!
//! | Node | Hash |
//! |------|------|
//! | Leaf | `keccak256(leaf bytes)` |
//! | Inner | `keccak256(left ‖ right)`, positional, never sorted |
//!
//! ## Odd levels
//!
//! An unpaired last node is promoted to the next level unchanged and adds no
//! proof entry at that level. Proofs are only valid under this policy.
//!
//! ## Module Structure
//!
//! ```text
//! bc-03-merkle/
//! ├── domain/       # Proof, errors
//! └── algorithms/   # tree construction, proof building, verification
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algorithms;
pub mod domain;

pub use algorithms::{get_proof, hash_leaf, hash_pair, verify_proof, MerkleTree};
pub use domain::{MerkleError, Proof, ZERO_ROOT};
pub use shared_types::Hash;

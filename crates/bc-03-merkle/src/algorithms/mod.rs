//! # Algorithms Module
//!
//! Tree construction, proof building and proof verification.

pub mod merkle_tree;

pub use merkle_tree::{get_proof, hash_leaf, hash_pair, verify_proof, MerkleTree};

//! # Domain Errors

use thiserror::Error;

/// Merkle prover error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MerkleError {
    /// The requested leaf is not part of the tree.
    #[error("Leaf not found in tree")]
    LeafNotFound,

    /// Leaves must all have the same length.
    #[error("Leaf {index} has length {got}, expected {expected}")]
    LeafLengthMismatch {
        /// Position of the offending leaf
        index: usize,
        /// Length of the first leaf
        expected: usize,
        /// Length of the offending leaf
        got: usize,
    },
}

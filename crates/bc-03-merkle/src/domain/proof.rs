//! # Inclusion Proof

use serde::{Deserialize, Serialize};
use shared_types::Hash;

/// Root of a tree with no leaves.
pub const ZERO_ROOT: Hash = [0u8; 32];

/// Sibling path from a leaf up to the root.
///
/// `left_flags[i]` is true when `siblings[i]` sits to the left of the running
/// hash at that level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proof {
    /// Sibling hashes, leaf level first
    pub siblings: Vec<Hash>,
    /// Side of each sibling, parallel to `siblings`
    pub left_flags: Vec<bool>,
    /// Root the proof resolves to
    pub root: Hash,
}

impl Proof {
    /// Number of levels the proof climbs.
    pub fn depth(&self) -> usize {
        self.siblings.len()
    }

    /// Length mismatch between siblings and flags.
    pub fn is_malformed(&self) -> bool {
        self.siblings.len() != self.left_flags.len()
    }

    /// Check that `leaf` belongs to the tree with `self.root`.
    pub fn verify(&self, leaf: &[u8]) -> bool {
        crate::algorithms::verify_proof(leaf, self)
    }
}

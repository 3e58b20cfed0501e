//! # Merkle Tree
//!
//! Level-by-level construction with promotion of unpaired nodes.
//!
//! # Algorithm
//!
//! 1. Level 0 holds `keccak256(leaf)` for every leaf, in order
//! 2. Each next level pairs neighbours: `keccak256(left ‖ right)`
//! 3. A trailing unpaired node moves up unchanged
//! 4. Stop when one node remains; that node is the root
//!
//! # Time Complexity: O(n) build, O(log n) proof
//! # Space Complexity: O(n)

use std::collections::HashMap;

use sha3::{Digest, Keccak256};
use shared_types::Hash;
use tracing::debug;

use crate::domain::{MerkleError, Proof, ZERO_ROOT};

/// Hash one leaf.
pub fn hash_leaf(leaf: &[u8]) -> Hash {
    Keccak256::digest(leaf).into()
}

/// Hash two nodes together, left first.
///
/// No leaf or node prefix is mixed in, so roots match ones computed on chain.
/// Leaves that are 64 bytes long can collide with an inner node.
pub fn hash_pair(left: &Hash, right: &Hash) -> Hash {
    let mut hasher = Keccak256::new();
    hasher.update(left);
    hasher.update(right);
    hasher.finalize().into()
}

fn next_level(level: &[Hash]) -> Vec<Hash> {
    level
        .chunks(2)
        .map(|pair| match pair.get(1) {
            Some(right) => hash_pair(&pair[0], right),
            None => pair[0], // Promote
        })
        .collect()
}

/// Immutable tree built from an ordered leaf set.
#[derive(Debug, Clone)]
pub struct MerkleTree {
    leaves: Vec<Vec<u8>>,
    /// `levels[0]` are leaf hashes, the last level is `[root]`.
    levels: Vec<Vec<Hash>>,
    /// Leaf hash to first index carrying it.
    index: HashMap<Hash, usize>,
}

impl MerkleTree {
    /// Build a tree over `leaves`.
    ///
    /// Every leaf must have the length of the first one. An empty set yields
    /// a tree whose root is [`ZERO_ROOT`].
    pub fn build<L: AsRef<[u8]>>(leaves: &[L]) -> Result<Self, MerkleError> {
        if let Some(first) = leaves.first() {
            let expected = first.as_ref().len();
            for (index, leaf) in leaves.iter().enumerate() {
                let got = leaf.as_ref().len();
                if got != expected {
                    return Err(MerkleError::LeafLengthMismatch {
                        index,
                        expected,
                        got,
                    });
                }
            }
        }

        let leaf_hashes: Vec<Hash> = leaves.iter().map(|l| hash_leaf(l.as_ref())).collect();

        let mut index = HashMap::with_capacity(leaf_hashes.len());
        for (i, h) in leaf_hashes.iter().enumerate() {
            index.entry(*h).or_insert(i);
        }

        let mut levels = vec![leaf_hashes];
        loop {
            let current = &levels[levels.len() - 1];
            if current.len() <= 1 {
                break;
            }
            let next = next_level(current);
            levels.push(next);
        }

        let tree = Self {
            leaves: leaves.iter().map(|l| l.as_ref().to_vec()).collect(),
            levels,
            index,
        };
        debug!(
            leaves = tree.len(),
            depth = tree.depth(),
            root = %hex::encode(tree.root()),
            "Merkle tree built"
        );
        Ok(tree)
    }

    /// Root hash, or [`ZERO_ROOT`] for an empty tree.
    pub fn root(&self) -> Hash {
        self.levels
            .last()
            .and_then(|level| level.first())
            .copied()
            .unwrap_or(ZERO_ROOT)
    }

    /// Number of leaves.
    pub fn len(&self) -> usize {
        self.leaves.len()
    }

    /// True when the tree has no leaves.
    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }

    /// Number of hashing levels above the leaves.
    pub fn depth(&self) -> usize {
        self.levels.len().saturating_sub(1)
    }

    /// Leaves in insertion order.
    pub fn leaves(&self) -> &[Vec<u8>] {
        &self.leaves
    }

    /// Position of the first leaf equal to `target`.
    pub fn position(&self, target: &[u8]) -> Option<usize> {
        self.index
            .get(&hash_leaf(target))
            .copied()
            .filter(|&i| self.leaves[i] == target)
    }

    /// Inclusion proof for the first leaf equal to `target`.
    pub fn proof(&self, target: &[u8]) -> Result<Proof, MerkleError> {
        let position = self.position(target).ok_or(MerkleError::LeafNotFound)?;
        Ok(self.proof_at(position))
    }

    fn proof_at(&self, position: usize) -> Proof {
        let mut siblings = Vec::with_capacity(self.depth());
        let mut left_flags = Vec::with_capacity(self.depth());
        let mut index = position;

        for level in &self.levels[..self.depth()] {
            let sibling = index ^ 1;
            if let Some(hash) = level.get(sibling) {
                siblings.push(*hash);
                left_flags.push(sibling < index);
            }
            // Unpaired nodes are promoted and leave no entry.
            index /= 2;
        }

        Proof {
            siblings,
            left_flags,
            root: self.root(),
        }
    }
}

/// Build a tree over `leaves` and prove `target` against it.
pub fn get_proof<L: AsRef<[u8]>>(leaves: &[L], target: &[u8]) -> Result<Proof, MerkleError> {
    MerkleTree::build(leaves)?.proof(target)
}

/// Fold `leaf` up through the proof and compare with its root.
///
/// A proof whose flags and siblings differ in length never verifies.
pub fn verify_proof(leaf: &[u8], proof: &Proof) -> bool {
    if proof.is_malformed() {
        return false;
    }

    let folded = proof
        .siblings
        .iter()
        .zip(&proof.left_flags)
        .fold(hash_leaf(leaf), |current, (sibling, &is_left)| {
            if is_left {
                hash_pair(sibling, &current)
            } else {
                hash_pair(&current, sibling)
            }
        });

    folded == proof.root
}

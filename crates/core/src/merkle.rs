//! Merkle root over a block's transaction ids.

use crate::hash::{hash_concat, Hash};

/// Compute the merkle root of `leaves`.
///
/// Returns the zero hash for an empty list. Levels with an odd number of
/// nodes pair the last node with itself.
pub fn merkle_root(leaves: &[Hash]) -> Hash {
    if leaves.is_empty() {
        return Hash::ZERO;
    }

    let mut level: Vec<Hash> = leaves.to_vec();
    while level.len() > 1 {
        level = level
            .chunks(2)
            .map(|pair| {
                let right = pair.get(1).unwrap_or(&pair[0]);
                hash_concat(&[pair[0].as_ref(), right.as_ref()])
            })
            .collect();
    }

    level[0]
}

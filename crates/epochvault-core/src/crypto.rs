// crates/epochvault-core/src/crypto.rs
//
// SHA-256 hashing and Merkle helpers for reward claims.
//
// Leaves commit to (index, account, amount). Interior nodes hash the two
// children in sorted order, so proofs carry no left/right flags.

use sha2::{Digest, Sha256};

use crate::address::Address;

/// Compute SHA-256 hash of the given bytes.
///
/// Returns a 32-byte hash.
pub fn hash_bytes(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    output
}

/// Hash two sibling nodes in sorted order.
pub fn hash_pair(a: &[u8; 32], b: &[u8; 32]) -> [u8; 32] {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    let mut hasher = Sha256::new();
    hasher.update(lo);
    hasher.update(hi);
    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    output
}

/// Leaf hash for a reward entitlement.
pub fn reward_leaf(index: u64, account: &Address, amount: u128) -> [u8; 32] {
    let mut data = Vec::with_capacity(8 + 32 + 16);
    data.extend_from_slice(&index.to_be_bytes());
    data.extend_from_slice(account.as_bytes());
    data.extend_from_slice(&amount.to_be_bytes());
    hash_bytes(&data)
}

/// Fold `proof` over `leaf` and compare with `root`.
pub fn verify_proof(root: &[u8; 32], leaf: &[u8; 32], proof: &[[u8; 32]]) -> bool {
    let computed = proof
        .iter()
        .fold(*leaf, |node, sibling| hash_pair(&node, sibling));
    computed == *root
}

/// Build every level of the tree, leaves first. An odd node is carried up
/// unchanged.
fn build_levels(leaves: &[[u8; 32]]) -> Vec<Vec<[u8; 32]>> {
    let mut levels = vec![leaves.to_vec()];
    while levels.last().map_or(false, |level| level.len() > 1) {
        let current = &levels[levels.len() - 1];
        let next: Vec<[u8; 32]> = current
            .chunks(2)
            .map(|pair| match pair {
                [a, b] => hash_pair(a, b),
                [a] => *a,
                _ => unreachable!("chunks(2) yields one or two items"),
            })
            .collect();
        levels.push(next);
    }
    levels
}

/// Root of the tree over `leaves`. The empty tree has an all-zero root.
pub fn merkle_root(leaves: &[[u8; 32]]) -> [u8; 32] {
    if leaves.is_empty() {
        return [0u8; 32];
    }
    build_levels(leaves)
        .last()
        .and_then(|level| level.first().copied())
        .unwrap_or([0u8; 32])
}

/// Sibling path for the leaf at `position`, or `None` if out of range.
pub fn merkle_proof(leaves: &[[u8; 32]], position: usize) -> Option<Vec<[u8; 32]>> {
    if position >= leaves.len() {
        return None;
    }
    let levels = build_levels(leaves);
    let mut proof = Vec::new();
    let mut idx = position;
    for level in &levels[..levels.len() - 1] {
        let sibling = idx ^ 1;
        if sibling < level.len() {
            proof.push(level[sibling]);
        }
        idx /= 2;
    }
    Some(proof)
}

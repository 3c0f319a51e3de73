use sha2::{Digest, Sha256};

use crate::error::BlobError;

pub const LEAF_DOMAIN_SEPARATOR: [u8; 1] = [0];
pub const INTERNAL_DOMAIN_SEPARATOR: [u8; 1] = [1];

/// Hashing rules for a binary merkle tree.
pub trait MerkleHasher {
    type Output: Clone;

    /// Hash a leaf. Implementations prepend [`LEAF_DOMAIN_SEPARATOR`] to the input bytes.
    fn leaf_hash(&self, bytes: &[u8]) -> Self::Output;

    /// Hash two child nodes. Implementations prepend [`INTERNAL_DOMAIN_SEPARATOR`] to the input.
    fn inner_hash(&self, left: &Self::Output, right: &Self::Output) -> Self::Output;

    /// Builds an RFC6962-style tree over `leaves` and returns its root.
    ///
    /// The left subtree of every node holds the largest power of two strictly
    /// smaller than the number of leaves below it.
    fn build_merkle_tree(&self, leaves: &[impl AsRef<[u8]>]) -> Result<Self::Output, BlobError> {
        match leaves.len() {
            0 => Err(BlobError::EmptyInput),
            1 => Ok(self.leaf_hash(leaves[0].as_ref())),
            length => {
                let split = length.next_power_of_two() / 2;
                let left = self.build_merkle_tree(&leaves[..split])?;
                let right = self.build_merkle_tree(&leaves[split..])?;
                Ok(self.inner_hash(&left, &right))
            }
        }
    }
}

/// Plain SHA-256 merkle tree, as used by tendermint for `simple_hash_from_byte_vectors`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Hasher;

impl MerkleHasher for Sha256Hasher {
    type Output = [u8; 32];

    fn leaf_hash(&self, bytes: &[u8]) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(LEAF_DOMAIN_SEPARATOR);
        hasher.update(bytes);
        hasher.finalize().into()
    }

    fn inner_hash(&self, left: &[u8; 32], right: &[u8; 32]) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(INTERNAL_DOMAIN_SEPARATOR);
        hasher.update(left);
        hasher.update(right);
        hasher.finalize().into()
    }
}

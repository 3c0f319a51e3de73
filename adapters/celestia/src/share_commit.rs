use std::fmt::{Display, Formatter};

use borsh::{BorshDeserialize, BorshSerialize};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::blob::Blob;
use crate::config::BlobConfig;
use crate::error::BlobError;
use crate::merkle::{MerkleHasher, Sha256Hasher};
use crate::namespace::NAMESPACE_SIZE;
use crate::shares::Share;

/// The length of a share commitment, in bytes
pub const COMMITMENT_LEN: usize = 32;
/// The length of a serialized subtree root: min namespace, max namespace, digest
pub const SUBTREE_ROOT_LEN: usize = 2 * NAMESPACE_SIZE + 32;

/// The root of the merkle tree built over a blob's subtree roots.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    BorshSerialize,
    BorshDeserialize,
)]
pub struct Commitment(#[serde(with = "hex::serde")] pub [u8; COMMITMENT_LEN]);

impl AsRef<[u8]> for Commitment {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<Commitment> for Vec<u8> {
    fn from(value: Commitment) -> Self {
        value.0.to_vec()
    }
}

impl Display for Commitment {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

/// Computes the sizes of the subtrees of a binary merkle mountain range.
///
/// Each size is the largest power of two not exceeding `min(max_subtree_width, remaining)`.
/// Examples:
///   - merkle_mountain_range_sizes(11, 4): [4, 4, 2, 1]
///   - merkle_mountain_range_sizes(19, 8): [8, 8, 2, 1]
pub fn merkle_mountain_range_sizes(
    total_size: usize,
    max_subtree_width: usize,
) -> Result<Vec<usize>, BlobError> {
    if total_size == 0 {
        return Err(BlobError::InvalidSize(total_size));
    }
    if !max_subtree_width.is_power_of_two() {
        return Err(BlobError::InvalidWidth(max_subtree_width));
    }

    let mut output = Vec::new();
    let mut remaining = total_size;
    while remaining != 0 {
        let tree_size = next_lower_power_of_2(remaining.min(max_subtree_width));
        output.push(tree_size);
        remaining -= tree_size;
    }
    Ok(output)
}

/// returns the largest power of 2 that is less than or equal to the input
/// Examples:
///   - next_lower_power_of_2(2): 2
///   - next_lower_power_of_2(3): 2
///   - next_lower_power_of_2(7): 4
///   - next_lower_power_of_2(8): 8
fn next_lower_power_of_2(num: usize) -> usize {
    if num.is_power_of_two() {
        num
    } else {
        num.next_power_of_two() >> 1
    }
}

/// Returns the smallest power of two that is greater than or equal to the input.
/// Zero rounds up to one.
pub fn round_up_power_of_two(num: usize) -> usize {
    num.max(1).next_power_of_two()
}

/// The width of the smallest square that can hold `share_count` shares.
pub fn blob_min_square_size(share_count: usize) -> usize {
    round_up_power_of_two(ceil_sqrt(share_count))
}

fn ceil_sqrt(num: usize) -> usize {
    let mut root = (num as f64).sqrt() as usize;
    while root * root < num {
        root += 1;
    }
    while root > 0 && (root - 1) * (root - 1) >= num {
        root -= 1;
    }
    root
}

/// The maximum subtree width used to commit to a blob of `share_count` shares.
///
/// The width grows only once the number of subtree roots would exceed
/// `subtree_root_threshold`, and never exceeds the smallest square the blob fits in.
pub fn subtree_width(share_count: usize, subtree_root_threshold: usize) -> usize {
    let roots_needed = share_count.div_ceil(subtree_root_threshold.max(1));
    round_up_power_of_two(roots_needed).min(blob_min_square_size(share_count))
}

/// Computes the share commitment of `blob` using the default [`BlobConfig`].
pub fn create_commitment(blob: &Blob) -> Result<Commitment, BlobError> {
    create_commitment_with_config(blob, &BlobConfig::default())
}

/// Computes the share commitment of `blob`, deriving the subtree width from `config`.
pub fn create_commitment_with_config(
    blob: &Blob,
    config: &BlobConfig,
) -> Result<Commitment, BlobError> {
    let shares = blob.to_shares()?;
    let width = config.subtree_width(shares.len());
    commit_to_shares(&shares, width)
}

/// Computes the share commitment of `blob` with a caller supplied maximum subtree width.
pub fn create_commitment_with_width(
    blob: &Blob,
    max_subtree_width: usize,
) -> Result<Commitment, BlobError> {
    let shares = blob.to_shares()?;
    commit_to_shares(&shares, max_subtree_width)
}

/// Builds the commitment over shares that all belong to one blob.
///
/// The shares are split into merkle mountain range subtrees, each subtree is
/// rooted with a namespaced merkle tree, and the serialized subtree roots are
/// rooted with a plain SHA-256 merkle tree.
pub fn commit_to_shares(
    shares: &[Share],
    max_subtree_width: usize,
) -> Result<Commitment, BlobError> {
    let subtree_roots = subtree_roots(shares, max_subtree_width)?;
    Sha256Hasher.build_merkle_tree(&subtree_roots).map(Commitment)
}

/// Returns the serialized namespaced merkle roots of the mountain range subtrees over `shares`.
pub fn subtree_roots(
    shares: &[Share],
    max_subtree_width: usize,
) -> Result<Vec<[u8; SUBTREE_ROOT_LEN]>, BlobError> {
    let heights = merkle_mountain_range_sizes(shares.len(), max_subtree_width)?;
    trace!(shares = shares.len(), ?heights, "Computed subtree sizes");

    let mut subtree_roots = Vec::with_capacity(heights.len());
    let mut cursor = 0;
    for height in heights {
        let mut tree = nmt_rs::CelestiaNmt::with_hasher(
            <nmt_rs::NamespacedSha2Hasher<NAMESPACE_SIZE> as nmt_rs::NamespaceMerkleHasher<NAMESPACE_SIZE>>::with_ignore_max_ns(true),
        );
        for share in &shares[cursor..cursor + height] {
            let nid = nmt_rs::NamespaceId(share.namespace()?.to_bytes());
            tree.push_leaf(share.as_serialized(), nid)
                .map_err(|e| BlobError::InvalidShare(e.to_string()))?;
        }
        cursor += height;

        let root = tree.root();
        let mut serialized = [0u8; SUBTREE_ROOT_LEN];
        serialized[..NAMESPACE_SIZE].copy_from_slice(&root.min_namespace().0);
        serialized[NAMESPACE_SIZE..2 * NAMESPACE_SIZE].copy_from_slice(&root.max_namespace().0);
        serialized[2 * NAMESPACE_SIZE..].copy_from_slice(&root.hash());
        subtree_roots.push(serialized);
    }
    Ok(subtree_roots)
}

/// Computes the commitments of many blobs in parallel using the default [`BlobConfig`].
pub fn create_commitments(blobs: &[Blob]) -> Result<Vec<Commitment>, BlobError> {
    create_commitments_with_config(blobs, &BlobConfig::default())
}

/// Computes the commitments of many blobs in parallel, deriving each subtree width from `config`.
///
/// The output preserves the order of `blobs`. If any blob fails, the error of the
/// first failing blob is returned and no commitments are produced.
pub fn create_commitments_with_config(
    blobs: &[Blob],
    config: &BlobConfig,
) -> Result<Vec<Commitment>, BlobError> {
    debug!(blobs = blobs.len(), "Creating share commitments");
    let results: Vec<Result<Commitment, BlobError>> = blobs
        .par_iter()
        .map(|blob| create_commitment_with_config(blob, config))
        .collect();
    results.into_iter().collect()
}

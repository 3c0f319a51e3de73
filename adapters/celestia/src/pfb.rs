use tracing::{debug, warn};

use crate::address::CelestiaAddress;
use crate::blob::{validate_blobs, Blob};
use crate::config::BlobConfig;
use crate::error::BlobError;
use crate::namespace::Namespace;
use crate::share_commit::{
    create_commitment_with_config, create_commitments_with_config, COMMITMENT_LEN,
};

/// MsgPayForBlobs pays for the inclusion of a blob in the block.
///
/// The four repeated fields are parallel arrays with one entry per blob.
#[derive(
    Clone,
    PartialEq,
    Eq,
    ::prost::Message,
    serde::Deserialize,
    serde::Serialize,
    borsh::BorshDeserialize,
    borsh::BorshSerialize,
)]
pub struct MsgPayForBlobs {
    #[prost(string, tag = "1")]
    pub signer: ::prost::alloc::string::String,
    /// namespaces are the serialized namespaces of the blobs, version byte included.
    #[prost(bytes = "vec", repeated, tag = "2")]
    pub namespaces: ::prost::alloc::vec::Vec<::prost::alloc::vec::Vec<u8>>,
    #[prost(uint32, repeated, tag = "3")]
    pub blob_sizes: ::prost::alloc::vec::Vec<u32>,
    /// share_commitments is a list of share commitments (one per blob).
    #[prost(bytes = "vec", repeated, tag = "4")]
    pub share_commitments: ::prost::alloc::vec::Vec<::prost::alloc::vec::Vec<u8>>,
    /// share_versions are the versions of the share format that the blobs
    /// associated with this message should use when included in a block. The
    /// share_versions specified must match the share_versions used to generate the
    /// share_commitment in this message.
    #[prost(uint32, repeated, tag = "8")]
    pub share_versions: ::prost::alloc::vec::Vec<u32>,
}

/// Builds a validated message paying for `blobs`, using the default [`BlobConfig`].
pub fn new_msg_pay_for_blobs(signer: &str, blobs: &[Blob]) -> Result<MsgPayForBlobs, BlobError> {
    MsgPayForBlobs::new(signer, blobs)
}

impl MsgPayForBlobs {
    pub const TYPE_URL: &'static str = "/celestia.blob.v1.MsgPayForBlobs";

    pub fn new(signer: &str, blobs: &[Blob]) -> Result<Self, BlobError> {
        Self::new_with_config(signer, blobs, &BlobConfig::default())
    }

    /// Validates every blob, commits to it and assembles the message.
    ///
    /// The assembled message is checked with [`MsgPayForBlobs::validate_basic`]
    /// before being returned.
    pub fn new_with_config(
        signer: &str,
        blobs: &[Blob],
        config: &BlobConfig,
    ) -> Result<Self, BlobError> {
        validate_blobs(blobs)?;
        let commitments = create_commitments_with_config(blobs, config)?;

        let mut namespaces = Vec::with_capacity(blobs.len());
        let mut blob_sizes = Vec::with_capacity(blobs.len());
        let mut share_versions = Vec::with_capacity(blobs.len());
        for blob in blobs {
            namespaces.push(blob.namespace()?.to_bytes().to_vec());
            blob_sizes.push(blob.size()?);
            share_versions.push(blob.share_version);
        }

        let msg = Self {
            signer: signer.to_string(),
            namespaces,
            blob_sizes,
            share_commitments: commitments.into_iter().map(Vec::from).collect(),
            share_versions,
        };
        msg.validate_basic()?;
        debug!(signer, blobs = blobs.len(), "Built MsgPayForBlobs");
        Ok(msg)
    }

    /// Stateless checks on the message. Checks run in a fixed order and the
    /// first violation is returned.
    pub fn validate_basic(&self) -> Result<(), BlobError> {
        if self.namespaces.is_empty() {
            return Err(BlobError::NoNamespaces);
        }
        if self.share_versions.is_empty() {
            return Err(BlobError::NoShareVersions);
        }
        if self.blob_sizes.is_empty() {
            return Err(BlobError::NoBlobSizes);
        }
        if self.share_commitments.is_empty() {
            return Err(BlobError::NoShareCommitments);
        }
        let len = self.namespaces.len();
        if self.share_versions.len() != len
            || self.blob_sizes.len() != len
            || self.share_commitments.len() != len
        {
            return Err(BlobError::MismatchedArrayLengths {
                namespaces: len,
                share_versions: self.share_versions.len(),
                blob_sizes: self.blob_sizes.len(),
                share_commitments: self.share_commitments.len(),
            });
        }

        for namespace in &self.namespaces {
            let namespace = Namespace::from_bytes(namespace).map_err(|e| match e {
                BlobError::UnsupportedNamespaceVersion(version) => {
                    BlobError::InvalidNamespaceVersion(version)
                }
                other => other,
            })?;
            namespace.validate_for_blob()?;
        }

        for (index, commitment) in self.share_commitments.iter().enumerate() {
            if commitment.len() != COMMITMENT_LEN {
                return Err(BlobError::InvalidShareCommitment {
                    index,
                    len: commitment.len(),
                });
            }
        }

        self.signer_address()?;
        Ok(())
    }

    /// Parses the signer as a bech32 Celestia address.
    pub fn signer_address(&self) -> Result<CelestiaAddress, BlobError> {
        self.signer
            .parse::<CelestiaAddress>()
            .map_err(|e| BlobError::InvalidAddress {
                address: self.signer.clone(),
                reason: e.to_string(),
            })
    }

    pub fn validate_blobs_match(&self, blobs: &[Blob]) -> Result<(), BlobError> {
        self.validate_blobs_match_with_config(blobs, &BlobConfig::default())
    }

    /// Checks that `blobs` are exactly the blobs this message pays for: same
    /// count, and per index the same namespace, size, share version and commitment.
    pub fn validate_blobs_match_with_config(
        &self,
        blobs: &[Blob],
        config: &BlobConfig,
    ) -> Result<(), BlobError> {
        self.validate_basic()?;
        validate_blobs(blobs)?;
        if blobs.len() != self.namespaces.len() {
            return Err(BlobError::BlobCountMismatch {
                expected: self.namespaces.len(),
                actual: blobs.len(),
            });
        }

        for (index, blob) in blobs.iter().enumerate() {
            if blob.namespace()?.to_bytes().as_slice() != self.namespaces[index].as_slice() {
                return Err(BlobError::NamespaceMismatch(index));
            }
            let size = blob.size()?;
            if size != self.blob_sizes[index] {
                return Err(BlobError::BlobSizeMismatch {
                    index,
                    expected: self.blob_sizes[index],
                    actual: size,
                });
            }
            if blob.share_version != self.share_versions[index] {
                return Err(BlobError::ShareVersionMismatch {
                    index,
                    expected: self.share_versions[index],
                    actual: blob.share_version,
                });
            }
            let commitment = create_commitment_with_config(blob, config)?;
            if commitment.as_ref() != self.share_commitments[index].as_slice() {
                warn!(index, %commitment, "Share commitment does not match blob");
                return Err(BlobError::ShareCommitmentMismatch { index });
            }
        }
        Ok(())
    }
}

use borsh::{BorshDeserialize, BorshSerialize};
use tracing::trace;

use crate::error::BlobError;
use crate::namespace::{Namespace, SUPPORTED_BLOB_NAMESPACE_VERSIONS};
use crate::shares::{Share, ShareVersion};

/// Blob is the data submitted by a user to be published to the namespace.
#[derive(
    Clone,
    PartialEq,
    Eq,
    ::prost::Message,
    serde::Serialize,
    serde::Deserialize,
    BorshSerialize,
    BorshDeserialize,
)]
pub struct Blob {
    #[prost(bytes = "vec", tag = "1")]
    pub namespace_id: Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    pub data: Vec<u8>,
    #[prost(uint32, tag = "3")]
    pub share_version: u32,
    #[prost(uint32, tag = "4")]
    pub namespace_version: u32,
}

impl Blob {
    pub fn new(namespace: Namespace, data: Vec<u8>, share_version: ShareVersion) -> Self {
        Self {
            namespace_id: namespace.id().to_vec(),
            data,
            share_version: share_version.into(),
            namespace_version: namespace.version() as u32,
        }
    }

    /// Decodes the namespace carried by this blob.
    pub fn namespace(&self) -> Result<Namespace, BlobError> {
        let version = u8::try_from(self.namespace_version)
            .map_err(|_| BlobError::UnsupportedNamespaceVersion(self.namespace_version))?;
        Namespace::new(version, &self.namespace_id)
    }

    pub fn share_version(&self) -> Result<ShareVersion, BlobError> {
        ShareVersion::try_from(self.share_version)
    }

    /// The blob size as recorded in a pay-for-blobs message.
    pub fn size(&self) -> Result<u32, BlobError> {
        u32::try_from(self.data.len()).map_err(|_| BlobError::BlobTooLarge(self.data.len()))
    }

    /// Splits the blob into the shares it will occupy in the data square.
    pub fn to_shares(&self) -> Result<Vec<Share>, BlobError> {
        self.share_version()?.split_blob(self.namespace()?, &self.data)
    }
}

/// Checks that a single blob may be paid for.
pub fn validate_blob(blob: &Blob) -> Result<(), BlobError> {
    if blob.data.is_empty() {
        return Err(BlobError::EmptyBlob);
    }
    blob.size()?;
    blob.share_version()?;

    let namespace = blob.namespace()?;
    if namespace.is_reserved() {
        return Err(BlobError::ReservedNamespace(namespace));
    }
    if !SUPPORTED_BLOB_NAMESPACE_VERSIONS.contains(&namespace.version()) {
        return Err(BlobError::UnsupportedNamespaceVersion(blob.namespace_version));
    }
    trace!(namespace = %namespace, size = blob.data.len(), "Blob is valid");
    Ok(())
}

/// Checks every blob in order, stopping at the first invalid one.
pub fn validate_blobs(blobs: &[Blob]) -> Result<(), BlobError> {
    if blobs.is_empty() {
        return Err(BlobError::NoBlobs);
    }
    blobs.iter().try_for_each(validate_blob)
}

/// The fields of a list of blobs, split into parallel arrays.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BlobComponents {
    pub namespace_versions: Vec<u32>,
    pub namespace_ids: Vec<Vec<u8>>,
    pub sizes: Vec<u32>,
    pub share_versions: Vec<u32>,
}

impl BlobComponents {
    pub fn extract(blobs: &[Blob]) -> Result<Self, BlobError> {
        let mut components = Self {
            namespace_versions: Vec::with_capacity(blobs.len()),
            namespace_ids: Vec::with_capacity(blobs.len()),
            sizes: Vec::with_capacity(blobs.len()),
            share_versions: Vec::with_capacity(blobs.len()),
        };
        for blob in blobs {
            components.namespace_versions.push(blob.namespace_version);
            components.namespace_ids.push(blob.namespace_id.clone());
            components.sizes.push(blob.size()?);
            components.share_versions.push(blob.share_version);
        }
        Ok(components)
    }
}

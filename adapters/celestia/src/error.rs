use crate::namespace::Namespace;

/// Every way a blob, a commitment or a pay-for-blobs message can be rejected.
///
/// Failures are deterministic: retrying with the same input yields the same error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BlobError {
    #[error("blob data must not be empty")]
    EmptyBlob,
    #[error("no blobs provided")]
    NoBlobs,
    #[error("blob of {0} bytes exceeds the maximum blob size")]
    BlobTooLarge(usize),
    #[error("unsupported share version {0}")]
    UnsupportedShareVersion(u32),
    #[error("unsupported namespace version {0}")]
    UnsupportedNamespaceVersion(u32),
    #[error("invalid namespace version {0}, only version 0 is supported for blobs")]
    InvalidNamespaceVersion(u32),
    #[error("invalid namespace: {0}")]
    InvalidNamespace(String),
    #[error("namespace {0} is reserved for protocol use")]
    ReservedNamespace(Namespace),
    #[error("share commitment at index {index} must be 32 bytes, got {len}")]
    InvalidShareCommitment { index: usize, len: usize },
    #[error("no namespaces provided")]
    NoNamespaces,
    #[error("no share versions provided")]
    NoShareVersions,
    #[error("no blob sizes provided")]
    NoBlobSizes,
    #[error("no share commitments provided")]
    NoShareCommitments,
    #[error(
        "mismatched array lengths: namespaces {namespaces}, share versions {share_versions}, \
         blob sizes {blob_sizes}, share commitments {share_commitments}"
    )]
    MismatchedArrayLengths {
        namespaces: usize,
        share_versions: usize,
        blob_sizes: usize,
        share_commitments: usize,
    },
    #[error("invalid signer address {address}: {reason}")]
    InvalidAddress { address: String, reason: String },
    #[error("invalid share count {0}, must be at least 1")]
    InvalidSize(usize),
    #[error("invalid subtree width {0}, must be a power of two")]
    InvalidWidth(usize),
    #[error("cannot compute the merkle root of zero leaves")]
    EmptyInput,
    #[error("invalid share: {0}")]
    InvalidShare(String),
    #[error("message pays for {expected} blobs but {actual} were provided")]
    BlobCountMismatch { expected: usize, actual: usize },
    #[error("namespace mismatch at index {0}")]
    NamespaceMismatch(usize),
    #[error("blob size mismatch at index {index}: message says {expected}, blob has {actual}")]
    BlobSizeMismatch {
        index: usize,
        expected: u32,
        actual: u32,
    },
    #[error("share version mismatch at index {index}: message says {expected}, blob has {actual}")]
    ShareVersionMismatch {
        index: usize,
        expected: u32,
        actual: u32,
    },
    #[error("share commitment at index {index} does not match the blob")]
    ShareCommitmentMismatch { index: usize },
}

/// Codespace reported alongside [`BlobError::code`].
pub const CODESPACE: &str = "blob";

impl BlobError {
    /// Stable numeric code for this error kind, independent of the payload.
    pub const fn code(&self) -> u32 {
        match self {
            BlobError::ReservedNamespace(_) => 11110,
            BlobError::InvalidNamespace(_) => 11111,
            BlobError::EmptyBlob => 11112,
            BlobError::BlobTooLarge(_) => 11113,
            BlobError::InvalidShareCommitment { .. } => 11116,
            BlobError::UnsupportedShareVersion(_) => 11117,
            BlobError::NoNamespaces => 11118,
            BlobError::NoShareVersions => 11119,
            BlobError::NoBlobSizes => 11120,
            BlobError::NoShareCommitments => 11121,
            BlobError::InvalidNamespaceVersion(_) => 11122,
            BlobError::UnsupportedNamespaceVersion(_) => 11123,
            BlobError::NoBlobs => 11124,
            BlobError::MismatchedArrayLengths { .. } => 11125,
            BlobError::InvalidAddress { .. } => 11126,
            BlobError::InvalidSize(_) => 11127,
            BlobError::InvalidWidth(_) => 11128,
            BlobError::EmptyInput => 11129,
            BlobError::InvalidShare(_) => 11130,
            BlobError::BlobCountMismatch { .. } => 11131,
            BlobError::NamespaceMismatch(_) => 11132,
            BlobError::BlobSizeMismatch { .. } => 11133,
            BlobError::ShareVersionMismatch { .. } => 11134,
            BlobError::ShareCommitmentMismatch { .. } => 11135,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::namespace::TX_NAMESPACE;

    #[test]
    fn codes_are_unique() {
        let errors = [
            BlobError::EmptyBlob,
            BlobError::NoBlobs,
            BlobError::BlobTooLarge(0),
            BlobError::UnsupportedShareVersion(1),
            BlobError::UnsupportedNamespaceVersion(1),
            BlobError::InvalidNamespaceVersion(1),
            BlobError::InvalidNamespace(String::new()),
            BlobError::ReservedNamespace(TX_NAMESPACE),
            BlobError::InvalidShareCommitment { index: 0, len: 0 },
            BlobError::NoNamespaces,
            BlobError::NoShareVersions,
            BlobError::NoBlobSizes,
            BlobError::NoShareCommitments,
            BlobError::MismatchedArrayLengths {
                namespaces: 0,
                share_versions: 0,
                blob_sizes: 0,
                share_commitments: 0,
            },
            BlobError::InvalidAddress {
                address: String::new(),
                reason: String::new(),
            },
            BlobError::InvalidSize(0),
            BlobError::InvalidWidth(0),
            BlobError::EmptyInput,
            BlobError::InvalidShare(String::new()),
            BlobError::BlobCountMismatch {
                expected: 0,
                actual: 0,
            },
            BlobError::NamespaceMismatch(0),
            BlobError::BlobSizeMismatch {
                index: 0,
                expected: 0,
                actual: 0,
            },
            BlobError::ShareVersionMismatch {
                index: 0,
                expected: 0,
                actual: 0,
            },
            BlobError::ShareCommitmentMismatch { index: 0 },
        ];
        let codes: HashSet<u32> = errors.iter().map(BlobError::code).collect();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn error_messages_carry_payload() {
        let err = BlobError::InvalidShareCommitment { index: 3, len: 31 };
        assert_eq!(
            err.to_string(),
            "share commitment at index 3 must be 32 bytes, got 31"
        );
        assert_eq!(
            BlobError::ShareCommitmentMismatch { index: 2 }.to_string(),
            "share commitment at index 2 does not match the blob"
        );
        assert_eq!(BlobError::ShareCommitmentMismatch { index: 2 }.code(), 11135);
    }
}

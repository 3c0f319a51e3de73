use borsh::{BorshDeserialize, BorshSerialize};
use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::BlobError;
use crate::namespace::{Namespace, NAMESPACE_SIZE};

/// The size of a share, in bytes
pub const SHARE_SIZE: usize = 512;
/// The length of the "info byte" field
pub const INFO_BYTE_LEN: usize = 1;
/// The length of the "sequence length" field, present in the first share of a sequence
pub const SEQUENCE_LENGTH_BYTES: usize = 4;
/// Data bytes carried by the first share of a blob
pub const FIRST_SPARSE_SHARE_CONTENT_SIZE: usize =
    SHARE_SIZE - NAMESPACE_SIZE - INFO_BYTE_LEN - SEQUENCE_LENGTH_BYTES;
/// Data bytes carried by every following share of a blob
pub const CONTINUATION_SPARSE_SHARE_CONTENT_SIZE: usize =
    SHARE_SIZE - NAMESPACE_SIZE - INFO_BYTE_LEN;

/// The encoding rules used to lay a blob out into shares.
///
/// Only versions listed here can be committed to. Unknown versions are rejected
/// when converting from the raw integer carried by blobs and messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ShareVersion {
    Zero = 0,
}

impl ShareVersion {
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// The info byte: version in the high seven bits, sequence start flag in the lowest.
    pub const fn info_byte(self, is_sequence_start: bool) -> u8 {
        (self.as_u8() << 1) | is_sequence_start as u8
    }

    /// Lays `data` out into namespaced shares.
    ///
    /// The first share carries the total data length as a big-endian `u32`.
    /// The final share is zero-padded.
    pub fn split_blob(self, namespace: Namespace, data: &[u8]) -> Result<Vec<Share>, BlobError> {
        if data.is_empty() {
            return Err(BlobError::EmptyBlob);
        }
        let sequence_len =
            u32::try_from(data.len()).map_err(|_| BlobError::BlobTooLarge(data.len()))?;

        match self {
            ShareVersion::Zero => {
                let namespace = namespace.to_bytes();
                let mut shares = Vec::with_capacity(sparse_shares_needed(data.len()));
                let mut remaining = data;
                loop {
                    let is_start = shares.is_empty();
                    let mut share = BytesMut::with_capacity(SHARE_SIZE);
                    share.put_slice(&namespace);
                    share.put_u8(self.info_byte(is_start));
                    if is_start {
                        share.put_u32(sequence_len);
                    }
                    let take = (SHARE_SIZE - share.len()).min(remaining.len());
                    share.put_slice(&remaining[..take]);
                    remaining = &remaining[take..];
                    share.resize(SHARE_SIZE, 0);

                    let share = share.freeze();
                    shares.push(if is_start {
                        Share::Start(share)
                    } else {
                        Share::Continuation(share)
                    });
                    if remaining.is_empty() {
                        return Ok(shares);
                    }
                }
            }
        }
    }
}

impl TryFrom<u32> for ShareVersion {
    type Error = BlobError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ShareVersion::Zero),
            other => Err(BlobError::UnsupportedShareVersion(other)),
        }
    }
}

impl From<ShareVersion> for u32 {
    fn from(value: ShareVersion) -> Self {
        value.as_u8() as u32
    }
}

/// Returns the number of shares needed to hold a blob of `data_len` bytes.
pub fn sparse_shares_needed(data_len: usize) -> usize {
    if data_len == 0 {
        return 0;
    }
    if data_len <= FIRST_SPARSE_SHARE_CONTENT_SIZE {
        return 1;
    }
    let continuation_bytes = data_len - FIRST_SPARSE_SHARE_CONTENT_SIZE;
    1 + (continuation_bytes + CONTINUATION_SPARSE_SHARE_CONTENT_SIZE - 1)
        / CONTINUATION_SPARSE_SHARE_CONTENT_SIZE
}

#[derive(Debug, Clone, PartialEq, BorshDeserialize, BorshSerialize)]
pub enum Share {
    Continuation(Bytes),
    Start(Bytes),
}

impl AsRef<[u8]> for Share {
    fn as_ref(&self) -> &[u8] {
        self.raw_inner_ref()
    }
}

fn is_continuation_unchecked(share: &[u8]) -> bool {
    share[NAMESPACE_SIZE] & 0x01 == 0
}

impl Share {
    /// Wraps a raw share, checking its length and share version.
    pub fn new(inner: Bytes) -> Result<Self, BlobError> {
        if inner.len() != SHARE_SIZE {
            return Err(BlobError::InvalidShare(format!(
                "expected {} bytes, got {}",
                SHARE_SIZE,
                inner.len()
            )));
        }
        ShareVersion::try_from((inner[NAMESPACE_SIZE] >> 1) as u32)?;
        if is_continuation_unchecked(inner.as_ref()) {
            Ok(Self::Continuation(inner))
        } else {
            Ok(Self::Start(inner))
        }
    }

    pub fn as_serialized(&self) -> &[u8] {
        self.raw_inner_ref()
    }

    pub fn is_sequence_start(&self) -> bool {
        match self {
            Share::Continuation(_) => false,
            Share::Start(_) => true,
        }
    }

    pub fn namespace(&self) -> Result<Namespace, BlobError> {
        Namespace::from_bytes(self.header(NAMESPACE_SIZE)?)
    }

    pub fn share_version(&self) -> Result<u8, BlobError> {
        Ok(self.header(NAMESPACE_SIZE + INFO_BYTE_LEN)?[NAMESPACE_SIZE] >> 1)
    }

    /// The length of the whole sequence, read from a start share.
    pub fn sequence_length(&self) -> Result<u32, BlobError> {
        match self {
            Share::Continuation(_) => Err(BlobError::InvalidShare(
                "continuation shares carry no sequence length".to_string(),
            )),
            Share::Start(_) => {
                let mut header =
                    self.header(NAMESPACE_SIZE + INFO_BYTE_LEN + SEQUENCE_LENGTH_BYTES)?;
                header.advance(NAMESPACE_SIZE + INFO_BYTE_LEN);
                Ok(header.get_u32())
            }
        }
    }

    /// Returns the data portion of this share, including any trailing padding.
    /// Empty if the share is too short to hold any data.
    pub fn data_ref(&self) -> &[u8] {
        self.raw_inner_ref()
            .get(self.get_data_offset()..)
            .unwrap_or(&[])
    }

    /// The first `len` bytes of the share, or an error if the share is shorter.
    fn header(&self, len: usize) -> Result<&[u8], BlobError> {
        let raw = self.raw_inner_ref();
        raw.get(..len).ok_or_else(|| {
            BlobError::InvalidShare(format!(
                "share of {} bytes is too short, expected {}",
                raw.len(),
                SHARE_SIZE
            ))
        })
    }

    fn get_data_offset(&self) -> usize {
        let mut offset = NAMESPACE_SIZE + INFO_BYTE_LEN;
        if let Self::Start(_) = self {
            offset += SEQUENCE_LENGTH_BYTES;
        }
        offset
    }

    fn raw_inner_ref(&self) -> &[u8] {
        match self {
            Share::Continuation(inner) => inner.as_ref(),
            Share::Start(inner) => inner.as_ref(),
        }
    }
}

/// Reassembles the data carried by a sequence of shares produced by [`ShareVersion::split_blob`].
pub fn join_shares(shares: &[Share]) -> Result<Vec<u8>, BlobError> {
    let first = shares
        .first()
        .ok_or_else(|| BlobError::InvalidShare("no shares to join".to_string()))?;
    let sequence_len = first.sequence_length()? as usize;
    let mut data = Vec::with_capacity(sequence_len);
    for share in shares {
        let chunk = share.data_ref();
        let take = chunk.len().min(sequence_len - data.len());
        data.extend_from_slice(&chunk[..take]);
    }
    if data.len() != sequence_len {
        return Err(BlobError::InvalidShare(format!(
            "sequence length {} but shares only hold {} bytes",
            sequence_len,
            data.len()
        )));
    }
    Ok(data)
}

#[cfg(test)]
mod tests {
    use proptest::collection::vec;
    use proptest::prelude::*;

    use super::*;

    fn namespace() -> Namespace {
        Namespace::new_v0(&[1; 10]).unwrap()
    }

    #[test]
    fn content_sizes() {
        assert_eq!(FIRST_SPARSE_SHARE_CONTENT_SIZE, 478);
        assert_eq!(CONTINUATION_SPARSE_SHARE_CONTENT_SIZE, 482);
    }

    #[test]
    fn shares_needed_boundaries() {
        assert_eq!(sparse_shares_needed(0), 0);
        assert_eq!(sparse_shares_needed(1), 1);
        assert_eq!(sparse_shares_needed(478), 1);
        assert_eq!(sparse_shares_needed(479), 2);
        assert_eq!(sparse_shares_needed(478 + 482), 2);
        assert_eq!(sparse_shares_needed(478 + 482 + 1), 3);
        assert_eq!(sparse_shares_needed(3 * SHARE_SIZE), 4);
    }

    #[test]
    fn first_share_layout() {
        let shares = ShareVersion::Zero
            .split_blob(namespace(), &[0xAA; 10])
            .unwrap();
        assert_eq!(shares.len(), 1);
        let share = &shares[0];
        assert!(share.is_sequence_start());
        assert_eq!(share.as_serialized().len(), SHARE_SIZE);
        assert_eq!(&share.as_serialized()[..NAMESPACE_SIZE], &namespace().to_bytes());
        // version zero, sequence start
        assert_eq!(share.as_serialized()[NAMESPACE_SIZE], 0x01);
        assert_eq!(share.sequence_length().unwrap(), 10);
        assert_eq!(&share.data_ref()[..10], &[0xAA; 10]);
        assert!(share.data_ref()[10..].iter().all(|b| *b == 0));
        assert_eq!(share.namespace().unwrap(), namespace());
    }

    #[test]
    fn continuation_shares_are_flagged() {
        let shares = ShareVersion::Zero
            .split_blob(namespace(), &[0xFF; 3 * SHARE_SIZE])
            .unwrap();
        assert_eq!(shares.len(), 4);
        assert!(shares[0].is_sequence_start());
        for share in &shares[1..] {
            assert!(!share.is_sequence_start());
            assert_eq!(share.as_serialized()[NAMESPACE_SIZE], 0x00);
            assert!(share.sequence_length().is_err());
        }
    }

    #[test]
    fn empty_data_is_rejected() {
        assert_eq!(
            ShareVersion::Zero.split_blob(namespace(), &[]),
            Err(BlobError::EmptyBlob)
        );
    }

    #[test]
    fn unknown_share_versions_are_rejected() {
        assert_eq!(
            ShareVersion::try_from(1u32),
            Err(BlobError::UnsupportedShareVersion(1))
        );
        assert_eq!(ShareVersion::try_from(0u32), Ok(ShareVersion::Zero));

        let mut raw = vec![0u8; SHARE_SIZE];
        raw[NAMESPACE_SIZE] = 1 << 1;
        assert_eq!(
            Share::new(raw.into()),
            Err(BlobError::UnsupportedShareVersion(1))
        );
    }

    #[test]
    fn short_shares_report_errors() {
        let start = Share::Start(Bytes::from(vec![0u8; 10]));
        assert!(matches!(start.namespace(), Err(BlobError::InvalidShare(_))));
        assert!(matches!(start.share_version(), Err(BlobError::InvalidShare(_))));
        assert!(matches!(start.sequence_length(), Err(BlobError::InvalidShare(_))));
        assert!(start.data_ref().is_empty());

        let mut header = namespace().to_bytes().to_vec();
        header.push(ShareVersion::Zero.info_byte(true));
        header.extend_from_slice(&[0, 0]);
        let truncated = Share::Start(Bytes::from(header));
        assert_eq!(truncated.namespace().unwrap(), namespace());
        assert_eq!(truncated.share_version().unwrap(), 0);
        assert!(matches!(truncated.sequence_length(), Err(BlobError::InvalidShare(_))));

        let empty = Share::Continuation(Bytes::new());
        assert!(matches!(empty.namespace(), Err(BlobError::InvalidShare(_))));
        assert!(matches!(join_shares(&[empty]), Err(BlobError::InvalidShare(_))));
    }

    #[test]
    fn wrong_length_share_is_rejected() {
        assert!(matches!(
            Share::new(Bytes::from(vec![0u8; 100])),
            Err(BlobError::InvalidShare(_))
        ));
    }

    proptest! {
        #[test]
        fn proptest_split_then_join(data in vec(any::<u8>(), 1..4096)) {
            let shares = ShareVersion::Zero.split_blob(namespace(), &data).unwrap();
            prop_assert_eq!(shares.len(), sparse_shares_needed(data.len()));
            for share in &shares {
                let reparsed = Share::new(Bytes::copy_from_slice(share.as_serialized())).unwrap();
                prop_assert_eq!(&reparsed, share);
            }
            prop_assert_eq!(join_shares(&shares).unwrap(), data);
        }
    }
}

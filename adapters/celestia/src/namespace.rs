use std::fmt::{Display, Formatter};

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use crate::error::BlobError;

/// The length of the namespace version prefix
pub const NAMESPACE_VERSION_SIZE: usize = 1;
/// The length of a namespace ID
pub const NAMESPACE_ID_SIZE: usize = 28;
/// The length of a serialized namespace: version byte followed by the ID
pub const NAMESPACE_SIZE: usize = NAMESPACE_VERSION_SIZE + NAMESPACE_ID_SIZE;

pub const NAMESPACE_VERSION_ZERO: u8 = 0;
pub const NAMESPACE_VERSION_MAX: u8 = u8::MAX;

/// Version zero IDs must start with this many zero bytes
pub const NAMESPACE_VERSION_ZERO_PREFIX_SIZE: usize = 18;
/// The user-chosen part of a version zero ID
pub const NAMESPACE_VERSION_ZERO_ID_SIZE: usize =
    NAMESPACE_ID_SIZE - NAMESPACE_VERSION_ZERO_PREFIX_SIZE;

/// Namespace versions that user blobs may be submitted under.
pub const SUPPORTED_BLOB_NAMESPACE_VERSIONS: &[u8] = &[NAMESPACE_VERSION_ZERO];

/// A 29 byte namespace: one version byte and a 28 byte ID.
///
/// The derived ordering compares the version first and then the ID bytewise,
/// which is the same as comparing the serialized form.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    BorshSerialize,
    BorshDeserialize,
)]
pub struct Namespace {
    version: u8,
    id: [u8; NAMESPACE_ID_SIZE],
}

/// Builds a version zero namespace whose ID is all zeroes except for the last byte.
const fn primary_reserved(last: u8) -> Namespace {
    let mut id = [0u8; NAMESPACE_ID_SIZE];
    id[NAMESPACE_ID_SIZE - 1] = last;
    Namespace {
        version: NAMESPACE_VERSION_ZERO,
        id,
    }
}

/// Builds a max version namespace whose ID is all `0xFF` except for the last byte.
const fn secondary_reserved(last: u8) -> Namespace {
    let mut id = [0xFF; NAMESPACE_ID_SIZE];
    id[NAMESPACE_ID_SIZE - 1] = last;
    Namespace {
        version: NAMESPACE_VERSION_MAX,
        id,
    }
}

pub const TX_NAMESPACE: Namespace = primary_reserved(0x01);
pub const INTERMEDIATE_STATE_ROOTS_NAMESPACE: Namespace = primary_reserved(0x02);
pub const PAY_FOR_BLOB_NAMESPACE: Namespace = primary_reserved(0x04);
pub const PRIMARY_RESERVED_PADDING_NAMESPACE: Namespace = primary_reserved(0xFF);
/// Every namespace less than or equal to this one is reserved.
pub const MAX_PRIMARY_RESERVED_NAMESPACE: Namespace = primary_reserved(0xFF);
pub const TAIL_PADDING_NAMESPACE: Namespace = secondary_reserved(0xFE);
pub const PARITY_SHARES_NAMESPACE: Namespace = secondary_reserved(0xFF);

/// Protocol namespaces that never carry user data.
pub const RESERVED_NAMESPACES: [Namespace; 6] = [
    TX_NAMESPACE,
    INTERMEDIATE_STATE_ROOTS_NAMESPACE,
    PAY_FOR_BLOB_NAMESPACE,
    PRIMARY_RESERVED_PADDING_NAMESPACE,
    TAIL_PADDING_NAMESPACE,
    PARITY_SHARES_NAMESPACE,
];

impl Namespace {
    /// Creates a namespace, checking that the version is known and the ID is well formed.
    pub fn new(version: u8, id: &[u8]) -> Result<Self, BlobError> {
        if version != NAMESPACE_VERSION_ZERO && version != NAMESPACE_VERSION_MAX {
            return Err(BlobError::UnsupportedNamespaceVersion(version as u32));
        }
        let id: [u8; NAMESPACE_ID_SIZE] = id.try_into().map_err(|_| {
            BlobError::InvalidNamespace(format!(
                "ID must be {} bytes, got {}",
                NAMESPACE_ID_SIZE,
                id.len()
            ))
        })?;
        if version == NAMESPACE_VERSION_ZERO
            && id[..NAMESPACE_VERSION_ZERO_PREFIX_SIZE]
                .iter()
                .any(|b| *b != 0)
        {
            return Err(BlobError::InvalidNamespace(format!(
                "version zero ID must start with {} zero bytes",
                NAMESPACE_VERSION_ZERO_PREFIX_SIZE
            )));
        }
        Ok(Self { version, id })
    }

    /// Creates a version zero namespace from a sub-ID of at most 10 bytes.
    /// Shorter sub-IDs are left-padded with zeroes.
    pub fn new_v0(sub_id: &[u8]) -> Result<Self, BlobError> {
        if sub_id.len() > NAMESPACE_VERSION_ZERO_ID_SIZE {
            return Err(BlobError::InvalidNamespace(format!(
                "version zero sub-ID must be at most {} bytes, got {}",
                NAMESPACE_VERSION_ZERO_ID_SIZE,
                sub_id.len()
            )));
        }
        let mut id = [0u8; NAMESPACE_ID_SIZE];
        id[NAMESPACE_ID_SIZE - sub_id.len()..].copy_from_slice(sub_id);
        Ok(Self {
            version: NAMESPACE_VERSION_ZERO,
            id,
        })
    }

    /// Decodes a namespace from its 29 byte serialized form.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, BlobError> {
        if bytes.len() != NAMESPACE_SIZE {
            return Err(BlobError::InvalidNamespace(format!(
                "namespace must be {} bytes, got {}",
                NAMESPACE_SIZE,
                bytes.len()
            )));
        }
        Self::new(bytes[0], &bytes[NAMESPACE_VERSION_SIZE..])
    }

    pub fn to_bytes(&self) -> [u8; NAMESPACE_SIZE] {
        let mut out = [0u8; NAMESPACE_SIZE];
        out[0] = self.version;
        out[NAMESPACE_VERSION_SIZE..].copy_from_slice(&self.id);
        out
    }

    pub fn version(&self) -> u8 {
        self.version
    }

    pub fn id(&self) -> &[u8; NAMESPACE_ID_SIZE] {
        &self.id
    }

    pub fn is_tx(&self) -> bool {
        *self == TX_NAMESPACE
    }

    pub fn is_intermediate_state_roots(&self) -> bool {
        *self == INTERMEDIATE_STATE_ROOTS_NAMESPACE
    }

    pub fn is_pay_for_blob(&self) -> bool {
        *self == PAY_FOR_BLOB_NAMESPACE
    }

    pub fn is_tail_padding(&self) -> bool {
        *self == TAIL_PADDING_NAMESPACE
    }

    pub fn is_parity_shares(&self) -> bool {
        *self == PARITY_SHARES_NAMESPACE
    }

    pub fn is_primary_reserved(&self) -> bool {
        *self <= MAX_PRIMARY_RESERVED_NAMESPACE
    }

    /// Returns true for the primary reserved range and the protocol padding
    /// and parity namespaces.
    ///
    /// Other max version namespaces are not reserved here, they are rejected
    /// for blobs by the namespace version check instead.
    pub fn is_reserved(&self) -> bool {
        self.is_primary_reserved() || RESERVED_NAMESPACES.contains(self)
    }

    /// Checks that this namespace may carry a user blob.
    ///
    /// Reserved namespaces are reported before unsupported versions.
    pub fn validate_for_blob(&self) -> Result<(), BlobError> {
        if self.is_reserved() {
            return Err(BlobError::ReservedNamespace(*self));
        }
        if !SUPPORTED_BLOB_NAMESPACE_VERSIONS.contains(&self.version) {
            return Err(BlobError::InvalidNamespaceVersion(self.version as u32));
        }
        Ok(())
    }
}

impl TryFrom<&[u8]> for Namespace {
    type Error = BlobError;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        Self::from_bytes(value)
    }
}

impl From<Namespace> for [u8; NAMESPACE_SIZE] {
    fn from(value: Namespace) -> Self {
        value.to_bytes()
    }
}

impl Display for Namespace {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", hex::encode(self.to_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn reserved_constants_have_expected_bytes() {
        let mut expected = [0u8; NAMESPACE_SIZE];
        expected[NAMESPACE_SIZE - 1] = 0x01;
        assert_eq!(TX_NAMESPACE.to_bytes(), expected);

        let parity = [0xFF; NAMESPACE_SIZE];
        assert_eq!(PARITY_SHARES_NAMESPACE.to_bytes(), parity);

        let mut tail = [0xFF; NAMESPACE_SIZE];
        tail[NAMESPACE_SIZE - 1] = 0xFE;
        assert_eq!(TAIL_PADDING_NAMESPACE.to_bytes(), tail);
    }

    #[test]
    fn every_reserved_constant_is_rejected_as_reserved() {
        for ns in RESERVED_NAMESPACES {
            assert_eq!(ns.validate_for_blob(), Err(BlobError::ReservedNamespace(ns)));
        }
    }

    #[test]
    fn every_reserved_constant_is_reserved() {
        for ns in RESERVED_NAMESPACES {
            assert!(ns.is_reserved(), "{ns} should be reserved");
        }
        assert!(MAX_PRIMARY_RESERVED_NAMESPACE.is_reserved());
    }

    #[test]
    fn user_namespaces_are_not_reserved() {
        let ns = Namespace::new_v0(&[1; NAMESPACE_VERSION_ZERO_ID_SIZE]).unwrap();
        assert!(!ns.is_reserved());
        assert!(ns.validate_for_blob().is_ok());

        // Just above the primary reserved range
        let ns = Namespace::new_v0(&[0x01, 0x00]).unwrap();
        assert!(ns > MAX_PRIMARY_RESERVED_NAMESPACE);
        assert!(!ns.is_reserved());
    }

    #[test]
    fn small_v0_namespaces_fall_in_primary_range() {
        let ns = Namespace::new_v0(&[0x03]).unwrap();
        assert!(ns.is_primary_reserved());
        assert_eq!(
            ns.validate_for_blob(),
            Err(BlobError::ReservedNamespace(ns))
        );
    }

    #[test]
    fn new_v0_left_pads() {
        let ns = Namespace::new_v0(&[0xAB, 0xCD]).unwrap();
        assert_eq!(ns.version(), NAMESPACE_VERSION_ZERO);
        assert_eq!(&ns.id()[26..], &[0xAB, 0xCD]);
        assert!(ns.id()[..26].iter().all(|b| *b == 0));
    }

    #[test]
    fn rejects_malformed_namespaces() {
        assert_eq!(
            Namespace::new(7, &[0u8; NAMESPACE_ID_SIZE]),
            Err(BlobError::UnsupportedNamespaceVersion(7))
        );
        assert!(matches!(
            Namespace::new(0, &[1u8; NAMESPACE_ID_SIZE]),
            Err(BlobError::InvalidNamespace(_))
        ));
        assert!(matches!(
            Namespace::from_bytes(&[0u8; 10]),
            Err(BlobError::InvalidNamespace(_))
        ));
        assert!(matches!(
            Namespace::new_v0(&[1u8; 11]),
            Err(BlobError::InvalidNamespace(_))
        ));
    }

    #[test]
    fn max_version_namespace_is_not_valid_for_blobs() {
        let mut id = [0u8; NAMESPACE_ID_SIZE];
        id[NAMESPACE_ID_SIZE - 1] = 0x01;
        let ns = Namespace::new(NAMESPACE_VERSION_MAX, &id).unwrap();
        assert!(!ns.is_reserved());
        assert_eq!(
            ns.validate_for_blob(),
            Err(BlobError::InvalidNamespaceVersion(255))
        );
    }

    proptest! {
        #[test]
        fn proptest_namespace_round_trip(sub_id in proptest::collection::vec(any::<u8>(), 0..=NAMESPACE_VERSION_ZERO_ID_SIZE)) {
            let ns = Namespace::new_v0(&sub_id).unwrap();
            let decoded = Namespace::from_bytes(&ns.to_bytes()).unwrap();
            prop_assert_eq!(decoded.version(), ns.version());
            prop_assert_eq!(decoded.id(), ns.id());
        }

        #[test]
        fn proptest_ordering_matches_bytes(a in any::<[u8; NAMESPACE_ID_SIZE]>(), b in any::<[u8; NAMESPACE_ID_SIZE]>()) {
            let a = Namespace::new(NAMESPACE_VERSION_MAX, &a).unwrap();
            let b = Namespace::new(NAMESPACE_VERSION_MAX, &b).unwrap();
            prop_assert_eq!(a.cmp(&b), a.to_bytes().cmp(&b.to_bytes()));
        }
    }
}

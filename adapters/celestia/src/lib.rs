pub mod address;
pub mod blob;
pub mod config;
pub mod error;
pub mod merkle;
pub mod namespace;
pub mod pfb;
pub mod share_commit;
pub mod shares;

pub use address::{CelestiaAddress, CELESTIA_ADDRESS_PREFIX};
pub use blob::{validate_blob, validate_blobs, Blob, BlobComponents};
pub use config::BlobConfig;
pub use error::BlobError;
pub use namespace::Namespace;
pub use pfb::{new_msg_pay_for_blobs, MsgPayForBlobs};
pub use share_commit::{
    create_commitment, create_commitments, merkle_mountain_range_sizes, Commitment,
};
pub use shares::{Share, ShareVersion};

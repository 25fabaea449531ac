//! Error type shared by the record store, the media and the image format.
//!
//! A version mismatch is not an error: it is reported through
//! [`crate::InitOutcome::Reset`]. Everything here is a hard failure that the
//! store propagates immediately without retrying the medium.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The medium cannot hold the requested number of bytes.
    #[error("medium too small: need {required} bytes, capacity is {capacity}")]
    MediumTooSmall { required: usize, capacity: usize },

    /// The medium was accessed before `begin` prepared it.
    #[error("medium not initialized (begin was not called)")]
    MediumUnavailable,

    /// Byte access outside the region prepared by `begin`.
    #[error("address {addr:#06x} outside prepared region of {limit} bytes")]
    AddressOutOfRange { addr: usize, limit: usize },

    /// An operation whose semantics are not defined yet.
    #[error("not implemented: {0}")]
    NotImplemented(&'static str),

    /// A save boundary past the end of the record.
    #[error("save boundary {boundary} outside record of {record_size} bytes")]
    BoundaryOutOfRange { boundary: usize, record_size: usize },

    /// The record cannot even hold its version and tag fields.
    #[error("record of {record_size} bytes is smaller than its {header_size}-byte header")]
    RecordTooSmall { record_size: usize, header_size: usize },

    /// A caller-supplied record buffer has the wrong length.
    #[error("record buffer holds {buffer} bytes, record size is {record_size}")]
    BufferSize { buffer: usize, record_size: usize },

    /// The version does not fit the configured version width.
    #[error("version {version} does not fit in a {width}-byte version field")]
    VersionOutOfRange { version: u32, width: usize },

    /// Tag access on a record layout without a tag field.
    #[error("record layout has no tag field")]
    NoTagField,

    /// A typed payload does not fit the payload span.
    #[error("payload needs {needed} bytes, only {available} available")]
    PayloadTooLarge { needed: usize, available: usize },

    /// bincode failed to encode or decode a typed payload.
    #[error("payload codec: {0}")]
    Payload(#[from] bincode::Error),

    /// Malformed or mismatched medium image file.
    #[error("image format: {0}")]
    ImageFormat(String),

    /// Host file access failed.
    #[error("I/O: {0}")]
    Io(#[from] std::io::Error),
}

//! The crate's single public error surface.

use thiserror::Error;

/// Every way a mapbufr read, write, or mutation can fail.
#[derive(Debug, Error)]
pub enum MapbufrError {
    /// Constructor input was neither a mapping, a byte buffer, nor a
    /// slice-addressable backing store.
    #[error("expected a mapping, byte buffer, or slice-addressable source, got {0}")]
    TypeError(&'static str),

    /// The requested key is not present in the map.
    #[error("key not found: {0}")]
    KeyError(String),

    /// An in-place [`set`](crate::bytemap::mutator::ByteMapMutator::set) used
    /// an encoded blob of a different length than the one it replaces.
    #[error("replacement value for key {key} encodes to {new_len} bytes, existing blob is {old_len} bytes")]
    LengthMismatch { key: u64, old_len: usize, new_len: usize },

    /// A codec failed to resolve, compress, or decompress a value. Wraps
    /// `mapbufr_codec::CodecError`, whose variants distinguish
    /// `UnsupportedCompressionType` from `CompressionError`/`DecompressionError`.
    #[error(transparent)]
    Codec(#[from] mapbufr_codec::CodecError),

    /// A structural invariant from the format (magic, version, offsets,
    /// size, CRC) did not hold.
    #[error("validation failed: {0}")]
    ValidationError(String),

    /// I/O failure reading the backing store (file, mmap, or slice source).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for mapbufr operations.
pub type Result<T> = std::result::Result<T, MapbufrError>;

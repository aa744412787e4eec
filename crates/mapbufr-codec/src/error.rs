//! Error types for codec dispatch.

use thiserror::Error;

/// Errors produced while compressing, decompressing, or resolving a codec tag.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The 4-byte tag did not match any registered codec.
    #[error("unsupported compression type: {0:?}")]
    UnsupportedCompressionType(String),

    /// The codec's compressor rejected the input or its own encoder failed.
    #[error("compression failed ({method}): {source}")]
    CompressionError {
        /// Name of the codec that failed.
        method: &'static str,
        /// Underlying I/O error from the codec's writer.
        #[source]
        source: std::io::Error,
    },

    /// The codec's decompressor could not produce a value from the given bytes.
    #[error("decompression failed for {context}: {source}")]
    DecompressionError {
        /// Caller-supplied label identifying what was being decompressed (e.g. a key).
        context: String,
        /// Underlying I/O error from the codec's reader.
        #[source]
        source: std::io::Error,
    },
}

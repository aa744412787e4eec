//! Compression codec registry for the mapbufr binary map format.
//!
//! A mapbufr buffer persists a single 4-byte ASCII tag identifying the codec
//! applied uniformly to every value it stores. This crate owns:
//!
//! - the tag encoding (right-justified, `'0'`-padded, see [`tag`]),
//! - the [`Method`] enum naming the five built-in codecs, and
//! - [`CodecRegistry`], the value-typed replacement for a process-wide codec
//!   table: construct one with [`CodecRegistry::default`] and pass it to a
//!   `mapbufr` reader or writer.

pub mod error;
pub mod tag;

mod brotli_codec;
mod gzip;
mod lzma_codec;
mod zstd_codec;

pub use error::CodecError;
pub use tag::TAG_LEN;

/// Result type for codec operations.
pub type Result<T> = std::result::Result<T, CodecError>;

/// The compression method applied to every value in a single map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// No compression; values are stored verbatim.
    None,
    /// DEFLATE, via `flate2`.
    Gzip,
    /// Brotli, via the `brotli` crate.
    Brotli,
    /// Zstandard, via the `zstd` crate.
    Zstd,
    /// LZMA/XZ, via `xz2`.
    Lzma,
}

impl Method {
    /// All methods, in the order they appear in the format's recognized tag list.
    pub const ALL: [Method; 5] =
        [Method::None, Method::Gzip, Method::Brotli, Method::Zstd, Method::Lzma];

    /// The codec's canonical (unpadded) name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Method::None => "none",
            Method::Gzip => "gzip",
            Method::Brotli => "br",
            Method::Zstd => "zstd",
            Method::Lzma => "lzma",
        }
    }

    /// The 4-byte tag persisted in a mapbufr header.
    #[must_use]
    pub fn tag(self) -> [u8; TAG_LEN] {
        tag::encode(self.name())
    }

    /// Resolve a header tag back to a [`Method`].
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::UnsupportedCompressionType`] if the tag, once
    /// stripped of zero padding and lowercased, does not name a known codec.
    pub fn from_tag(raw: &[u8; TAG_LEN]) -> Result<Self> {
        match tag::decode(raw).as_str() {
            "none" => Ok(Method::None),
            "gzip" => Ok(Method::Gzip),
            "br" => Ok(Method::Brotli),
            "zstd" => Ok(Method::Zstd),
            "lzma" => Ok(Method::Lzma),
            other => Err(CodecError::UnsupportedCompressionType(other.to_string())),
        }
    }
}

/// A value-typed table of the five built-in codecs.
///
/// Unlike the source's process-wide codec table, `CodecRegistry` carries no
/// global state: construct it with [`CodecRegistry::default`] and pass it
/// explicitly to a reader or writer. All five built-in codecs are always
/// available; the type exists as the seam a caller embedding this crate in a
/// larger system would extend.
#[derive(Debug, Clone, Copy, Default)]
pub struct CodecRegistry;

impl CodecRegistry {
    /// Compress `data` with `method`, returning the raw bytes to persist.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::CompressionError`] if the underlying codec fails.
    pub fn compress(&self, data: &[u8], method: Method) -> Result<Vec<u8>> {
        tracing::debug!(method = method.name(), len = data.len(), "compressing value");
        match method {
            Method::None => Ok(data.to_vec()),
            Method::Gzip => gzip::compress(data),
            Method::Brotli => brotli_codec::compress(data),
            Method::Zstd => zstd_codec::compress(data),
            Method::Lzma => lzma_codec::compress(data),
        }
    }

    /// Decompress `data` with `method`.
    ///
    /// `context_label` identifies what was being decompressed (typically the
    /// key) and is attached to any [`CodecError::DecompressionError`] raised.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::DecompressionError`] if the underlying codec
    /// fails, e.g. because the bytes are truncated or corrupt.
    pub fn decompress(&self, data: &[u8], method: Method, context_label: &str) -> Result<Vec<u8>> {
        let result = match method {
            Method::None => Ok(data.to_vec()),
            Method::Gzip => gzip::decompress(data, context_label),
            Method::Brotli => brotli_codec::decompress(data, context_label),
            Method::Zstd => zstd_codec::decompress(data, context_label),
            Method::Lzma => lzma_codec::decompress(data, context_label),
        };
        if let Err(ref err) = result {
            tracing::error!(method = method.name(), context = context_label, %err, "codec dispatch failed");
        }
        result
    }
}

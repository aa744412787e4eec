//! The 16-byte ByteMap header.

use mapbufr_codec::{Method, TAG_LEN};

use crate::error::{MapbufrError, Result};

/// Magic bytes identifying a ByteMap buffer: ASCII `"mapbufr"`.
pub const MAGIC: [u8; 7] = *b"mapbufr";

/// Width in bytes of the header.
pub const HEADER_LEN: usize = 16;

/// Width in bytes of one `(key, offset)` index slot.
pub const SLOT_LEN: usize = 16;

/// CRC trailer appended to every value blob (format version 1).
pub const FORMAT_VERSION_1: u8 = 1;
/// No CRC trailer (format version 0).
pub const FORMAT_VERSION_0: u8 = 0;

/// Parsed view of a ByteMap header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub version: u8,
    pub method: Method,
    pub entry_count: u32,
}

impl Header {
    /// Parse the first [`HEADER_LEN`] bytes of a buffer.
    ///
    /// # Errors
    ///
    /// Returns [`MapbufrError::ValidationError`] if the buffer is too short,
    /// the magic doesn't match, or the format version is unrecognized.
    /// Returns [`MapbufrError::Codec`] if the compression tag is unknown.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_LEN {
            return Err(MapbufrError::ValidationError(format!(
                "buffer of {} bytes is shorter than the {HEADER_LEN}-byte header",
                bytes.len()
            )));
        }
        if bytes[0..7] != MAGIC {
            return Err(MapbufrError::ValidationError(format!(
                "bad magic: expected {MAGIC:?}, got {:?}",
                &bytes[0..7]
            )));
        }
        let version = bytes[7];
        if version != FORMAT_VERSION_0 && version != FORMAT_VERSION_1 {
            return Err(MapbufrError::ValidationError(format!(
                "unsupported format version: {version}"
            )));
        }
        let mut tag = [0u8; TAG_LEN];
        tag.copy_from_slice(&bytes[8..12]);
        let method = Method::from_tag(&tag)?;

        let mut n_bytes = [0u8; 4];
        n_bytes.copy_from_slice(&bytes[12..16]);
        let entry_count = u32::from_le_bytes(n_bytes);

        Ok(Self { version, method, entry_count })
    }

    /// Whether value blobs carry a trailing CRC-32C.
    #[must_use]
    pub const fn has_checksum(&self) -> bool {
        self.version == FORMAT_VERSION_1
    }

    /// Serialize the header to its 16-byte on-disk form.
    #[must_use]
    pub fn to_bytes(self) -> [u8; HEADER_LEN] {
        let mut out = [0u8; HEADER_LEN];
        out[0..7].copy_from_slice(&MAGIC);
        out[7] = self.version;
        out[8..12].copy_from_slice(&self.method.tag());
        out[12..16].copy_from_slice(&self.entry_count.to_le_bytes());
        out
    }

    /// Byte offset of the start of the index region (== end of the header).
    #[must_use]
    pub const fn index_start(&self) -> u64 {
        HEADER_LEN as u64
    }

    /// Byte offset of the start of the data region (== end of the index).
    #[must_use]
    pub fn data_start(&self) -> u64 {
        HEADER_LEN as u64 + SLOT_LEN as u64 * u64::from(self.entry_count)
    }
}

/// Decode the `n` interleaved `(key, offset)` slots following the header.
///
/// `bytes` must be exactly `SLOT_LEN * header.entry_count` bytes — the raw
/// index region, already sliced out by the caller.
///
/// # Errors
///
/// Returns [`MapbufrError::ValidationError`] if `bytes` is not an exact
/// multiple of [`SLOT_LEN`].
pub fn parse_index(bytes: &[u8], header: &Header) -> Result<Vec<(u64, u64)>> {
    let n = header.entry_count as usize;
    if bytes.len() != SLOT_LEN * n {
        return Err(MapbufrError::ValidationError(format!(
            "index region is {} bytes, expected {} for {n} entries",
            bytes.len(),
            SLOT_LEN * n
        )));
    }
    let mut slots = Vec::with_capacity(n);
    for chunk in bytes.chunks_exact(SLOT_LEN) {
        let key = u64::from_le_bytes(chunk[0..8].try_into().expect("8-byte chunk"));
        let offset = u64::from_le_bytes(chunk[8..16].try_into().expect("8-byte chunk"));
        slots.push((key, offset));
    }
    Ok(slots)
}

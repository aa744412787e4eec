//! The 12-byte IntMap header.

use crate::error::{MapbufrError, Result};
use crate::intmap::types::TypeDescriptor;

/// Magic bytes identifying an IntMap buffer: ASCII `"mapint"`.
pub const MAGIC: [u8; 6] = *b"mapint";

/// Width in bytes of the header.
pub const HEADER_LEN: usize = 12;

/// The only format version IntMap currently defines.
pub const FORMAT_VERSION: u8 = 0;

/// Parsed view of an IntMap header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub version: u8,
    pub descriptor: TypeDescriptor,
    pub entry_count: u32,
}

impl Header {
    /// Parse the first [`HEADER_LEN`] bytes of a buffer.
    ///
    /// # Errors
    ///
    /// Returns [`MapbufrError::ValidationError`] if the buffer is too
    /// short, the magic doesn't match, the format version is unrecognized,
    /// or the type byte is malformed.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_LEN {
            return Err(MapbufrError::ValidationError(format!(
                "buffer of {} bytes is shorter than the {HEADER_LEN}-byte header",
                bytes.len()
            )));
        }
        if bytes[0..6] != MAGIC {
            return Err(MapbufrError::ValidationError(format!(
                "bad magic: expected {MAGIC:?}, got {:?}",
                &bytes[0..6]
            )));
        }
        let version = bytes[6];
        if version != FORMAT_VERSION {
            return Err(MapbufrError::ValidationError(format!("unsupported format version: {version}")));
        }
        let descriptor = TypeDescriptor::from_byte(bytes[7])?;

        let mut n_bytes = [0u8; 4];
        n_bytes.copy_from_slice(&bytes[8..12]);
        let entry_count = u32::from_le_bytes(n_bytes);

        Ok(Self { version, descriptor, entry_count })
    }

    /// Serialize the header to its 12-byte on-disk form.
    #[must_use]
    pub fn to_bytes(self) -> [u8; HEADER_LEN] {
        let mut out = [0u8; HEADER_LEN];
        out[0..6].copy_from_slice(&MAGIC);
        out[6] = self.version;
        out[7] = self.descriptor.to_byte();
        out[8..12].copy_from_slice(&self.entry_count.to_le_bytes());
        out
    }

    /// Byte width of one `(key, value)` slot: `2 * width`.
    #[must_use]
    pub fn slot_len(&self) -> usize {
        2 * self.descriptor.width.bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intmap::types::{NumClass, Width};

    #[test]
    fn round_trips_through_bytes() {
        let header = Header {
            version: FORMAT_VERSION,
            descriptor: TypeDescriptor {
                key_class: NumClass::Unsigned,
                value_class: NumClass::Unsigned,
                width: Width::W4,
            },
            entry_count: 20,
        };
        let bytes = header.to_bytes();
        assert_eq!(bytes.len(), HEADER_LEN);
        assert_eq!(Header::parse(&bytes).unwrap(), header);
    }

    #[test]
    fn rejects_bad_magic() {
        let mut bytes = [0u8; HEADER_LEN];
        bytes[0..6].copy_from_slice(b"notmap");
        assert!(Header::parse(&bytes).is_err());
    }
}

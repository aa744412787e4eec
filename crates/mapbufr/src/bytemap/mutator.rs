//! In-place value replacement over a mutable ByteMap buffer.
//!
//! Modeled as a separate writable view rather than a method on
//! [`ByteMapReader`](crate::bytemap::ByteMapReader): mutation needs an
//! exclusive `&mut [u8]`, which a read-only, possibly-shared reader cannot
//! offer.

use mapbufr_codec::CodecRegistry;

use crate::bytemap::header::{self, Header};
use crate::checksum;
use crate::error::{MapbufrError, Result};
use crate::eytzinger;

/// A writable view over an in-memory ByteMap buffer, for in-place value
/// replacement only. Structural changes (adding or removing keys) require
/// rebuilding the buffer with [`ByteMapWriter`](crate::bytemap::ByteMapWriter).
pub struct ByteMapMutator<'a> {
    buffer: &'a mut [u8],
    registry: CodecRegistry,
}

impl<'a> ByteMapMutator<'a> {
    /// Wrap a mutable buffer for in-place updates.
    #[must_use]
    pub fn new(buffer: &'a mut [u8]) -> Self {
        Self { buffer, registry: CodecRegistry }
    }

    /// Override the codec registry (defaults to [`CodecRegistry::default`]).
    #[must_use]
    pub fn with_registry(mut self, registry: CodecRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Replace the value stored under `key` with `value`, re-applying the
    /// map's codec and (for format version 1) recomputing the CRC trailer.
    ///
    /// The caller is responsible for external synchronization if `buffer`
    /// is shared; the write is not atomic across a power failure.
    ///
    /// # Errors
    ///
    /// Returns [`MapbufrError::KeyError`] if `key` is absent, and
    /// [`MapbufrError::LengthMismatch`] if the newly encoded blob is not
    /// exactly the size of the one it replaces.
    pub fn set(&mut self, key: u64, value: &[u8]) -> Result<()> {
        let header = Header::parse(self.buffer)?;
        let index_bytes = &self.buffer[header.index_start() as usize..header.data_start() as usize];
        let slots = header::parse_index(index_bytes, &header)?;

        let idx = eytzinger::search_by(&slots, &key, |(k, _)| *k)
            .ok_or_else(|| MapbufrError::KeyError(key.to_string()))?;
        let start = slots[idx].1 as usize;
        let end = if idx + 1 < slots.len() { slots[idx + 1].1 as usize } else { self.buffer.len() };
        let old_len = end - start;

        let mut blob = self.registry.compress(value, header.method)?;
        if header.has_checksum() {
            let crc = checksum::crc32c(&blob);
            blob.extend_from_slice(&checksum::encode(crc));
        }

        if blob.len() != old_len {
            return Err(MapbufrError::LengthMismatch { key, old_len, new_len: blob.len() });
        }

        self.buffer[start..end].copy_from_slice(&blob);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytemap::reader::ByteMapReader;
    use crate::bytemap::writer::ByteMapWriter;

    #[test]
    fn set_replaces_a_same_length_value() {
        let mut bytes = ByteMapWriter::default()
            .build_bytes([(1u64, b"hello".to_vec()), (2u64, b"world".to_vec())])
            .unwrap();
        ByteMapMutator::new(&mut bytes).set(1, b"HELLO").unwrap();
        let reader = ByteMapReader::from_bytes(bytes);
        assert_eq!(reader.get(1).unwrap(), b"HELLO");
        assert_eq!(reader.get(2).unwrap(), b"world");
    }

    #[test]
    fn set_rejects_a_different_length_value() {
        let mut bytes = ByteMapWriter::default().build_bytes([(1u64, b"hello".to_vec())]).unwrap();
        let err = ByteMapMutator::new(&mut bytes).set(1, b"hi").unwrap_err();
        assert!(matches!(err, MapbufrError::LengthMismatch { .. }));
    }

    #[test]
    fn set_on_missing_key_is_a_key_error() {
        let mut bytes = ByteMapWriter::default().build_bytes([(1u64, b"hello".to_vec())]).unwrap();
        let err = ByteMapMutator::new(&mut bytes).set(99, b"x").unwrap_err();
        assert!(matches!(err, MapbufrError::KeyError(_)));
    }
}

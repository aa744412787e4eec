//! Reads values out of an IntMap buffer.

use std::sync::OnceLock;

use crate::backing::{ByteSource, MmapSource};
use crate::error::{MapbufrError, Result};
use crate::eytzinger;
use crate::intmap::header::{self, Header};
use crate::intmap::types::Number;

/// A read-only view over an IntMap buffer.
///
/// Structurally the same idea as [`ByteMapReader`](crate::bytemap::ByteMapReader)
/// but simpler: there is no data region, so the index slots *are* the map —
/// each slot holds `(key, value)` inline, reinterpreted per the header's
/// type descriptor.
pub struct IntMapReader<S> {
    source: S,
    header: OnceLock<Header>,
    slots: OnceLock<Vec<(Number, Number)>>,
}

impl IntMapReader<Vec<u8>> {
    /// Wrap an owned buffer.
    #[must_use]
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self::from_source(bytes)
    }
}

impl IntMapReader<MmapSource> {
    /// Memory-map `path` read-only and wrap it.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or mapped.
    pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let source = MmapSource::open(path)?;
        tracing::info!(size = source.len(), "opened IntMap via mmap");
        Ok(Self::from_source(source))
    }
}

impl<S: ByteSource> IntMapReader<S> {
    /// Wrap an arbitrary [`ByteSource`].
    #[must_use]
    pub fn from_source(source: S) -> Self {
        Self { source, header: OnceLock::new(), slots: OnceLock::new() }
    }

    /// Parse (and cache) the 12-byte header.
    ///
    /// # Errors
    ///
    /// Returns [`MapbufrError::ValidationError`] if the magic, version, or
    /// type byte is invalid.
    pub fn header(&self) -> Result<Header> {
        if let Some(header) = self.header.get() {
            return Ok(*header);
        }
        let bytes = self.source.read_slice(0, header::HEADER_LEN as u64)?;
        let header = Header::parse(&bytes)?;
        let _ = self.header.set(header);
        Ok(header)
    }

    fn slots(&self) -> Result<&[(Number, Number)]> {
        if let Some(slots) = self.slots.get() {
            return Ok(slots);
        }
        let header = self.header()?;
        let n = header.entry_count as usize;
        let slot_len = header.slot_len();
        let width = header.descriptor.width;
        let start = header::HEADER_LEN as u64;
        let end = start + (slot_len * n) as u64;
        let bytes = self.source.read_slice(start, end)?;
        if bytes.len() != slot_len * n {
            return Err(MapbufrError::ValidationError(format!(
                "slot region is {} bytes, expected {} for {n} entries",
                bytes.len(),
                slot_len * n
            )));
        }

        let mut decoded = Vec::with_capacity(n);
        for chunk in bytes.chunks_exact(slot_len) {
            let (key_bytes, value_bytes) = chunk.split_at(width.bytes());
            let key = Number::decode(key_bytes, header.descriptor.key_class, width)?;
            let value = Number::decode(value_bytes, header.descriptor.value_class, width)?;
            decoded.push((key, value));
        }
        let _ = self.slots.set(decoded);
        Ok(self.slots.get().expect("just initialized"))
    }

    /// Number of entries in the map.
    ///
    /// # Errors
    ///
    /// Returns an error if the header cannot be parsed.
    pub fn len(&self) -> Result<usize> {
        Ok(self.header()?.entry_count as usize)
    }

    /// Whether the map is empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the header cannot be parsed.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Look up `key`, returning its value.
    ///
    /// # Errors
    ///
    /// Returns [`MapbufrError::KeyError`] if `key` is absent.
    pub fn get(&self, key: Number) -> Result<Number> {
        let slots = self.slots()?;
        let idx = eytzinger::search_by(slots, &key, |(k, _)| *k)
            .ok_or_else(|| MapbufrError::KeyError(key.to_string()))?;
        Ok(slots[idx].1)
    }

    /// Whether `key` is present.
    ///
    /// # Errors
    ///
    /// Returns an error if the header or slots cannot be parsed.
    pub fn contains(&self, key: Number) -> Result<bool> {
        Ok(eytzinger::search_by(self.slots()?, &key, |(k, _)| *k).is_some())
    }

    /// Keys in Eytzinger order (not sorted order).
    ///
    /// # Errors
    ///
    /// Returns an error if the header or slots cannot be parsed.
    pub fn keys(&self) -> Result<impl Iterator<Item = Number> + '_> {
        Ok(self.slots()?.iter().map(|(k, _)| *k))
    }

    /// `(key, value)` pairs in Eytzinger order (not sorted order).
    ///
    /// # Errors
    ///
    /// Returns an error if the header or slots cannot be parsed.
    pub fn items(&self) -> Result<impl Iterator<Item = (Number, Number)> + '_> {
        Ok(self.slots()?.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intmap::types::{NumClass, TypeDescriptor, Width};
    use crate::intmap::writer::IntMapWriter;

    fn unsigned_descriptor(width: Width) -> TypeDescriptor {
        TypeDescriptor { key_class: NumClass::Unsigned, value_class: NumClass::Unsigned, width }
    }

    #[test]
    fn zero_to_nineteen_maps_to_k_plus_one() {
        let entries = (0u64..20).map(|i| (Number::Unsigned(i), Number::Unsigned(i + 1)));
        let bytes = IntMapWriter::new(unsigned_descriptor(Width::W4)).build(entries).unwrap();
        let reader = IntMapReader::from_bytes(bytes);
        assert_eq!(reader.len().unwrap(), 20);
        for i in 0u64..20 {
            assert_eq!(reader.get(Number::Unsigned(i)).unwrap(), Number::Unsigned(i + 1));
        }
        assert!(matches!(reader.get(Number::Unsigned(20)), Err(MapbufrError::KeyError(_))));
    }

    #[test]
    fn signed_keys_round_trip() {
        let descriptor =
            TypeDescriptor { key_class: NumClass::Signed, value_class: NumClass::Signed, width: Width::W2 };
        let entries = (-10i64..10).map(|i| (Number::Signed(i), Number::Signed(-i)));
        let bytes = IntMapWriter::new(descriptor).build(entries).unwrap();
        let reader = IntMapReader::from_bytes(bytes);
        for i in -10i64..10 {
            assert_eq!(reader.get(Number::Signed(i)).unwrap(), Number::Signed(-i));
        }
    }
}

//! Builds an IntMap buffer: fixed-width `(key, value)` pairs, no data region.

use crate::error::{MapbufrError, Result};
use crate::eytzinger;
use crate::intmap::header::{FORMAT_VERSION, HEADER_LEN};
use crate::intmap::types::{Number, TypeDescriptor};
use crate::intmap::Header;

/// Builds IntMap buffers.
///
/// ```
/// use mapbufr::intmap::{IntMapWriter, TypeDescriptor, NumClass, Width, Number};
///
/// let descriptor = TypeDescriptor {
///     key_class: NumClass::Unsigned,
///     value_class: NumClass::Unsigned,
///     width: Width::W4,
/// };
/// let entries = (0u64..20).map(|i| (Number::Unsigned(i), Number::Unsigned(i + 1)));
/// let bytes = IntMapWriter::new(descriptor).build(entries).unwrap();
/// assert_eq!(bytes.len(), 12 + 20 * 8);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct IntMapWriter {
    descriptor: TypeDescriptor,
}

impl IntMapWriter {
    /// A writer for the given key/value type descriptor.
    #[must_use]
    pub fn new(descriptor: TypeDescriptor) -> Self {
        Self { descriptor }
    }

    /// Build a buffer from `entries`.
    ///
    /// # Errors
    ///
    /// Returns [`MapbufrError::ValidationError`] if `entries` contains a
    /// duplicate key, exceeds [`u32::MAX`] entries, or any key/value does
    /// not fit the descriptor's width and class.
    pub fn build(&self, entries: impl IntoIterator<Item = (Number, Number)>) -> Result<Vec<u8>> {
        let mut sorted: Vec<(Number, Number)> = entries.into_iter().collect();
        sorted.sort_by(|a, b| a.0.partial_cmp(&b.0).expect("keys within one class are totally ordered"));
        for pair in sorted.windows(2) {
            if pair[0].0 == pair[1].0 {
                return Err(MapbufrError::ValidationError(format!("duplicate key: {}", pair[0].0)));
            }
        }
        let n = sorted.len();
        let n_u32 = u32::try_from(n)
            .map_err(|_| MapbufrError::ValidationError(format!("{n} entries exceeds u32::MAX")))?;

        tracing::debug!(entries = n, width = self.descriptor.width.bytes(), "building IntMap");

        let eytzinger_pairs = eytzinger::permute(&sorted);

        let header = Header { version: FORMAT_VERSION, descriptor: self.descriptor, entry_count: n_u32 };
        let slot_len = header.slot_len();

        let mut out = Vec::with_capacity(HEADER_LEN + slot_len * n);
        out.extend_from_slice(&header.to_bytes());
        for (key, value) in eytzinger_pairs {
            out.extend_from_slice(&key.encode(self.descriptor.width)?);
            out.extend_from_slice(&value.encode(self.descriptor.width)?);
        }

        Ok(out)
    }
}

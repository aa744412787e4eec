//! Builds a ByteMap buffer from an in-memory key→value mapping.

use std::collections::HashMap;

use mapbufr_codec::{CodecRegistry, Method};

use crate::bytemap::header::{FORMAT_VERSION_0, FORMAT_VERSION_1, HEADER_LEN, Header, SLOT_LEN};
use crate::checksum;
use crate::error::{MapbufrError, Result};
use crate::eytzinger;

/// Builds ByteMap buffers.
///
/// ```
/// use mapbufr::bytemap::ByteMapWriter;
///
/// let bytes = ByteMapWriter::default()
///     .build_bytes([(1u64, b"hello".to_vec())])
///     .unwrap();
/// assert_eq!(bytes.len(), 16 + 16 + (5 + 4));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ByteMapWriter {
    registry: CodecRegistry,
    method: Method,
    version: u8,
}

impl Default for ByteMapWriter {
    fn default() -> Self {
        Self::new(Method::None)
    }
}

impl ByteMapWriter {
    /// A writer that compresses every value with `method` and always writes
    /// the format-1 CRC trailer.
    #[must_use]
    pub fn new(method: Method) -> Self {
        Self { registry: CodecRegistry, method, version: FORMAT_VERSION_1 }
    }

    /// Override the codec registry (defaults to [`CodecRegistry::default`]).
    #[must_use]
    pub fn with_registry(mut self, registry: CodecRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Emit format version 0: no per-value CRC trailer.
    #[must_use]
    pub fn without_checksum(mut self) -> Self {
        self.version = FORMAT_VERSION_0;
        self
    }

    /// Build a buffer directly from raw byte values.
    ///
    /// # Errors
    ///
    /// See [`Self::build`].
    pub fn build_bytes(&self, entries: impl IntoIterator<Item = (u64, Vec<u8>)>) -> Result<Vec<u8>> {
        self.build(entries, |v: &Vec<u8>| v.clone())
    }

    /// Build a buffer from `entries`, applying `encode` to each value before
    /// compression — the Rust-native counterpart of the source's
    /// `tobytesfn` hook.
    ///
    /// # Errors
    ///
    /// Returns [`MapbufrError::ValidationError`] if `entries` contains a
    /// duplicate key or more than [`u32::MAX`] entries. Returns
    /// [`MapbufrError::Codec`] if compression fails for any value.
    pub fn build<V>(
        &self,
        entries: impl IntoIterator<Item = (u64, V)>,
        encode: impl Fn(&V) -> Vec<u8>,
    ) -> Result<Vec<u8>> {
        let entries: Vec<(u64, V)> = entries.into_iter().collect();
        let n = entries.len();
        let n_u32 = u32::try_from(n)
            .map_err(|_| MapbufrError::ValidationError(format!("{n} entries exceeds u32::MAX")))?;

        let mut sorted_keys: Vec<u64> = entries.iter().map(|(k, _)| *k).collect();
        sorted_keys.sort_unstable();
        for pair in sorted_keys.windows(2) {
            if pair[0] == pair[1] {
                return Err(MapbufrError::ValidationError(format!("duplicate key: {}", pair[0])));
            }
        }

        tracing::debug!(entries = n, method = self.method.name(), "building ByteMap");

        let mut blobs: HashMap<u64, Vec<u8>> = HashMap::with_capacity(n);
        for (key, value) in &entries {
            let raw = encode(value);
            let compressed = self.registry.compress(&raw, self.method)?;
            let mut blob = compressed;
            if self.version == FORMAT_VERSION_1 {
                let crc = checksum::crc32c(&blob);
                blob.extend_from_slice(&checksum::encode(crc));
            }
            blobs.insert(*key, blob);
        }

        let eytzinger_keys = eytzinger::permute(&sorted_keys);

        let mut offsets = Vec::with_capacity(n);
        let mut next_offset = HEADER_LEN as u64 + SLOT_LEN as u64 * n as u64;
        for (i, key) in eytzinger_keys.iter().enumerate() {
            offsets.push(next_offset);
            if i + 1 < n {
                next_offset += blobs[key].len() as u64;
            }
        }

        let header = Header { version: self.version, method: self.method, entry_count: n_u32 };
        let total_len = next_offset as usize + eytzinger_keys.last().map_or(0, |k| blobs[k].len());

        let mut out = Vec::with_capacity(total_len);
        out.extend_from_slice(&header.to_bytes());
        for (key, offset) in eytzinger_keys.iter().zip(&offsets) {
            out.extend_from_slice(&key.to_le_bytes());
            out.extend_from_slice(&offset.to_le_bytes());
        }
        for key in &eytzinger_keys {
            out.extend_from_slice(&blobs[key]);
        }

        Ok(out)
    }
}

//! Reads values out of a ByteMap buffer without deserializing the whole map.

use std::sync::OnceLock;

use mapbufr_codec::CodecRegistry;

use crate::backing::{ByteSource, MmapSource};
use crate::bytemap::header::{self, Header};
use crate::checksum;
use crate::error::{MapbufrError, Result};
use crate::eytzinger;

/// A read-only view over a ByteMap buffer.
///
/// Generic over its backing store: construct one over an owned `Vec<u8>`
/// ([`Self::from_bytes`]), a borrowed slice ([`Self::from_slice`]), a
/// memory-mapped file ([`Self::open`]), or any type implementing
/// [`ByteSource`] ([`Self::from_source`]).
///
/// The header and index are parsed lazily and cached on first access, since
/// the backing store may have nonzero per-read latency (a remote blob
/// store, say).
pub struct ByteMapReader<S> {
    source: S,
    registry: CodecRegistry,
    verify_checksum: bool,
    header: OnceLock<Header>,
    index: OnceLock<Vec<(u64, u64)>>,
}

impl ByteMapReader<Vec<u8>> {
    /// Wrap an owned buffer.
    #[must_use]
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self::from_source(bytes)
    }
}

impl ByteMapReader<MmapSource> {
    /// Memory-map `path` read-only and wrap it.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or mapped.
    pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let source = MmapSource::open(path)?;
        tracing::info!(size = source.len(), "opened ByteMap via mmap");
        Ok(Self::from_source(source))
    }
}

impl<S: ByteSource> ByteMapReader<S> {
    /// Wrap an arbitrary [`ByteSource`].
    #[must_use]
    pub fn from_source(source: S) -> Self {
        Self {
            source,
            registry: CodecRegistry,
            verify_checksum: true,
            header: OnceLock::new(),
            index: OnceLock::new(),
        }
    }

    /// Override the codec registry (defaults to [`CodecRegistry::default`]).
    #[must_use]
    pub fn with_registry(mut self, registry: CodecRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Skip CRC-32C verification on every lookup — a trusted-input fast
    /// path. Has no effect on format version 0, which carries no checksum.
    #[must_use]
    pub fn without_checksum_verification(mut self) -> Self {
        self.verify_checksum = false;
        self
    }

    /// Parse (and cache) the 16-byte header.
    ///
    /// # Errors
    ///
    /// Returns [`MapbufrError::ValidationError`] if the magic, version, or
    /// size is invalid, or [`MapbufrError::Codec`] if the codec tag is
    /// unrecognized.
    pub fn header(&self) -> Result<Header> {
        if let Some(header) = self.header.get() {
            return Ok(*header);
        }
        let bytes = self.source.read_slice(0, header::HEADER_LEN as u64)?;
        let header = Header::parse(&bytes)?;
        let _ = self.header.set(header);
        Ok(header)
    }

    /// Parse (and cache) the index: `N` `(key, offset)` pairs in Eytzinger order.
    fn index(&self) -> Result<&[(u64, u64)]> {
        if let Some(index) = self.index.get() {
            return Ok(index);
        }
        let header = self.header()?;
        let start = header.index_start();
        let end = header.data_start();
        let bytes = self.source.read_slice(start, end)?;
        let slots = header::parse_index(&bytes, &header)?;
        let _ = self.index.set(slots);
        Ok(self.index.get().expect("just initialized"))
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

    /// Whether `key` is present.
    ///
    /// # Errors
    ///
    /// Returns an error if the header or index cannot be parsed.
    pub fn contains(&self, key: u64) -> Result<bool> {
        Ok(eytzinger::search_by(self.index()?, &key, |(k, _)| *k).is_some())
    }

    fn slot_bounds(&self, idx: usize) -> Result<(u64, u64)> {
        let slots = self.index()?;
        let start = slots[idx].1;
        let end = if idx + 1 < slots.len() { slots[idx + 1].1 } else { self.source.len() };
        Ok((start, end))
    }

    /// Decompress and return the value stored at Eytzinger slot `idx`,
    /// verifying its CRC if enabled.
    fn value_at(&self, idx: usize) -> Result<Vec<u8>> {
        let header = self.header()?;
        let (start, end) = self.slot_bounds(idx)?;
        let blob = self.source.read_slice(start, end)?;

        let body = if header.has_checksum() {
            if blob.len() < checksum::CHECKSUM_LEN {
                return Err(MapbufrError::ValidationError(format!(
                    "blob at offset {start} is shorter than the checksum trailer"
                )));
            }
            if self.verify_checksum && !checksum::verify(&blob) {
                let key = self.index()?[idx].0;
                tracing::warn!(key, offset = start, "CRC-32C mismatch");
                return Err(MapbufrError::ValidationError(format!(
                    "CRC-32C mismatch for value at key {key}"
                )));
            }
            &blob[..blob.len() - checksum::CHECKSUM_LEN]
        } else {
            &blob[..]
        };

        let key = self.index()?[idx].0;
        Ok(self.registry.decompress(body, header.method, &key.to_string())?)
    }

    /// Look up `key`, returning its decompressed value.
    ///
    /// # Errors
    ///
    /// Returns [`MapbufrError::KeyError`] if `key` is absent,
    /// [`MapbufrError::ValidationError`] if the blob's CRC fails to verify,
    /// or [`MapbufrError::Codec`] if decompression fails.
    pub fn get(&self, key: u64) -> Result<Vec<u8>> {
        let idx = eytzinger::search_by(self.index()?, &key, |(k, _)| *k)
            .ok_or_else(|| MapbufrError::KeyError(key.to_string()))?;
        self.value_at(idx)
    }

    /// Look up `key`, applying `decode` to the raw decompressed bytes.
    ///
    /// The Rust-native counterpart of the source's `frombytesfn` hook.
    ///
    /// # Errors
    ///
    /// See [`Self::get`].
    pub fn get_decoded<T>(&self, key: u64, decode: impl FnOnce(Vec<u8>) -> T) -> Result<T> {
        self.get(key).map(decode)
    }

    /// Look up `key`, returning `default` on a miss. Errors other than a
    /// missing key still propagate.
    ///
    /// # Errors
    ///
    /// Returns any error from [`Self::get`] other than [`MapbufrError::KeyError`].
    pub fn get_or(&self, key: u64, default: Vec<u8>) -> Result<Vec<u8>> {
        match self.get(key) {
            Ok(value) => Ok(value),
            Err(MapbufrError::KeyError(_)) => Ok(default),
            Err(err) => Err(err),
        }
    }

    /// Keys in Eytzinger order (not sorted order).
    ///
    /// # Errors
    ///
    /// Returns an error if the header or index cannot be parsed.
    pub fn keys(&self) -> Result<impl Iterator<Item = u64> + '_> {
        Ok(self.index()?.iter().map(|(k, _)| *k))
    }

    /// Decompressed values in Eytzinger order (not sorted order).
    ///
    /// # Errors
    ///
    /// Returns an error if the header or index cannot be parsed.
    pub fn values(&self) -> Result<impl Iterator<Item = Result<Vec<u8>>> + '_> {
        let n = self.index()?.len();
        Ok((0..n).map(move |i| self.value_at(i)))
    }

    /// `(key, value)` pairs in Eytzinger order (not sorted order).
    ///
    /// # Errors
    ///
    /// Returns an error if the header or index cannot be parsed.
    pub fn items(&self) -> Result<impl Iterator<Item = (u64, Result<Vec<u8>>)> + '_> {
        let slots = self.index()?;
        Ok(slots.iter().enumerate().map(move |(i, (k, _))| (*k, self.value_at(i))))
    }

    /// Materialize the full underlying buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read in full.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(self.source.read_slice(0, self.source.len())?.into_owned())
    }

    /// Eagerly check every structural invariant from the format (magic,
    /// version, size, monotonic offsets, Eytzinger ordering, and — for
    /// format version 1 — every value's CRC-32C).
    ///
    /// # Errors
    ///
    /// Returns [`MapbufrError::ValidationError`] describing the first
    /// violation found.
    pub fn validate(&self) -> Result<()> {
        let header = self.header()?;
        let buffer_len = self.source.len();
        let min_len = header.data_start();
        if buffer_len < min_len {
            return Err(MapbufrError::ValidationError(format!(
                "buffer is {buffer_len} bytes, shorter than the {min_len}-byte header+index"
            )));
        }
        if header.entry_count == 0 && buffer_len != header::HEADER_LEN as u64 {
            return Err(MapbufrError::ValidationError(format!(
                "empty map must be exactly {} bytes, got {buffer_len}",
                header::HEADER_LEN
            )));
        }

        let slots = self.index()?;

        // Eytzinger invariant: an inorder (left, self, right) walk of the
        // implicit heap must yield strictly ascending keys.
        let inorder = inorder_keys(slots);
        if !inorder.windows(2).all(|w| w[0] < w[1]) {
            return Err(MapbufrError::ValidationError(
                "index is not in valid Eytzinger order (inorder walk is not ascending)".to_string(),
            ));
        }

        // Offsets must be strictly increasing in sorted-key order, not
        // Eytzinger order.
        let mut by_key: Vec<(u64, u64)> = slots.to_vec();
        by_key.sort_unstable_by_key(|(k, _)| *k);
        for pair in by_key.windows(2) {
            if pair[0].1 >= pair[1].1 {
                return Err(MapbufrError::ValidationError(format!(
                    "offsets not strictly increasing in key order: key {} at {} >= key {} at {}",
                    pair[0].0, pair[0].1, pair[1].0, pair[1].1
                )));
            }
        }
        if let Some(&(key, offset)) = by_key.last() {
            if !(min_len..=buffer_len).contains(&offset) {
                return Err(MapbufrError::ValidationError(format!(
                    "offset {offset} for key {key} out of bounds [{min_len}, {buffer_len}]"
                )));
            }
        }

        if header.has_checksum() {
            for i in 0..slots.len() {
                self.value_at(i)?;
            }
        }

        Ok(())
    }
}

/// Read the keys of an Eytzinger-ordered `slots` array back out in the
/// ascending order they were permuted from, by walking the implicit heap
/// in-order (left child, self, right child).
fn inorder_keys(slots: &[(u64, u64)]) -> Vec<u64> {
    let n = slots.len();
    let mut out = Vec::with_capacity(n);

    // Reuse the same enter/emit shape as the permutation builder.
    enum Step {
        Enter(usize),
        Emit(usize),
    }
    let mut work = Vec::new();
    if n > 0 {
        work.push(Step::Enter(1));
    }
    while let Some(step) = work.pop() {
        match step {
            Step::Enter(k) => {
                if k > n {
                    continue;
                }
                work.push(Step::Enter(2 * k + 1));
                work.push(Step::Emit(k));
                work.push(Step::Enter(2 * k));
            }
            Step::Emit(k) => out.push(slots[k - 1].0),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytemap::writer::ByteMapWriter;
    use mapbufr_codec::Method;

    #[test]
    fn empty_map_reports_empty_and_raises_key_error() {
        let bytes = ByteMapWriter::default().build_bytes(Vec::<(u64, Vec<u8>)>::new()).unwrap();
        let reader = ByteMapReader::from_bytes(bytes);
        assert_eq!(reader.len().unwrap(), 0);
        assert!(reader.is_empty().unwrap());
        assert!(matches!(reader.get(0), Err(MapbufrError::KeyError(_))));
        assert_eq!(reader.keys().unwrap().count(), 0);
    }

    #[test]
    fn two_entries_round_trip_and_miss_is_key_error() {
        let bytes = ByteMapWriter::default()
            .build_bytes([(1u64, b"hello".to_vec()), (2u64, b"world".to_vec())])
            .unwrap();
        let reader = ByteMapReader::from_bytes(bytes);
        assert_eq!(reader.len().unwrap(), 2);
        assert_eq!(reader.get(1).unwrap(), b"hello");
        assert_eq!(reader.get(2).unwrap(), b"world");
        assert!(matches!(reader.get(3), Err(MapbufrError::KeyError(_))));
    }

    #[test]
    fn flipping_a_data_byte_fails_crc_verification() {
        let mut bytes = ByteMapWriter::default()
            .build_bytes([(1u64, b"hello".to_vec()), (2u64, b"world".to_vec())])
            .unwrap();
        let header = Header::parse(&bytes).unwrap();
        let data_start = header.data_start() as usize;
        bytes[data_start] ^= 0xFF;
        let reader = ByteMapReader::from_bytes(bytes);
        // One of the two keys now has a corrupted blob.
        let results: Vec<_> = [1u64, 2u64].into_iter().map(|k| reader.get(k)).collect();
        assert!(results.iter().any(|r| matches!(r, Err(MapbufrError::ValidationError(_)))));
    }

    #[test]
    fn get_or_falls_back_only_on_miss() {
        let bytes = ByteMapWriter::default().build_bytes([(1u64, b"hi".to_vec())]).unwrap();
        let reader = ByteMapReader::from_bytes(bytes);
        assert_eq!(reader.get_or(1, b"default".to_vec()).unwrap(), b"hi");
        assert_eq!(reader.get_or(99, b"default".to_vec()).unwrap(), b"default");
    }

    #[test]
    fn validate_accepts_well_formed_buffers_and_rejects_truncation() {
        let bytes = ByteMapWriter::default()
            .build_bytes([(1u64, b"hello".to_vec()), (2u64, b"world".to_vec())])
            .unwrap();
        let reader = ByteMapReader::from_bytes(bytes.clone());
        reader.validate().unwrap();

        let truncated = bytes[..bytes.len() - 1].to_vec();
        let reader = ByteMapReader::from_bytes(truncated);
        assert!(reader.validate().is_err());
    }

    #[test]
    fn compression_matrix_round_trips() {
        for method in [Method::Gzip, Method::Brotli, Method::Zstd, Method::Lzma] {
            let bytes = ByteMapWriter::new(method)
                .build_bytes([(1u64, b"hello, compressed world".to_vec())])
                .unwrap();
            let reader = ByteMapReader::from_bytes(bytes);
            assert_eq!(reader.get(1).unwrap(), b"hello, compressed world");
        }
    }

    #[test]
    fn slice_addressable_source_matches_bytes_backed_reader() {
        use crate::backing::SliceFn;

        let bytes =
            ByteMapWriter::default().build_bytes([(1u64, b"hi".to_vec()), (7u64, b"there".to_vec())]).unwrap();
        let owned = bytes.clone();
        let source = SliceFn::new(
            || owned.len() as u64,
            move |start, end| Ok(owned[start as usize..end as usize].to_vec()),
        );
        let reader = ByteMapReader::from_source(source);
        assert_eq!(reader.get(1).unwrap(), b"hi");
        assert_eq!(reader.get(7).unwrap(), b"there");
        assert!(matches!(reader.get(2), Err(MapbufrError::KeyError(_))));
    }
}

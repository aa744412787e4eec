//! The capability a mapbufr reader needs from its backing store: a length
//! and a way to read an arbitrary byte range. Implemented for owned
//! buffers, borrowed slices, memory-mapped files, and any caller-supplied
//! object exposing the same two operations (a blob-store proxy, an HTTP
//! range reader, ...).

use std::borrow::Cow;
use std::fs::File;
use std::path::Path;

use memmap2::Mmap;

use crate::error::{MapbufrError, Result};

/// A random-access byte source a reader can be built over.
///
/// Implementors need not hold the whole buffer in memory; `read_slice` is
/// the only method on the hot lookup path that touches the data region, and
/// is called at most once per [`get`](crate::bytemap::ByteMapReader::get).
pub trait ByteSource {
    /// Total length of the backing store, in bytes.
    fn len(&self) -> u64;

    /// Whether the backing store is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read the half-open byte range `[start, end)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the range is out of bounds or the underlying
    /// store cannot satisfy the read (e.g. an I/O failure).
    fn read_slice(&self, start: u64, end: u64) -> Result<Cow<'_, [u8]>>;
}

impl ByteSource for Vec<u8> {
    fn len(&self) -> u64 {
        Vec::len(self) as u64
    }

    fn read_slice(&self, start: u64, end: u64) -> Result<Cow<'_, [u8]>> {
        slice_range(self, start, end).map(Cow::Borrowed)
    }
}

impl ByteSource for [u8] {
    fn len(&self) -> u64 {
        <[u8]>::len(self) as u64
    }

    fn read_slice(&self, start: u64, end: u64) -> Result<Cow<'_, [u8]>> {
        slice_range(self, start, end).map(Cow::Borrowed)
    }
}

impl<T: ByteSource + ?Sized> ByteSource for Box<T> {
    fn len(&self) -> u64 {
        T::len(self)
    }

    fn read_slice(&self, start: u64, end: u64) -> Result<Cow<'_, [u8]>> {
        T::read_slice(self, start, end)
    }
}

fn slice_range(data: &[u8], start: u64, end: u64) -> Result<&[u8]> {
    let (start, end) = (start as usize, end as usize);
    data.get(start..end).ok_or_else(|| {
        MapbufrError::ValidationError(format!(
            "read [{start}, {end}) out of bounds for {}-byte source",
            data.len()
        ))
    })
}

/// A memory-mapped file, opened read-only for the lifetime of the reader.
pub struct MmapSource {
    mmap: Mmap,
}

impl MmapSource {
    /// Memory-map `path` read-only.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or mapped.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        // SAFETY: the mapping is read-only and this reader does not outlive
        // the `Mmap`; concurrent external writers to the file are the
        // caller's responsibility, per the format's concurrency model.
        let mmap = unsafe { Mmap::map(&file)? };
        Ok(Self { mmap })
    }
}

impl ByteSource for MmapSource {
    fn len(&self) -> u64 {
        self.mmap.len() as u64
    }

    fn read_slice(&self, start: u64, end: u64) -> Result<Cow<'_, [u8]>> {
        slice_range(&self.mmap, start, end).map(Cow::Borrowed)
    }
}

/// Adapts any `len`/range-read closure pair into a [`ByteSource`] — the
/// capability interface for a duck-typed backing store (a blob-store proxy,
/// an HTTP range reader) that can only hand back owned byte ranges.
pub struct SliceFn<L, R> {
    len_fn: L,
    read_fn: R,
}

impl<L, R> SliceFn<L, R>
where
    L: Fn() -> u64,
    R: Fn(u64, u64) -> Result<Vec<u8>>,
{
    /// Wrap `len_fn` (total size) and `read_fn` (half-open range read).
    pub fn new(len_fn: L, read_fn: R) -> Self {
        Self { len_fn, read_fn }
    }
}

impl<L, R> ByteSource for SliceFn<L, R>
where
    L: Fn() -> u64,
    R: Fn(u64, u64) -> Result<Vec<u8>>,
{
    fn len(&self) -> u64 {
        (self.len_fn)()
    }

    fn read_slice(&self, start: u64, end: u64) -> Result<Cow<'_, [u8]>> {
        (self.read_fn)(start, end).map(Cow::Owned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vec_source_reads_in_bounds_ranges() {
        let data = vec![1u8, 2, 3, 4, 5];
        assert_eq!(&*data.read_slice(1, 3).unwrap(), &[2, 3]);
        assert!(data.read_slice(4, 10).is_err());
    }

    #[test]
    fn slice_fn_adapts_a_closure_pair() {
        let data = vec![10u8, 20, 30, 40];
        let source = SliceFn::new(
            || data.len() as u64,
            |start, end| Ok(data[start as usize..end as usize].to_vec()),
        );
        assert_eq!(source.len(), 4);
        assert_eq!(&*source.read_slice(1, 3).unwrap(), &[20, 30]);
    }
}

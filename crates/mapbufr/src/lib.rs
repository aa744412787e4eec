//! `mapbufr`: a zero-parse binary map format.
//!
//! A `mapbufr` buffer is an immutable mapping from unsigned 64-bit keys to
//! variable-length byte payloads (module [`bytemap`]), or a sibling format
//! for fixed-width integer values with no data region ([`intmap`]). Both
//! commit to an Eytzinger (breadth-first heap) index layout ([`eytzinger`])
//! so a reader holding only a byte range — a buffer, a memory map, or any
//! [`ByteSource`] — can locate a value with a single cache-friendly index
//! probe and no allocation proportional to map size.
//!
//! ```
//! use mapbufr::bytemap::{ByteMapReader, ByteMapWriter};
//!
//! let bytes = ByteMapWriter::default()
//!     .build_bytes([(1u64, b"hello".to_vec()), (2, b"world".to_vec())])
//!     .unwrap();
//! let reader = ByteMapReader::from_bytes(bytes);
//! assert_eq!(reader.get(1).unwrap(), b"hello");
//! ```

pub mod backing;
pub mod bytemap;
pub mod checksum;
pub mod error;
pub mod eytzinger;
pub mod intmap;

pub use backing::ByteSource;
pub use error::{MapbufrError, Result};
pub use mapbufr_codec::{CodecRegistry, Method};

//! IntMap: a fixed-width `Number → Number` sibling of [`ByteMap`](crate::bytemap).
//!
//! Unlike ByteMap there is no data region: every slot is exactly
//! `2 * width` bytes, so the Eytzinger-ordered index *is* the map.

pub mod header;
pub mod reader;
pub mod types;
pub mod writer;

pub use header::Header;
pub use reader::IntMapReader;
pub use types::{NumClass, Number, TypeDescriptor, Width};
pub use writer::IntMapWriter;

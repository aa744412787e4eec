//! ByteMap: an immutable `u64 → bytes` mapping with an Eytzinger-ordered
//! index and a length-prefixed, optionally compressed data region.

pub mod header;
pub mod mutator;
pub mod reader;
pub mod writer;

pub use header::Header;
pub use mutator::ByteMapMutator;
pub use reader::ByteMapReader;
pub use writer::ByteMapWriter;

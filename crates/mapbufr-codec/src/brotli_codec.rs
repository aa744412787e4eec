//! Mode `br`: Brotli via the `brotli` crate.

use std::io::{Read, Write};

use crate::Result;
use crate::error::CodecError;

const NAME: &str = "br";
const BUFFER_SIZE: usize = 4096;
const QUALITY: i32 = 9;
const LG_WINDOW_SIZE: i32 = 22;

pub fn compress(data: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    let mut writer =
        brotli::CompressorWriter::new(&mut out, BUFFER_SIZE, QUALITY as u32, LG_WINDOW_SIZE as u32);
    writer
        .write_all(data)
        .map_err(|source| CodecError::CompressionError { method: NAME, source })?;
    drop(writer);
    Ok(out)
}

pub fn decompress(data: &[u8], context_label: &str) -> Result<Vec<u8>> {
    let mut reader = brotli::Decompressor::new(data, BUFFER_SIZE);
    let mut out = Vec::new();
    reader
        .read_to_end(&mut out)
        .map_err(|source| CodecError::DecompressionError { context: context_label.to_string(), source })?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let data = b"hello world, brotli me".repeat(8);
        let compressed = compress(&data).unwrap();
        let decompressed = decompress(&compressed, "test").unwrap();
        assert_eq!(decompressed, data);
    }
}

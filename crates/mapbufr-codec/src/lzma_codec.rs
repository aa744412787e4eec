//! Mode `lzma`: LZMA/XZ via the `xz2` crate.

use std::io::Read;

use xz2::read::{XzDecoder, XzEncoder};

use crate::Result;
use crate::error::CodecError;

const NAME: &str = "lzma";
const PRESET: u32 = 6;

pub fn compress(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = XzEncoder::new(data, PRESET);
    let mut out = Vec::new();
    encoder
        .read_to_end(&mut out)
        .map_err(|source| CodecError::CompressionError { method: NAME, source })?;
    Ok(out)
}

pub fn decompress(data: &[u8], context_label: &str) -> Result<Vec<u8>> {
    let mut decoder = XzDecoder::new(data);
    let mut out = Vec::new();
    decoder
        .read_to_end(&mut out)
        .map_err(|source| CodecError::DecompressionError { context: context_label.to_string(), source })?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let data = b"hello world, lzma me".repeat(8);
        let compressed = compress(&data).unwrap();
        let decompressed = decompress(&compressed, "test").unwrap();
        assert_eq!(decompressed, data);
    }
}

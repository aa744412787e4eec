//! Mode `gzip`: DEFLATE via `flate2`.

use std::io::{Read, Write};

use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;

use crate::Result;
use crate::error::CodecError;

const NAME: &str = "gzip";

pub fn compress(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(data)
        .map_err(|source| CodecError::CompressionError { method: NAME, source })?;
    encoder
        .finish()
        .map_err(|source| CodecError::CompressionError { method: NAME, source })
}

pub fn decompress(data: &[u8], context_label: &str) -> Result<Vec<u8>> {
    let mut decoder = GzDecoder::new(data);
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
        let data = b"hello world, gzip me".repeat(8);
        let compressed = compress(&data).unwrap();
        let decompressed = decompress(&compressed, "test").unwrap();
        assert_eq!(decompressed, data);
    }
}

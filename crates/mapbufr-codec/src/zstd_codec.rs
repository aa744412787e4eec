//! Mode `zstd`: Zstandard via the `zstd` crate.

use crate::Result;
use crate::error::CodecError;

const NAME: &str = "zstd";
const LEVEL: i32 = 0;

pub fn compress(data: &[u8]) -> Result<Vec<u8>> {
    zstd::stream::encode_all(data, LEVEL)
        .map_err(|source| CodecError::CompressionError { method: NAME, source })
}

pub fn decompress(data: &[u8], context_label: &str) -> Result<Vec<u8>> {
    zstd::stream::decode_all(data)
        .map_err(|source| CodecError::DecompressionError { context: context_label.to_string(), source })
}

//! CRC-32C (Castagnoli) checksum primitive.
//!
//! Applied to each value's bytes *after* compression. Persisted as 4 bytes
//! little-endian, trailing the compressed blob.

/// Width in bytes of the trailing checksum.
pub const CHECKSUM_LEN: usize = 4;

/// Compute the CRC-32C of `data`.
#[must_use]
pub fn crc32c(data: &[u8]) -> u32 {
    crc32c::crc32c(data)
}

/// Encode a CRC-32C as 4 little-endian bytes.
#[must_use]
pub fn encode(crc: u32) -> [u8; CHECKSUM_LEN] {
    crc.to_le_bytes()
}

/// Decode a 4-byte little-endian trailer back into a CRC-32C value.
#[must_use]
pub fn decode(trailer: &[u8]) -> u32 {
    let mut bytes = [0u8; CHECKSUM_LEN];
    bytes.copy_from_slice(trailer);
    u32::from_le_bytes(bytes)
}

/// Verify that `blob`'s trailing 4 bytes are the CRC-32C of the bytes before them.
#[must_use]
pub fn verify(blob: &[u8]) -> bool {
    if blob.len() < CHECKSUM_LEN {
        return false;
    }
    let (body, trailer) = blob.split_at(blob.len() - CHECKSUM_LEN);
    decode(trailer) == crc32c(body)
}

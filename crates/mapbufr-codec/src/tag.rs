//! ASCII codec tag encoding: 4 bytes, right-justified, left-padded with `'0'`.

/// Width in bytes of an encoded codec tag.
pub const TAG_LEN: usize = 4;

/// Encode `name` (at most 4 ASCII bytes) into a right-justified, zero-padded tag.
///
/// # Panics
///
/// Panics if `name` is longer than [`TAG_LEN`] bytes; this only happens for
/// codec names defined in this crate, never for caller input.
pub fn encode(name: &str) -> [u8; TAG_LEN] {
    let bytes = name.as_bytes();
    assert!(bytes.len() <= TAG_LEN, "codec name longer than tag width");
    let mut tag = [b'0'; TAG_LEN];
    let start = TAG_LEN - bytes.len();
    tag[start..].copy_from_slice(bytes);
    tag
}

/// Decode a tag by stripping leading `'0'` padding, lowercased for matching.
pub fn decode(raw: &[u8; TAG_LEN]) -> String {
    let first_non_zero = raw.iter().position(|&b| b != b'0').unwrap_or(TAG_LEN);
    String::from_utf8_lossy(&raw[first_non_zero..]).to_lowercase()
}

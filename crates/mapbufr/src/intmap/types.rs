//! The tagged numeric types an IntMap key or value lane can hold.
//!
//! The source determines a slot's width and interpretation from runtime
//! data (a type-descriptor byte). This module models that as a tagged
//! variant dispatched once, at reader construction, so every subsequent
//! lane decode is a straight-line match rather than a repeated runtime
//! branch tree.

use std::fmt;

use crate::error::{MapbufrError, Result};

/// Which family a numeric lane belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumClass {
    Unsigned,
    Signed,
    Floating,
    Complex,
}

impl NumClass {
    fn code(self) -> u8 {
        match self {
            NumClass::Unsigned => 0,
            NumClass::Signed => 1,
            NumClass::Floating => 2,
            NumClass::Complex => 3,
        }
    }

    fn from_code(code: u8) -> Result<Self> {
        match code {
            0 => Ok(NumClass::Unsigned),
            1 => Ok(NumClass::Signed),
            2 => Ok(NumClass::Floating),
            3 => Ok(NumClass::Complex),
            other => Err(MapbufrError::ValidationError(format!("invalid numeric class: {other}"))),
        }
    }
}

/// Lane width in bytes: one of 1, 2, 4, 8.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Width {
    W1 = 1,
    W2 = 2,
    W4 = 4,
    W8 = 8,
}

impl Width {
    /// Width in bytes.
    #[must_use]
    pub const fn bytes(self) -> usize {
        self as usize
    }

    fn log2(self) -> u8 {
        match self {
            Width::W1 => 0,
            Width::W2 => 1,
            Width::W4 => 2,
            Width::W8 => 3,
        }
    }

    fn from_log2(code: u8) -> Result<Self> {
        match code {
            0 => Ok(Width::W1),
            1 => Ok(Width::W2),
            2 => Ok(Width::W4),
            3 => Ok(Width::W8),
            other => Err(MapbufrError::ValidationError(format!("invalid width code: {other}"))),
        }
    }
}

/// The packed `(key_class << 5) | (value_class << 2) | log2(width_bytes)` byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeDescriptor {
    pub key_class: NumClass,
    pub value_class: NumClass,
    pub width: Width,
}

impl TypeDescriptor {
    /// Pack into the on-disk type byte.
    #[must_use]
    pub fn to_byte(self) -> u8 {
        (self.key_class.code() << 5) | (self.value_class.code() << 2) | self.width.log2()
    }

    /// Unpack a type byte.
    ///
    /// # Errors
    ///
    /// Returns [`MapbufrError::ValidationError`] if any field is out of range.
    pub fn from_byte(byte: u8) -> Result<Self> {
        let key_class = NumClass::from_code((byte >> 5) & 0b111)?;
        let value_class = NumClass::from_code((byte >> 2) & 0b111)?;
        let width = Width::from_log2(byte & 0b11)?;
        Ok(Self { key_class, value_class, width })
    }
}

/// A decoded key or value lane.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub enum Number {
    Unsigned(u64),
    Signed(i64),
    Float(f64),
    /// Two IEEE-754 single-precision components: `(real, imaginary)`.
    Complex(f32, f32),
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Unsigned(v) => write!(f, "{v}"),
            Number::Signed(v) => write!(f, "{v}"),
            Number::Float(v) => write!(f, "{v}"),
            Number::Complex(re, im) => write!(f, "{re}+{im}i"),
        }
    }
}

impl Number {
    /// Encode this value into exactly `width.bytes()` little-endian bytes.
    ///
    /// # Errors
    ///
    /// Returns [`MapbufrError::ValidationError`] if the value does not fit
    /// `width` (an out-of-range integer, or `Floating`/`Complex` paired with
    /// an unsupported width).
    pub fn encode(self, width: Width) -> Result<Vec<u8>> {
        let w = width.bytes();
        match self {
            Number::Unsigned(v) => {
                let full = v.to_le_bytes();
                if w < 8 && (v >> (w * 8)) != 0 {
                    return Err(MapbufrError::ValidationError(format!(
                        "unsigned value {v} does not fit in {w} bytes"
                    )));
                }
                Ok(full[..w].to_vec())
            }
            Number::Signed(v) => {
                let full = v.to_le_bytes();
                let fits = if w >= 8 { true } else { sign_extends_cleanly(v, w) };
                if !fits {
                    return Err(MapbufrError::ValidationError(format!(
                        "signed value {v} does not fit in {w} bytes"
                    )));
                }
                Ok(full[..w].to_vec())
            }
            Number::Float(v) => match width {
                Width::W4 => Ok((v as f32).to_le_bytes().to_vec()),
                Width::W8 => Ok(v.to_le_bytes().to_vec()),
                _ => Err(MapbufrError::ValidationError("floating class requires width 4 or 8".into())),
            },
            Number::Complex(re, im) => match width {
                Width::W8 => {
                    let mut out = Vec::with_capacity(8);
                    out.extend_from_slice(&re.to_le_bytes());
                    out.extend_from_slice(&im.to_le_bytes());
                    Ok(out)
                }
                _ => Err(MapbufrError::ValidationError("complex class requires width 8".into())),
            },
        }
    }

    /// Decode `bytes` (exactly `width.bytes()` long) as `class`.
    ///
    /// # Errors
    ///
    /// Returns [`MapbufrError::ValidationError`] if `class`/`width` is an
    /// unsupported combination (`Floating`/`Complex` at an unsupported width).
    pub fn decode(bytes: &[u8], class: NumClass, width: Width) -> Result<Self> {
        match class {
            NumClass::Unsigned => {
                let mut buf = [0u8; 8];
                buf[..bytes.len()].copy_from_slice(bytes);
                Ok(Number::Unsigned(u64::from_le_bytes(buf)))
            }
            NumClass::Signed => {
                let negative = bytes.last().is_some_and(|&b| b & 0x80 != 0);
                let mut buf = [if negative { 0xFF } else { 0x00 }; 8];
                buf[..bytes.len()].copy_from_slice(bytes);
                Ok(Number::Signed(i64::from_le_bytes(buf)))
            }
            NumClass::Floating => match width {
                Width::W4 => {
                    let mut buf = [0u8; 4];
                    buf.copy_from_slice(bytes);
                    Ok(Number::Float(f64::from(f32::from_le_bytes(buf))))
                }
                Width::W8 => {
                    let mut buf = [0u8; 8];
                    buf.copy_from_slice(bytes);
                    Ok(Number::Float(f64::from_le_bytes(buf)))
                }
                _ => Err(MapbufrError::ValidationError("floating class requires width 4 or 8".into())),
            },
            NumClass::Complex => match width {
                Width::W8 => {
                    let mut re = [0u8; 4];
                    re.copy_from_slice(&bytes[0..4]);
                    let mut im = [0u8; 4];
                    im.copy_from_slice(&bytes[4..8]);
                    Ok(Number::Complex(f32::from_le_bytes(re), f32::from_le_bytes(im)))
                }
                _ => Err(MapbufrError::ValidationError("complex class requires width 8".into())),
            },
        }
    }
}

fn sign_extends_cleanly(v: i64, w: usize) -> bool {
    let full = v.to_le_bytes();
    let sign_byte = if v < 0 { 0xFFu8 } else { 0x00 };
    let mut truncated = [sign_byte; 8];
    truncated[..w].copy_from_slice(&full[..w]);
    i64::from_le_bytes(truncated) == v
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_descriptor_round_trips_through_the_byte() {
        for key_class in [NumClass::Unsigned, NumClass::Signed, NumClass::Floating, NumClass::Complex] {
            for value_class in [NumClass::Unsigned, NumClass::Signed, NumClass::Floating, NumClass::Complex] {
                for width in [Width::W1, Width::W2, Width::W4, Width::W8] {
                    let descriptor = TypeDescriptor { key_class, value_class, width };
                    let byte = descriptor.to_byte();
                    assert_eq!(TypeDescriptor::from_byte(byte).unwrap(), descriptor);
                }
            }
        }
    }

    #[test]
    fn unsigned_round_trips_every_width() {
        for (width, max) in [(Width::W1, u8::MAX as u64), (Width::W2, u16::MAX as u64), (Width::W4, u32::MAX as u64)]
        {
            let n = Number::Unsigned(max);
            let bytes = n.encode(width).unwrap();
            assert_eq!(bytes.len(), width.bytes());
            assert_eq!(Number::decode(&bytes, NumClass::Unsigned, width).unwrap(), n);
        }
    }

    #[test]
    fn signed_round_trips_negative_values() {
        let n = Number::Signed(-5);
        let bytes = n.encode(Width::W2).unwrap();
        assert_eq!(Number::decode(&bytes, NumClass::Signed, Width::W2).unwrap(), n);
    }

    #[test]
    fn unsigned_value_that_overflows_width_is_rejected() {
        assert!(Number::Unsigned(300).encode(Width::W1).is_err());
    }

    #[test]
    fn floating_requires_4_or_8_byte_width() {
        assert!(Number::Float(1.5).encode(Width::W2).is_err());
        assert_eq!(
            Number::decode(&Number::Float(1.5).encode(Width::W8).unwrap(), NumClass::Floating, Width::W8).unwrap(),
            Number::Float(1.5)
        );
    }
}

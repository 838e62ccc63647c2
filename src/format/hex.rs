//! Hexadecimal encoding for binary SNMP content.

use std::fmt;

/// Encode bytes as lowercase hex string.
pub fn encode(bytes: &[u8]) -> String {
    Hex(bytes).to_string()
}

/// Decode a hex string (either case) to bytes.
///
/// Known-answer tests write their expected wire images with this.
#[cfg(any(test, feature = "testing"))]
pub fn decode(s: &str) -> Result<Vec<u8>, DecodeError> {
    let digits: Vec<u8> = s.bytes().filter(|b| !b.is_ascii_whitespace()).collect();
    if digits.len() % 2 != 0 {
        return Err(DecodeError::OddLength);
    }
    digits
        .chunks(2)
        .map(|pair| Ok((nibble(pair[0])? << 4) | nibble(pair[1])?))
        .collect()
}

#[cfg(any(test, feature = "testing"))]
fn nibble(digit: u8) -> Result<u8, DecodeError> {
    (digit as char)
        .to_digit(16)
        .map(|d| d as u8)
        .ok_or(DecodeError::InvalidChar)
}

/// Error type for hex decoding.
#[cfg(any(test, feature = "testing"))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Odd number of hex digits
    OddLength,
    /// Not a hexadecimal digit
    InvalidChar,
}

/// Lazy hex formatter, only formats when actually displayed.
///
/// Used in log fields so disabled levels never allocate.
pub struct Hex<'a>(pub &'a [u8]);

impl fmt::Display for Hex<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in self.0 {
            write!(f, "{:02x}", b)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Hex<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode() {
        assert_eq!(encode(b"public"), "7075626c6963");
        assert_eq!(encode(&[]), "");
        assert_eq!(format!("{:?}", Hex(&[0x00, 0xff, 0x42])), "00ff42");
    }

    #[test]
    fn test_decode_ignores_whitespace() {
        assert_eq!(
            decode("30 0b\n02 01 01").unwrap(),
            vec![0x30, 0x0b, 0x02, 0x01, 0x01]
        );
        assert_eq!(decode("DeAdBeEf").unwrap(), vec![0xde, 0xad, 0xbe, 0xef]);
    }

    #[test]
    fn test_decode_errors() {
        assert_eq!(decode("123"), Err(DecodeError::OddLength));
        assert_eq!(decode("0g"), Err(DecodeError::InvalidChar));
    }
}

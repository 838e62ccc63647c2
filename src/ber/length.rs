//! BER length encoding and decoding.
//!
//! Length encoding follows X.690 Section 8.1.3:
//! - Short form: Single byte, bit 8=0, value 0-127
//! - Long form: Initial byte (bit 8=1, bits 7-1=count), followed by length bytes
//! - Indefinite form (0x80): Rejected

use crate::error::{DecodeErrorKind, EncodeErrorKind, Error, Result};

/// Maximum declared content length we'll accept (2 x 2^18 bytes).
///
/// Far larger than any realistic SNMP message. A crafted length above this
/// is rejected before anything is sliced or allocated for it.
pub const MAX_LENGTH: usize = 2 << 18; // 512KB

/// Maximum number of octets following a long-form length byte.
///
/// Matches the width of a 32-bit length integer.
pub const MAX_LENGTH_OCTETS: usize = 4;

/// Encode a length value into the buffer (returns bytes in reverse order for prepending)
///
/// Uses short form for lengths <= 127, long form otherwise. Lengths above
/// [`MAX_LENGTH`] are rejected, matching what [`decode_length`] accepts.
pub fn encode_length(len: usize) -> Result<([u8; 5], usize)> {
    if len > MAX_LENGTH {
        return Err(Error::encode(EncodeErrorKind::LengthExceedsMax {
            length: len,
            max: MAX_LENGTH,
        }));
    }

    let mut buf = [0u8; 5];

    if len <= 127 {
        // Short form
        buf[0] = len as u8;
        Ok((buf, 1))
    } else {
        let octets = length_octets(len);
        for (i, slot) in buf.iter_mut().take(octets).enumerate() {
            *slot = (len >> (8 * i)) as u8;
        }
        buf[octets] = 0x80 | octets as u8;
        Ok((buf, octets + 1))
    }
}

/// Number of bytes `encode_length` produces for `len`.
pub fn length_encoded_len(len: usize) -> usize {
    if len <= 127 { 1 } else { 1 + length_octets(len) }
}

fn length_octets(len: usize) -> usize {
    (usize::BITS - len.leading_zeros()).div_ceil(8) as usize
}

/// Decode a length from bytes, returning (length, bytes_consumed)
///
/// The `base_offset` parameter is used to report error offsets correctly
/// when this is called from within a decoder.
///
/// Non-minimal long forms are accepted: `0x82 0x00 0x05` is length 5, the
/// big-endian bytes being read as if left-padded with zeros.
pub fn decode_length(data: &[u8], base_offset: usize) -> Result<(usize, usize)> {
    let Some(&first) = data.first() else {
        return Err(Error::decode(base_offset, DecodeErrorKind::TruncatedData));
    };

    if first == 0x80 {
        return Err(Error::decode(
            base_offset,
            DecodeErrorKind::IndefiniteLength,
        ));
    }

    if first & 0x80 == 0 {
        // Short form
        return Ok((first as usize, 1));
    }

    let num_octets = (first & 0x7F) as usize;

    if num_octets > MAX_LENGTH_OCTETS {
        return Err(Error::decode(
            base_offset,
            DecodeErrorKind::LengthTooLong { octets: num_octets },
        ));
    }

    if data.len() < 1 + num_octets {
        return Err(Error::decode(base_offset, DecodeErrorKind::TruncatedData));
    }

    let len = data[1..=num_octets]
        .iter()
        .fold(0usize, |acc, &b| (acc << 8) | b as usize);

    if len > MAX_LENGTH {
        return Err(Error::decode(
            base_offset,
            DecodeErrorKind::LengthExceedsMax {
                length: len,
                max: MAX_LENGTH,
            },
        ));
    }

    Ok((len, 1 + num_octets))
}

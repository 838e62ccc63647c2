//! BER decoding.
//!
//! Zero-copy decoding using `Bytes` to avoid allocations.
//!
//! Every composite read (header, then content) is all-or-nothing: if any
//! step fails, the decoder's position is put back where it was before the
//! call, so [`Decoder::remaining`] is unchanged by a failed read.

use super::length::decode_length;
use super::tag;
use crate::error::{DecodeErrorKind, Error, Result};
use crate::oid::Oid;
use bytes::Bytes;

/// BER decoder that reads from a byte buffer.
pub struct Decoder {
    data: Bytes,
    offset: usize,
    // Absolute position of `data[0]` in the outermost buffer, for error reports.
    origin: usize,
}

impl Decoder {
    /// Create a new decoder from bytes.
    pub fn new(data: Bytes) -> Self {
        Self {
            data,
            offset: 0,
            origin: 0,
        }
    }

    /// Create a decoder from a byte slice (copies the data).
    pub fn from_slice(data: &[u8]) -> Self {
        Self::new(Bytes::copy_from_slice(data))
    }

    /// Get the current offset.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Get remaining bytes.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    /// Check if we've reached the end.
    pub fn is_empty(&self) -> bool {
        self.offset >= self.data.len()
    }

    /// Peek at the next byte without consuming it.
    pub fn peek_byte(&self) -> Option<u8> {
        self.data.get(self.offset).copied()
    }

    /// Peek at the next tag without consuming it.
    pub fn peek_tag(&self) -> Option<u8> {
        self.peek_byte()
    }

    pub(crate) fn fail<T>(&self, kind: DecodeErrorKind) -> Result<T> {
        self.fail_at(self.offset, kind)
    }

    /// Fail with `kind`, reporting local position `at`.
    pub(crate) fn fail_at<T>(&self, at: usize, kind: DecodeErrorKind) -> Result<T> {
        let offset = self.origin + at;
        tracing::debug!(target: "snmp_wire::ber", { snmp.offset = offset, kind = %kind }, "decode failed");
        Err(Error::decode(offset, kind))
    }

    /// Run `f`, restoring the read position if it fails.
    pub(crate) fn transaction<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        let saved = self.offset;
        let result = f(self);
        if result.is_err() {
            self.offset = saved;
        }
        result
    }

    /// Read a single byte.
    pub fn read_byte(&mut self) -> Result<u8> {
        let Some(byte) = self.peek_byte() else {
            return self.fail(DecodeErrorKind::TruncatedData);
        };
        self.offset += 1;
        Ok(byte)
    }

    /// Read a tag byte.
    ///
    /// Multi-byte tags (tag number 31) are rejected.
    pub fn read_tag(&mut self) -> Result<u8> {
        let Some(tag) = self.peek_byte() else {
            return self.fail(DecodeErrorKind::TruncatedData);
        };
        if tag::is_extended(tag) {
            return self.fail(DecodeErrorKind::ExtendedTag(tag));
        }
        self.offset += 1;
        Ok(tag)
    }

    /// Read a length field.
    pub fn read_length(&mut self) -> Result<usize> {
        let (len, consumed) =
            decode_length(&self.data[self.offset..], self.origin + self.offset)?;
        self.offset += consumed;
        Ok(len)
    }

    /// Read a tag and length, checking the content is fully present.
    ///
    /// Returns `(tag, content_length)`. Nothing is consumed on failure.
    pub fn read_header(&mut self) -> Result<(u8, usize)> {
        self.transaction(|d| {
            let tag = d.read_tag()?;
            let len = d.read_length()?;
            if len > d.remaining() {
                return d.fail(DecodeErrorKind::InsufficientData {
                    needed: len,
                    available: d.remaining(),
                });
            }
            Ok((tag, len))
        })
    }

    /// Read raw bytes without copying.
    pub fn read_bytes(&mut self, len: usize) -> Result<Bytes> {
        if len > self.remaining() {
            return self.fail(DecodeErrorKind::InsufficientData {
                needed: len,
                available: self.remaining(),
            });
        }
        let bytes = self.data.slice(self.offset..self.offset + len);
        self.offset += len;
        Ok(bytes)
    }

    /// Read and expect a specific tag, returning the content length.
    pub fn expect_tag(&mut self, expected: u8) -> Result<usize> {
        self.transaction(|d| {
            let start = d.offset;
            let (tag, len) = d.read_header()?;
            if tag != expected {
                d.offset = start;
                return d.fail(DecodeErrorKind::UnexpectedTag {
                    expected,
                    actual: tag,
                });
            }
            Ok(len)
        })
    }

    /// Read a BER integer (signed).
    pub fn read_integer(&mut self) -> Result<i32> {
        self.transaction(|d| {
            let len = d.expect_tag(tag::universal::INTEGER)?;
            d.read_integer_value(len)
        })
    }

    /// Read integer value given the length.
    ///
    /// Non-minimal encodings are accepted; more than 4 content bytes are not.
    pub fn read_integer_value(&mut self, len: usize) -> Result<i32> {
        if len == 0 {
            return self.fail(DecodeErrorKind::ZeroLengthInteger);
        }
        if len > 4 {
            return self.fail(DecodeErrorKind::IntegerTooLong { length: len });
        }

        let bytes = self.read_bytes(len)?;

        // Sign extend
        let is_negative = bytes[0] & 0x80 != 0;
        let mut value: i32 = if is_negative { -1 } else { 0 };

        for &byte in bytes.iter() {
            value = (value << 8) | (byte as i32);
        }

        Ok(value)
    }

    /// Read a 64-bit unsigned integer (Counter64).
    pub fn read_integer64(&mut self, expected_tag: u8) -> Result<u64> {
        self.transaction(|d| {
            let len = d.expect_tag(expected_tag)?;
            d.read_integer64_value(len)
        })
    }

    /// Read 64-bit unsigned integer value given the length.
    pub fn read_integer64_value(&mut self, len: usize) -> Result<u64> {
        self.read_unsigned_value(len, 8)
            .map_err(|kind| match kind {
                DecodeErrorKind::IntegerTooLong { length } => {
                    DecodeErrorKind::Integer64TooLong { length }
                }
                other => other,
            })
            .or_else(|kind| self.fail(kind))
    }

    /// Read an unsigned 32-bit integer with specific tag.
    pub fn read_unsigned32(&mut self, expected_tag: u8) -> Result<u32> {
        self.transaction(|d| {
            let len = d.expect_tag(expected_tag)?;
            d.read_unsigned32_value(len)
        })
    }

    /// Read unsigned 32-bit integer value given length.
    ///
    /// Up to 5 content bytes are accepted; a fifth byte must be a leading
    /// 0x00 guard. The value is never sign-extended: `41 01 FF` is 255.
    pub fn read_unsigned32_value(&mut self, len: usize) -> Result<u32> {
        match self.read_unsigned_value(len, 4) {
            Ok(value) => Ok(value as u32),
            Err(kind) => self.fail(kind),
        }
    }

    // Unsigned content of at most `width` bytes plus one 0x00 guard byte.
    fn read_unsigned_value(
        &mut self,
        len: usize,
        width: usize,
    ) -> std::result::Result<u64, DecodeErrorKind> {
        if len == 0 {
            return Err(DecodeErrorKind::ZeroLengthInteger);
        }
        if len > width + 1 {
            return Err(DecodeErrorKind::IntegerTooLong { length: len });
        }
        if len > self.remaining() {
            return Err(DecodeErrorKind::InsufficientData {
                needed: len,
                available: self.remaining(),
            });
        }
        let content = &self.data[self.offset..self.offset + len];
        if len == width + 1 && content[0] != 0x00 {
            return Err(DecodeErrorKind::InvalidUnsignedPadding);
        }
        let value = content
            .iter()
            .fold(0u64, |acc, &b| acc.wrapping_shl(8) | b as u64);
        self.offset += len;
        Ok(value)
    }

    /// Read an OCTET STRING.
    pub fn read_octet_string(&mut self) -> Result<Bytes> {
        self.transaction(|d| {
            let len = d.expect_tag(tag::universal::OCTET_STRING)?;
            d.read_bytes(len)
        })
    }

    /// Read an OCTET STRING of at most `max` bytes.
    ///
    /// Longer strings fail without consuming anything.
    pub fn read_octet_string_bounded(&mut self, max: usize) -> Result<Bytes> {
        self.transaction(|d| {
            let len = d.expect_tag(tag::universal::OCTET_STRING)?;
            if len > max {
                return d.fail(DecodeErrorKind::OctetStringTooLong { length: len, max });
            }
            d.read_bytes(len)
        })
    }

    /// Read a NULL.
    pub fn read_null(&mut self) -> Result<()> {
        self.transaction(|d| {
            let len = d.expect_tag(tag::universal::NULL)?;
            if len != 0 {
                return d.fail(DecodeErrorKind::InvalidNull);
            }
            Ok(())
        })
    }

    /// Read an OBJECT IDENTIFIER.
    pub fn read_oid(&mut self) -> Result<Oid> {
        self.transaction(|d| {
            let len = d.expect_tag(tag::universal::OBJECT_IDENTIFIER)?;
            d.read_oid_value(len)
        })
    }

    /// Read an OID given a pre-read length.
    ///
    /// A zero-length OID decodes as `0.0`.
    pub fn read_oid_value(&mut self, len: usize) -> Result<Oid> {
        let start = self.origin + self.offset;
        let bytes = self.read_bytes(len)?;
        Oid::from_ber(&bytes).map_err(|e| match e {
            Error::Decode { offset, kind } => {
                tracing::debug!(target: "snmp_wire::ber", { snmp.offset = start + offset, kind = %kind }, "invalid OID");
                Error::decode(start + offset, kind)
            }
            other => other,
        })
    }

    /// Read a BIT STRING, returning `(unused_bits, data)`.
    pub fn read_bit_string(&mut self) -> Result<(u8, Bytes)> {
        self.transaction(|d| {
            let len = d.expect_tag(tag::universal::BIT_STRING)?;
            d.read_bit_string_value(len)
        })
    }

    /// Read BIT STRING content given its length.
    pub fn read_bit_string_value(&mut self, len: usize) -> Result<(u8, Bytes)> {
        self.transaction(|d| {
            if len == 0 {
                return d.fail(DecodeErrorKind::InvalidBitString);
            }
            let unused = d.read_byte()?;
            if unused > 7 || (unused > 0 && len == 1) {
                return d.fail(DecodeErrorKind::InvalidBitString);
            }
            let data = d.read_bytes(len - 1)?;
            Ok((unused, data))
        })
    }

    /// Read a SEQUENCE, returning a decoder for its contents.
    pub fn read_sequence(&mut self) -> Result<Decoder> {
        self.read_constructed(tag::universal::SEQUENCE)
    }

    /// Read a constructed type with a specific tag, returning a decoder for its contents.
    pub fn read_constructed(&mut self, expected_tag: u8) -> Result<Decoder> {
        self.transaction(|d| {
            let len = d.expect_tag(expected_tag)?;
            d.sub_decoder(len)
        })
    }

    /// Read an IP address.
    pub fn read_ip_address(&mut self) -> Result<[u8; 4]> {
        self.transaction(|d| {
            let len = d.expect_tag(tag::application::IP_ADDRESS)?;
            d.read_ip_address_value(len)
        })
    }

    /// Read IpAddress content given its length.
    pub fn read_ip_address_value(&mut self, len: usize) -> Result<[u8; 4]> {
        if len != 4 {
            return self.fail(DecodeErrorKind::InvalidIpAddressLength { length: len });
        }
        let bytes = self.read_bytes(4)?;
        Ok([bytes[0], bytes[1], bytes[2], bytes[3]])
    }

    /// Create a sub-decoder for a portion of the remaining data.
    pub fn sub_decoder(&mut self, len: usize) -> Result<Decoder> {
        let origin = self.origin + self.offset;
        let content = self.read_bytes(len)?;
        Ok(Decoder {
            data: content,
            offset: 0,
            origin,
        })
    }

    /// Fail with `TrailingData` unless every byte has been consumed.
    pub fn expect_end(&self) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            self.fail(DecodeErrorKind::TrailingData {
                remaining: self.remaining(),
            })
        }
    }

    /// Get remaining data as a slice.
    pub fn remaining_slice(&self) -> &[u8] {
        &self.data[self.offset..]
    }
}

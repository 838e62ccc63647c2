//! BER encoding.
//!
//! [`EncodeBuf`] builds the encoding back to front: children are pushed
//! first, then their parent's length and tag are prepended once the content
//! size is known. No length is ever guessed or patched after the fact.

use super::length::encode_length;
use super::tag;
use crate::error::{EncodeErrorKind, Error, Result};
use crate::oid::Oid;
use bytes::Bytes;

/// Reverse-order BER encode buffer.
///
/// Bytes are stored last-to-first and flipped by [`finish`](Self::finish).
#[derive(Debug, Default)]
pub struct EncodeBuf {
    buf: Vec<u8>,
}

impl EncodeBuf {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    /// Create a buffer with room for `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    /// Number of bytes encoded so far.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// True if nothing has been encoded.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Drop everything pushed after the buffer held `len` bytes.
    pub fn truncate(&mut self, len: usize) {
        self.buf.truncate(len);
    }

    /// Prepend a single byte.
    pub fn push_byte(&mut self, byte: u8) {
        self.buf.push(byte);
    }

    /// Prepend raw bytes, keeping their order in the final output.
    pub fn push_bytes(&mut self, data: &[u8]) {
        self.buf.extend(data.iter().rev());
    }

    /// Prepend a length field.
    ///
    /// Lengths above [`MAX_LENGTH`](super::MAX_LENGTH) are rejected.
    pub fn push_length(&mut self, len: usize) -> Result<()> {
        let (bytes, count) = encode_length(len).inspect_err(|_| {
            tracing::debug!(target: "snmp_wire::ber", { length = len }, "length exceeds maximum");
        })?;
        // encode_length already returns the bytes reversed
        self.buf.extend_from_slice(&bytes[..count]);
        Ok(())
    }

    /// Prepend the length of a primitive whose content never exceeds 127 bytes.
    fn push_short_length(&mut self, len: usize) {
        debug_assert!(len <= 127);
        self.buf.push(len as u8);
    }

    /// Prepend a tag byte.
    ///
    /// Tag number 31 (the multi-byte form) is rejected.
    pub fn push_tag(&mut self, tag: u8) -> Result<()> {
        if tag::is_extended(tag) {
            tracing::debug!(target: "snmp_wire::ber", { tag = tag }, "extended tag rejected");
            return Err(Error::encode(EncodeErrorKind::ExtendedTag(tag)));
        }
        self.buf.push(tag);
        Ok(())
    }

    /// Prepend a tag and length header for `len` content bytes.
    pub fn push_header(&mut self, tag: u8, len: usize) -> Result<()> {
        let start = self.len();
        self.push_length(len)?;
        if let Err(e) = self.push_tag(tag) {
            self.truncate(start);
            return Err(e);
        }
        Ok(())
    }

    /// Encode a constructed type.
    ///
    /// `f` pushes the children (in reverse order, like everything else in
    /// this buffer). The header is prepended afterwards. On failure the
    /// buffer is restored to its state before the call.
    pub fn push_constructed<F>(&mut self, tag: u8, f: F) -> Result<()>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        let start = self.len();
        let result = f(self).and_then(|()| {
            let content_len = self.len() - start;
            self.push_header(tag, content_len)
        });
        if result.is_err() {
            self.truncate(start);
        }
        result
    }

    /// Encode a SEQUENCE.
    pub fn push_sequence<F>(&mut self, f: F) -> Result<()>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        self.push_constructed(tag::universal::SEQUENCE, f)
    }

    /// Encode a signed INTEGER in minimal two's-complement form.
    pub fn push_integer(&mut self, value: i32) {
        let len = integer_content_len(value);
        self.push_be(value as i64 as u64, len);
        self.push_short_length(len);
        self.buf.push(tag::universal::INTEGER);
    }

    /// Encode an unsigned 32-bit value under `tag` (Counter32, Gauge32, ...).
    ///
    /// A 0x00 guard byte is added when the top bit of the leading byte is set,
    /// so the value is never read back as negative.
    pub fn push_unsigned32(&mut self, tag: u8, value: u32) -> Result<()> {
        let len = unsigned_content_len(value as u64);
        let start = self.len();
        self.push_be(value as u64, len);
        self.push_short_length(len);
        self.push_tag(tag).inspect_err(|_| self.truncate(start))
    }

    /// Encode a Counter64.
    pub fn push_integer64(&mut self, value: u64) {
        let len = unsigned_content_len(value);
        self.push_be(value, len);
        self.push_short_length(len);
        self.buf.push(tag::application::COUNTER64);
    }

    /// Encode an OCTET STRING.
    pub fn push_octet_string(&mut self, data: &[u8]) -> Result<()> {
        self.push_tagged_bytes(tag::universal::OCTET_STRING, data)
    }

    /// Encode opaque content under an arbitrary primitive tag.
    pub fn push_tagged_bytes(&mut self, tag: u8, data: &[u8]) -> Result<()> {
        let start = self.len();
        self.push_bytes(data);
        self.push_header(tag, data.len())
            .inspect_err(|_| self.truncate(start))
    }

    /// Encode a NULL.
    pub fn push_null(&mut self) {
        self.buf.push(0x00);
        self.buf.push(tag::universal::NULL);
    }

    /// Encode a zero-length value under `tag` (exception values).
    pub fn push_empty(&mut self, tag: u8) -> Result<()> {
        self.push_header(tag, 0)
    }

    /// Encode an OBJECT IDENTIFIER.
    pub fn push_oid(&mut self, oid: &Oid) -> Result<()> {
        let content = oid.encode_content()?;
        self.push_tagged_bytes(tag::universal::OBJECT_IDENTIFIER, &content)
    }

    /// Encode an IpAddress.
    pub fn push_ip_address(&mut self, addr: [u8; 4]) {
        self.push_bytes(&addr);
        self.push_short_length(4);
        self.buf.push(tag::application::IP_ADDRESS);
    }

    /// Encode a BIT STRING with `unused_bits` padding bits in the last byte.
    pub fn push_bit_string(&mut self, unused_bits: u8, data: &[u8]) -> Result<()> {
        if unused_bits > 7 || (unused_bits > 0 && data.is_empty()) {
            return Err(Error::encode(EncodeErrorKind::InvalidBitString {
                unused_bits,
            }));
        }
        let start = self.len();
        self.push_bytes(data);
        self.buf.push(unused_bits);
        self.push_header(tag::universal::BIT_STRING, data.len() + 1)
            .inspect_err(|_| self.truncate(start))
    }

    /// Finish encoding and return the bytes in wire order.
    pub fn finish(mut self) -> Bytes {
        self.buf.reverse();
        Bytes::from(self.buf)
    }

    /// Prepend the low `len` bytes of `value`, most significant first on the wire.
    fn push_be(&mut self, value: u64, len: usize) {
        for i in 0..len {
            let byte = value.checked_shr(8 * i as u32).unwrap_or(0) as u8;
            self.buf.push(byte);
        }
    }
}

/// Content length of a minimal two's-complement INTEGER.
pub fn integer_content_len(value: i32) -> usize {
    let mut len = 4;
    let mut v = value;
    // A leading byte is redundant while the top 9 bits are all equal.
    while len > 1 {
        let top9 = (v >> 23) & 0x1FF;
        if top9 != 0 && top9 != 0x1FF {
            break;
        }
        len -= 1;
        v = v.wrapping_shl(8);
    }
    len
}

/// Content length of an unsigned value, including the 0x00 guard byte when needed.
pub fn unsigned_content_len(value: u64) -> usize {
    let bits = 64 - value.leading_zeros() as usize;
    bits / 8 + 1
}

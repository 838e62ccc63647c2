//! Basic Encoding Rules (BER) primitives.
//!
//! Only the subset of X.690 that SNMP uses: single-byte tags, definite
//! lengths, and the SNMP primitive types. Nothing here knows about PDUs.

mod decode;
mod encode;
mod length;
pub mod tag;

pub use decode::Decoder;
pub use encode::{EncodeBuf, integer_content_len, unsigned_content_len};
pub use length::{MAX_LENGTH, MAX_LENGTH_OCTETS, decode_length, encode_length, length_encoded_len};

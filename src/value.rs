//! SNMP value types.
//!
//! The `Value` enum represents every SMI data type this codec carries,
//! including the SNMPv2c exception values.

use crate::ber::{Decoder, EncodeBuf, tag};
use crate::error::{DecodeErrorKind, Result};
use crate::format::hex;
use crate::oid::Oid;
use crate::version::Version;
use bytes::Bytes;

/// SNMP value.
///
/// Any tag not listed here is rejected on decode with
/// [`DecodeErrorKind::UnsupportedType`].
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum Value {
    /// INTEGER (ASN.1 primitive, signed 32-bit)
    Integer(i32),

    /// OCTET STRING (arbitrary bytes)
    OctetString(Bytes),

    /// NULL
    Null,

    /// OBJECT IDENTIFIER
    ObjectIdentifier(Oid),

    /// IpAddress (4 bytes, big-endian)
    IpAddress([u8; 4]),

    /// Counter32 (unsigned 32-bit, wrapping)
    Counter32(u32),

    /// Gauge32 / Unsigned32 (unsigned 32-bit, non-wrapping)
    Gauge32(u32),

    /// TimeTicks (hundredths of seconds)
    TimeTicks(u32),

    /// Opaque (legacy, arbitrary bytes)
    Opaque(Bytes),

    /// NsapAddress (legacy, arbitrary bytes)
    Nsap(Bytes),

    /// Counter64 (unsigned 64-bit, wrapping).
    ///
    /// Held as one `u64`; the wire form is a minimal unsigned integer of up
    /// to 9 bytes.
    Counter64(u64),

    /// UInteger32 (legacy unsigned 32-bit)
    UInteger32(u32),

    /// BIT STRING with the number of unused bits in the final byte (0-7).
    BitString { unused_bits: u8, data: Bytes },

    /// noSuchObject exception (SNMPv2c only).
    ///
    /// ```
    /// use snmp_wire::Value;
    ///
    /// assert!(Value::NoSuchObject.is_exception());
    /// assert_ne!(Value::NoSuchObject, Value::Null);
    /// ```
    NoSuchObject,

    /// noSuchInstance exception (SNMPv2c only).
    NoSuchInstance,

    /// endOfMibView exception (SNMPv2c only).
    ///
    /// Terminates a GET-NEXT/GET-BULK walk.
    EndOfMibView,
}

impl Value {
    /// Try to get as i32.
    ///
    /// Returns `Some(i32)` for [`Value::Integer`], `None` otherwise.
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Value::Integer(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get as u32.
    ///
    /// Returns `Some(u32)` for the unsigned 32-bit types or a non-negative
    /// [`Value::Integer`].
    ///
    /// ```
    /// use snmp_wire::Value;
    ///
    /// assert_eq!(Value::Counter32(100).as_u32(), Some(100));
    /// assert_eq!(Value::UInteger32(7).as_u32(), Some(7));
    /// assert_eq!(Value::Integer(50).as_u32(), Some(50));
    /// assert_eq!(Value::Integer(-1).as_u32(), None);
    /// assert_eq!(Value::Counter64(100).as_u32(), None);
    /// ```
    pub fn as_u32(&self) -> Option<u32> {
        match self {
            Value::Counter32(v)
            | Value::Gauge32(v)
            | Value::TimeTicks(v)
            | Value::UInteger32(v) => Some(*v),
            Value::Integer(v) if *v >= 0 => Some(*v as u32),
            _ => None,
        }
    }

    /// Try to get as u64.
    ///
    /// Returns `Some(u64)` for [`Value::Counter64`], any 32-bit unsigned type,
    /// or a non-negative [`Value::Integer`].
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::Counter64(v) => Some(*v),
            other => other.as_u32().map(u64::from),
        }
    }

    /// Try to get as bytes.
    ///
    /// Returns the content of [`Value::OctetString`], [`Value::Opaque`] or
    /// [`Value::Nsap`].
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::OctetString(v) | Value::Opaque(v) | Value::Nsap(v) => Some(v),
            _ => None,
        }
    }

    /// Try to get as string (UTF-8).
    ///
    /// ```
    /// use snmp_wire::Value;
    /// use bytes::Bytes;
    ///
    /// let v = Value::OctetString(Bytes::from_static(b"Linux router1 5.4.0"));
    /// assert_eq!(v.as_str(), Some("Linux router1 5.4.0"));
    ///
    /// let v = Value::OctetString(Bytes::from_static(&[0xFF, 0xFE]));
    /// assert_eq!(v.as_str(), None);
    /// ```
    pub fn as_str(&self) -> Option<&str> {
        self.as_bytes().and_then(|b| std::str::from_utf8(b).ok())
    }

    /// Try to get as OID.
    pub fn as_oid(&self) -> Option<&Oid> {
        match self {
            Value::ObjectIdentifier(oid) => Some(oid),
            _ => None,
        }
    }

    /// Try to get as IP address.
    pub fn as_ip(&self) -> Option<std::net::Ipv4Addr> {
        match self {
            Value::IpAddress(bytes) => Some(std::net::Ipv4Addr::from(*bytes)),
            _ => None,
        }
    }

    /// Check if this is an exception value.
    pub fn is_exception(&self) -> bool {
        matches!(
            self,
            Value::NoSuchObject | Value::NoSuchInstance | Value::EndOfMibView
        )
    }

    /// Check if this value can be summed, averaged or compared.
    ///
    /// ```
    /// use snmp_wire::Value;
    ///
    /// assert!(Value::Counter64(1).is_numeric());
    /// assert!(Value::Integer(-5).is_numeric());
    /// assert!(!Value::Null.is_numeric());
    /// assert!(!Value::from("text").is_numeric());
    /// ```
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Value::Integer(_)
                | Value::Counter32(_)
                | Value::Gauge32(_)
                | Value::TimeTicks(_)
                | Value::UInteger32(_)
                | Value::Counter64(_)
        )
    }

    /// Check if two values carry the same SNMP type.
    pub fn same_type(&self, other: &Value) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }

    /// BER tag this value is encoded under (SNMPv2c form).
    pub fn tag(&self) -> u8 {
        match self {
            Value::Integer(_) => tag::universal::INTEGER,
            Value::OctetString(_) => tag::universal::OCTET_STRING,
            Value::Null => tag::universal::NULL,
            Value::ObjectIdentifier(_) => tag::universal::OBJECT_IDENTIFIER,
            Value::IpAddress(_) => tag::application::IP_ADDRESS,
            Value::Counter32(_) => tag::application::COUNTER32,
            Value::Gauge32(_) => tag::application::GAUGE32,
            Value::TimeTicks(_) => tag::application::TIMETICKS,
            Value::Opaque(_) => tag::application::OPAQUE,
            Value::Nsap(_) => tag::application::NSAP,
            Value::Counter64(_) => tag::application::COUNTER64,
            Value::UInteger32(_) => tag::application::UINTEGER32,
            Value::BitString { .. } => tag::universal::BIT_STRING,
            Value::NoSuchObject => tag::context::NO_SUCH_OBJECT,
            Value::NoSuchInstance => tag::context::NO_SUCH_INSTANCE,
            Value::EndOfMibView => tag::context::END_OF_MIB_VIEW,
        }
    }

    /// Encode to BER.
    ///
    /// For [`Version::V1`] all three exception values are written under the
    /// noSuchObject tag. On failure the buffer is left unchanged.
    pub fn encode(&self, buf: &mut EncodeBuf, version: Version) -> Result<()> {
        match self {
            Value::Integer(v) => buf.push_integer(*v),
            Value::OctetString(data) => buf.push_octet_string(data)?,
            Value::Null => buf.push_null(),
            Value::ObjectIdentifier(oid) => buf.push_oid(oid)?,
            Value::IpAddress(addr) => buf.push_ip_address(*addr),
            Value::Counter32(v)
            | Value::Gauge32(v)
            | Value::TimeTicks(v)
            | Value::UInteger32(v) => buf.push_unsigned32(self.tag(), *v)?,
            Value::Opaque(data) | Value::Nsap(data) => buf.push_tagged_bytes(self.tag(), data)?,
            Value::Counter64(v) => buf.push_integer64(*v),
            Value::BitString { unused_bits, data } => buf.push_bit_string(*unused_bits, data)?,
            Value::NoSuchObject | Value::NoSuchInstance | Value::EndOfMibView => {
                let tag = if version.supports_exceptions() {
                    self.tag()
                } else {
                    tag::context::NO_SUCH_OBJECT
                };
                buf.push_empty(tag)?
            }
        }
        Ok(())
    }

    /// Decode from BER.
    ///
    /// On failure the decoder position is unchanged.
    pub fn decode(decoder: &mut Decoder) -> Result<Self> {
        decoder.transaction(Self::decode_tlv)
    }

    fn decode_tlv(decoder: &mut Decoder) -> Result<Self> {
        let tag_offset = decoder.offset();
        let (tag, len) = decoder.read_header()?;

        match tag {
            tag::universal::INTEGER => Ok(Value::Integer(decoder.read_integer_value(len)?)),
            tag::universal::OCTET_STRING => Ok(Value::OctetString(decoder.read_bytes(len)?)),
            tag::universal::NULL => {
                if len != 0 {
                    return decoder.fail(DecodeErrorKind::InvalidNull);
                }
                Ok(Value::Null)
            }
            tag::universal::OBJECT_IDENTIFIER => {
                Ok(Value::ObjectIdentifier(decoder.read_oid_value(len)?))
            }
            tag::universal::BIT_STRING => {
                let (unused_bits, data) = decoder.read_bit_string_value(len)?;
                Ok(Value::BitString { unused_bits, data })
            }
            tag::application::IP_ADDRESS => {
                Ok(Value::IpAddress(decoder.read_ip_address_value(len)?))
            }
            tag::application::COUNTER32 => {
                Ok(Value::Counter32(decoder.read_unsigned32_value(len)?))
            }
            tag::application::GAUGE32 => Ok(Value::Gauge32(decoder.read_unsigned32_value(len)?)),
            tag::application::TIMETICKS => {
                Ok(Value::TimeTicks(decoder.read_unsigned32_value(len)?))
            }
            tag::application::UINTEGER32 => {
                Ok(Value::UInteger32(decoder.read_unsigned32_value(len)?))
            }
            tag::application::OPAQUE => Ok(Value::Opaque(decoder.read_bytes(len)?)),
            tag::application::NSAP => Ok(Value::Nsap(decoder.read_bytes(len)?)),
            tag::application::COUNTER64 => {
                Ok(Value::Counter64(decoder.read_integer64_value(len)?))
            }
            tag::context::NO_SUCH_OBJECT
            | tag::context::NO_SUCH_INSTANCE
            | tag::context::END_OF_MIB_VIEW => {
                if len != 0 {
                    return decoder.fail(DecodeErrorKind::InvalidException);
                }
                Ok(match tag {
                    tag::context::NO_SUCH_OBJECT => Value::NoSuchObject,
                    tag::context::NO_SUCH_INSTANCE => Value::NoSuchInstance,
                    _ => Value::EndOfMibView,
                })
            }
            // Constructed OCTET STRING (0x24) is never produced by SNMP agents.
            tag::universal::OCTET_STRING_CONSTRUCTED => {
                decoder.fail_at(tag_offset, DecodeErrorKind::ConstructedOctetString)
            }
            other => decoder.fail_at(tag_offset, DecodeErrorKind::UnsupportedType(other)),
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Integer(v) => write!(f, "{}", v),
            Value::OctetString(data) => match std::str::from_utf8(data) {
                Ok(s) => write!(f, "{}", s),
                Err(_) => write!(f, "0x{}", hex::Hex(data)),
            },
            Value::Null => write!(f, "NULL"),
            Value::ObjectIdentifier(oid) => write!(f, "{}", oid),
            Value::IpAddress(addr) => {
                write!(f, "{}.{}.{}.{}", addr[0], addr[1], addr[2], addr[3])
            }
            Value::Counter32(v) | Value::Gauge32(v) | Value::UInteger32(v) => write!(f, "{}", v),
            Value::TimeTicks(v) => {
                let secs = v / 100;
                let days = secs / 86400;
                let hours = (secs % 86400) / 3600;
                let mins = (secs % 3600) / 60;
                let s = secs % 60;
                write!(f, "{}d {}h {}m {}s", days, hours, mins, s)
            }
            Value::Opaque(data) => write!(f, "Opaque(0x{})", hex::Hex(data)),
            Value::Nsap(data) => write!(f, "Nsap(0x{})", hex::Hex(data)),
            Value::Counter64(v) => write!(f, "{}", v),
            Value::BitString { unused_bits, data } => {
                write!(f, "BITS(0x{}, unused={})", hex::Hex(data), unused_bits)
            }
            Value::NoSuchObject => write!(f, "noSuchObject"),
            Value::NoSuchInstance => write!(f, "noSuchInstance"),
            Value::EndOfMibView => write!(f, "endOfMibView"),
        }
    }
}

/// Convenience conversions for creating [`Value`] from common Rust types.
///
/// ```
/// use snmp_wire::Value;
///
/// let v: Value = 42i32.into();
/// assert_eq!(v.as_i32(), Some(42));
///
/// let v: Value = "hello".into();
/// assert_eq!(v.as_str(), Some("hello"));
///
/// let v: Value = 10_000_000_000u64.into();
/// assert_eq!(v.as_u64(), Some(10_000_000_000));
/// ```
impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::OctetString(Bytes::copy_from_slice(s.as_bytes()))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::OctetString(Bytes::from(s))
    }
}

impl From<&[u8]> for Value {
    fn from(data: &[u8]) -> Self {
        Value::OctetString(Bytes::copy_from_slice(data))
    }
}

impl From<Bytes> for Value {
    fn from(data: Bytes) -> Self {
        Value::OctetString(data)
    }
}

impl From<Oid> for Value {
    fn from(oid: Oid) -> Self {
        Value::ObjectIdentifier(oid)
    }
}

impl From<std::net::Ipv4Addr> for Value {
    fn from(addr: std::net::Ipv4Addr) -> Self {
        Value::IpAddress(addr.octets())
    }
}

impl From<[u8; 4]> for Value {
    fn from(addr: [u8; 4]) -> Self {
        Value::IpAddress(addr)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::Counter64(v)
    }
}

//! Error types for snmp-wire.
//!
//! This module provides:
//!
//! - [`Error`] - The main error type for every codec and aggregation operation
//! - [`ErrorStatus`] - SNMP protocol error status codes (RFC 3416)
//! - Kind enums describing decode, encode, OID and aggregation failures
//!
//! All errors are `#[non_exhaustive]` to allow adding new variants without breaking changes.
//!
//! # Error Categories
//!
//! - **Framing errors** ([`Error::Decode`] with a length/tag kind): truncated
//!   buffers, declared lengths past the end of input, oversized length fields,
//!   extended tags.
//! - **Value errors** ([`Error::Decode`] / [`Error::Encode`] with a value kind):
//!   integers too wide, subidentifier overflow, bad bit strings, unsupported
//!   variable types.
//! - **Logic errors** ([`Error::Aggregate`]): a worker response that does not
//!   match the shape of the aggregate. These abort the current request only.
//!
//! ```
//! use snmp_wire::{DecodeErrorKind, Error};
//! use snmp_wire::message::CommunityMessage;
//!
//! // A SEQUENCE claiming 16 bytes of content with only 2 present.
//! let truncated = bytes::Bytes::from_static(&[0x30, 0x10, 0x02, 0x01]);
//!
//! match CommunityMessage::decode(truncated) {
//!     Err(Error::Decode { kind: DecodeErrorKind::InsufficientData { .. }, .. }) => {}
//!     other => panic!("unexpected result: {:?}", other),
//! }
//! ```

/// Result type alias using the library's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// BER decode error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeErrorKind {
    /// Expected different tag.
    UnexpectedTag { expected: u8, actual: u8 },
    /// Data truncated unexpectedly.
    TruncatedData,
    /// Indefinite length not supported.
    IndefiniteLength,
    /// Length field uses more octets than the host length integer holds.
    LengthTooLong { octets: usize },
    /// Length exceeds maximum.
    LengthExceedsMax { length: usize, max: usize },
    /// Declared content length runs past the end of the buffer.
    InsufficientData { needed: usize, available: usize },
    /// Multi-byte (extended) tag numbers are not supported.
    ExtendedTag(u8),
    /// Zero-length integer.
    ZeroLengthInteger,
    /// Signed integer wider than 32 bits.
    IntegerTooLong { length: usize },
    /// Five-byte unsigned integer whose leading byte is not 0x00.
    InvalidUnsignedPadding,
    /// Integer64 too long.
    Integer64TooLong { length: usize },
    /// Subidentifier exceeds the maximum subidentifier value.
    IntegerOverflow,
    /// OID has more subidentifiers than allowed.
    OidTooLong { count: usize, max: usize },
    /// NULL with non-zero length.
    InvalidNull,
    /// Exception value (noSuchObject etc.) with non-zero length.
    InvalidException,
    /// BIT STRING with no content or unused-bits out of range.
    InvalidBitString,
    /// Invalid IP address length.
    InvalidIpAddressLength { length: usize },
    /// OCTET STRING longer than the caller's capacity.
    OctetStringTooLong { length: usize, max: usize },
    /// Variable binding carries a value type this codec does not support.
    UnsupportedType(u8),
    /// Constructed OCTET STRING not supported.
    ConstructedOctetString,
    /// Unknown SNMP version.
    UnknownVersion(i32),
    /// Unknown or unsupported PDU type.
    UnknownPduType(u8),
    /// Bytes left over after a complete message.
    TrailingData { remaining: usize },
}

impl std::fmt::Display for DecodeErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnexpectedTag { expected, actual } => {
                write!(f, "expected tag 0x{:02X}, got 0x{:02X}", expected, actual)
            }
            Self::TruncatedData => write!(f, "unexpected end of data"),
            Self::IndefiniteLength => write!(f, "indefinite length encoding not supported"),
            Self::LengthTooLong { octets } => {
                write!(f, "length encoding too long ({} octets)", octets)
            }
            Self::LengthExceedsMax { length, max } => {
                write!(f, "length {} exceeds maximum {}", length, max)
            }
            Self::InsufficientData { needed, available } => {
                write!(f, "need {} bytes but only {} remaining", needed, available)
            }
            Self::ExtendedTag(t) => write!(f, "extended tag 0x{:02X} not supported", t),
            Self::ZeroLengthInteger => write!(f, "zero-length integer"),
            Self::IntegerTooLong { length } => {
                write!(f, "integer too long: {} bytes", length)
            }
            Self::InvalidUnsignedPadding => {
                write!(f, "unsigned integer padding byte must be 0x00")
            }
            Self::Integer64TooLong { length } => {
                write!(f, "integer64 too long: {} bytes", length)
            }
            Self::IntegerOverflow => write!(f, "integer overflow"),
            Self::OidTooLong { count, max } => {
                write!(
                    f,
                    "OID has {} subidentifiers, exceeds maximum {}",
                    count, max
                )
            }
            Self::InvalidNull => write!(f, "NULL with non-zero length"),
            Self::InvalidException => write!(f, "exception value with non-zero length"),
            Self::InvalidBitString => write!(f, "invalid BIT STRING"),
            Self::InvalidIpAddressLength { length } => {
                write!(f, "IP address must be 4 bytes, got {}", length)
            }
            Self::OctetStringTooLong { length, max } => {
                write!(
                    f,
                    "OCTET STRING of {} bytes exceeds capacity {}",
                    length, max
                )
            }
            Self::UnsupportedType(t) => write!(f, "unsupported variable type 0x{:02X}", t),
            Self::ConstructedOctetString => {
                write!(f, "constructed OCTET STRING (0x24) not supported")
            }
            Self::UnknownVersion(v) => write!(f, "unknown SNMP version: {}", v),
            Self::UnknownPduType(t) => write!(f, "unknown PDU type: 0x{:02X}", t),
            Self::TrailingData { remaining } => {
                write!(f, "{} trailing bytes after message", remaining)
            }
        }
    }
}

/// BER encode error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeErrorKind {
    /// Tag number 31 (multi-byte tag) requested.
    ExtendedTag(u8),
    /// BIT STRING unused-bits out of range or empty content with padding.
    InvalidBitString { unused_bits: u8 },
    /// OID has more subidentifiers than allowed.
    OidTooLong { count: usize, max: usize },
    /// First two arcs do not fit into one subidentifier.
    SubidentifierOverflow,
    /// OID arcs that would decode back as a different OID.
    InvalidArc(OidErrorKind),
    /// Content length above the limit the decoder accepts.
    LengthExceedsMax { length: usize, max: usize },
    /// Community string longer than the configured limit.
    CommunityTooLong { length: usize, max: usize },
}

impl std::fmt::Display for EncodeErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ExtendedTag(t) => write!(f, "extended tag 0x{:02X} not supported", t),
            Self::InvalidBitString { unused_bits } => {
                write!(f, "invalid BIT STRING (unused bits {})", unused_bits)
            }
            Self::OidTooLong { count, max } => {
                write!(
                    f,
                    "OID has {} subidentifiers, exceeds maximum {}",
                    count, max
                )
            }
            Self::SubidentifierOverflow => write!(f, "subidentifier overflow"),
            Self::InvalidArc(kind) => write!(f, "OID not encodable: {}", kind),
            Self::LengthExceedsMax { length, max } => {
                write!(f, "length {} exceeds maximum {}", length, max)
            }
            Self::CommunityTooLong { length, max } => {
                write!(f, "community of {} bytes exceeds limit {}", length, max)
            }
        }
    }
}

/// OID validation error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OidErrorKind {
    /// Invalid arc value.
    InvalidArc,
    /// First arc must be 0, 1, or 2.
    InvalidFirstArc(u32),
    /// Second arc too large for first arc value.
    InvalidSecondArc { first: u32, second: u32 },
    /// OID has too many arcs (exceeds MAX_OID_LEN).
    TooManyArcs { count: usize, max: usize },
    /// First two arcs do not pack into one 32-bit subidentifier.
    SubidentifierOverflow,
    /// A non-empty OID needs at least two arcs.
    SingleArc,
}

impl std::fmt::Display for OidErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidArc => write!(f, "invalid arc value"),
            Self::InvalidFirstArc(v) => write!(f, "first arc must be 0, 1, or 2, got {}", v),
            Self::InvalidSecondArc { first, second } => {
                write!(f, "second arc {} too large for first arc {}", second, first)
            }
            Self::TooManyArcs { count, max } => {
                write!(f, "OID has {} arcs, exceeds maximum {}", count, max)
            }
            Self::SubidentifierOverflow => {
                write!(f, "first two arcs overflow a 32-bit subidentifier")
            }
            Self::SingleArc => write!(f, "OID must have at least two arcs"),
        }
    }
}

/// Aggregation failure kinds.
///
/// These indicate a worker response that does not line up with the
/// aggregate, which is a contract violation upstream of the codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateErrorKind {
    /// Responses carry different numbers of variable bindings.
    VarCountMismatch { expected: usize, actual: usize },
    /// Values at the same position have different SNMP types.
    TypeMismatch { index: usize },
    /// A sum/average/max/min policy applies to a non-numeric value.
    NotNumeric { index: usize },
    /// Nothing was merged.
    NoResponses,
}

impl std::fmt::Display for AggregateErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::VarCountMismatch { expected, actual } => {
                write!(f, "expected {} variable bindings, got {}", expected, actual)
            }
            Self::TypeMismatch { index } => {
                write!(f, "value type mismatch at varbind {}", index)
            }
            Self::NotNumeric { index } => {
                write!(f, "non-numeric value at varbind {}", index)
            }
            Self::NoResponses => write!(f, "no responses to aggregate"),
        }
    }
}

/// SNMP protocol error status codes (RFC 3416).
///
/// These codes travel in the error-status field of a Response PDU. A
/// non-zero status in a worker response short-circuits aggregation.
///
/// # Example
///
/// ```
/// use snmp_wire::ErrorStatus;
///
/// let status = ErrorStatus::from_i32(2);
/// assert_eq!(status, ErrorStatus::NoSuchName);
/// assert_eq!(status.as_i32(), 2);
/// assert_eq!(status.to_string(), "noSuchName");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorStatus {
    /// Operation completed successfully (status = 0).
    NoError,
    /// Response message would be too large for transport (status = 1).
    TooBig,
    /// Requested OID not found (status = 2). SNMPv1 only; v2c uses exception values.
    NoSuchName,
    /// Invalid value provided in SET request (status = 3).
    BadValue,
    /// Attempted to SET a read-only object (status = 4).
    ReadOnly,
    /// Unspecified error occurred (status = 5).
    GenErr,
    /// Object exists but access is denied (status = 6).
    NoAccess,
    /// SET value has wrong ASN.1 type (status = 7).
    WrongType,
    /// SET value has incorrect length (status = 8).
    WrongLength,
    /// SET value uses wrong encoding (status = 9).
    WrongEncoding,
    /// SET value is out of range or otherwise invalid (status = 10).
    WrongValue,
    /// Object does not support row creation (status = 11).
    NoCreation,
    /// Value is inconsistent with other managed objects (status = 12).
    InconsistentValue,
    /// Resource required for SET is unavailable (status = 13).
    ResourceUnavailable,
    /// SET commit phase failed (status = 14).
    CommitFailed,
    /// SET undo phase failed (status = 15).
    UndoFailed,
    /// Access denied (status = 16).
    AuthorizationError,
    /// Object does not support modification (status = 17).
    NotWritable,
    /// Named object cannot be created (status = 18).
    InconsistentName,
    /// Unknown or future error status code.
    Unknown(i32),
}

impl ErrorStatus {
    /// Create from raw status code.
    pub fn from_i32(value: i32) -> Self {
        match value {
            0 => Self::NoError,
            1 => Self::TooBig,
            2 => Self::NoSuchName,
            3 => Self::BadValue,
            4 => Self::ReadOnly,
            5 => Self::GenErr,
            6 => Self::NoAccess,
            7 => Self::WrongType,
            8 => Self::WrongLength,
            9 => Self::WrongEncoding,
            10 => Self::WrongValue,
            11 => Self::NoCreation,
            12 => Self::InconsistentValue,
            13 => Self::ResourceUnavailable,
            14 => Self::CommitFailed,
            15 => Self::UndoFailed,
            16 => Self::AuthorizationError,
            17 => Self::NotWritable,
            18 => Self::InconsistentName,
            other => Self::Unknown(other),
        }
    }

    /// Convert to raw status code.
    pub fn as_i32(&self) -> i32 {
        match self {
            Self::NoError => 0,
            Self::TooBig => 1,
            Self::NoSuchName => 2,
            Self::BadValue => 3,
            Self::ReadOnly => 4,
            Self::GenErr => 5,
            Self::NoAccess => 6,
            Self::WrongType => 7,
            Self::WrongLength => 8,
            Self::WrongEncoding => 9,
            Self::WrongValue => 10,
            Self::NoCreation => 11,
            Self::InconsistentValue => 12,
            Self::ResourceUnavailable => 13,
            Self::CommitFailed => 14,
            Self::UndoFailed => 15,
            Self::AuthorizationError => 16,
            Self::NotWritable => 17,
            Self::InconsistentName => 18,
            Self::Unknown(code) => *code,
        }
    }
}

impl std::fmt::Display for ErrorStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoError => write!(f, "noError"),
            Self::TooBig => write!(f, "tooBig"),
            Self::NoSuchName => write!(f, "noSuchName"),
            Self::BadValue => write!(f, "badValue"),
            Self::ReadOnly => write!(f, "readOnly"),
            Self::GenErr => write!(f, "genErr"),
            Self::NoAccess => write!(f, "noAccess"),
            Self::WrongType => write!(f, "wrongType"),
            Self::WrongLength => write!(f, "wrongLength"),
            Self::WrongEncoding => write!(f, "wrongEncoding"),
            Self::WrongValue => write!(f, "wrongValue"),
            Self::NoCreation => write!(f, "noCreation"),
            Self::InconsistentValue => write!(f, "inconsistentValue"),
            Self::ResourceUnavailable => write!(f, "resourceUnavailable"),
            Self::CommitFailed => write!(f, "commitFailed"),
            Self::UndoFailed => write!(f, "undoFailed"),
            Self::AuthorizationError => write!(f, "authorizationError"),
            Self::NotWritable => write!(f, "notWritable"),
            Self::InconsistentName => write!(f, "inconsistentName"),
            Self::Unknown(code) => write!(f, "unknown({})", code),
        }
    }
}

/// The main error type for all snmp-wire operations.
///
/// # Common Patterns
///
/// ```
/// use snmp_wire::{Error, DecodeErrorKind};
///
/// fn is_framing_error(error: &Error) -> bool {
///     matches!(
///         error,
///         Error::Decode {
///             kind: DecodeErrorKind::TruncatedData
///                 | DecodeErrorKind::InsufficientData { .. }
///                 | DecodeErrorKind::LengthTooLong { .. }
///                 | DecodeErrorKind::LengthExceedsMax { .. }
///                 | DecodeErrorKind::ExtendedTag(_),
///             ..
///         }
///     )
/// }
/// ```
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// BER decoding error.
    #[error("decode error at offset {offset}: {kind}")]
    Decode {
        offset: usize,
        kind: DecodeErrorKind,
    },

    /// BER encoding error.
    #[error("encode error: {kind}")]
    Encode { kind: EncodeErrorKind },

    /// Invalid OID format.
    #[error("invalid OID: {kind}")]
    InvalidOid {
        kind: OidErrorKind,
        input: Option<Box<str>>, // Only allocated when parsing string input
    },

    /// Worker response cannot be merged into the aggregate.
    #[error("aggregation failed: {kind}")]
    Aggregate { kind: AggregateErrorKind },

    /// Message exceeds maximum size.
    #[error("message too large: {size} bytes exceeds maximum {max}")]
    MessageTooLarge { size: usize, max: usize },
}

impl Error {
    /// Create a decode error.
    pub fn decode(offset: usize, kind: DecodeErrorKind) -> Self {
        Self::Decode { offset, kind }
    }

    /// Create an encode error.
    pub fn encode(kind: EncodeErrorKind) -> Self {
        Self::Encode { kind }
    }

    /// Create an aggregation error.
    pub fn aggregate(kind: AggregateErrorKind) -> Self {
        Self::Aggregate { kind }
    }

    /// Create an invalid OID error from a kind (no input string).
    pub fn invalid_oid(kind: OidErrorKind) -> Self {
        Self::InvalidOid { kind, input: None }
    }

    /// Create an invalid OID error with the input string that failed.
    pub fn invalid_oid_with_input(kind: OidErrorKind, input: impl Into<Box<str>>) -> Self {
        Self::InvalidOid {
            kind,
            input: Some(input.into()),
        }
    }

    /// Get the decode error kind, if this is a decode error.
    pub fn decode_kind(&self) -> Option<DecodeErrorKind> {
        match self {
            Self::Decode { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_roundtrip() {
        for code in 0..=18 {
            assert_eq!(ErrorStatus::from_i32(code).as_i32(), code);
        }
        assert_eq!(ErrorStatus::from_i32(99), ErrorStatus::Unknown(99));
        assert_eq!(ErrorStatus::Unknown(99).as_i32(), 99);
    }

    #[test]
    fn test_decode_error_display() {
        let err = Error::decode(7, DecodeErrorKind::UnsupportedType(0x49));
        assert_eq!(
            err.to_string(),
            "decode error at offset 7: unsupported variable type 0x49"
        );
        assert_eq!(
            err.decode_kind(),
            Some(DecodeErrorKind::UnsupportedType(0x49))
        );
    }

    #[test]
    fn test_encode_error_display() {
        let kind = OidErrorKind::InvalidSecondArc {
            first: 1,
            second: 40,
        };
        let err = Error::encode(EncodeErrorKind::InvalidArc(kind));
        assert_eq!(
            err.to_string(),
            "encode error: OID not encodable: second arc 40 too large for first arc 1"
        );
    }

    #[test]
    fn test_aggregate_error_display() {
        let err = Error::aggregate(AggregateErrorKind::VarCountMismatch {
            expected: 3,
            actual: 2,
        });
        assert_eq!(
            err.to_string(),
            "aggregation failed: expected 3 variable bindings, got 2"
        );
        assert_eq!(err.decode_kind(), None);
    }

    #[test]
    fn error_size_budget() {
        // Errors travel through every decode layer by value; keep them small.
        assert!(
            std::mem::size_of::<Error>() <= 64,
            "Error size {} exceeds 64-byte budget",
            std::mem::size_of::<Error>()
        );
    }
}

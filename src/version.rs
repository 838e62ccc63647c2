//! SNMP protocol version carried in the message envelope.

use std::fmt;

/// SNMP version.
///
/// Only the community-based versions are supported; a version field of 3
/// is rejected when decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Version {
    /// SNMPv1 (wire value 0)
    V1,
    /// SNMPv2c (wire value 1)
    #[default]
    V2c,
}

impl Version {
    /// Wire value of the version field.
    pub fn as_i32(self) -> i32 {
        match self {
            Version::V1 => 0,
            Version::V2c => 1,
        }
    }

    /// Map a wire value back to a version.
    pub fn from_i32(value: i32) -> Option<Self> {
        match value {
            0 => Some(Version::V1),
            1 => Some(Version::V2c),
            _ => None,
        }
    }

    /// Whether exception values (noSuchObject etc.) may appear on the wire.
    pub fn supports_exceptions(self) -> bool {
        self == Version::V2c
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Version::V1 => write!(f, "v1"),
            Version::V2c => write!(f, "v2c"),
        }
    }
}

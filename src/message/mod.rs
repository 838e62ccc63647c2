//! SNMP message wrappers.
//!
//! Messages wrap a PDU with the protocol version and community string.
//! [`Message::decode`] dispatches on the version field; today every
//! accepted version is community-based.

mod community;

pub use community::CommunityMessage;

use crate::error::Result;
use crate::pdu::Pdu;
use crate::version::Version;
use bytes::Bytes;

/// Default upper bound on an encoded message, in bytes.
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 4096;

/// Default upper bound on the community string, in bytes.
pub const DEFAULT_MAX_COMMUNITY_LEN: usize = 256;

/// Size limits applied when encoding and decoding messages.
///
/// ```
/// use snmp_wire::message::Limits;
///
/// let limits = Limits::default();
/// assert_eq!(limits.max_message_size, 4096);
/// assert_eq!(limits.max_community_len, 256);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Limits {
    /// Largest message accepted or produced.
    pub max_message_size: usize,
    /// Longest community string accepted or produced.
    pub max_community_len: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
            max_community_len: DEFAULT_MAX_COMMUNITY_LEN,
        }
    }
}

/// Decoded SNMP message (any supported version).
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum Message {
    /// SNMPv1 or SNMPv2c message with community string
    Community(CommunityMessage),
}

impl Message {
    /// Get a reference to the PDU.
    pub fn pdu(&self) -> &Pdu {
        match self {
            Message::Community(m) => &m.pdu,
        }
    }

    /// Consume and return the PDU.
    pub fn into_pdu(self) -> Pdu {
        match self {
            Message::Community(m) => m.into_pdu(),
        }
    }

    /// Get the SNMP version.
    pub fn version(&self) -> Version {
        match self {
            Message::Community(m) => m.version,
        }
    }

    /// Encode to BER.
    pub fn encode(&self) -> Result<Bytes> {
        match self {
            Message::Community(m) => m.encode(),
        }
    }

    /// Decode a message, dispatching on its version field.
    pub fn decode(data: Bytes) -> Result<Self> {
        Self::decode_with_limits(data, &Limits::default())
    }

    /// Decode a message with explicit limits.
    pub fn decode_with_limits(data: Bytes, limits: &Limits) -> Result<Self> {
        CommunityMessage::decode_with_limits(data, limits).map(Message::Community)
    }
}

impl From<CommunityMessage> for Message {
    fn from(msg: CommunityMessage) -> Self {
        Message::Community(msg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DecodeErrorKind;
    use crate::oid;

    #[test]
    fn test_message_dispatch() {
        let pdu = Pdu::get_next_request(5, &[oid!(1, 3, 6, 1, 2, 1)]);
        let bytes = CommunityMessage::v1(b"public".as_slice(), pdu.clone())
            .encode()
            .unwrap();

        let msg = Message::decode(bytes.clone()).unwrap();
        assert_eq!(msg.version(), Version::V1);
        assert_eq!(msg.pdu(), &pdu);
        assert_eq!(msg.encode().unwrap(), bytes);
        assert_eq!(msg.into_pdu(), pdu);
    }

    #[test]
    fn test_message_insufficient_data() {
        let err = Message::decode(Bytes::from_static(&[0x30, 0x10, 0x02, 0x01])).unwrap_err();
        assert!(matches!(
            err.decode_kind(),
            Some(DecodeErrorKind::InsufficientData {
                needed: 16,
                available: 2
            })
        ));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_limits_serde_defaults() {
        let limits: Limits = serde_json::from_str(r#"{"max_message_size": 1500}"#).unwrap();
        assert_eq!(limits.max_message_size, 1500);
        assert_eq!(limits.max_community_len, DEFAULT_MAX_COMMUNITY_LEN);
    }
}

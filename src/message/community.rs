//! Community-based SNMP message format (v1/v2c).
//!
//! Both versions share one layout:
//! `SEQUENCE { version INTEGER, community OCTET STRING, pdu PDU }`
//!
//! Only the version number differs (0 for v1, 1 for v2c), along with how
//! exception values inside the PDU are written.

use super::Limits;
use crate::ber::{Decoder, EncodeBuf};
use crate::error::{DecodeErrorKind, EncodeErrorKind, Error, Result};
use crate::pdu::Pdu;
use crate::version::Version;
use bytes::Bytes;

/// Community-based SNMP message (v1/v2c).
#[derive(Debug, Clone, PartialEq)]
pub struct CommunityMessage {
    /// SNMP version (V1 or V2c)
    pub version: Version,
    /// Community string
    pub community: Bytes,
    /// Protocol data unit
    pub pdu: Pdu,
}

impl CommunityMessage {
    /// Create a new community message.
    pub fn new(version: Version, community: impl Into<Bytes>, pdu: Pdu) -> Self {
        Self {
            version,
            community: community.into(),
            pdu,
        }
    }

    /// Create a V2c message.
    pub fn v2c(community: impl Into<Bytes>, pdu: Pdu) -> Self {
        Self::new(Version::V2c, community, pdu)
    }

    /// Create a V1 message.
    pub fn v1(community: impl Into<Bytes>, pdu: Pdu) -> Self {
        Self::new(Version::V1, community, pdu)
    }

    /// Encode to BER using default [`Limits`].
    ///
    /// Fails if any binding cannot be encoded (for example an OID whose
    /// first arcs do not pack) or if [`decode`](Self::decode) would refuse
    /// the result. No partial message is produced.
    pub fn encode(&self) -> Result<Bytes> {
        self.encode_with_limits(&Limits::default())
    }

    /// Encode to BER under explicit limits.
    ///
    /// Refuses a community longer than `limits.max_community_len` and a
    /// message larger than `limits.max_message_size`, the same bounds
    /// [`decode_with_limits`](Self::decode_with_limits) applies.
    pub fn encode_with_limits(&self, limits: &Limits) -> Result<Bytes> {
        if self.community.len() > limits.max_community_len {
            tracing::debug!(
                target: "snmp_wire::message",
                { length = self.community.len(), max = limits.max_community_len },
                "community exceeds length limit"
            );
            return Err(Error::encode(EncodeErrorKind::CommunityTooLong {
                length: self.community.len(),
                max: limits.max_community_len,
            }));
        }

        let mut buf = EncodeBuf::new();
        buf.push_sequence(|buf| {
            self.pdu.encode(buf, self.version)?;
            buf.push_octet_string(&self.community)?;
            buf.push_integer(self.version.as_i32());
            Ok(())
        })?;
        let bytes = buf.finish();

        if bytes.len() > limits.max_message_size {
            tracing::debug!(
                target: "snmp_wire::message",
                { size = bytes.len(), max = limits.max_message_size, request_id = self.pdu.request_id },
                "encoded message exceeds size limit"
            );
            return Err(Error::MessageTooLarge {
                size: bytes.len(),
                max: limits.max_message_size,
            });
        }
        Ok(bytes)
    }

    /// Decode from BER using default [`Limits`].
    ///
    /// The message must span `data` exactly; trailing bytes are rejected.
    pub fn decode(data: Bytes) -> Result<Self> {
        Self::decode_with_limits(data, &Limits::default())
    }

    /// Decode from BER with explicit limits.
    ///
    /// ```
    /// use snmp_wire::message::{CommunityMessage, Limits};
    /// use snmp_wire::{oid, Pdu, DecodeErrorKind};
    ///
    /// let msg = CommunityMessage::v2c(&b"a-long-community"[..], Pdu::get_request(1, &[oid!(1, 3, 6, 1)]));
    /// let bytes = msg.encode().unwrap();
    ///
    /// let limits = Limits { max_community_len: 8, ..Limits::default() };
    /// let err = CommunityMessage::decode_with_limits(bytes, &limits).unwrap_err();
    /// assert!(matches!(err.decode_kind(), Some(DecodeErrorKind::OctetStringTooLong { length: 16, max: 8 })));
    /// ```
    pub fn decode_with_limits(data: Bytes, limits: &Limits) -> Result<Self> {
        if data.len() > limits.max_message_size {
            tracing::debug!(
                target: "snmp_wire::message",
                { size = data.len(), max = limits.max_message_size },
                "incoming message exceeds size limit"
            );
            return Err(Error::MessageTooLarge {
                size: data.len(),
                max: limits.max_message_size,
            });
        }
        let mut decoder = Decoder::new(data);
        let msg = Self::decode_from(&mut decoder, limits)?;
        decoder.expect_end()?;
        Ok(msg)
    }

    /// Decode one message from `decoder`.
    fn decode_from(decoder: &mut Decoder, limits: &Limits) -> Result<Self> {
        decoder.transaction(|d| {
            let mut seq = d.read_sequence()?;

            let version_offset = seq.offset();
            let version_num = seq.read_integer()?;
            let Some(version) = Version::from_i32(version_num) else {
                return seq.fail_at(version_offset, DecodeErrorKind::UnknownVersion(version_num));
            };

            let community = seq.read_octet_string_bounded(limits.max_community_len)?;
            let pdu = Pdu::decode(&mut seq)?;
            seq.expect_end()?;

            tracing::trace!(
                target: "snmp_wire::message",
                { version = %version, pdu_type = %pdu.pdu_type, request_id = pdu.request_id },
                "decoded message"
            );

            Ok(CommunityMessage {
                version,
                community,
                pdu,
            })
        })
    }

    /// Consume and return the PDU.
    pub fn into_pdu(self) -> Pdu {
        self.pdu
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ber::decode_length;
    use crate::message::{DEFAULT_MAX_COMMUNITY_LEN, DEFAULT_MAX_MESSAGE_SIZE};
    use crate::oid;
    use crate::value::Value;
    use crate::varbind::VarBind;

    fn get_request() -> CommunityMessage {
        let pdu = Pdu::get_request(1, &[oid!(1, 3, 6, 1)]);
        CommunityMessage::v2c(b"public".as_slice(), pdu)
    }

    fn interface_names(count: u32) -> Pdu {
        let varbinds = (0..count)
            .map(|i| {
                let oid = oid!(1, 3, 6, 1, 2, 1, 2, 2, 1, 2, i);
                VarBind::new(oid, Value::from("ethernet-interface"))
            })
            .collect();
        Pdu::response(1, varbinds)
    }

    /// Content length and header size of the TLV starting at `at`.
    fn tlv_at(bytes: &[u8], at: usize) -> (usize, usize) {
        decode_length(&bytes[at + 1..], at + 1).unwrap()
    }

    #[test]
    fn test_v1_roundtrip() {
        let pdu = Pdu::get_request(42, &[oid!(1, 3, 6, 1, 2, 1, 1, 1, 0)]);
        let msg = CommunityMessage::v1(b"public".as_slice(), pdu);

        let decoded = CommunityMessage::decode(msg.encode().unwrap()).unwrap();
        assert_eq!(decoded.version, Version::V1);
        assert_eq!(decoded, msg);
    }

    #[test]
    fn test_v2c_response_roundtrip() {
        let pdu = Pdu::response(
            123,
            vec![
                VarBind::new(oid!(1, 3, 6, 1, 2, 1, 1, 1, 0), Value::from("Linux")),
                VarBind::new(
                    oid!(1, 3, 6, 1, 2, 1, 31, 1, 1, 1, 6, 1),
                    Value::Counter64(u64::MAX),
                ),
                VarBind::new(oid!(1, 3, 6, 1, 2, 1, 1, 9, 0), Value::NoSuchInstance),
            ],
        );
        let msg = CommunityMessage::v2c(b"private".as_slice(), pdu);

        let decoded = CommunityMessage::decode(msg.encode().unwrap()).unwrap();
        assert_eq!(decoded, msg);
        assert_eq!(decoded.community.as_ref(), b"private");
    }

    #[test]
    fn test_v1_exceptions_degrade() {
        let pdu = Pdu::response(
            1,
            vec![
                VarBind::new(oid!(1, 3, 6, 1), Value::EndOfMibView),
                VarBind::new(oid!(1, 3, 6, 2), Value::NoSuchInstance),
            ],
        );
        let msg = CommunityMessage::v1(b"public".as_slice(), pdu);
        let decoded = CommunityMessage::decode(msg.encode().unwrap()).unwrap();

        assert!(
            decoded
                .pdu
                .varbinds
                .iter()
                .all(|vb| vb.value == Value::NoSuchObject)
        );
    }

    #[test]
    fn test_nested_lengths_consistent() {
        let pdu = Pdu::response(
            7,
            vec![
                VarBind::new(oid!(1, 3, 6, 1, 2, 1, 1, 5, 0), Value::from("host")),
                VarBind::new(oid!(1, 3, 6, 1, 2, 1, 2, 1, 0), Value::Integer(300)),
            ],
        );
        let bytes = CommunityMessage::v2c(b"public".as_slice(), pdu)
            .encode()
            .unwrap();

        // message header
        assert_eq!(bytes[0], 0x30);
        let (msg_len, msg_hdr) = tlv_at(&bytes, 0);
        assert_eq!(1 + msg_hdr + msg_len, bytes.len());

        // version (3) + community (2 + 6) precede the PDU
        let pdu_start = 1 + msg_hdr + 3 + 8;
        assert_eq!(bytes[pdu_start], 0xA2);
        let (pdu_len, pdu_hdr) = tlv_at(&bytes, pdu_start);
        assert_eq!(pdu_start + 1 + pdu_hdr + pdu_len, bytes.len());

        // request-id (3) + error-status (3) + error-index (3)
        let list_start = pdu_start + 1 + pdu_hdr + 9;
        assert_eq!(bytes[list_start], 0x30);
        let (list_len, list_hdr) = tlv_at(&bytes, list_start);
        assert_eq!(list_start + 1 + list_hdr + list_len, bytes.len());
    }

    #[test]
    fn test_unknown_version_rejected() {
        let mut bytes = get_request().encode().unwrap().to_vec();
        // version INTEGER content byte
        bytes[4] = 3;
        let err = CommunityMessage::decode(Bytes::from(bytes)).unwrap_err();
        assert!(matches!(
            err,
            Error::Decode {
                offset: 2,
                kind: DecodeErrorKind::UnknownVersion(3)
            }
        ));
    }

    #[test]
    fn test_trailing_bytes_rejected() {
        let mut bytes = get_request().encode().unwrap().to_vec();
        bytes.extend_from_slice(&[0x05, 0x00]);
        let err = CommunityMessage::decode(Bytes::from(bytes)).unwrap_err();
        assert_eq!(
            err.decode_kind(),
            Some(DecodeErrorKind::TrailingData { remaining: 2 })
        );
    }

    #[test]
    fn test_truncated_message() {
        let bytes = get_request().encode().unwrap();
        for cut in 0..bytes.len() {
            let result = CommunityMessage::decode(bytes.slice(..cut));
            assert!(result.is_err(), "cut at {cut}");
        }
    }

    #[test]
    fn test_size_limits() {
        let msg = CommunityMessage::v2c(b"public".as_slice(), interface_names(50));
        let limits = Limits {
            max_message_size: 512,
            ..Limits::default()
        };

        let err = msg.encode_with_limits(&limits).unwrap_err();
        assert!(matches!(err, Error::MessageTooLarge { max: 512, .. }));

        let bytes = msg.encode().unwrap();
        let err = CommunityMessage::decode_with_limits(bytes.clone(), &limits).unwrap_err();
        assert!(matches!(err, Error::MessageTooLarge { max: 512, .. }));

        assert_eq!(msg.encode_with_limits(&Limits::default()).unwrap(), bytes);
    }

    #[test]
    fn test_default_encode_accepted_by_default_decode() {
        // 150 bindings of about 35 bytes each, well over 4096
        let msg = CommunityMessage::v2c(b"public".as_slice(), interface_names(150));
        let err = msg.encode().unwrap_err();
        assert!(matches!(err, Error::MessageTooLarge { max: 4096, .. }));

        let limits = Limits {
            max_message_size: 16 * 1024,
            ..Limits::default()
        };
        let bytes = msg.encode_with_limits(&limits).unwrap();
        assert!(bytes.len() > DEFAULT_MAX_MESSAGE_SIZE);
        assert!(CommunityMessage::decode(bytes.clone()).is_err());
        assert_eq!(
            CommunityMessage::decode_with_limits(bytes, &limits).unwrap(),
            msg
        );

        let long_community = vec![b'c'; DEFAULT_MAX_COMMUNITY_LEN + 1];
        let msg = CommunityMessage::v2c(long_community, Pdu::get_request(1, &[]));
        let err = msg.encode().unwrap_err();
        assert!(matches!(
            err,
            Error::Encode {
                kind: EncodeErrorKind::CommunityTooLong {
                    length: 257,
                    max: 256
                }
            }
        ));
    }

    #[test]
    fn test_unpackable_oid_fails_whole_message() {
        let pdu = Pdu::response(
            9,
            vec![
                VarBind::new(oid!(1, 3, 6, 1, 2, 1, 1, 3, 0), Value::TimeTicks(1)),
                VarBind::new(oid!(1, 40, 5), Value::Integer(1)),
            ],
        );
        let err = CommunityMessage::v2c(b"public".as_slice(), pdu)
            .encode()
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Encode {
                kind: EncodeErrorKind::InvalidArc(_)
            }
        ));
    }
}

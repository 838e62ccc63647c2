//! Known-Answer Tests (KAT) for the wire format.
//!
//! Expected byte images are written out by hand from X.690 and RFC 1157 /
//! RFC 3416 so that encoder and decoder are checked against the standard
//! rather than against each other.
//!
//! - X.690 8.3: INTEGER minimal two's-complement content
//! - X.690 8.19: OBJECT IDENTIFIER subidentifier packing
//! - X.690 8.1.3: definite length, short and long forms
//! - RFC 3416 3: exception values and GetBulk field reuse

use bytes::Bytes;
use snmp_wire::ber::{Decoder, EncodeBuf, decode_length};
use snmp_wire::message::CommunityMessage;
use snmp_wire::testing::{decode, encode};
use snmp_wire::{DecodeErrorKind, Oid, Pdu, PduType, Value, VarBind, Version, oid};

fn value_bytes(value: &Value, version: Version) -> String {
    let mut buf = EncodeBuf::new();
    value.encode(&mut buf, version).unwrap();
    encode(&buf.finish())
}

fn hex(s: &str) -> Bytes {
    Bytes::from(decode(s).unwrap())
}

/// SNMPv2c GetRequest for sysDescr.0 with community "public".
///
/// ```text
/// 30 26                     Message SEQUENCE (38)
///    02 01 01               version v2c
///    04 06 "public"         community
///    a0 19                  GetRequest (25)
///       02 01 01            request-id 1
///       02 01 00            error-status
///       02 01 00            error-index
///       30 0e               varbind list (14)
///          30 0c            varbind (12)
///             06 08 2b06010201010100
///             05 00
/// ```
const V2C_GET_SYSDESCR: &str = "3026 020101 0406 7075626c6963 a019 020101 020100 020100 \
                                300e 300c 0608 2b06010201010100 0500";

#[test]
fn test_v2c_get_request_encode() {
    let pdu = Pdu::get_request(1, &[oid!(1, 3, 6, 1, 2, 1, 1, 1, 0)]);
    let msg = CommunityMessage::v2c(&b"public"[..], pdu);
    assert_eq!(msg.encode().unwrap(), hex(V2C_GET_SYSDESCR));
}

#[test]
fn test_v2c_get_request_decode() {
    let msg = CommunityMessage::decode(hex(V2C_GET_SYSDESCR)).unwrap();
    assert_eq!(msg.version, Version::V2c);
    assert_eq!(msg.community.as_ref(), b"public");
    assert_eq!(msg.pdu.pdu_type, PduType::GetRequest);
    assert_eq!(msg.pdu.request_id, 1);
    let sys_descr = VarBind::null(oid!(1, 3, 6, 1, 2, 1, 1, 1, 0));
    assert_eq!(msg.pdu.varbinds, vec![sys_descr]);
}

/// SNMPv1 Response carrying sysUpTime.0 = TimeTicks 0x12345678.
const V1_RESPONSE_UPTIME: &str = "302b 020100 0406 7075626c6963 a21e 02021234 020100 020100 \
                                  3012 3010 0608 2b06010201010300 430412345678";

#[test]
fn test_v1_response_roundtrip() {
    let ticks = Value::TimeTicks(0x1234_5678);
    let uptime = VarBind::new(oid!(1, 3, 6, 1, 2, 1, 1, 3, 0), ticks);
    let msg = CommunityMessage::v1(&b"public"[..], Pdu::response(0x1234, vec![uptime]));
    let bytes = msg.encode().unwrap();
    assert_eq!(bytes, hex(V1_RESPONSE_UPTIME));
    assert_eq!(CommunityMessage::decode(bytes).unwrap(), msg);
}

/// GetBulk for ifTable with non-repeaters 0 and max-repetitions 10.
///
/// The error-status and error-index slots carry the two bulk fields.
const V2C_GETBULK_IFTABLE: &str = "3025 020101 0406 7075626c6963 a518 020101 020100 02010a \
                                   300d 300b 0607 2b060102010202 0500";

#[test]
fn test_getbulk_request() {
    let pdu = Pdu::get_bulk(1, 0, 10, &[oid!(1, 3, 6, 1, 2, 1, 2, 2)]);
    let msg = CommunityMessage::v2c(&b"public"[..], pdu);
    assert_eq!(msg.encode().unwrap(), hex(V2C_GETBULK_IFTABLE));

    let decoded = CommunityMessage::decode(hex(V2C_GETBULK_IFTABLE)).unwrap();
    assert_eq!(decoded.pdu.pdu_type, PduType::GetBulkRequest);
    assert_eq!(decoded.pdu.non_repeaters(), 0);
    assert_eq!(decoded.pdu.max_repetitions(), 10);
}

/// X.690 8.3.2: INTEGER content is the minimal two's-complement form.
#[test]
fn test_integer_minimal_lengths() {
    let cases = [
        (0, "020100"),
        (-1, "0201ff"),
        (127, "02017f"),
        (-128, "020180"),
        (128, "02020080"),
        (255, "020200ff"),
        (256, "02020100"),
        (-129, "0202ff7f"),
        (2_147_483_647, "02047fffffff"),
        (i32::MIN, "020480000000"),
    ];
    for (value, expected) in cases {
        assert_eq!(
            value_bytes(&Value::Integer(value), Version::V2c),
            expected,
            "value {value}"
        );
    }
}

/// Unsigned application types get a 0x00 guard byte when the top bit is set.
#[test]
fn test_unsigned_guard_byte() {
    assert_eq!(
        value_bytes(&Value::Counter32(0x8000_0000), Version::V2c),
        "41050080000000"
    );
    assert_eq!(value_bytes(&Value::Gauge32(0), Version::V2c), "420100");
    assert_eq!(
        value_bytes(&Value::TimeTicks(255), Version::V2c),
        "430200ff"
    );
    assert_eq!(
        value_bytes(&Value::Counter64(u64::MAX), Version::V2c),
        "460900ffffffffffffffff"
    );

    // Decoding must not sign-extend: 41 01 ff is 255, not 0xffffffff
    let mut decoder = Decoder::from_slice(&[0x41, 0x01, 0xFF]);
    assert_eq!(Value::decode(&mut decoder).unwrap(), Value::Counter32(255));
}

/// X.690 8.19: first two arcs share one subidentifier.
#[test]
fn test_oid_subidentifiers() {
    let cases: [(&[u32], &str); 5] = [
        (&[1, 3, 6, 1, 2, 1][..], "2b 06 01 02 01"),
        (&[1, 3, 6, 1, 4, 1, 2021][..], "2b06010401 8f65"),
        (&[2, 999, 3][..], "8837 03"),
        (&[1, 3, u32::MAX][..], "2b 8fffffff7f"),
        (&[0, 0][..], "00"),
    ];
    for (arcs, expected) in cases {
        let oid = Oid::from_slice(arcs);
        let content = oid.encode_content().unwrap();
        assert_eq!(encode(&content), expected.replace(' ', ""), "{oid}");
        assert_eq!(Oid::from_ber(&content).unwrap(), oid);
    }

    assert_eq!(Oid::from_ber(&[0x2B]).unwrap(), oid!(1, 3));
    assert_eq!(Oid::from_ber(&[]).unwrap(), oid!(0, 0));
}

/// X.690 8.1.3: short form below 128, long form with minimal length octets.
#[test]
fn test_length_forms() {
    let short = Value::OctetString(Bytes::from(vec![0xAA; 127]));
    assert!(value_bytes(&short, Version::V2c).starts_with("047f"));

    let one = Value::OctetString(Bytes::from(vec![0xAA; 200]));
    assert!(value_bytes(&one, Version::V2c).starts_with("0481c8"));

    let two = Value::OctetString(Bytes::from(vec![0xAA; 300]));
    assert!(value_bytes(&two, Version::V2c).starts_with("0482012c"));

    assert_eq!(decode_length(&[0x82, 0x01, 0x2C], 0).unwrap(), (300, 3));
    assert_eq!(
        decode_length(&[0x80], 0).unwrap_err().decode_kind(),
        Some(DecodeErrorKind::IndefiniteLength)
    );
}

/// RFC 3416 exceptions, and their SNMPv1 degradation to noSuchObject.
#[test]
fn test_exception_values() {
    assert_eq!(value_bytes(&Value::NoSuchObject, Version::V2c), "8000");
    assert_eq!(value_bytes(&Value::NoSuchInstance, Version::V2c), "8100");
    assert_eq!(value_bytes(&Value::EndOfMibView, Version::V2c), "8200");

    assert_eq!(value_bytes(&Value::NoSuchInstance, Version::V1), "8000");
    assert_eq!(value_bytes(&Value::EndOfMibView, Version::V1), "8000");

    let mut decoder = Decoder::new(hex("810100"));
    assert_eq!(
        Value::decode(&mut decoder).unwrap_err().decode_kind(),
        Some(DecodeErrorKind::InvalidException)
    );
}

#[test]
fn test_application_values() {
    assert_eq!(
        value_bytes(&Value::IpAddress([192, 168, 1, 1]), Version::V2c),
        "4004c0a80101"
    );
    assert_eq!(value_bytes(&Value::from("hi"), Version::V2c), "04026869");
    assert_eq!(value_bytes(&Value::Null, Version::V2c), "0500");
    assert_eq!(
        value_bytes(&Value::ObjectIdentifier(oid!(1, 3, 6, 1)), Version::V2c),
        "06032b0601"
    );
}

/// Decoding stops at the first violation and reports where it happened.
#[test]
fn test_decode_failures() {
    // Opaque-wrapped float (0x48) is not a supported variable type
    let err = CommunityMessage::decode(hex(
        "301f 020101 0406 7075626c6963 a212 020101 020100 020100 3007 3005 06012b 4800",
    ))
    .unwrap_err();
    assert_eq!(
        err.decode_kind(),
        Some(DecodeErrorKind::UnsupportedType(0x48))
    );

    // Five length octets
    let err = CommunityMessage::decode(hex("3085 0000000010")).unwrap_err();
    assert_eq!(
        err.decode_kind(),
        Some(DecodeErrorKind::LengthTooLong { octets: 5 })
    );

    // SET PDU tag
    let err = CommunityMessage::decode(hex(
        "3018 020101 0406 7075626c6963 a30b 020101 020100 020100 3000",
    ))
    .unwrap_err();
    assert_eq!(
        err.decode_kind(),
        Some(DecodeErrorKind::UnknownPduType(0xA3))
    );
}

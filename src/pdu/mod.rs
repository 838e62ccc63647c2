//! SNMP Protocol Data Units (PDUs).
//!
//! GET, GET-NEXT, RESPONSE and GET-BULK share one layout: three INTEGERs
//! followed by the variable-binding list. GET-BULK reuses the error slots
//! for non-repeaters and max-repetitions.

use crate::ber::{Decoder, EncodeBuf, tag};
use crate::error::{DecodeErrorKind, ErrorStatus, Result};
use crate::oid::Oid;
use crate::varbind::{VarBind, decode_varbind_list, encode_varbind_list};
use crate::version::Version;

/// PDU type tag.
///
/// SET, TRAP and INFORM tags exist in [`tag::pdu`] but are not decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PduType {
    GetRequest = tag::pdu::GET_REQUEST,
    GetNextRequest = tag::pdu::GET_NEXT_REQUEST,
    Response = tag::pdu::RESPONSE,
    GetBulkRequest = tag::pdu::GET_BULK_REQUEST,
}

impl PduType {
    /// Create from tag byte.
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            tag::pdu::GET_REQUEST => Some(Self::GetRequest),
            tag::pdu::GET_NEXT_REQUEST => Some(Self::GetNextRequest),
            tag::pdu::RESPONSE => Some(Self::Response),
            tag::pdu::GET_BULK_REQUEST => Some(Self::GetBulkRequest),
            _ => None,
        }
    }

    /// Get the tag byte.
    pub fn tag(self) -> u8 {
        self as u8
    }
}

impl std::fmt::Display for PduType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GetRequest => write!(f, "GetRequest"),
            Self::GetNextRequest => write!(f, "GetNextRequest"),
            Self::Response => write!(f, "Response"),
            Self::GetBulkRequest => write!(f, "GetBulkRequest"),
        }
    }
}

/// Generic PDU structure for request/response operations.
#[derive(Debug, Clone, PartialEq)]
pub struct Pdu {
    /// PDU type
    pub pdu_type: PduType,
    /// Request ID for correlating requests and responses
    pub request_id: i32,
    /// Error status (0 for requests), or non-repeaters for GET-BULK
    pub error_status: i32,
    /// Error index (1-based), or max-repetitions for GET-BULK
    pub error_index: i32,
    /// Variable bindings
    pub varbinds: Vec<VarBind>,
}

impl Pdu {
    /// Create a new GET request PDU.
    pub fn get_request(request_id: i32, oids: &[Oid]) -> Self {
        Self::request(PduType::GetRequest, request_id, oids)
    }

    /// Create a new GETNEXT request PDU.
    pub fn get_next_request(request_id: i32, oids: &[Oid]) -> Self {
        Self::request(PduType::GetNextRequest, request_id, oids)
    }

    fn request(pdu_type: PduType, request_id: i32, oids: &[Oid]) -> Self {
        Self {
            pdu_type,
            request_id,
            error_status: 0,
            error_index: 0,
            varbinds: oids.iter().cloned().map(VarBind::null).collect(),
        }
    }

    /// Create a GETBULK request PDU.
    ///
    /// ```
    /// use snmp_wire::{oid, Pdu};
    ///
    /// let pdu = Pdu::get_bulk(7, 1, 10, &[oid!(1, 3, 6, 1, 2, 1, 1, 3), oid!(1, 3, 6, 1, 2, 1, 2, 2)]);
    /// assert_eq!(pdu.non_repeaters(), 1);
    /// assert_eq!(pdu.max_repetitions(), 10);
    /// assert_eq!(pdu.error_status, 1);
    /// ```
    pub fn get_bulk(
        request_id: i32,
        non_repeaters: i32,
        max_repetitions: i32,
        oids: &[Oid],
    ) -> Self {
        let mut pdu = Self::request(PduType::GetBulkRequest, request_id, oids);
        pdu.error_status = non_repeaters;
        pdu.error_index = max_repetitions;
        pdu
    }

    /// Create a Response PDU carrying `varbinds`.
    pub fn response(request_id: i32, varbinds: Vec<VarBind>) -> Self {
        Self {
            pdu_type: PduType::Response,
            request_id,
            error_status: 0,
            error_index: 0,
            varbinds,
        }
    }

    /// GET-BULK non-repeaters (the error-status slot).
    pub fn non_repeaters(&self) -> i32 {
        self.error_status
    }

    /// GET-BULK max-repetitions (the error-index slot).
    pub fn max_repetitions(&self) -> i32 {
        self.error_index
    }

    /// Encode to BER.
    ///
    /// `version` selects how exception values are written. On failure the
    /// buffer is left unchanged.
    pub fn encode(&self, buf: &mut EncodeBuf, version: Version) -> Result<()> {
        buf.push_constructed(self.pdu_type.tag(), |buf| {
            encode_varbind_list(buf, &self.varbinds, version)?;
            buf.push_integer(self.error_index);
            buf.push_integer(self.error_status);
            buf.push_integer(self.request_id);
            Ok(())
        })
    }

    /// Decode from BER.
    ///
    /// Fails with [`DecodeErrorKind::UnknownPduType`] for any tag other than
    /// the four supported kinds. On failure the decoder position is unchanged.
    pub fn decode(decoder: &mut Decoder) -> Result<Self> {
        decoder.transaction(|d| {
            let tag_offset = d.offset();
            let (tag, len) = d.read_header()?;
            let Some(pdu_type) = PduType::from_tag(tag) else {
                return d.fail_at(tag_offset, DecodeErrorKind::UnknownPduType(tag));
            };
            let mut pdu_decoder = d.sub_decoder(len)?;

            let request_id = pdu_decoder.read_integer()?;
            let error_status = pdu_decoder.read_integer()?;
            let error_index = pdu_decoder.read_integer()?;
            let varbinds = decode_varbind_list(&mut pdu_decoder)?;
            pdu_decoder.expect_end()?;

            tracing::trace!(target: "snmp_wire::pdu", { pdu_type = %pdu_type, request_id, varbinds = varbinds.len() }, "decoded PDU");

            Ok(Pdu {
                pdu_type,
                request_id,
                error_status,
                error_index,
                varbinds,
            })
        })
    }

    /// Check if this is an error response.
    ///
    /// Always false for GET-BULK, whose error slot holds non-repeaters.
    pub fn is_error(&self) -> bool {
        self.pdu_type != PduType::GetBulkRequest && self.error_status != 0
    }

    /// Get the error status as an enum.
    pub fn error_status_enum(&self) -> ErrorStatus {
        ErrorStatus::from_i32(self.error_status)
    }

    /// Create a Response PDU from this PDU.
    ///
    /// The response copies the request_id and variable bindings and clears
    /// both error fields.
    pub fn to_response(&self) -> Self {
        Self::response(self.request_id, self.varbinds.clone())
    }

    /// Create a Response PDU with specific error status.
    ///
    /// This is the generic error answer for a request that could not be
    /// served; the request's bindings are echoed unchanged.
    pub fn to_error_response(&self, error_status: ErrorStatus, error_index: i32) -> Self {
        Self {
            pdu_type: PduType::Response,
            request_id: self.request_id,
            error_status: error_status.as_i32(),
            error_index,
            varbinds: self.varbinds.clone(),
        }
    }
}

//! Variable binding (VarBind) type.
//!
//! A VarBind pairs an OID with a value. Lists are order-preserving: the
//! position of a binding is how responses are matched against requests
//! and against each other during aggregation.

use crate::ber::{Decoder, EncodeBuf};
use crate::error::Result;
use crate::oid::Oid;
use crate::value::Value;
use crate::version::Version;

/// Variable binding - an OID-value pair.
#[derive(Debug, Clone, PartialEq)]
pub struct VarBind {
    /// The object identifier.
    pub oid: Oid,
    /// The value.
    pub value: Value,
}

impl VarBind {
    /// Create a new VarBind.
    pub fn new(oid: Oid, value: Value) -> Self {
        Self { oid, value }
    }

    /// Create a VarBind with a NULL value (for GET requests).
    pub fn null(oid: Oid) -> Self {
        Self {
            oid,
            value: Value::Null,
        }
    }

    /// Encode as SEQUENCE { name, value }.
    pub fn encode(&self, buf: &mut EncodeBuf, version: Version) -> Result<()> {
        buf.push_sequence(|buf| {
            self.value.encode(buf, version)?;
            buf.push_oid(&self.oid)
        })
    }

    /// Decode from BER.
    ///
    /// The binding must fill its SEQUENCE exactly.
    pub fn decode(decoder: &mut Decoder) -> Result<Self> {
        decoder.transaction(|d| {
            let mut seq = d.read_sequence()?;
            let oid = seq.read_oid()?;
            let value = Value::decode(&mut seq)?;
            seq.expect_end()?;
            Ok(VarBind { oid, value })
        })
    }
}

impl std::fmt::Display for VarBind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} = {}", self.oid, self.value)
    }
}

/// Encodes a list of VarBinds as a SEQUENCE of VarBind SEQUENCEs.
pub fn encode_varbind_list(
    buf: &mut EncodeBuf,
    varbinds: &[VarBind],
    version: Version,
) -> Result<()> {
    buf.push_sequence(|buf| {
        // Reverse buffer: last binding first
        for vb in varbinds.iter().rev() {
            vb.encode(buf, version)?;
        }
        Ok(())
    })
}

/// Decodes a BER-encoded VarBind list.
///
/// Reads the outer SEQUENCE once and loops until its content is exhausted.
/// Any failing binding fails the whole list and leaves `decoder` where it was.
pub fn decode_varbind_list(decoder: &mut Decoder) -> Result<Vec<VarBind>> {
    decoder.transaction(|d| {
        let mut seq = d.read_sequence()?;

        // Typical bindings run 20-50 bytes
        let mut varbinds = Vec::with_capacity((seq.remaining() / 16).max(1));

        while !seq.is_empty() {
            varbinds.push(VarBind::decode(&mut seq)?);
        }

        Ok(varbinds)
    })
}

/// Encodes OIDs with NULL values for GET, GET-NEXT and GET-BULK requests.
pub fn encode_null_varbinds(buf: &mut EncodeBuf, oids: &[Oid]) -> Result<()> {
    buf.push_sequence(|buf| {
        for oid in oids.iter().rev() {
            buf.push_sequence(|buf| {
                buf.push_null();
                buf.push_oid(oid)
            })?;
        }
        Ok(())
    })
}

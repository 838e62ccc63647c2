//! # snmp-wire
//!
//! SNMPv1/v2c wire codec and response aggregation for agents that fan a
//! request out to several workers.
//!
//! ## Features
//!
//! - BER encoding/decoding of the SNMP subset of X.690
//! - GET, GET-NEXT, RESPONSE and GET-BULK PDUs in a community envelope
//! - Type-safe OID and value handling
//! - Per-OID aggregation (sum, average, max, min) of worker responses
//!
//! Decoding is zero-copy over [`bytes::Bytes`] and transactional: a failed
//! decode never moves the caller's position, so a retry from the original
//! buffer is always possible.
//!
//! ## Quick Start
//!
//! ```rust
//! use snmp_wire::{oid, CommunityMessage, Pdu, Value, VarBind};
//!
//! let request = CommunityMessage::v2c(
//!     &b"public"[..],
//!     Pdu::get_request(1, &[oid!(1, 3, 6, 1, 2, 1, 1, 3, 0)]),
//! );
//! let wire = request.encode()?;
//!
//! let decoded = CommunityMessage::decode(wire)?;
//! let answer = Pdu::response(
//!     decoded.pdu.request_id,
//!     vec![VarBind::new(decoded.pdu.varbinds[0].oid.clone(), Value::TimeTicks(4200))],
//! );
//! let reply = CommunityMessage::new(decoded.version, decoded.community, answer).encode()?;
//! assert_eq!(reply[0], 0x30);
//! # Ok::<(), snmp_wire::Error>(())
//! ```
//!
//! ## Aggregation
//!
//! ```rust
//! use snmp_wire::{aggregate_all, oid, AggregationKind, Pdu, PolicyTable, Value, VarBind};
//!
//! let policy = PolicyTable::new().with(oid!(1, 3, 6, 1, 2, 1, 2, 2, 1, 10), AggregationKind::Sum);
//! let workers: Vec<Pdu> = [100u32, 250, 50]
//!     .into_iter()
//!     .map(|octets| {
//!         Pdu::response(9, vec![VarBind::new(oid!(1, 3, 6, 1, 2, 1, 2, 2, 1, 10, 1), Value::Counter32(octets))])
//!     })
//!     .collect();
//!
//! let merged = aggregate_all(&workers, policy)?;
//! assert_eq!(merged.varbinds[0].value, Value::Counter32(400));
//! # Ok::<(), snmp_wire::Error>(())
//! ```

pub mod aggregate;
pub mod ber;
pub mod error;
pub mod format;
pub mod message;
pub mod oid;
pub mod pdu;
pub mod value;
pub mod varbind;
pub mod version;

// Re-exports for convenience
pub use aggregate::{AggregationKind, AggregationPolicy, Aggregator, PolicyTable, aggregate_all};
pub use error::{
    AggregateErrorKind, DecodeErrorKind, EncodeErrorKind, Error, ErrorStatus, OidErrorKind,
    Result,
};
pub use message::{CommunityMessage, Limits, Message};
pub use oid::Oid;
pub use pdu::{Pdu, PduType};
pub use value::Value;
pub use varbind::VarBind;
pub use version::Version;

/// Testing utilities exposed via the `testing` feature.
#[cfg(feature = "testing")]
pub mod testing {
    pub use crate::format::hex::{DecodeError as HexDecodeError, decode, encode};
}

//! Formatting helpers shared by `Display` impls and log events.
//!
//! ```
//! use snmp_wire::format::hex;
//!
//! assert_eq!(hex::encode(&[0xde, 0xad, 0xbe, 0xef]), "deadbeef");
//! assert_eq!(hex::Hex(&[0x00, 0xff]).to_string(), "00ff");
//! ```

pub mod hex;

//! Object Identifier (OID) type.
//!
//! OIDs are stored as `SmallVec<[u32; 16]>` to avoid heap allocation for common OIDs.

use crate::error::{DecodeErrorKind, EncodeErrorKind, Error, OidErrorKind, Result};
use smallvec::SmallVec;
use std::fmt;

/// Maximum number of arcs (subidentifiers) allowed in an OID.
///
/// Enforced when encoding ([`Oid::encode_content`]) and decoding
/// ([`Oid::from_ber`]). OIDs built in memory can be checked with
/// [`Oid::validate_length`].
pub const MAX_OID_LEN: usize = 64;

/// Object Identifier.
///
/// Stored as a sequence of arc values (u32). Uses SmallVec to avoid
/// heap allocation for OIDs with 16 or fewer arcs.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Oid {
    arcs: SmallVec<[u32; 16]>,
}

impl Oid {
    /// Create an empty OID.
    pub fn empty() -> Self {
        Self {
            arcs: SmallVec::new(),
        }
    }

    /// Create an OID from arc values.
    ///
    /// ```
    /// use snmp_wire::oid::Oid;
    ///
    /// let oid = Oid::new(vec![1, 3, 6, 1, 2, 1]);
    /// assert_eq!(oid.arcs(), &[1, 3, 6, 1, 2, 1]);
    ///
    /// let oid = Oid::new([1, 3, 6, 1]);
    /// assert_eq!(oid.len(), 4);
    /// ```
    pub fn new(arcs: impl IntoIterator<Item = u32>) -> Self {
        Self {
            arcs: arcs.into_iter().collect(),
        }
    }

    /// Create an OID from a slice of arcs.
    pub fn from_slice(arcs: &[u32]) -> Self {
        Self {
            arcs: SmallVec::from_slice(arcs),
        }
    }

    /// Parse an OID from dotted string notation (e.g., "1.3.6.1.2.1.1.1.0").
    ///
    /// Arc constraints are not checked here; call [`validate()`](Self::validate)
    /// after parsing if the OID comes from an untrusted source.
    ///
    /// ```
    /// use snmp_wire::oid::Oid;
    ///
    /// let oid = Oid::parse("1.3.6.1.2.1.1.1.0").unwrap();
    /// assert!(oid.validate().is_ok());
    ///
    /// let invalid = Oid::parse("3.0").unwrap();
    /// assert!(invalid.validate().is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Ok(Self::empty());
        }

        let mut arcs = SmallVec::new();

        for part in s.split('.') {
            if part.is_empty() {
                continue;
            }

            let arc: u32 = part.parse().map_err(|_| {
                Error::invalid_oid_with_input(OidErrorKind::InvalidArc, s.to_string())
            })?;

            arcs.push(arc);
        }

        Ok(Self { arcs })
    }

    /// Get the arc values.
    pub fn arcs(&self) -> &[u32] {
        &self.arcs
    }

    /// Get the number of arcs.
    pub fn len(&self) -> usize {
        self.arcs.len()
    }

    /// Check if the OID is empty.
    pub fn is_empty(&self) -> bool {
        self.arcs.is_empty()
    }

    /// Check if this OID starts with another OID.
    ///
    /// An OID always starts with itself, and any OID starts with an empty OID.
    ///
    /// ```
    /// use snmp_wire::oid;
    ///
    /// let if_in_octets = oid!(1, 3, 6, 1, 2, 1, 2, 2, 1, 10, 1);
    /// assert!(if_in_octets.starts_with(&oid!(1, 3, 6, 1, 2, 1, 2)));
    /// assert!(!if_in_octets.starts_with(&oid!(1, 3, 6, 1, 2, 1, 1)));
    /// ```
    pub fn starts_with(&self, other: &Oid) -> bool {
        self.arcs.len() >= other.arcs.len() && self.arcs[..other.arcs.len()] == other.arcs[..]
    }

    /// Get the parent OID (all arcs except the last).
    ///
    /// Returns `None` if the OID is empty.
    pub fn parent(&self) -> Option<Oid> {
        let (_, rest) = self.arcs.split_last()?;
        Some(Oid::from_slice(rest))
    }

    /// Create a child OID by appending an arc.
    pub fn child(&self, arc: u32) -> Oid {
        let mut arcs = self.arcs.clone();
        arcs.push(arc);
        Oid { arcs }
    }

    /// Validate OID arcs per X.690 Section 8.19.4.
    ///
    /// - a non-empty OID has at least two arcs
    /// - arc1 must be 0, 1, or 2
    /// - arc2 must be <= 39 when arc1 is 0 or 1
    /// - arc2 can be any value when arc1 is 2, as long as the packed
    ///   first subidentifier fits in 32 bits
    pub fn validate(&self) -> Result<()> {
        self.check_arcs().map_err(Error::invalid_oid)
    }

    fn check_arcs(&self) -> std::result::Result<(), OidErrorKind> {
        let Some(&arc1) = self.arcs.first() else {
            return Ok(());
        };

        if arc1 > 2 {
            return Err(OidErrorKind::InvalidFirstArc(arc1));
        }

        let Some(&arc2) = self.arcs.get(1) else {
            return Err(OidErrorKind::SingleArc);
        };
        if arc1 < 2 && arc2 >= 40 {
            return Err(OidErrorKind::InvalidSecondArc {
                first: arc1,
                second: arc2,
            });
        }
        if first_subidentifier(arc1, arc2).is_none() {
            return Err(OidErrorKind::SubidentifierOverflow);
        }

        Ok(())
    }

    /// Validate that the OID doesn't exceed [`MAX_OID_LEN`] arcs.
    pub fn validate_length(&self) -> Result<()> {
        if self.arcs.len() > MAX_OID_LEN {
            return Err(Error::invalid_oid(OidErrorKind::TooManyArcs {
                count: self.arcs.len(),
                max: MAX_OID_LEN,
            }));
        }
        Ok(())
    }

    /// Validate both arc constraints and length.
    pub fn validate_all(&self) -> Result<()> {
        self.validate()?;
        self.validate_length()
    }

    /// Encode the OID content octets (without tag and length).
    ///
    /// - First two arcs packed as `arc1 * 40 + arc2`, base-128
    /// - Remaining arcs base-128 with continuation bits
    /// - An empty OID has no content octets
    ///
    /// Fails if the OID has more than [`MAX_OID_LEN`] arcs or its arcs fail
    /// [`validate`](Self::validate), since packing them would produce a
    /// different OID on the wire.
    pub fn encode_content(&self) -> Result<SmallVec<[u8; 64]>> {
        if self.arcs.len() > MAX_OID_LEN {
            return Err(Error::encode(EncodeErrorKind::OidTooLong {
                count: self.arcs.len(),
                max: MAX_OID_LEN,
            }));
        }

        if let Err(kind) = self.check_arcs() {
            tracing::debug!(target: "snmp_wire::ber", { oid = %self, kind = %kind }, "OID arcs not encodable");
            return Err(Error::encode(match kind {
                OidErrorKind::SubidentifierOverflow => EncodeErrorKind::SubidentifierOverflow,
                other => EncodeErrorKind::InvalidArc(other),
            }));
        }

        let mut bytes = SmallVec::new();

        let [arc1, arc2, rest @ ..] = self.arcs.as_slice() else {
            return Ok(bytes);
        };
        // check_arcs rules out overflow here
        encode_subidentifier(&mut bytes, arc1 * 40 + arc2);

        for &arc in rest {
            encode_subidentifier(&mut bytes, arc);
        }

        Ok(bytes)
    }

    /// Decode from BER content octets.
    ///
    /// Empty content decodes as `0.0`. Error offsets are relative to the
    /// start of `data`.
    pub fn from_ber(data: &[u8]) -> Result<Self> {
        let mut arcs = SmallVec::new();

        if data.is_empty() {
            arcs.push(0);
            arcs.push(0);
            return Ok(Self { arcs });
        }

        // First subidentifier packs arc1*40 + arc2; values of 80 and above
        // all belong to arc1 = 2.
        let (first_subid, consumed) = decode_subidentifier(data, 0)?;
        match first_subid {
            0..40 => {
                arcs.push(0);
                arcs.push(first_subid);
            }
            40..80 => {
                arcs.push(1);
                arcs.push(first_subid - 40);
            }
            _ => {
                arcs.push(2);
                arcs.push(first_subid - 80);
            }
        }

        let mut i = consumed;
        while i < data.len() {
            if arcs.len() == MAX_OID_LEN {
                return Err(Error::decode(
                    i,
                    DecodeErrorKind::OidTooLong {
                        count: arcs.len() + 1,
                        max: MAX_OID_LEN,
                    },
                ));
            }
            let (arc, bytes_consumed) = decode_subidentifier(&data[i..], i)?;
            arcs.push(arc);
            i += bytes_consumed;
        }

        Ok(Self { arcs })
    }
}

fn first_subidentifier(arc1: u32, arc2: u32) -> Option<u32> {
    arc1.checked_mul(40)?.checked_add(arc2)
}

/// Encode a subidentifier in base-128 variable length.
#[inline]
fn encode_subidentifier(bytes: &mut SmallVec<[u8; 64]>, value: u32) {
    let groups = ((32 - value.leading_zeros()).div_ceil(7)).max(1);

    // Encode from MSB to LSB
    for i in (0..groups).rev() {
        let mut byte = ((value >> (i * 7)) & 0x7F) as u8;
        if i > 0 {
            byte |= 0x80; // Continuation bit
        }
        bytes.push(byte);
    }
}

/// Decode a subidentifier, returning (value, bytes_consumed).
fn decode_subidentifier(data: &[u8], base: usize) -> Result<(u32, usize)> {
    let mut value: u32 = 0;

    for (i, &byte) in data.iter().enumerate() {
        if value > (u32::MAX >> 7) {
            return Err(Error::decode(base + i, DecodeErrorKind::IntegerOverflow));
        }

        value = (value << 7) | ((byte & 0x7F) as u32);

        if byte & 0x80 == 0 {
            return Ok((value, i + 1));
        }
    }

    Err(Error::decode(base + data.len(), DecodeErrorKind::TruncatedData))
}

impl fmt::Debug for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Oid({})", self)
    }
}

impl fmt::Display for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for arc in &self.arcs {
            if !first {
                write!(f, ".")?;
            }
            write!(f, "{}", arc)?;
            first = false;
        }
        Ok(())
    }
}

impl std::str::FromStr for Oid {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl From<&[u32]> for Oid {
    fn from(arcs: &[u32]) -> Self {
        Self::from_slice(arcs)
    }
}

impl<const N: usize> From<[u32; N]> for Oid {
    fn from(arcs: [u32; N]) -> Self {
        Self::new(arcs)
    }
}

impl PartialOrd for Oid {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Oid {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.arcs.cmp(&other.arcs)
    }
}

// OIDs serialize as their dotted string so policy tables read naturally in config files.
#[cfg(feature = "serde")]
impl serde::Serialize for Oid {
    fn serialize<S: serde::Serializer>(
        &self,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Oid {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Oid::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Macro to create an OID from literal arcs.
///
/// ```
/// use snmp_wire::oid;
///
/// let sys_descr = oid!(1, 3, 6, 1, 2, 1, 1, 1, 0);
/// assert_eq!(sys_descr.to_string(), "1.3.6.1.2.1.1.1.0");
///
/// // Trailing commas are allowed
/// let sys_name = oid!(1, 3, 6, 1, 2, 1, 1, 5, 0,);
/// assert!(sys_name.starts_with(&oid!(1, 3, 6, 1, 2, 1, 1)));
/// ```
#[macro_export]
macro_rules! oid {
    ($($arc:expr),* $(,)?) => {
        $crate::oid::Oid::from_slice(&[$($arc),*])
    };
}

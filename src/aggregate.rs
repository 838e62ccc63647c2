//! Merging worker responses into one answer.
//!
//! Several workers each answer the same request with a Response PDU of
//! identical shape. An [`Aggregator`] folds those PDUs together position by
//! position, using an [`AggregationPolicy`] to decide per OID whether the
//! value is summed, averaged, or reduced to a maximum or minimum.
//!
//! ```
//! use snmp_wire::aggregate::{AggregationKind, Aggregator, PolicyTable};
//! use snmp_wire::{oid, Pdu, Value, VarBind};
//!
//! let policy = PolicyTable::new().with(oid!(1, 3, 6, 1, 4, 1, 99, 1), AggregationKind::Average);
//! let mut agg = Aggregator::new(policy);
//!
//! for load in [10, 20, 30] {
//!     let vb = VarBind::new(oid!(1, 3, 6, 1, 4, 1, 99, 1, 0), Value::Gauge32(load));
//!     agg.merge(&Pdu::response(1, vec![vb])).unwrap();
//! }
//! agg.finalize();
//!
//! let pdu = agg.into_pdu().unwrap();
//! assert_eq!(pdu.varbinds[0].value, Value::Gauge32(20));
//! ```

use std::cmp::Ordering;

use crate::error::{AggregateErrorKind, Error, Result};
use crate::oid::Oid;
use crate::pdu::Pdu;
use crate::value::Value;
use crate::varbind::VarBind;

/// How values under an OID are combined across responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum AggregationKind {
    /// Keep the first value seen.
    #[default]
    None,
    /// Add values together.
    Sum,
    /// Add values, then divide by the number of responses at finalization.
    Average,
    /// Keep the largest value.
    Max,
    /// Keep the smallest value.
    Min,
}

impl AggregationKind {
    fn is_numeric(self) -> bool {
        self != AggregationKind::None
    }
}

impl std::fmt::Display for AggregationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Sum => write!(f, "sum"),
            Self::Average => write!(f, "average"),
            Self::Max => write!(f, "max"),
            Self::Min => write!(f, "min"),
        }
    }
}

/// Maps an OID to its aggregation kind.
///
/// Closures `Fn(&Oid) -> AggregationKind` implement this directly.
pub trait AggregationPolicy {
    /// Classify `oid`.
    fn classify(&self, oid: &Oid) -> AggregationKind;
}

impl<F> AggregationPolicy for F
where
    F: Fn(&Oid) -> AggregationKind,
{
    fn classify(&self, oid: &Oid) -> AggregationKind {
        self(oid)
    }
}

/// One prefix rule in a [`PolicyTable`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PolicyRule {
    /// OIDs at or below this prefix match.
    pub prefix: Oid,
    /// Kind applied to matching OIDs.
    pub kind: AggregationKind,
}

/// Longest-prefix table of aggregation rules.
///
/// ```
/// use snmp_wire::aggregate::{AggregationKind, AggregationPolicy, PolicyTable};
/// use snmp_wire::oid;
///
/// let table = PolicyTable::new()
///     .with(oid!(1, 3, 6, 1, 2, 1, 2, 2, 1), AggregationKind::Sum)
///     .with(oid!(1, 3, 6, 1, 2, 1, 2, 2, 1, 5), AggregationKind::Max);
///
/// assert_eq!(table.classify(&oid!(1, 3, 6, 1, 2, 1, 2, 2, 1, 10, 1)), AggregationKind::Sum);
/// assert_eq!(table.classify(&oid!(1, 3, 6, 1, 2, 1, 2, 2, 1, 5, 1)), AggregationKind::Max);
/// assert_eq!(table.classify(&oid!(1, 3, 6, 1, 2, 1, 1, 3, 0)), AggregationKind::None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PolicyTable {
    /// Kind for OIDs no rule matches.
    pub default: AggregationKind,
    /// Prefix rules, in any order.
    pub rules: Vec<PolicyRule>,
}

impl PolicyTable {
    /// Create an empty table that classifies everything as `None`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rule for `prefix`. A later rule for the same prefix replaces
    /// the earlier one.
    pub fn with(mut self, prefix: Oid, kind: AggregationKind) -> Self {
        self.insert(prefix, kind);
        self
    }

    /// Set the kind used when no rule matches.
    pub fn with_default(mut self, kind: AggregationKind) -> Self {
        self.default = kind;
        self
    }

    /// Add or replace a rule.
    pub fn insert(&mut self, prefix: Oid, kind: AggregationKind) {
        match self.rules.iter_mut().find(|r| r.prefix == prefix) {
            Some(rule) => rule.kind = kind,
            None => self.rules.push(PolicyRule { prefix, kind }),
        }
    }
}

impl AggregationPolicy for PolicyTable {
    fn classify(&self, oid: &Oid) -> AggregationKind {
        self.rules
            .iter()
            .filter(|r| oid.starts_with(&r.prefix))
            .max_by_key(|r| r.prefix.len())
            .map_or(self.default, |r| r.kind)
    }
}

/// Merges Response PDUs from several workers into one.
///
/// One aggregator serves one in-flight request. Feed it each worker's
/// response with [`merge`](Self::merge), then call
/// [`finalize`](Self::finalize) once the transport decides the request is
/// complete.
#[derive(Debug, Clone)]
pub struct Aggregator<P> {
    pdu: Option<Pdu>,
    merged: u32,
    failed: bool,
    policy: P,
}

impl<P: AggregationPolicy> Aggregator<P> {
    /// Create an empty aggregator.
    pub fn new(policy: P) -> Self {
        Self {
            pdu: None,
            merged: 0,
            failed: false,
            policy,
        }
    }

    /// Number of PDUs merged since creation or the last finalization.
    pub fn merged(&self) -> u32 {
        self.merged
    }

    /// Whether an error response has replaced the aggregate.
    pub fn is_failed(&self) -> bool {
        self.failed
    }

    /// The aggregate so far.
    pub fn pdu(&self) -> Option<&Pdu> {
        self.pdu.as_ref()
    }

    /// Consume the aggregator, returning the aggregate.
    pub fn into_pdu(self) -> Option<Pdu> {
        self.pdu
    }

    /// Merge one worker response.
    ///
    /// Returns `Ok(false)` when the merge was ignored because an earlier
    /// response carried an error status. A response with a non-zero error
    /// status replaces the aggregate outright.
    ///
    /// # Errors
    ///
    /// [`Error::Aggregate`] when the response does not line up with the
    /// aggregate: a different binding count, a value of another type at the
    /// same position, or a non-numeric value under a numeric policy. The
    /// aggregate is unchanged on error.
    pub fn merge(&mut self, pdu: &Pdu) -> Result<bool> {
        if self.failed {
            tracing::trace!(target: "snmp_wire::aggregate", { request_id = pdu.request_id }, "aggregate already failed, ignoring response");
            return Ok(false);
        }

        if pdu.is_error() {
            tracing::debug!(
                target: "snmp_wire::aggregate",
                { request_id = pdu.request_id, error_status = %pdu.error_status_enum(), error_index = pdu.error_index },
                "error response short-circuits aggregation"
            );
            self.pdu = Some(pdu.clone());
            self.failed = true;
            self.merged += 1;
            return Ok(true);
        }

        let Some(current) = self.pdu.as_mut() else {
            self.pdu = Some(pdu.clone());
            self.merged = 1;
            tracing::trace!(target: "snmp_wire::aggregate", { request_id = pdu.request_id, varbinds = pdu.varbinds.len() }, "first response");
            return Ok(true);
        };

        if current.varbinds.len() != pdu.varbinds.len() {
            let kind = AggregateErrorKind::VarCountMismatch {
                expected: current.varbinds.len(),
                actual: pdu.varbinds.len(),
            };
            tracing::warn!(target: "snmp_wire::aggregate", { request_id = pdu.request_id, kind = %kind }, "response does not match aggregate");
            return Err(Error::aggregate(kind));
        }

        // Validate every position before touching the aggregate
        let mut updates = Vec::new();
        for (index, (acc, incoming)) in current.varbinds.iter().zip(&pdu.varbinds).enumerate() {
            let update = combine(&self.policy, index, acc, incoming).inspect_err(|err| {
                tracing::warn!(target: "snmp_wire::aggregate", { request_id = pdu.request_id, oid = %acc.oid, error = %err }, "response does not match aggregate");
            })?;
            if let Some(vb) = update {
                updates.push((index, vb));
            }
        }

        for (index, vb) in updates {
            current.varbinds[index] = vb;
        }
        self.merged += 1;

        tracing::trace!(target: "snmp_wire::aggregate", { request_id = pdu.request_id, merged = self.merged }, "merged response");
        Ok(true)
    }

    /// Finish aggregation.
    ///
    /// With two or more merged responses, every value classified as
    /// [`AggregationKind::Average`] is divided by the merge count. The count
    /// is then reset to zero, so a second call changes nothing.
    pub fn finalize(&mut self) {
        let count = self.merged;
        self.merged = 0;

        if count < 2 || self.failed {
            return;
        }
        let Some(pdu) = self.pdu.as_mut() else {
            return;
        };

        for vb in &mut pdu.varbinds {
            if self.policy.classify(&vb.oid) == AggregationKind::Average {
                if let Some(value) = divide(&vb.value, count) {
                    vb.value = value;
                }
            }
        }

        tracing::trace!(target: "snmp_wire::aggregate", { request_id = pdu.request_id, count }, "finalized aggregate");
    }
}

/// Merge every PDU in `pdus` and finalize.
///
/// # Errors
///
/// [`AggregateErrorKind::NoResponses`] for an empty slice, otherwise the
/// first error from [`Aggregator::merge`].
pub fn aggregate_all<P: AggregationPolicy>(pdus: &[Pdu], policy: P) -> Result<Pdu> {
    let mut agg = Aggregator::new(policy);
    for pdu in pdus {
        agg.merge(pdu)?;
    }
    agg.finalize();
    agg.into_pdu()
        .ok_or_else(|| Error::aggregate(AggregateErrorKind::NoResponses))
}

/// Compute the replacement for one aggregate position, if any.
fn combine<P: AggregationPolicy>(
    policy: &P,
    index: usize,
    acc: &VarBind,
    incoming: &VarBind,
) -> Result<Option<VarBind>> {
    if acc.value == Value::Null {
        return Ok(Some(incoming.clone()));
    }

    let kind = policy.classify(&acc.oid);
    if !kind.is_numeric() {
        return Ok(None);
    }
    if !acc.value.same_type(&incoming.value) {
        return Err(Error::aggregate(AggregateErrorKind::TypeMismatch { index }));
    }
    if !acc.value.is_numeric() {
        return Err(Error::aggregate(AggregateErrorKind::NotNumeric { index }));
    }

    let value = match kind {
        AggregationKind::Sum | AggregationKind::Average => add(&acc.value, &incoming.value),
        AggregationKind::Max => {
            (compare(&incoming.value, &acc.value) == Some(Ordering::Greater))
                .then(|| incoming.value.clone())
        }
        AggregationKind::Min => {
            (compare(&incoming.value, &acc.value) == Some(Ordering::Less))
                .then(|| incoming.value.clone())
        }
        AggregationKind::None => None,
    };

    Ok(value.map(|value| VarBind::new(acc.oid.clone(), value)))
}

/// Wrapping add within one numeric type.
fn add(a: &Value, b: &Value) -> Option<Value> {
    Some(match (a, b) {
        (Value::Integer(x), Value::Integer(y)) => Value::Integer(x.wrapping_add(*y)),
        (Value::Counter32(x), Value::Counter32(y)) => Value::Counter32(x.wrapping_add(*y)),
        (Value::Gauge32(x), Value::Gauge32(y)) => Value::Gauge32(x.wrapping_add(*y)),
        (Value::TimeTicks(x), Value::TimeTicks(y)) => Value::TimeTicks(x.wrapping_add(*y)),
        (Value::UInteger32(x), Value::UInteger32(y)) => Value::UInteger32(x.wrapping_add(*y)),
        (Value::Counter64(x), Value::Counter64(y)) => Value::Counter64(x.wrapping_add(*y)),
        _ => return None,
    })
}

/// Order two values of the same numeric type. Integer compares signed.
fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Integer(x), Value::Integer(y)) => Some(x.cmp(y)),
        (Value::Counter64(x), Value::Counter64(y)) => Some(x.cmp(y)),
        _ if a.same_type(b) => Some(a.as_u32()?.cmp(&b.as_u32()?)),
        _ => None,
    }
}

fn divide(value: &Value, count: u32) -> Option<Value> {
    Some(match value {
        Value::Integer(x) => Value::Integer((i64::from(*x) / i64::from(count)) as i32),
        Value::Counter32(x) => Value::Counter32(x / count),
        Value::Gauge32(x) => Value::Gauge32(x / count),
        Value::TimeTicks(x) => Value::TimeTicks(x / count),
        Value::UInteger32(x) => Value::UInteger32(x / count),
        Value::Counter64(x) => Value::Counter64(x / u64::from(count)),
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorStatus;
    use crate::oid;

    const LOAD: [u32; 9] = [1, 3, 6, 1, 4, 1, 99, 1, 0];

    fn load_oid() -> Oid {
        Oid::from_slice(&LOAD)
    }

    fn response(values: Vec<Value>) -> Pdu {
        Pdu::response(
            1,
            values
                .into_iter()
                .enumerate()
                .map(|(i, v)| VarBind::new(load_oid().child(i as u32), v))
                .collect(),
        )
    }

    fn every(kind: AggregationKind) -> impl Fn(&Oid) -> AggregationKind {
        move |_: &Oid| kind
    }

    fn run(kind: AggregationKind, values: &[i32]) -> Value {
        let pdus: Vec<Pdu> = values
            .iter()
            .map(|&v| response(vec![Value::Integer(v)]))
            .collect();
        let pdu = aggregate_all(&pdus, every(kind)).unwrap();
        pdu.varbinds[0].value.clone()
    }

    #[test]
    fn test_kinds() {
        assert_eq!(
            run(AggregationKind::Average, &[10, 20, 30]),
            Value::Integer(20)
        );
        assert_eq!(run(AggregationKind::Sum, &[10, 20, 30]), Value::Integer(60));
        assert_eq!(run(AggregationKind::Max, &[5, 9, 2]), Value::Integer(9));
        assert_eq!(run(AggregationKind::Min, &[5, 9, 2]), Value::Integer(2));
        assert_eq!(run(AggregationKind::None, &[5, 9, 2]), Value::Integer(5));
    }

    #[test]
    fn test_signed_comparison() {
        assert_eq!(run(AggregationKind::Max, &[-5, -9, -2]), Value::Integer(-2));
        assert_eq!(run(AggregationKind::Min, &[3, -1, 0]), Value::Integer(-1));
        assert_eq!(
            run(AggregationKind::Average, &[-10, -20]),
            Value::Integer(-15)
        );
    }

    #[test]
    fn test_single_response_average_not_divided() {
        assert_eq!(run(AggregationKind::Average, &[42]), Value::Integer(42));
    }

    #[test]
    fn test_finalize_idempotent() {
        let mut agg = Aggregator::new(every(AggregationKind::Average));
        for v in [10, 20, 30] {
            agg.merge(&response(vec![Value::Counter64(v)])).unwrap();
        }
        assert_eq!(agg.merged(), 3);

        agg.finalize();
        assert_eq!(agg.merged(), 0);
        agg.finalize();

        assert_eq!(agg.pdu().unwrap().varbinds[0].value, Value::Counter64(20));
    }

    #[test]
    fn test_null_position_takes_incoming() {
        let oid = oid!(1, 3, 6, 1, 2, 1, 1, 5, 0);
        let first = Pdu::response(1, vec![VarBind::null(oid!(1, 3, 6, 1))]);
        let mut agg = Aggregator::new(every(AggregationKind::Sum));
        agg.merge(&first).unwrap();
        for v in [4, 6] {
            let vb = VarBind::new(oid.clone(), Value::Gauge32(v));
            agg.merge(&Pdu::response(1, vec![vb])).unwrap();
        }

        let vb = &agg.pdu().unwrap().varbinds[0];
        assert_eq!(vb.oid, oid);
        assert_eq!(vb.value, Value::Gauge32(10));
    }

    #[test]
    fn test_wrapping_sum() {
        let pdus = [
            response(vec![Value::Counter32(u32::MAX)]),
            response(vec![Value::Counter32(2)]),
        ];
        let pdu = aggregate_all(&pdus, every(AggregationKind::Sum)).unwrap();
        assert_eq!(pdu.varbinds[0].value, Value::Counter32(1));
    }

    #[test]
    fn test_none_policy_ignores_type() {
        let pdus = [
            response(vec![Value::from("a")]),
            response(vec![Value::Integer(1)]),
        ];
        let pdu = aggregate_all(&pdus, every(AggregationKind::None)).unwrap();
        assert_eq!(pdu.varbinds[0].value, Value::from("a"));
    }

    #[test]
    fn test_error_short_circuit() {
        let mut agg = Aggregator::new(every(AggregationKind::Sum));
        agg.merge(&response(vec![Value::Integer(1)])).unwrap();

        let error = response(vec![Value::Integer(0)]).to_error_response(ErrorStatus::GenErr, 1);
        assert!(agg.merge(&error).unwrap());
        assert!(agg.is_failed());

        assert!(!agg.merge(&response(vec![Value::Integer(100)])).unwrap());
        agg.finalize();

        assert_eq!(agg.into_pdu().unwrap(), error);
    }

    #[test]
    fn test_mismatch_leaves_aggregate() {
        let mut agg = Aggregator::new(every(AggregationKind::Sum));
        agg.merge(&response(vec![Value::Integer(1), Value::Integer(2)]))
            .unwrap();
        let before = agg.pdu().cloned();

        let err = agg.merge(&response(vec![Value::Integer(1)])).unwrap_err();
        assert!(matches!(
            err,
            Error::Aggregate {
                kind: AggregateErrorKind::VarCountMismatch {
                    expected: 2,
                    actual: 1
                }
            }
        ));

        // second position fails after the first would have been summed
        let err = agg
            .merge(&response(vec![Value::Integer(5), Value::Gauge32(5)]))
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Aggregate {
                kind: AggregateErrorKind::TypeMismatch { index: 1 }
            }
        ));

        assert_eq!(agg.pdu().cloned(), before);
        assert_eq!(agg.merged(), 1);
    }

    #[test]
    fn test_not_numeric() {
        let pdus = [
            response(vec![Value::from("a")]),
            response(vec![Value::from("b")]),
        ];
        let err = aggregate_all(&pdus, every(AggregationKind::Max)).unwrap_err();
        assert!(matches!(
            err,
            Error::Aggregate {
                kind: AggregateErrorKind::NotNumeric { index: 0 }
            }
        ));
    }

    #[test]
    fn test_empty_input() {
        let err = aggregate_all(&[], PolicyTable::new()).unwrap_err();
        assert!(matches!(
            err,
            Error::Aggregate {
                kind: AggregateErrorKind::NoResponses
            }
        ));
    }

    #[test]
    fn test_policy_table_longest_prefix() {
        let table = PolicyTable::new()
            .with_default(AggregationKind::Sum)
            .with(oid!(1, 3, 6, 1, 4, 1, 99), AggregationKind::Max)
            .with(oid!(1, 3, 6, 1, 4, 1, 99, 1), AggregationKind::Average)
            .with(oid!(1, 3, 6, 1, 4, 1, 99), AggregationKind::Min);

        assert_eq!(table.rules.len(), 2);
        assert_eq!(table.classify(&load_oid()), AggregationKind::Average);
        assert_eq!(
            table.classify(&oid!(1, 3, 6, 1, 4, 1, 99, 2, 0)),
            AggregationKind::Min
        );
        assert_eq!(
            table.classify(&oid!(1, 3, 6, 1, 2, 1)),
            AggregationKind::Sum
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_policy_table_serde() {
        let json = r#"{
            "default": "none",
            "rules": [{ "prefix": "1.3.6.1.4.1.99.1", "kind": "average" }]
        }"#;
        let table: PolicyTable = serde_json::from_str(json).unwrap();
        assert_eq!(table.classify(&load_oid()), AggregationKind::Average);

        let encoded = serde_json::to_string(&table).unwrap();
        let back: PolicyTable = serde_json::from_str(&encoded).unwrap();
        assert_eq!(back, table);
    }
}

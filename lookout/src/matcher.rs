//! Structural partial matching of values against specs.
//!
//! [`matches`] walks a [`Spec`] top-down and stops at the first divergence.
//! The failure carries a breadcrumb [`Path`] from the root to that point,
//! built while the recursion unwinds, and a [`MismatchReason`].
//!
//! ```rust
//! use lookout::{Spec, Value, matcher::matches};
//! use serde_json::json;
//!
//! let actual = Value::from(json!({"list": [{"name": "x"}]}));
//! let spec = Spec::from(json!({"list": [{"name": "y"}]}));
//!
//! let mismatch = matches(Some(&actual), &spec, false).into_result().unwrap_err();
//! assert_eq!(mismatch.path().to_string(), ".list[0].name");
//! ```

use std::{collections::VecDeque, fmt};

use crate::{Literal, Spec, Value, ValueKind};

/// Result of comparing a value against a spec.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchOutcome {
    Pass,
    Fail(Mismatch),
}

impl MatchOutcome {
    #[inline]
    pub fn is_pass(&self) -> bool {
        matches!(self, MatchOutcome::Pass)
    }

    pub fn mismatch(&self) -> Option<&Mismatch> {
        match self {
            MatchOutcome::Pass => None,
            MatchOutcome::Fail(mismatch) => Some(mismatch),
        }
    }

    pub fn into_result(self) -> Result<(), Mismatch> {
        match self {
            MatchOutcome::Pass => Ok(()),
            MatchOutcome::Fail(mismatch) => Err(mismatch),
        }
    }
}

impl From<Result<(), Mismatch>> for MatchOutcome {
    fn from(result: Result<(), Mismatch>) -> Self {
        match result {
            Ok(()) => MatchOutcome::Pass,
            Err(mismatch) => MatchOutcome::Fail(mismatch),
        }
    }
}

/// One step of a [`Path`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// Sequence element, rendered as `[index]`.
    Index(usize),
    /// Record field or map key, rendered as `.key`.
    Key(String),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Index(index) => write!(f, "[{index}]"),
            PathSegment::Key(key) => write!(f, ".{key}"),
        }
    }
}

/// Accessor path from the root of the actual value to a mismatch.
///
/// The root itself is the empty path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Path(VecDeque<PathSegment>);

impl Path {
    pub fn segments(&self) -> impl Iterator<Item = &PathSegment> {
        self.0.iter()
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.iter().try_for_each(|segment| write!(f, "{segment}"))
    }
}

/// Why a comparison failed.
#[derive(Debug, Clone, PartialEq)]
pub enum MismatchReason {
    /// The spec constrains a value that the actual value does not have.
    Missing,
    /// The container category of the actual value differs from the spec's.
    TypeMismatch {
        expected: ValueKind,
        actual: ValueKind,
    },
    /// Strict-length mode only: a sequence or map has the wrong size.
    LengthMismatch { expected: usize, actual: usize },
    /// A predicate returned an explicit `false`.
    PredicateFalse { source: String, actual: String },
    /// A literal was not loosely equal to the actual value.
    ValueMismatch { actual: Value, expected: Literal },
}

impl fmt::Display for MismatchReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MismatchReason::Missing => write!(f, "does not exist in actual"),
            MismatchReason::TypeMismatch { expected, actual } => {
                write!(f, "has type {actual} instead of {expected}")
            }
            MismatchReason::LengthMismatch { expected, actual } => write!(
                f,
                "has size {actual} instead of {expected}. Turn strict_length off to allow different lengths."
            ),
            MismatchReason::PredicateFalse { source, actual } => {
                write!(f, "predicate ({source}) returned false for {actual}")
            }
            MismatchReason::ValueMismatch { actual, expected } => {
                write!(f, "different: actual: {actual}, expected: {expected}")
            }
        }
    }
}

/// The first divergence between an actual value and a spec.
#[derive(Debug, Clone, PartialEq)]
pub struct Mismatch {
    path: Path,
    reason: MismatchReason,
}

impl Mismatch {
    pub fn new(reason: MismatchReason) -> Self {
        Self {
            path: Path::default(),
            reason,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn reason(&self) -> &MismatchReason {
        &self.reason
    }

    /// Prefix the path with the segment of the enclosing container.
    fn within(mut self, segment: PathSegment) -> Self {
        self.path.0.push_front(segment);
        self
    }
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_root() {
            write!(f, "{}", self.reason)
        } else {
            write!(f, "{} {}", self.path, self.reason)
        }
    }
}

/// Compare `actual` against `spec`.
///
/// `actual` is `None` when the value is absent. With `strict_length`,
/// sequences and keyed maps must have exactly as many elements as the spec;
/// otherwise extra elements in `actual` are accepted. Records are always
/// open-world: fields the spec does not name are never inspected.
///
/// Matching stops at the first failure, so later siblings (including their
/// predicates) are not evaluated.
pub fn matches(actual: Option<&Value>, spec: &Spec, strict_length: bool) -> MatchOutcome {
    compare(actual, spec, strict_length).into()
}

fn compare(actual: Option<&Value>, spec: &Spec, strict_length: bool) -> Result<(), Mismatch> {
    if spec.is_omitted() {
        return Ok(());
    }
    let Some(actual) = actual else {
        return Err(Mismatch::new(MismatchReason::Missing));
    };

    match (spec, actual) {
        (Spec::Omitted, _) => Ok(()),
        (Spec::Predicate(predicate), _) => {
            if predicate.rejects(actual) {
                return Err(Mismatch::new(MismatchReason::PredicateFalse {
                    source: predicate.source().to_owned(),
                    actual: actual.to_json(),
                }));
            }
            Ok(())
        }
        (Spec::Literal(literal), _) => {
            if literal.loosely_equals(actual) {
                Ok(())
            } else {
                Err(Mismatch::new(MismatchReason::ValueMismatch {
                    actual: actual.clone(),
                    expected: literal.clone(),
                }))
            }
        }
        (Spec::Sequence(items), Value::Sequence(values)) => {
            check_length(items.len(), values.len(), strict_length)?;
            for (index, item) in items.iter().enumerate() {
                compare(values.get(index), item, strict_length)
                    .map_err(|m| m.within(PathSegment::Index(index)))?;
            }
            Ok(())
        }
        (Spec::KeyedMap(entries), Value::Map(values)) => {
            check_length(entries.len(), values.len(), strict_length)?;
            for (key, entry) in entries {
                compare(values.get(key), entry, strict_length)
                    .map_err(|m| m.within(PathSegment::Key(key.clone())))?;
            }
            Ok(())
        }
        (Spec::Record(fields), Value::Record(values)) => {
            for (name, field) in fields {
                compare(values.get(name), field, strict_length)
                    .map_err(|m| m.within(PathSegment::Key(name.clone())))?;
            }
            Ok(())
        }
        (Spec::Sequence(_), _) => Err(type_mismatch(ValueKind::Sequence, actual)),
        (Spec::KeyedMap(_), _) => Err(type_mismatch(ValueKind::Map, actual)),
        (Spec::Record(_), _) => Err(type_mismatch(ValueKind::Record, actual)),
    }
}

fn type_mismatch(expected: ValueKind, actual: &Value) -> Mismatch {
    Mismatch::new(MismatchReason::TypeMismatch {
        expected,
        actual: actual.kind(),
    })
}

fn check_length(expected: usize, actual: usize, strict_length: bool) -> Result<(), Mismatch> {
    if strict_length && expected != actual {
        return Err(Mismatch::new(MismatchReason::LengthMismatch {
            expected,
            actual,
        }));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    use serde_json::json;

    use super::*;
    use crate::predicate;

    fn value(json: serde_json::Value) -> Value {
        Value::from(json)
    }

    fn fail(actual: Option<&Value>, spec: &Spec, strict: bool) -> Mismatch {
        match matches(actual, spec, strict) {
            MatchOutcome::Fail(mismatch) => mismatch,
            MatchOutcome::Pass => panic!("expected a mismatch"),
        }
    }

    #[test]
    fn omitted_spec_matches_everything() {
        assert!(matches(None, &Spec::Omitted, false).is_pass());
        assert!(matches(Some(&Value::Null), &Spec::Omitted, true).is_pass());
        assert!(matches(Some(&value(json!({"a": [1]}))), &Spec::any(), false).is_pass());
    }

    #[test]
    fn absent_actual_is_missing() {
        let mismatch = fail(None, &Spec::from("hi"), false);
        assert_eq!(mismatch.reason(), &MismatchReason::Missing);
        assert!(mismatch.path().is_root());
        assert_eq!(mismatch.to_string(), "does not exist in actual");
    }

    #[test]
    fn predicate_fails_only_on_explicit_false() {
        let actual = Value::from(5);
        assert!(!matches(Some(&actual), &Spec::predicate(|_| false), false).is_pass());
        assert!(matches(Some(&actual), &Spec::predicate(|_| true), false).is_pass());
        assert!(matches(Some(&actual), &Spec::predicate(|_| ()), false).is_pass());
        assert!(matches(Some(&actual), &Spec::predicate(|_| None::<bool>), false).is_pass());
        assert!(matches(Some(&actual), &Spec::predicate(|_| Value::from(0)), false).is_pass());
        assert!(matches(Some(&actual), &Spec::predicate(|_| Value::from("")), false).is_pass());
        assert!(matches(Some(&actual), &Spec::predicate(|_| Value::Null), false).is_pass());
    }

    #[test]
    fn predicate_failure_reports_source_and_value() {
        let spec = Spec::record([("value", predicate!(|n: &Value| n.as_f64() > Some(6.0)))]);
        let mismatch = fail(Some(&value(json!({"value": 5}))), &spec, false);
        assert_eq!(
            mismatch.to_string(),
            ".value predicate (|n: &Value| n.as_f64() > Some(6.0)) returned false for 5"
        );
        assert!(matches(Some(&value(json!({"value": 7}))), &spec, false).is_pass());
    }

    #[test]
    fn sequences_allow_extra_elements_unless_strict() {
        let actual = value(json!([1, 2, 3]));
        let spec = Spec::from(json!([1, 2]));
        assert!(matches(Some(&actual), &spec, false).is_pass());

        let mismatch = fail(Some(&actual), &spec, true);
        assert_eq!(
            mismatch.reason(),
            &MismatchReason::LengthMismatch {
                expected: 2,
                actual: 3
            }
        );
    }

    #[test]
    fn shorter_sequence_is_missing_at_index() {
        let mismatch = fail(Some(&value(json!([1]))), &Spec::from(json!([1, 2])), false);
        assert_eq!(mismatch.reason(), &MismatchReason::Missing);
        assert_eq!(mismatch.path().to_string(), "[1]");
        assert_eq!(mismatch.to_string(), "[1] does not exist in actual");
    }

    #[test]
    fn omitted_sequence_element_matches_absent_element() {
        let spec = Spec::seq([Spec::from(1), Spec::Omitted]);
        assert!(matches(Some(&value(json!([1]))), &spec, false).is_pass());
    }

    #[test]
    fn records_are_open_world_even_when_strict() {
        let actual = value(json!({"a": 1, "b": 2}));
        let spec = Spec::from(json!({"a": 1}));
        assert!(matches(Some(&actual), &spec, false).is_pass());
        assert!(matches(Some(&actual), &spec, true).is_pass());
        assert!(matches(Some(&actual), &Spec::from(json!({})), true).is_pass());
    }

    #[test]
    fn first_failure_short_circuits_siblings() {
        let calls = Arc::new(AtomicUsize::new(0));
        let spy = calls.clone();
        let spec = Spec::record([
            ("a", Spec::predicate(|_| false)),
            (
                "b",
                Spec::predicate(move |_| {
                    spy.fetch_add(1, Ordering::SeqCst);
                    false
                }),
            ),
        ]);

        let mismatch = fail(Some(&value(json!({"a": 1, "b": 2}))), &spec, false);
        assert_eq!(mismatch.path().to_string(), ".a");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn path_composes_from_root_to_divergence() {
        let actual = value(json!({"list": [{"name": "x"}]}));
        let spec = Spec::from(json!({"list": [{"name": "y"}]}));
        let mismatch = fail(Some(&actual), &spec, false);

        assert_eq!(mismatch.path().to_string(), ".list[0].name");
        assert_eq!(
            mismatch.path().segments().cloned().collect::<Vec<_>>(),
            vec![
                PathSegment::Key("list".into()),
                PathSegment::Index(0),
                PathSegment::Key("name".into()),
            ]
        );
        assert_eq!(
            mismatch.to_string(),
            r#".list[0].name different: actual: "x", expected: "y""#
        );
    }

    #[test]
    fn container_category_is_checked_before_children() {
        let calls = Arc::new(AtomicUsize::new(0));
        let spy = calls.clone();
        let spec = Spec::seq([Spec::predicate(move |_| {
            spy.fetch_add(1, Ordering::SeqCst);
        })]);

        let mismatch = fail(Some(&value(json!({"0": 1}))), &spec, false);
        assert_eq!(
            mismatch.reason(),
            &MismatchReason::TypeMismatch {
                expected: ValueKind::Sequence,
                actual: ValueKind::Record,
            }
        );
        assert_eq!(mismatch.to_string(), "has type Record instead of Sequence");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn container_specs_reject_every_other_category() {
        let values = [
            Value::Null,
            Value::from(true),
            Value::from(1),
            Value::from("s"),
            Value::seq([1]),
            Value::map([("k", 1)]),
            Value::record([("k", 1)]),
        ];
        let specs = [
            (Spec::seq([Spec::any()]), ValueKind::Sequence),
            (Spec::map([("k", Spec::any())]), ValueKind::Map),
            (Spec::record([("k", Spec::any())]), ValueKind::Record),
        ];

        for (spec, expected) in &specs {
            for value in &values {
                let outcome = matches(Some(value), spec, false);
                if value.kind() == *expected {
                    assert!(outcome.is_pass(), "{value} should match {expected}");
                } else {
                    assert_eq!(
                        outcome.mismatch().map(Mismatch::reason),
                        Some(&MismatchReason::TypeMismatch {
                            expected: *expected,
                            actual: value.kind(),
                        }),
                        "{value} against {expected}"
                    );
                }
            }
        }
    }

    #[test]
    fn nested_type_mismatch_has_path() {
        let spec = Spec::from(json!({"test": {}}));
        assert!(matches(Some(&value(json!({"test": {}}))), &spec, false).is_pass());
        assert!(matches(Some(&value(json!({"test": {"key": "value"}}))), &spec, false).is_pass());

        let mismatch = fail(Some(&value(json!({"test": "string"}))), &spec, false);
        assert_eq!(mismatch.to_string(), ".test has type String instead of Record");
    }

    #[test]
    fn keyed_maps_match_by_key() {
        let spec = Spec::map([("key", "value")]);
        assert!(matches(Some(&Value::map([("key", "value")])), &spec, false).is_pass());

        let mismatch = fail(Some(&Value::map([("key", "different")])), &spec, false);
        assert_eq!(
            mismatch.to_string(),
            r#".key different: actual: "different", expected: "value""#
        );

        let mismatch = fail(Some(&Value::map([("other", "value")])), &spec, false);
        assert_eq!(mismatch.to_string(), ".key does not exist in actual");
    }

    #[test]
    fn keyed_maps_respect_strict_length() {
        let spec = Spec::map([("a", 1)]);
        let actual = Value::map([("a", 1), ("b", 2)]);
        assert!(matches(Some(&actual), &spec, false).is_pass());
        assert_eq!(
            fail(Some(&actual), &spec, true).reason(),
            &MismatchReason::LengthMismatch {
                expected: 1,
                actual: 2
            }
        );
    }

    #[test]
    fn map_and_record_are_distinct_categories() {
        let mismatch = fail(Some(&Value::map([("a", 1)])), &Spec::from(json!({"a": 1})), false);
        assert_eq!(
            mismatch.reason(),
            &MismatchReason::TypeMismatch {
                expected: ValueKind::Record,
                actual: ValueKind::Map,
            }
        );
    }

    #[test]
    fn literals_use_loose_equality() {
        assert!(matches(Some(&Value::from("1")), &Spec::from(1), false).is_pass());
        let mismatch = fail(Some(&Value::from("bye")), &Spec::from("hi"), false);
        assert_eq!(
            mismatch.to_string(),
            r#"different: actual: "bye", expected: "hi""#
        );
    }

    #[test]
    fn embeds_style_nesting() {
        let actual = value(json!({
            "content": "",
            "embeds": [
                {"data": {"description": "hello"}},
                {"data": {"description": "goodbye"}},
            ],
        }));
        let spec = Spec::from(json!({
            "embeds": [
                {"data": {"description": "hello"}},
                {"data": {"description": "bye"}},
            ],
        }));
        let mismatch = fail(Some(&actual), &spec, false);
        assert_eq!(mismatch.path().to_string(), ".embeds[1].data.description");
    }
}

use std::{borrow::Cow, fmt, sync::Arc};

use indexmap::IndexMap;
use serde::{Serialize, Serializer, ser::SerializeMap};

use crate::Value;

/// A partial, recursive description of an expected value.
///
/// Specs are open-world: anything a spec does not mention is accepted.
/// Each variant is an explicit discriminant, so the matcher never has to
/// guess whether an object is a keyed map or a plain record.
///
/// # Authoring
///
/// ```rust
/// use lookout::{Spec, predicate};
/// use serde_json::json;
///
/// // JSON-shaped literals become records, sequences and literals
/// let spec = Spec::from(json!({
///     "content": "pong",
///     "embeds": [{"description": "hello"}],
/// }));
///
/// // Builders, mixing in predicates
/// let spec = Spec::record([
///     ("content", Spec::from("pong")),
///     ("score", predicate!(|v: &lookout::Value| v.as_f64() > Some(6.0))),
/// ]);
/// ```
#[derive(Debug, Clone, Default)]
pub enum Spec {
    /// No constraint. Matches anything, including an absent value.
    #[default]
    Omitted,
    /// A scalar compared by loose equality.
    Literal(Literal),
    /// A custom check on the actual value.
    Predicate(Predicate),
    /// Index-aligned element specs, matched against a [`Value::Sequence`].
    Sequence(Vec<Spec>),
    /// Key-aligned entry specs, matched against a [`Value::Map`].
    KeyedMap(IndexMap<String, Spec>),
    /// Named field specs, matched against a [`Value::Record`].
    Record(IndexMap<String, Spec>),
}

impl Spec {
    /// A spec that accepts anything.
    pub fn any() -> Self {
        Spec::Omitted
    }

    pub fn record<K, S>(fields: impl IntoIterator<Item = (K, S)>) -> Self
    where
        K: Into<String>,
        S: Into<Spec>,
    {
        Spec::Record(
            fields
                .into_iter()
                .map(|(k, s)| (k.into(), s.into()))
                .collect(),
        )
    }

    pub fn map<K, S>(entries: impl IntoIterator<Item = (K, S)>) -> Self
    where
        K: Into<String>,
        S: Into<Spec>,
    {
        Spec::KeyedMap(
            entries
                .into_iter()
                .map(|(k, s)| (k.into(), s.into()))
                .collect(),
        )
    }

    pub fn seq<S: Into<Spec>>(items: impl IntoIterator<Item = S>) -> Self {
        Spec::Sequence(items.into_iter().map(Into::into).collect())
    }

    /// Wrap a closure as a predicate spec.
    ///
    /// The closure's type name is used as its source text in diagnostics.
    /// Use the [`predicate!`](crate::predicate!) macro to capture the
    /// closure's source instead.
    pub fn predicate<F, R>(check: F) -> Self
    where
        F: Fn(&Value) -> R + Send + Sync + 'static,
        R: Verdict,
    {
        Spec::Predicate(Predicate::new(std::any::type_name::<F>(), check))
    }

    /// Add (or replace) a field, turning an omitted spec into a record.
    ///
    /// Has no effect on specs that are neither records nor omitted.
    pub fn field(self, name: impl Into<String>, spec: impl Into<Spec>) -> Self {
        match self {
            Spec::Omitted => Spec::Record(IndexMap::from([(name.into(), spec.into())])),
            Spec::Record(mut fields) => {
                fields.insert(name.into(), spec.into());
                Spec::Record(fields)
            }
            other => other,
        }
    }

    /// Fill the record fields this spec leaves out with the ones from `defaults`.
    ///
    /// Fields the spec states explicitly are kept, even when the default differs.
    /// An omitted spec becomes `defaults` as a whole. Any other combination
    /// returns the spec unchanged.
    ///
    /// ```rust
    /// use lookout::Spec;
    /// use serde_json::json;
    ///
    /// let defaults = Spec::from(json!({"channelId": "123", "author": {"id": "bot"}}));
    /// let spec = Spec::from(json!({"content": "hi"})).with_defaults(&defaults);
    /// // spec now requires content, channelId and author.id
    /// ```
    pub fn with_defaults(self, defaults: &Spec) -> Self {
        match (self, defaults) {
            (Spec::Omitted, defaults) => defaults.clone(),
            (Spec::Record(mut fields), Spec::Record(extra)) => {
                for (name, spec) in extra {
                    let entry = fields.entry(name.clone()).or_insert(Spec::Omitted);
                    if entry.is_omitted() {
                        *entry = spec.clone();
                    }
                }
                Spec::Record(fields)
            }
            (spec, _) => spec,
        }
    }

    #[inline]
    pub fn is_omitted(&self) -> bool {
        matches!(self, Spec::Omitted)
    }

    /// Pretty JSON rendering used in timeout diagnostics.
    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| format!("{self:?}"))
    }
}

impl Serialize for Spec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Spec::Omitted => serializer.serialize_unit(),
            Spec::Literal(literal) => literal.serialize(serializer),
            Spec::Predicate(predicate) => {
                serializer.serialize_str(&format!("<predicate: {}>", predicate.source()))
            }
            Spec::Sequence(items) => serializer.collect_seq(items),
            Spec::KeyedMap(entries) | Spec::Record(entries) => {
                // omitted entries carry no constraint, leave them out
                let mut map = serializer.serialize_map(None)?;
                for (key, spec) in entries.iter().filter(|(_, s)| !s.is_omitted()) {
                    map.serialize_entry(key, spec)?;
                }
                map.end()
            }
        }
    }
}

/// A scalar expected value.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
}

impl Literal {
    /// Loose equality against an actual value.
    ///
    /// Same-kind scalars compare directly. A number and a numeric string
    /// compare by numeric value, and booleans count as `0`/`1` against
    /// numbers and strings. `Null` only equals `Null`, and a literal never
    /// equals a container.
    pub fn loosely_equals(&self, actual: &Value) -> bool {
        match (self, actual) {
            (Literal::Null, Value::Null) => true,
            (Literal::Null, _) | (_, Value::Null) => false,
            (Literal::Bool(a), Value::Bool(b)) => a == b,
            (Literal::Number(a), Value::Number(b)) => a == b,
            (Literal::String(a), Value::String(b)) => a == b,
            (Literal::Number(a), Value::String(s)) => to_number(s) == Some(*a),
            (Literal::String(s), Value::Number(b)) => to_number(s) == Some(*b),
            (Literal::Bool(a), other) => Literal::Number(bool_to_number(*a)).loosely_equals(other),
            (literal, Value::Bool(b)) => literal.loosely_equals(&Value::Number(bool_to_number(*b))),
            _ => false,
        }
    }
}

fn bool_to_number(b: bool) -> f64 {
    if b { 1.0 } else { 0.0 }
}

/// Numeric reading of a string, `None` where it would be NaN.
///
/// Rust also parses `inf`, `infinity` and `nan` in any case. Only the exact
/// spelling `Infinity` (optionally signed) is treated as infinite here.
fn to_number(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() {
        return Some(0.0);
    }
    let n: f64 = s.parse().ok()?;
    if n.is_finite() || s.trim_start_matches(['+', '-']) == "Infinity" {
        Some(n)
    } else {
        None
    }
}

impl Serialize for Literal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Literal::Null => serializer.serialize_unit(),
            Literal::Bool(b) => serializer.serialize_bool(*b),
            Literal::Number(n) => Value::Number(*n).serialize(serializer),
            Literal::String(s) => serializer.serialize_str(s),
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string(self) {
            Ok(json) => f.write_str(&json),
            Err(_) => write!(f, "{self:?}"),
        }
    }
}

/// The outcome of a predicate call.
///
/// Only an explicit `false` rejects the value. Every other output passes,
/// so a predicate that only inspects or logs its input (returning `()`)
/// never fails a match by accident.
pub trait Verdict {
    /// Returns true if this output rejects the value.
    fn rejects(&self) -> bool;
}

impl Verdict for bool {
    fn rejects(&self) -> bool {
        !*self
    }
}

impl Verdict for () {
    fn rejects(&self) -> bool {
        false
    }
}

impl Verdict for Option<bool> {
    fn rejects(&self) -> bool {
        matches!(self, Some(false))
    }
}

impl Verdict for Value {
    fn rejects(&self) -> bool {
        matches!(self, Value::Bool(false))
    }
}

type CheckFn = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// A named check on an actual value.
#[derive(Clone)]
pub struct Predicate {
    source: Cow<'static, str>,
    rejects: CheckFn,
}

impl Predicate {
    /// Create a predicate with the given source text for diagnostics.
    pub fn new<F, R>(source: impl Into<Cow<'static, str>>, check: F) -> Self
    where
        F: Fn(&Value) -> R + Send + Sync + 'static,
        R: Verdict,
    {
        Self {
            source: source.into(),
            rejects: Arc::new(move |value: &Value| check(value).rejects()),
        }
    }

    /// Returns the text shown for this predicate in diagnostics.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub(crate) fn rejects(&self, value: &Value) -> bool {
        (self.rejects)(value)
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Predicate")
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

/// Build a predicate [`Spec`] that remembers its own source text.
///
/// ```rust
/// use lookout::{Value, predicate};
///
/// let spec = predicate!(|n: &Value| n.as_f64() > Some(6.0));
/// ```
#[macro_export]
macro_rules! predicate {
    ($check:expr) => {
        $crate::Spec::Predicate($crate::Predicate::new(stringify!($check), $check))
    };
}

impl From<Predicate> for Spec {
    fn from(predicate: Predicate) -> Self {
        Spec::Predicate(predicate)
    }
}

impl From<Literal> for Spec {
    fn from(literal: Literal) -> Self {
        Spec::Literal(literal)
    }
}

impl From<&str> for Spec {
    fn from(s: &str) -> Self {
        Spec::Literal(Literal::String(s.to_owned()))
    }
}

impl From<String> for Spec {
    fn from(s: String) -> Self {
        Spec::Literal(Literal::String(s))
    }
}

impl From<bool> for Spec {
    fn from(b: bool) -> Self {
        Spec::Literal(Literal::Bool(b))
    }
}

macro_rules! number_spec_from {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Spec {
                fn from(n: $t) -> Self {
                    Spec::Literal(Literal::Number(n as f64))
                }
            }
        )*
    };
}

number_spec_from!(i8, i16, i32, i64, u8, u16, u32, u64, usize, f32, f64);

/// Every part of the value becomes a constraint. Maps stay keyed maps and
/// records stay records.
impl From<Value> for Spec {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Spec::Literal(Literal::Null),
            Value::Bool(b) => Spec::Literal(Literal::Bool(b)),
            Value::Number(n) => Spec::Literal(Literal::Number(n)),
            Value::String(s) => Spec::Literal(Literal::String(s)),
            Value::Sequence(items) => Spec::Sequence(items.into_iter().map(Spec::from).collect()),
            Value::Map(entries) => {
                Spec::KeyedMap(entries.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
            Value::Record(fields) => {
                Spec::Record(fields.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
        }
    }
}

impl From<serde_json::Value> for Spec {
    fn from(json: serde_json::Value) -> Self {
        Spec::from(Value::from(json))
    }
}

impl<S: Into<Spec>> From<Vec<S>> for Spec {
    fn from(items: Vec<S>) -> Self {
        Spec::seq(items)
    }
}

/// `None` means "don't care".
impl<S: Into<Spec>> From<Option<S>> for Spec {
    fn from(spec: Option<S>) -> Self {
        spec.map_or(Spec::Omitted, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_literal_becomes_record_spec() {
        let spec = Spec::from(json!({"content": "hi", "embeds": [{"title": "t"}]}));
        let Spec::Record(fields) = spec else {
            panic!("expected a record spec");
        };
        assert!(matches!(fields["content"], Spec::Literal(Literal::String(_))));
        assert!(matches!(fields["embeds"], Spec::Sequence(ref items) if items.len() == 1));
    }

    #[test]
    fn map_values_become_keyed_map_specs() {
        let spec = Spec::from(Value::map([("1", "one")]));
        assert!(matches!(spec, Spec::KeyedMap(ref entries) if entries.len() == 1));
    }

    #[test]
    fn verdicts_only_reject_explicit_false() {
        assert!(false.rejects());
        assert!(!true.rejects());
        assert!(!().rejects());
        assert!(!None::<bool>.rejects());
        assert!(Some(false).rejects());
        assert!(Value::Bool(false).rejects());
        assert!(!Value::Null.rejects());
        assert!(!Value::from(0).rejects());
        assert!(!Value::from("").rejects());
    }

    #[test]
    fn loose_equality_coerces_scalars() {
        assert!(Literal::Number(1.0).loosely_equals(&Value::from("1")));
        assert!(Literal::String("2".into()).loosely_equals(&Value::from(2)));
        assert!(Literal::Bool(true).loosely_equals(&Value::from(1)));
        assert!(Literal::Number(0.0).loosely_equals(&Value::from(false)));
        assert!(Literal::Number(0.0).loosely_equals(&Value::from("")));
        assert!(!Literal::Null.loosely_equals(&Value::from(0)));
        assert!(!Literal::Number(0.0).loosely_equals(&Value::Null));
        assert!(!Literal::String("a".into()).loosely_equals(&Value::seq(["a"])));
        assert!(!Literal::String("a".into()).loosely_equals(&Value::from("b")));
    }

    #[test]
    fn only_exact_infinity_spelling_is_numeric() {
        let infinity = Literal::Number(f64::INFINITY);
        assert!(infinity.loosely_equals(&Value::from("Infinity")));
        assert!(infinity.loosely_equals(&Value::from(" +Infinity ")));
        assert!(Literal::Number(f64::NEG_INFINITY).loosely_equals(&Value::from("-Infinity")));
        assert!(!infinity.loosely_equals(&Value::from("inf")));
        assert!(!infinity.loosely_equals(&Value::from("infinity")));
        assert!(!Literal::String("INF".into()).loosely_equals(&Value::from(f64::INFINITY)));
        assert!(!Literal::Number(f64::NAN).loosely_equals(&Value::from("nan")));
    }

    #[test]
    fn with_defaults_fills_only_omitted_fields() {
        let defaults = Spec::from(json!({"content": "", "channelId": "c1"}));
        let spec = Spec::from(json!({"content": "hi"}))
            .field("author", Spec::Omitted)
            .with_defaults(&defaults.clone().field("author", json!({"id": "bot"})));

        assert_eq!(
            serde_json::to_value(&spec).unwrap(),
            json!({"content": "hi", "author": {"id": "bot"}, "channelId": "c1"})
        );
        assert_eq!(
            serde_json::to_value(Spec::any().with_defaults(&defaults)).unwrap(),
            json!({"content": "", "channelId": "c1"})
        );
    }

    #[test]
    fn predicates_serialize_with_their_source() {
        let spec = Spec::record([
            ("score", crate::predicate!(|v: &Value| v.as_f64() > Some(6.0))),
            ("skipped", Spec::Omitted),
        ]);
        let json = serde_json::to_value(&spec).unwrap();
        let text = json["score"].as_str().unwrap();
        assert!(text.starts_with("<predicate: |v: &Value|"), "got {text}");
        assert!(json.get("skipped").is_none());
    }
}

//! Loosely-typed stat records as handed over by the host.
//!
//! Hosts disagree on field names and on value types: the same counter may
//! arrive as a number on one path and as a decimal string on the other.
//! [`RawRecord`] keeps every field as a [`StatValue`] so the classification
//! pass can work on either shape without a schema per vendor.

use ::serde::{Deserialize, Deserializer, Serialize};
use chrono::DateTime;
use std::collections::BTreeMap;
use std::fmt;

/// Value stored by the track-scoped path for metrics the host does not report.
pub const UNKNOWN_VALUE: &str = "?";

/// The kind of a local media track.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MediaKind {
    #[serde(rename = "audio")]
    Audio,
    #[serde(rename = "video")]
    Video,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Audio => "audio",
            MediaKind::Video => "video",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single stat value.
///
/// Serialized untagged, so a record round-trips through the same JSON the
/// host produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StatValue {
    Bool(bool),
    Number(f64),
    String(String),
}

impl StatValue {
    /// The placeholder for a metric the host cannot report.
    pub fn unknown() -> Self {
        StatValue::String(UNKNOWN_VALUE.to_owned())
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, StatValue::String(s) if s == UNKNOWN_VALUE)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            StatValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric view of the value. Decimal strings are parsed, booleans are not numbers.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            StatValue::Number(n) => Some(*n),
            StatValue::String(s) => s.trim().parse::<f64>().ok(),
            StatValue::Bool(_) => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            StatValue::Bool(b) => Some(*b),
            StatValue::String(s) if s == "true" => Some(true),
            StatValue::String(s) if s == "false" => Some(false),
            _ => None,
        }
    }

    /// Whether the value counts as "present" for a gate: non-zero numbers,
    /// non-empty strings and `true`.
    pub fn is_truthy(&self) -> bool {
        match self {
            StatValue::Bool(b) => *b,
            StatValue::Number(n) => *n != 0.0 && !n.is_nan(),
            StatValue::String(s) => !s.is_empty(),
        }
    }
}

impl fmt::Display for StatValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatValue::Bool(b) => write!(f, "{b}"),
            StatValue::Number(n) => write!(f, "{n}"),
            StatValue::String(s) => f.write_str(s),
        }
    }
}

impl From<bool> for StatValue {
    fn from(b: bool) -> Self {
        StatValue::Bool(b)
    }
}

impl From<f64> for StatValue {
    fn from(n: f64) -> Self {
        StatValue::Number(n)
    }
}

impl From<u32> for StatValue {
    fn from(n: u32) -> Self {
        StatValue::Number(n as f64)
    }
}

impl From<u64> for StatValue {
    fn from(n: u64) -> Self {
        StatValue::Number(n as f64)
    }
}

impl From<i64> for StatValue {
    fn from(n: i64) -> Self {
        StatValue::Number(n as f64)
    }
}

impl From<&str> for StatValue {
    fn from(s: &str) -> Self {
        StatValue::String(s.to_owned())
    }
}

impl From<String> for StatValue {
    fn from(s: String) -> Self {
        StatValue::String(s)
    }
}

/// Deserializes a stat map, treating `null` values as absent fields.
pub(crate) fn deserialize_present_fields<'de, D>(
    deserializer: D,
) -> std::result::Result<BTreeMap<String, StatValue>, D::Error>
where
    D: Deserializer<'de>,
{
    let fields = BTreeMap::<String, Option<StatValue>>::deserialize(deserializer)?;
    Ok(fields
        .into_iter()
        .filter_map(|(name, value)| value.map(|value| (name, value)))
        .collect())
}

/// One host stat entry, flattened to `name -> value` plus its identity.
///
/// Records only live for a single normalization; the summary keeps them in
/// host report order for callers that want the raw numbers.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub typ: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<StatValue>,
    #[serde(flatten, deserialize_with = "deserialize_present_fields")]
    pub fields: BTreeMap<String, StatValue>,
}

impl RawRecord {
    pub fn new(id: impl Into<String>, typ: impl Into<String>) -> Self {
        RawRecord {
            id: id.into(),
            typ: typ.into(),
            ..Default::default()
        }
    }

    pub fn with_timestamp(mut self, timestamp: impl Into<StatValue>) -> Self {
        self.timestamp = Some(timestamp.into());
        self
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<StatValue>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&StatValue> {
        self.fields.get(name)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(StatValue::as_str)
    }

    /// `true` only for a boolean `true` or the string `"true"`.
    pub fn flag(&self, name: &str) -> bool {
        self.get(name).and_then(StatValue::as_bool).unwrap_or(false)
    }

    pub fn is_truthy(&self, name: &str) -> bool {
        self.get(name).is_some_and(StatValue::is_truthy)
    }

    /// Milliseconds since the Unix epoch.
    ///
    /// Accepts numbers, decimal strings and RFC 3339 strings. Returns `None`
    /// when the record carries no timestamp or one that cannot be read.
    pub fn timestamp_millis(&self) -> Option<f64> {
        match self.timestamp.as_ref()? {
            StatValue::Number(n) if n.is_finite() => Some(*n),
            StatValue::String(s) => {
                if let Ok(n) = s.trim().parse::<f64>() {
                    return n.is_finite().then_some(n);
                }
                DateTime::parse_from_rfc3339(s.trim())
                    .ok()
                    .map(|dt| dt.timestamp_millis() as f64)
            }
            _ => None,
        }
    }
}

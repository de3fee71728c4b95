//! Core domain types for the monitor metrics bridge
//!
//! These value objects describe what flows between the management-bean
//! server, the bridge and the metric registries: registry partitions, metric
//! kinds, tags, metric identities, metadata and the values read from beans.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Registry partition a metric is registered into
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistryType {
    /// Standard metrics every runtime is expected to expose
    Base,
    /// Product-specific metrics
    Vendor,
}

impl RegistryType {
    /// Parse a partition column value.
    ///
    /// Only `vendor` (any case) selects the vendor partition; every other
    /// value falls back to `base`.
    pub fn from_column(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("vendor") {
            RegistryType::Vendor
        } else {
            RegistryType::Base
        }
    }

    /// Lowercase partition name
    pub fn name(&self) -> &'static str {
        match self {
            RegistryType::Base => "base",
            RegistryType::Vendor => "vendor",
        }
    }
}

impl std::fmt::Display for RegistryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Kind of metric a descriptor row produces
///
/// `Unknown` keeps the raw column value so the row can be reported when it
/// is skipped.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MetricKind {
    /// Monotonic count read from a bean attribute
    Counter,
    /// Instantaneous numeric reading
    Gauge,
    /// Count plus accumulated elapsed time
    SimpleTimer,
    /// Any type name the bridge does not understand
    Unknown(String),
}

impl MetricKind {
    /// Parse a type column such as `COUNTER`, `gauge` or `SIMPLE_TIMER`
    pub fn parse(value: &str) -> Self {
        let normalized: String = value
            .trim()
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect::<String>()
            .to_ascii_lowercase();

        match normalized.as_str() {
            "counter" => MetricKind::Counter,
            "gauge" => MetricKind::Gauge,
            "simpletimer" => MetricKind::SimpleTimer,
            _ => MetricKind::Unknown(value.to_string()),
        }
    }

    /// Canonical column spelling
    pub fn as_str(&self) -> &str {
        match self {
            MetricKind::Counter => "counter",
            MetricKind::Gauge => "gauge",
            MetricKind::SimpleTimer => "simple_timer",
            MetricKind::Unknown(raw) => raw,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, MetricKind::Unknown(_))
    }
}

impl std::fmt::Display for MetricKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for MetricKind {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for MetricKind {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(MetricKind::parse(&raw))
    }
}

/// A key/value label attached to a metric
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    pub value: String,
}

impl Tag {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}={}", self.name, self.value)
    }
}

/// Identity of one registered metric: its name plus its tags
///
/// Tags are kept sorted by name so two identities built from the same tags
/// in a different order compare equal.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MetricId {
    name: String,
    tags: Vec<Tag>,
}

impl MetricId {
    pub fn new(name: impl Into<String>, tags: impl IntoIterator<Item = Tag>) -> Self {
        let mut tags: Vec<Tag> = tags.into_iter().collect();
        tags.sort();
        Self {
            name: name.into(),
            tags,
        }
    }

    /// Identity without tags
    pub fn untagged(name: impl Into<String>) -> Self {
        Self::new(name, Vec::new())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    /// Value of the tag with the given name, if present
    pub fn tag(&self, name: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|t| t.name == name)
            .map(|t| t.value.as_str())
    }
}

impl std::fmt::Display for MetricId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{{{}}}", self.name, crate::utils::format_tags(&self.tags))
    }
}

/// Metadata handed to the registry alongside each adapter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    name: String,
    display_name: String,
    description: String,
    kind: MetricKind,
    unit: String,
}

impl Metadata {
    pub fn new(name: impl Into<String>, kind: MetricKind) -> Self {
        Self {
            name: name.into(),
            display_name: String::new(),
            description: String::new(),
            kind,
            unit: "none".to_string(),
        }
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = unit.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn kind(&self) -> &MetricKind {
        &self.kind
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }
}

/// Value returned by the management-bean server for an attribute
///
/// `Composite` models open/composite data: a nested map addressed by
/// sub-attribute key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Number(f64),
    Text(String),
    Composite(BTreeMap<String, AttributeValue>),
}

impl AttributeValue {
    /// Build a composite value from key/value pairs
    pub fn composite<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, AttributeValue)>,
        K: Into<String>,
    {
        AttributeValue::Composite(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Numeric view of the value; text and composites have none
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttributeValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Look up a sub-attribute of a composite value
    pub fn get(&self, key: &str) -> Option<&AttributeValue> {
        match self {
            AttributeValue::Composite(entries) => entries.get(key),
            _ => None,
        }
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        AttributeValue::Number(value)
    }
}

impl From<u64> for AttributeValue {
    fn from(value: u64) -> Self {
        AttributeValue::Number(value as f64)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        AttributeValue::Number(value as f64)
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::Text(value.to_string())
    }
}

/// Current value produced by an adapter at read time
#[derive(Debug, Clone, PartialEq)]
pub enum MetricReading {
    Count(u64),
    Gauge(f64),
    SimpleTimer { count: u64, elapsed: Duration },
}

impl MetricReading {
    /// Kind of metric this reading belongs to
    pub fn kind(&self) -> MetricKind {
        match self {
            MetricReading::Count(_) => MetricKind::Counter,
            MetricReading::Gauge(_) => MetricKind::Gauge,
            MetricReading::SimpleTimer { .. } => MetricKind::SimpleTimer,
        }
    }
}

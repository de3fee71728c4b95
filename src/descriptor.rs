//! Metric descriptor rows and descriptor tables
//!
//! A descriptor says which bean attribute feeds which metric. Tables come
//! from configuration (JSON) or from the built-in [`crate::MappingTable`].

use super::*;
use crate::mapping::units;
use serde::{Deserialize, Deserializer, Serialize};

/// One row of a descriptor table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricDescriptor {
    /// Partition the metric is registered into
    #[serde(deserialize_with = "registry_from_column")]
    pub registry: RegistryType,

    pub name: String,

    pub kind: MetricKind,

    #[serde(default)]
    pub display_name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default = "default_unit")]
    pub unit: String,

    /// Bean attribute read by the adapter (the count attribute for timers)
    pub attribute: String,

    #[serde(default)]
    pub sub_attribute: Option<String>,

    /// Elapsed-time attribute, used by simple timers only
    #[serde(default)]
    pub second_attribute: Option<String>,

    #[serde(default)]
    pub second_sub_attribute: Option<String>,

    /// Tag name carrying the derived instance label
    #[serde(default)]
    pub tag_name: Option<String>,
}

fn default_unit() -> String {
    units::NONE.to_string()
}

fn registry_from_column<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<RegistryType, D::Error> {
    let raw = String::deserialize(deserializer)?;
    Ok(RegistryType::from_column(&raw))
}

impl MetricDescriptor {
    fn new(
        registry: RegistryType,
        name: impl Into<String>,
        kind: MetricKind,
        attribute: impl Into<String>,
    ) -> Self {
        Self {
            registry,
            name: name.into(),
            kind,
            display_name: String::new(),
            description: String::new(),
            unit: default_unit(),
            attribute: attribute.into(),
            sub_attribute: None,
            second_attribute: None,
            second_sub_attribute: None,
            tag_name: None,
        }
    }

    /// Counter row reading `attribute`
    pub fn counter(registry: RegistryType, name: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self::new(registry, name, MetricKind::Counter, attribute)
    }

    /// Gauge row reading `attribute`
    pub fn gauge(registry: RegistryType, name: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self::new(registry, name, MetricKind::Gauge, attribute)
    }

    /// Simple timer row pairing a count path with an elapsed-time path
    pub fn simple_timer(
        registry: RegistryType,
        name: impl Into<String>,
        count: (&str, Option<&str>),
        elapsed: (&str, Option<&str>),
    ) -> Self {
        let mut row = Self::new(registry, name, MetricKind::SimpleTimer, count.0);
        row.sub_attribute = count.1.map(str::to_string);
        row.second_attribute = Some(elapsed.0.to_string());
        row.second_sub_attribute = elapsed.1.map(str::to_string);
        row
    }

    /// Row with an arbitrary kind column, as read from configuration
    pub fn with_kind(mut self, kind: MetricKind) -> Self {
        self.kind = kind;
        self
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

    pub fn with_sub_attribute(mut self, sub_attribute: impl Into<String>) -> Self {
        self.sub_attribute = Some(sub_attribute.into());
        self
    }

    pub fn with_tag_name(mut self, tag_name: impl Into<String>) -> Self {
        self.tag_name = Some(tag_name.into());
        self
    }

    /// Metadata registered alongside the adapter
    pub fn metadata(&self) -> Metadata {
        Metadata::new(&self.name, self.kind.clone())
            .with_display_name(&self.display_name)
            .with_description(&self.description)
            .with_unit(&self.unit)
    }

    /// Path of the primary attribute
    pub fn attribute_path(&self) -> AttributePath {
        AttributePath::from_parts(&self.attribute, self.sub_attribute.as_deref())
    }

    /// Path of the elapsed-time attribute, if the row declares one
    pub fn second_attribute_path(&self) -> Option<AttributePath> {
        self.second_attribute
            .as_deref()
            .map(|attr| AttributePath::from_parts(attr, self.second_sub_attribute.as_deref()))
    }

    /// Check names and the attributes the row's kind needs
    ///
    /// Unknown kinds pass: they are skipped at registration time, not
    /// rejected while loading.
    pub fn validate(&self) -> Result<()> {
        validate_metric_name(&self.name)?;

        if self.attribute.trim().is_empty() {
            return Err(descriptor_error(&self.name, "attribute cannot be empty"));
        }

        if let Some(tag_name) = &self.tag_name {
            validate_tag_name(tag_name)?;
        }

        if self.kind == MetricKind::SimpleTimer && self.second_attribute.is_none() {
            return Err(descriptor_error(
                &self.name,
                "simple timer needs a second (elapsed time) attribute",
            ));
        }

        Ok(())
    }
}

/// Ordered list of descriptor rows
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DescriptorTable {
    rows: Vec<MetricDescriptor>,
}

impl DescriptorTable {
    pub fn new(rows: Vec<MetricDescriptor>) -> Self {
        Self { rows }
    }

    /// Load a table from a JSON array of rows
    ///
    /// # Examples
    /// ```rust
    /// use tyl_monitor_metrics::{DescriptorTable, MetricKind, RegistryType};
    ///
    /// let table = DescriptorTable::from_json(r#"[
    ///     {"registry": "vendor", "name": "threadpool.size", "kind": "GAUGE",
    ///      "attribute": "PoolSize", "tag_name": "pool"}
    /// ]"#).unwrap();
    ///
    /// assert_eq!(table.len(), 1);
    /// assert_eq!(table.rows()[0].registry, RegistryType::Vendor);
    /// assert_eq!(table.rows()[0].kind, MetricKind::Gauge);
    /// ```
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(from_serde_json_error)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(from_serde_json_error)
    }

    pub fn rows(&self) -> &[MetricDescriptor] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn push(&mut self, row: MetricDescriptor) {
        self.rows.push(row);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MetricDescriptor> {
        self.rows.iter()
    }

    /// Validate every row, stopping at the first failure
    pub fn validate(&self) -> Result<()> {
        self.rows.iter().try_for_each(MetricDescriptor::validate)
    }
}

impl From<Vec<MetricDescriptor>> for DescriptorTable {
    fn from(rows: Vec<MetricDescriptor>) -> Self {
        Self::new(rows)
    }
}

impl FromIterator<MetricDescriptor> for DescriptorTable {
    fn from_iter<I: IntoIterator<Item = MetricDescriptor>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a DescriptorTable {
    type Item = &'a MetricDescriptor;
    type IntoIter = std::slice::Iter<'a, MetricDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_row_metadata() {
        let row = MetricDescriptor::counter(RegistryType::Vendor, "servlet.request.total", "RequestCount")
            .with_display_name("Total Request")
            .with_description("The number of visits to this servlet")
            .with_tag_name("servlet");

        let metadata = row.metadata();
        assert_eq!(metadata.name(), "servlet.request.total");
        assert_eq!(metadata.kind(), &MetricKind::Counter);
        assert_eq!(metadata.unit(), "none");
        assert_eq!(row.attribute_path(), AttributePath::new("RequestCount"));
        assert!(row.validate().is_ok());
    }

    #[test]
    fn test_simple_timer_row_paths() {
        let row = MetricDescriptor::simple_timer(
            RegistryType::Base,
            "REST.request",
            ("ResponseTimeDetails", Some("count")),
            ("ResponseTimeDetails", Some("total")),
        );

        assert_eq!(row.attribute_path(), AttributePath::nested("ResponseTimeDetails", "count"));
        assert_eq!(
            row.second_attribute_path(),
            Some(AttributePath::nested("ResponseTimeDetails", "total"))
        );
        assert!(row.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_rows() {
        let bad_name = MetricDescriptor::gauge(RegistryType::Vendor, "bad name", "PoolSize");
        assert!(bad_name.validate().is_err());

        let bad_tag = MetricDescriptor::gauge(RegistryType::Vendor, "threadpool.size", "PoolSize")
            .with_tag_name("pool name");
        assert!(bad_tag.validate().is_err());

        let empty_attribute = MetricDescriptor::gauge(RegistryType::Vendor, "threadpool.size", " ");
        assert!(empty_attribute.validate().is_err());

        let incomplete_timer = MetricDescriptor::counter(RegistryType::Base, "REST.request", "RequestCount")
            .with_kind(MetricKind::SimpleTimer);
        let error = incomplete_timer.validate().unwrap_err();
        assert!(error.to_string().contains("REST.request"));
    }

    #[test]
    fn test_unknown_kind_passes_validation() {
        let row = MetricDescriptor::gauge(RegistryType::Vendor, "threadpool.size", "PoolSize")
            .with_kind(MetricKind::parse("HISTOGRAM"));
        assert!(row.validate().is_ok());
    }

    #[test]
    fn test_table_from_json() {
        let table = DescriptorTable::from_json(
            r#"[
                {"registry": "VENDOR", "name": "session.create.total", "kind": "COUNTER",
                 "display_name": "Total Create Count", "attribute": "CreateCount",
                 "tag_name": "appname"},
                {"registry": "base", "name": "REST.request", "kind": "SIMPLE_TIMER",
                 "unit": "nanoseconds", "attribute": "ResponseTimeDetails", "sub_attribute": "count",
                 "second_attribute": "ResponseTimeDetails", "second_sub_attribute": "total"},
                {"registry": "vendor", "name": "odd.metric", "kind": "METER", "attribute": "X"}
            ]"#,
        )
        .unwrap();

        assert_eq!(table.len(), 3);
        let rows = table.rows();
        assert_eq!(rows[0].registry, RegistryType::Vendor);
        assert_eq!(rows[0].tag_name.as_deref(), Some("appname"));
        assert_eq!(rows[0].unit, "none");
        assert_eq!(rows[1].kind, MetricKind::SimpleTimer);
        assert_eq!(rows[1].second_sub_attribute.as_deref(), Some("total"));
        assert_eq!(rows[2].kind, MetricKind::Unknown("METER".to_string()));
        assert!(table.validate().is_ok());
    }

    #[test]
    fn test_table_from_invalid_json() {
        let error = DescriptorTable::from_json("{not json").unwrap_err();
        assert!(error.to_string().contains("json"));

        // a row without an attribute is a parse error
        assert!(DescriptorTable::from_json(r#"[{"registry": "vendor", "name": "a", "kind": "GAUGE"}]"#).is_err());
    }

    #[test]
    fn test_table_json_round_trip_keeps_rows() {
        let table: DescriptorTable = vec![
            MetricDescriptor::gauge(RegistryType::Vendor, "threadpool.size", "PoolSize").with_tag_name("pool"),
        ]
        .into();

        let json = table.to_json().unwrap();
        assert_eq!(DescriptorTable::from_json(&json).unwrap(), table);
    }
}

//! MetricBridge: registers bean-backed metrics and tears them down again
//!
//! One bridge is built per monitored bean. `create_metrics` walks a
//! descriptor table, builds an adapter per row and registers it in the base
//! or vendor partition; `unregister_metrics` removes everything the bridge
//! registered. Neither operation fails: per-row and per-identity problems
//! are logged and reported.

use super::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::{Arc, OnceLock};
use tokio::sync::RwLock;

/// Tag names used for simple timers
pub const CLASS_TAG: &str = "class";
pub const METHOD_TAG: &str = "method";

/// Which partition `unregister_metrics` removes a metric from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnregisterScope {
    /// The partition the metric was registered into
    #[default]
    RegisteredPartition,
    /// Always the vendor partition, even for metrics registered into base
    VendorOnly,
}

/// Configuration for a bridge instance
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    pub unregister_scope: UnregisterScope,

    /// Validate each row before registering it; invalid rows are skipped
    pub validate_descriptors: bool,
}

impl BridgeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_unregister_scope(mut self, scope: UnregisterScope) -> Self {
        self.unregister_scope = scope;
        self
    }

    pub fn with_descriptor_validation(mut self, validate: bool) -> Self {
        self.validate_descriptors = validate;
        self
    }

    /// Load configuration from JSON; missing fields take their defaults
    ///
    /// # Examples
    /// ```rust
    /// use tyl_monitor_metrics::{BridgeConfig, UnregisterScope};
    ///
    /// let config = BridgeConfig::from_json(r#"{"unregister_scope": "vendor_only"}"#).unwrap();
    /// assert_eq!(config.unregister_scope, UnregisterScope::VendorOnly);
    /// assert!(!config.validate_descriptors);
    /// ```
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| monitor_config_error("bridge", e.to_string()))
    }
}

/// Why a descriptor row produced no metric
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    /// The kind column named no known metric kind
    UnknownKind(String),
    /// Row failed validation (only with `validate_descriptors`)
    InvalidDescriptor(String),
    /// Simple timer row without an elapsed-time attribute
    IncompleteTimer,
    /// Simple timer on a bean whose name carries no class/method
    MissingRestTags,
    /// The registry refused the registration
    RegistrationFailed(String),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::UnknownKind(kind) => write!(f, "invalid type {kind}"),
            SkipReason::InvalidDescriptor(message) => write!(f, "invalid descriptor: {message}"),
            SkipReason::IncompleteTimer => f.write_str("simple timer without elapsed time attribute"),
            SkipReason::MissingRestTags => f.write_str("object name has no class/method"),
            SkipReason::RegistrationFailed(message) => write!(f, "registration failed: {message}"),
        }
    }
}

/// A descriptor row that was not registered
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedMetric {
    pub name: String,
    pub reason: SkipReason,
}

/// Outcome of `create_metrics`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegistrationReport {
    /// Identities registered, in table order
    pub registered: Vec<MetricId>,
    pub skipped: Vec<SkippedMetric>,
}

/// Outcome of `unregister_metrics`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UnregisterReport {
    pub removed: Vec<MetricId>,
    pub failed: Vec<MetricId>,
}

impl UnregisterReport {
    /// Number of removals attempted
    pub fn attempted(&self) -> usize {
        self.removed.len() + self.failed.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct TrackedMetric {
    registry: RegistryType,
    id: MetricId,
}

/// Bridge between one management bean and the metric registries
///
/// ## Example Usage
/// ```rust
/// use std::sync::Arc;
/// use tyl_monitor_metrics::{
///     AttributeValue, InMemoryMetricRegistry, MetricBridge, MetricId, MetricReading,
///     RegistryType, SharedMetricRegistries, StaticMBeanServer, Tag,
/// };
///
/// # tokio_test::block_on(async {
/// let name = "WebSphere:type=ServletStats,name=myApp.HelloServlet";
/// let server = Arc::new(
///     StaticMBeanServer::new().with_attribute(name, "RequestCount", AttributeValue::from(17u64)),
/// );
/// let vendor = Arc::new(InMemoryMetricRegistry::new(RegistryType::Vendor));
/// let registries = SharedMetricRegistries::new(
///     Arc::new(InMemoryMetricRegistry::new(RegistryType::Base)),
///     vendor.clone(),
/// );
///
/// let bridge = MetricBridge::new(name, server, registries);
/// let report = bridge.create_mapped_metrics().await.unwrap();
/// assert_eq!(report.registered.len(), 2);
///
/// let id = MetricId::new("servlet.request.total", vec![Tag::new("servlet", "myApp.HelloServlet")]);
/// assert_eq!(vendor.read(&id).await.unwrap(), MetricReading::Count(17));
///
/// bridge.unregister_metrics().await;
/// assert!(vendor.is_empty().await);
/// # });
/// ```
pub struct MetricBridge {
    object_name: ObjectName,
    server: Arc<dyn MBeanServer>,
    registries: SharedMetricRegistries,
    config: BridgeConfig,
    mbean_stats_name: OnceLock<String>,
    metric_ids: RwLock<BTreeSet<TrackedMetric>>,
}

impl MetricBridge {
    pub fn new(
        object_name: impl Into<ObjectName>,
        server: Arc<dyn MBeanServer>,
        registries: SharedMetricRegistries,
    ) -> Self {
        Self::with_config(object_name, server, registries, BridgeConfig::default())
    }

    pub fn with_config(
        object_name: impl Into<ObjectName>,
        server: Arc<dyn MBeanServer>,
        registries: SharedMetricRegistries,
        config: BridgeConfig,
    ) -> Self {
        Self {
            object_name: object_name.into(),
            server,
            registries,
            config,
            mbean_stats_name: OnceLock::new(),
            metric_ids: RwLock::new(BTreeSet::new()),
        }
    }

    pub fn object_name(&self) -> &ObjectName {
        &self.object_name
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Instance label derived from the object name, computed once
    pub fn mbean_stats_name(&self) -> &str {
        self.mbean_stats_name
            .get_or_init(|| derive_label(&self.object_name))
    }

    /// Class and method of a REST resource bean
    pub fn rest_tags(&self) -> Option<RestTags> {
        rest_tags(&self.object_name)
    }

    /// Identities registered by this bridge and not yet unregistered
    pub async fn tracked_ids(&self) -> Vec<MetricId> {
        self.metric_ids
            .read()
            .await
            .iter()
            .map(|tracked| tracked.id.clone())
            .collect()
    }

    /// Register one metric per descriptor row
    ///
    /// Rows are processed in table order. A row that cannot be registered is
    /// logged, reported in `skipped`, and does not affect the other rows.
    /// Calling this twice with the same table registers fresh adapters
    /// again; how duplicates are handled is up to the registry.
    pub async fn create_metrics(&self, table: &DescriptorTable) -> RegistrationReport {
        let mut report = RegistrationReport::default();

        for row in table {
            match self.register_row(row).await {
                Ok(tracked) => {
                    tracing::debug!("Registered {} in {} registry", tracked.id, tracked.registry);
                    report.registered.push(tracked.id.clone());
                    self.metric_ids.write().await.insert(tracked);
                }
                Err(reason) => {
                    match &reason {
                        SkipReason::RegistrationFailed(_) => {
                            tracing::warn!("Failed to register {}: {}", row.name, reason)
                        }
                        _ => tracing::debug!("Failed to register {} because of {}", row.name, reason),
                    }
                    report.skipped.push(SkippedMetric {
                        name: row.name.clone(),
                        reason,
                    });
                }
            }
        }

        report
    }

    /// Register the built-in table matching this bean's `type=` key
    ///
    /// Returns `None` when no built-in table exists for the bean type.
    pub async fn create_mapped_metrics(&self) -> Option<RegistrationReport> {
        let table = MappingTable::for_object_name(&self.object_name)?;
        Some(self.create_metrics(&table).await)
    }

    /// Remove every metric this bridge registered and forget them
    ///
    /// A failed removal is logged and reported; it never stops the others.
    pub async fn unregister_metrics(&self) -> UnregisterReport {
        let tracked = std::mem::take(&mut *self.metric_ids.write().await);
        let mut report = UnregisterReport::default();

        for metric in tracked {
            let registry = match self.config.unregister_scope {
                UnregisterScope::RegisteredPartition => self.registries.get(metric.registry),
                UnregisterScope::VendorOnly => self.registries.vendor(),
            };

            let removed = registry.remove(&metric.id).await;
            tracing::debug!(
                "Unregistered {} {}",
                metric.id,
                if removed { "successfully" } else { "unsuccessfully" }
            );

            if removed {
                report.removed.push(metric.id);
            } else {
                report.failed.push(metric.id);
            }
        }

        report
    }

    async fn register_row(&self, row: &MetricDescriptor) -> std::result::Result<TrackedMetric, SkipReason> {
        if self.config.validate_descriptors {
            row.validate()
                .map_err(|e| SkipReason::InvalidDescriptor(e.to_string()))?;
        }

        let object_name = self.object_name.as_str();
        let (adapter, tags) = match &row.kind {
            MetricKind::Counter => (
                MetricAdapter::Counter(MonitorCounter::new(
                    self.server.clone(),
                    object_name,
                    row.attribute_path(),
                )),
                self.instance_tags(row),
            ),
            MetricKind::Gauge => (
                MetricAdapter::Gauge(MonitorGauge::new(
                    self.server.clone(),
                    object_name,
                    row.attribute_path(),
                )),
                self.instance_tags(row),
            ),
            MetricKind::SimpleTimer => {
                let elapsed = row
                    .second_attribute_path()
                    .ok_or(SkipReason::IncompleteTimer)?;
                let rest = self.rest_tags().ok_or(SkipReason::MissingRestTags)?;
                (
                    MetricAdapter::SimpleTimer(MonitorSimpleTimer::new(
                        self.server.clone(),
                        object_name,
                        row.attribute_path(),
                        elapsed,
                    )),
                    vec![Tag::new(CLASS_TAG, rest.class), Tag::new(METHOD_TAG, rest.method)],
                )
            }
            MetricKind::Unknown(kind) => return Err(SkipReason::UnknownKind(kind.clone())),
        };

        let id = MetricId::new(&row.name, tags.clone());
        self.registries
            .get(row.registry)
            .register(row.metadata(), adapter, tags)
            .await
            .map_err(|e| SkipReason::RegistrationFailed(e.to_string()))?;

        Ok(TrackedMetric {
            registry: row.registry,
            id,
        })
    }

    fn instance_tags(&self, row: &MetricDescriptor) -> Vec<Tag> {
        row.tag_name
            .iter()
            .map(|name| Tag::new(name, self.mbean_stats_name()))
            .collect()
    }
}

impl std::fmt::Debug for MetricBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricBridge")
            .field("object_name", &self.object_name)
            .field("registries", &self.registries)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

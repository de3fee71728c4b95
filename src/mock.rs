//! In-memory collaborators for testing and examples
//!
//! `InMemoryMetricRegistry` implements [`MetricRegistry`] by storing every
//! registration so tests can inspect and read it back. `StaticMBeanServer`
//! implements [`MBeanServer`] over a fixed set of attribute values.

use super::*;
use crate::utils::{validate_metric_name, validate_tag};
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

/// Configuration for the in-memory registry
#[derive(Debug, Clone, PartialEq)]
pub struct InMemoryRegistryConfig {
    /// Refuse a registration whose identity is already present
    pub reject_duplicates: bool,

    /// Whether to simulate registration failures
    pub simulate_failures: bool,

    /// Failure probability (0.0 to 1.0) when simulate_failures is true
    pub failure_rate: f64,
}

impl Default for InMemoryRegistryConfig {
    fn default() -> Self {
        Self {
            reject_duplicates: true,
            simulate_failures: false,
            failure_rate: 0.0,
        }
    }
}

impl InMemoryRegistryConfig {
    pub fn with_duplicates_rejected(mut self, reject: bool) -> Self {
        self.reject_duplicates = reject;
        self
    }

    /// Enable failure simulation for error handling tests
    pub fn with_failures(mut self, failure_rate: f64) -> Self {
        self.simulate_failures = failure_rate > 0.0;
        self.failure_rate = failure_rate.clamp(0.0, 1.0);
        self
    }
}

/// A registration held by the in-memory registry
#[derive(Debug, Clone)]
pub struct RegisteredMetric {
    pub metadata: Metadata,
    pub adapter: MetricAdapter,
    pub tags: Vec<Tag>,
}

/// Registry partition that keeps registrations in memory
///
/// ## Example Usage
/// ```rust
/// use std::sync::Arc;
/// use tyl_monitor_metrics::{
///     AttributeValue, DescriptorTable, InMemoryMetricRegistry, MetricBridge, MetricDescriptor,
///     RegistryType, SharedMetricRegistries, StaticMBeanServer,
/// };
///
/// # tokio_test::block_on(async {
/// let name = "WebSphere:type=ThreadPoolStats,name=Default Executor";
/// let server = Arc::new(StaticMBeanServer::new().with_attribute(name, "PoolSize", AttributeValue::from(8u64)));
/// let vendor = Arc::new(InMemoryMetricRegistry::new(RegistryType::Vendor));
/// let registries = SharedMetricRegistries::new(
///     Arc::new(InMemoryMetricRegistry::new(RegistryType::Base)),
///     vendor.clone(),
/// );
///
/// let bridge = MetricBridge::new(name, server, registries);
/// let table = DescriptorTable::from(vec![
///     MetricDescriptor::gauge(RegistryType::Vendor, "threadpool.size", "PoolSize").with_tag_name("pool"),
/// ]);
/// bridge.create_metrics(&table).await;
///
/// assert_eq!(vendor.len().await, 1);
/// # });
/// ```
pub struct InMemoryMetricRegistry {
    registry_type: RegistryType,

    config: InMemoryRegistryConfig,

    metrics: RwLock<BTreeMap<MetricId, RegisteredMetric>>,

    /// Random number generator for failure simulation
    rng: RwLock<fastrand::Rng>,
}

impl InMemoryMetricRegistry {
    pub fn new(registry_type: RegistryType) -> Self {
        Self::with_config(registry_type, InMemoryRegistryConfig::default())
    }

    pub fn with_config(registry_type: RegistryType, config: InMemoryRegistryConfig) -> Self {
        Self {
            registry_type,
            config,
            metrics: RwLock::new(BTreeMap::new()),
            rng: RwLock::new(fastrand::Rng::new()),
        }
    }

    pub fn config(&self) -> &InMemoryRegistryConfig {
        &self.config
    }

    /// Identities currently registered, in sorted order
    pub async fn ids(&self) -> Vec<MetricId> {
        self.metrics.read().await.keys().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.metrics.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.metrics.read().await.is_empty()
    }

    pub async fn contains(&self, metric_id: &MetricId) -> bool {
        self.metrics.read().await.contains_key(metric_id)
    }

    pub async fn get(&self, metric_id: &MetricId) -> Option<RegisteredMetric> {
        self.metrics.read().await.get(metric_id).cloned()
    }

    /// Find registrations by metric name, whatever their tags
    pub async fn find_by_name(&self, name: &str) -> Vec<MetricId> {
        self.metrics
            .read()
            .await
            .keys()
            .filter(|id| id.name() == name)
            .cloned()
            .collect()
    }

    /// Read the current value of a registered metric
    pub async fn read(&self, metric_id: &MetricId) -> Result<MetricReading> {
        let adapter = self
            .metrics
            .read()
            .await
            .get(metric_id)
            .map(|m| m.adapter.clone())
            .ok_or_else(|| monitor_error("metric_id", format!("{metric_id} is not registered")))?;

        adapter.read().await.map_err(|e| e.with_metric_name(metric_id.to_string()))
    }

    /// Clear all registrations
    pub async fn clear(&self) {
        self.metrics.write().await.clear();
    }

    async fn should_fail(&self) -> bool {
        if !self.config.simulate_failures {
            return false;
        }

        let random_value = {
            let mut rng = self.rng.write().await;
            rng.f64()
        };
        random_value < self.config.failure_rate
    }
}

#[async_trait]
impl MetricRegistry for InMemoryMetricRegistry {
    fn registry_type(&self) -> RegistryType {
        self.registry_type
    }

    async fn register(&self, metadata: Metadata, adapter: MetricAdapter, tags: Vec<Tag>) -> Result<()> {
        let metric_id = MetricId::new(metadata.name(), tags.clone());

        if self.should_fail().await {
            return Err(registration_error(
                metric_id.to_string(),
                "Simulated registration failure",
            ));
        }

        validate_metric_name(metadata.name())?;
        for tag in &tags {
            validate_tag(tag)?;
        }

        let mut metrics = self.metrics.write().await;
        if self.config.reject_duplicates && metrics.contains_key(&metric_id) {
            return Err(registration_error(
                metric_id.to_string(),
                format!("already registered in the {} registry", self.registry_type),
            ));
        }

        metrics.insert(
            metric_id,
            RegisteredMetric {
                metadata,
                adapter,
                tags,
            },
        );
        Ok(())
    }

    async fn remove(&self, metric_id: &MetricId) -> bool {
        self.metrics.write().await.remove(metric_id).is_some()
    }
}

/// Management-bean server over a fixed set of attribute values
#[derive(Default)]
pub struct StaticMBeanServer {
    beans: RwLock<HashMap<String, HashMap<String, AttributeValue>>>,
}

impl StaticMBeanServer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an attribute while building the server
    pub fn with_attribute(
        mut self,
        object_name: impl Into<String>,
        attribute: impl Into<String>,
        value: AttributeValue,
    ) -> Self {
        self.beans
            .get_mut()
            .entry(object_name.into())
            .or_default()
            .insert(attribute.into(), value);
        self
    }

    /// Change an attribute of a live server
    pub async fn set_attribute(
        &self,
        object_name: impl Into<String>,
        attribute: impl Into<String>,
        value: AttributeValue,
    ) {
        self.beans
            .write()
            .await
            .entry(object_name.into())
            .or_default()
            .insert(attribute.into(), value);
    }

    /// Drop a bean, as when the monitored component goes away
    pub async fn remove_bean(&self, object_name: &str) -> bool {
        self.beans.write().await.remove(object_name).is_some()
    }
}

#[async_trait]
impl MBeanServer for StaticMBeanServer {
    async fn get_attribute(&self, object_name: &str, attribute: &str) -> Result<AttributeValue> {
        let beans = self.beans.read().await;
        let bean = beans
            .get(object_name)
            .ok_or_else(|| mbean_not_found_error(object_name))?;
        bean.get(attribute)
            .cloned()
            .ok_or_else(|| attribute_not_found_error(object_name, attribute))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    const BEAN: &str = "WebSphere:type=SessionStats,name=default_host/app";

    fn server() -> Arc<StaticMBeanServer> {
        Arc::new(StaticMBeanServer::new().with_attribute(BEAN, "LiveCount", AttributeValue::from(4u64)))
    }

    fn gauge(server: Arc<StaticMBeanServer>) -> MetricAdapter {
        MetricAdapter::Gauge(MonitorGauge::new(server, BEAN, AttributePath::new("LiveCount")))
    }

    #[tokio::test]
    async fn test_register_and_read() {
        let registry = InMemoryMetricRegistry::new(RegistryType::Vendor);
        let tags = vec![Tag::new("appname", "default_host_app")];
        registry
            .register(
                Metadata::new("session.liveSessions", MetricKind::Gauge),
                gauge(server()),
                tags.clone(),
            )
            .await
            .unwrap();

        let id = MetricId::new("session.liveSessions", tags);
        assert!(registry.contains(&id).await);
        assert_eq!(registry.read(&id).await.unwrap(), MetricReading::Gauge(4.0));
        assert_eq!(registry.find_by_name("session.liveSessions").await, vec![id]);
    }

    #[tokio::test]
    async fn test_read_follows_live_value() {
        let server = server();
        let registry = InMemoryMetricRegistry::new(RegistryType::Vendor);
        registry
            .register(
                Metadata::new("session.liveSessions", MetricKind::Gauge),
                gauge(server.clone()),
                Vec::new(),
            )
            .await
            .unwrap();

        let id = MetricId::untagged("session.liveSessions");
        server.set_attribute(BEAN, "LiveCount", AttributeValue::from(9u64)).await;
        assert_eq!(registry.read(&id).await.unwrap(), MetricReading::Gauge(9.0));

        server.remove_bean(BEAN).await;
        let error = registry.read(&id).await.unwrap_err();
        assert!(error.to_string().contains("session.liveSessions"));
    }

    #[tokio::test]
    async fn test_duplicate_registration_rejected() {
        let registry = InMemoryMetricRegistry::new(RegistryType::Vendor);
        let metadata = Metadata::new("session.liveSessions", MetricKind::Gauge);

        registry.register(metadata.clone(), gauge(server()), Vec::new()).await.unwrap();
        let error = registry
            .register(metadata.clone(), gauge(server()), Vec::new())
            .await
            .unwrap_err();
        assert!(error.to_string().contains("already registered"));

        let lenient = InMemoryMetricRegistry::with_config(
            RegistryType::Vendor,
            InMemoryRegistryConfig::default().with_duplicates_rejected(false),
        );
        lenient.register(metadata.clone(), gauge(server()), Vec::new()).await.unwrap();
        lenient.register(metadata, gauge(server()), Vec::new()).await.unwrap();
        assert_eq!(lenient.len().await, 1);
    }

    #[tokio::test]
    async fn test_invalid_names_rejected() {
        let registry = InMemoryMetricRegistry::new(RegistryType::Base);
        let result = registry
            .register(Metadata::new("bad name", MetricKind::Gauge), gauge(server()), Vec::new())
            .await;
        assert!(result.is_err());

        let result = registry
            .register(
                Metadata::new("session.liveSessions", MetricKind::Gauge),
                gauge(server()),
                vec![Tag::new("app name", "x")],
            )
            .await;
        assert!(result.is_err());
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn test_failure_simulation() {
        let registry = InMemoryMetricRegistry::with_config(
            RegistryType::Vendor,
            InMemoryRegistryConfig::default().with_failures(1.0),
        );
        assert!(registry.config().simulate_failures);

        let error = registry
            .register(Metadata::new("session.liveSessions", MetricKind::Gauge), gauge(server()), Vec::new())
            .await
            .unwrap_err();
        assert!(error.to_string().contains("Simulated registration failure"));
    }

    #[tokio::test]
    async fn test_remove() {
        let registry = InMemoryMetricRegistry::new(RegistryType::Vendor);
        registry
            .register(Metadata::new("session.liveSessions", MetricKind::Gauge), gauge(server()), Vec::new())
            .await
            .unwrap();

        let id = MetricId::untagged("session.liveSessions");
        assert!(registry.remove(&id).await);
        assert!(!registry.remove(&id).await);
        assert!(registry.read(&id).await.is_err());
    }

    #[tokio::test]
    async fn test_static_server_errors() {
        let server = server();
        let error = server.get_attribute("WebSphere:name=none", "LiveCount").await.unwrap_err();
        assert!(error.to_string().contains("MBean not found"));

        let error = server.get_attribute(BEAN, "ActiveCount").await.unwrap_err();
        assert!(error.to_string().contains("ActiveCount"));
    }
}

//! Ports for the collaborators the bridge consumes
//!
//! The bridge owns neither the management-bean server nor the metric
//! registries. It talks to them through the traits below, and adapters for
//! concrete runtimes implement them.

use super::*;
use async_trait::async_trait;
use std::sync::Arc;

/// **Management-bean server port**
///
/// Reads live attribute values from a bean addressed by its object name.
///
/// ## Example Implementation
/// ```rust
/// use tyl_monitor_metrics::{async_trait, mbean_not_found_error, AttributeValue, MBeanServer, Result};
///
/// struct SingleBean;
///
/// #[async_trait]
/// impl MBeanServer for SingleBean {
///     async fn get_attribute(&self, object_name: &str, attribute: &str) -> Result<AttributeValue> {
///         match (object_name, attribute) {
///             ("WebSphere:name=pool", "PoolSize") => Ok(AttributeValue::from(8u64)),
///             _ => Err(mbean_not_found_error(object_name)),
///         }
///     }
/// }
/// ```
#[async_trait]
pub trait MBeanServer: Send + Sync {
    /// Read one attribute of a bean
    ///
    /// Fails when the bean or the attribute does not exist.
    async fn get_attribute(&self, object_name: &str, attribute: &str) -> Result<AttributeValue>;

    /// Read one key of a composite attribute
    async fn get_sub_attribute(
        &self,
        object_name: &str,
        attribute: &str,
        sub_attribute: &str,
    ) -> Result<AttributeValue> {
        let value = self.get_attribute(object_name, attribute).await?;
        value
            .get(sub_attribute)
            .cloned()
            .ok_or_else(|| {
                attribute_not_found_error(object_name, format!("{attribute}.{sub_attribute}"))
            })
    }
}

/// **Metric registry port**
///
/// One partition of the metrics store. The registry owns storage and
/// thread-safety; duplicate handling is its decision.
#[async_trait]
pub trait MetricRegistry: Send + Sync {
    /// Partition this registry represents
    fn registry_type(&self) -> RegistryType;

    /// Register an adapter under the given metadata and tags
    async fn register(&self, metadata: Metadata, adapter: MetricAdapter, tags: Vec<Tag>) -> Result<()>;

    /// Remove a metric, returning whether anything was removed
    async fn remove(&self, metric_id: &MetricId) -> bool;
}

/// Handles to the base and vendor partitions
///
/// Injected into the bridge so partitions are never looked up by name from
/// global state.
#[derive(Clone)]
pub struct SharedMetricRegistries {
    base: Arc<dyn MetricRegistry>,
    vendor: Arc<dyn MetricRegistry>,
}

impl SharedMetricRegistries {
    pub fn new(base: Arc<dyn MetricRegistry>, vendor: Arc<dyn MetricRegistry>) -> Self {
        Self { base, vendor }
    }

    /// Handle for a partition
    pub fn get(&self, registry_type: RegistryType) -> &Arc<dyn MetricRegistry> {
        match registry_type {
            RegistryType::Base => &self.base,
            RegistryType::Vendor => &self.vendor,
        }
    }

    pub fn base(&self) -> &Arc<dyn MetricRegistry> {
        &self.base
    }

    pub fn vendor(&self) -> &Arc<dyn MetricRegistry> {
        &self.vendor
    }
}

impl std::fmt::Debug for SharedMetricRegistries {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedMetricRegistries")
            .field("base", &self.base.registry_type())
            .field("vendor", &self.vendor.registry_type())
            .finish()
    }
}

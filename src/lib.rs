//! # TYL Monitor Metrics
//!
//! Bridge from management-bean (MBean) attributes to application metrics in
//! the TYL framework.
//!
//! A [`MetricBridge`] is built for one monitored bean. It derives an instance
//! label from the bean's object name, builds one adapter per descriptor row
//! and registers it in the base or vendor registry partition. Adapters read
//! the live attribute every time the metric is read.
//!
//! - **Ports**: [`MBeanServer`] and [`MetricRegistry`], implemented by the runtime
//! - **Descriptors**: [`DescriptorTable`] from configuration or [`MappingTable`]
//! - **In-memory adapters**: [`InMemoryMetricRegistry`] and [`StaticMBeanServer`] for tests
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use tyl_monitor_metrics::{
//!     AttributeValue, InMemoryMetricRegistry, MetricBridge, RegistryType,
//!     SharedMetricRegistries, StaticMBeanServer,
//! };
//!
//! # tokio_test::block_on(async {
//! let name = "WebSphere:type=SessionStats,name=default_host/app";
//! let server = Arc::new(
//!     StaticMBeanServer::new()
//!         .with_attribute(name, "CreateCount", AttributeValue::from(10u64))
//!         .with_attribute(name, "LiveCount", AttributeValue::from(2u64)),
//! );
//! let registries = SharedMetricRegistries::new(
//!     Arc::new(InMemoryMetricRegistry::new(RegistryType::Base)),
//!     Arc::new(InMemoryMetricRegistry::new(RegistryType::Vendor)),
//! );
//!
//! let bridge = MetricBridge::new(name, server, registries);
//! let report = bridge.create_mapped_metrics().await.unwrap();
//! assert_eq!(report.registered.len(), 5);
//! assert_eq!(bridge.mbean_stats_name(), "default_host_app");
//!
//! bridge.unregister_metrics().await;
//! # });
//! ```

// Re-export TYL framework functionality (CRITICAL pattern)
pub use tyl_config::{ConfigManager, ConfigPlugin};
pub use tyl_errors::{TylError, TylResult};
pub use tyl_logging::Environment;

// Collaborator ports
mod port;
pub use port::{MBeanServer, MetricRegistry, SharedMetricRegistries};

// Domain types
mod types;
pub use types::{AttributeValue, Metadata, MetricId, MetricKind, MetricReading, RegistryType, Tag};

mod errors;
pub use errors::{
    attribute_not_found_error, attribute_read_error, descriptor_error, from_serde_json_error,
    mbean_not_found_error, monitor_config_error, monitor_error, registration_error,
    MonitorErrorExt,
};

mod utils;
pub use utils::{format_tags, sanitize_label_value, validate_metric_name, validate_tag, validate_tag_name};

mod label;
pub use label::{derive_label, rest_tags, ObjectName, RestTags, UNKNOWN_LABEL};

mod monitor;
pub use monitor::{AttributePath, MetricAdapter, MonitorCounter, MonitorGauge, MonitorSimpleTimer};

mod descriptor;
pub use descriptor::{DescriptorTable, MetricDescriptor};

mod mapping;
pub use mapping::{units, MappingTable, StatsBeanType};

mod bridge;
pub use bridge::{
    BridgeConfig, MetricBridge, RegistrationReport, SkipReason, SkippedMetric, UnregisterReport,
    UnregisterScope, CLASS_TAG, METHOD_TAG,
};

// In-memory collaborators for tests and examples
mod mock;
pub use mock::{InMemoryMetricRegistry, InMemoryRegistryConfig, RegisteredMetric, StaticMBeanServer};

/// Result type for bridge operations using TYL error handling
pub type Result<T> = TylResult<T>;

/// Re-export async_trait for collaborator implementations
pub use async_trait::async_trait;

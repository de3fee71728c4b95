//! Adapters that pull live bean attributes at read time
//!
//! Nothing is read when an adapter is built or registered. Every call to
//! `read` goes to the management-bean server, and failures surface to
//! whoever is reading the metric.

use super::*;
use std::sync::Arc;
use std::time::Duration;

/// Attribute of a bean, optionally drilled one level into a composite value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributePath {
    attribute: String,
    sub_attribute: Option<String>,
}

impl AttributePath {
    pub fn new(attribute: impl Into<String>) -> Self {
        Self {
            attribute: attribute.into(),
            sub_attribute: None,
        }
    }

    pub fn nested(attribute: impl Into<String>, sub_attribute: impl Into<String>) -> Self {
        Self {
            attribute: attribute.into(),
            sub_attribute: Some(sub_attribute.into()),
        }
    }

    /// Build from an attribute and an optional sub-attribute column
    pub fn from_parts(attribute: &str, sub_attribute: Option<&str>) -> Self {
        match sub_attribute {
            Some(sub) => Self::nested(attribute, sub),
            None => Self::new(attribute),
        }
    }

    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    pub fn sub_attribute(&self) -> Option<&str> {
        self.sub_attribute.as_deref()
    }

    async fn resolve(&self, server: &dyn MBeanServer, object_name: &str) -> Result<AttributeValue> {
        match &self.sub_attribute {
            Some(sub) => server.get_sub_attribute(object_name, &self.attribute, sub).await,
            None => server.get_attribute(object_name, &self.attribute).await,
        }
    }

    async fn read_f64(&self, server: &dyn MBeanServer, object_name: &str) -> Result<f64> {
        let value = self.resolve(server, object_name).await?;
        value
            .as_f64()
            .filter(|v| v.is_finite())
            .ok_or_else(|| {
                attribute_read_error(object_name, self.to_string(), "value is not a finite number")
            })
    }

    async fn read_u64(&self, server: &dyn MBeanServer, object_name: &str) -> Result<u64> {
        let value = self.read_f64(server, object_name).await?;
        if value < 0.0 {
            return Err(attribute_read_error(
                object_name,
                self.to_string(),
                format!("count cannot be negative ({value})"),
            ));
        }
        Ok(value as u64)
    }
}

impl std::fmt::Display for AttributePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.sub_attribute {
            Some(sub) => write!(f, "{}.{}", self.attribute, sub),
            None => f.write_str(&self.attribute),
        }
    }
}

/// Counter backed by a numeric bean attribute
#[derive(Clone)]
pub struct MonitorCounter {
    server: Arc<dyn MBeanServer>,
    object_name: String,
    path: AttributePath,
}

impl MonitorCounter {
    pub fn new(server: Arc<dyn MBeanServer>, object_name: impl Into<String>, path: AttributePath) -> Self {
        Self {
            server,
            object_name: object_name.into(),
            path,
        }
    }

    /// Current count
    pub async fn count(&self) -> Result<u64> {
        self.path.read_u64(self.server.as_ref(), &self.object_name).await
    }

    pub fn path(&self) -> &AttributePath {
        &self.path
    }
}

/// Gauge backed by a numeric bean attribute
#[derive(Clone)]
pub struct MonitorGauge {
    server: Arc<dyn MBeanServer>,
    object_name: String,
    path: AttributePath,
}

impl MonitorGauge {
    pub fn new(server: Arc<dyn MBeanServer>, object_name: impl Into<String>, path: AttributePath) -> Self {
        Self {
            server,
            object_name: object_name.into(),
            path,
        }
    }

    /// Current value
    pub async fn value(&self) -> Result<f64> {
        self.path.read_f64(self.server.as_ref(), &self.object_name).await
    }

    pub fn path(&self) -> &AttributePath {
        &self.path
    }
}

/// Simple timer composed from a count attribute and an elapsed-time attribute
///
/// The elapsed attribute holds accumulated nanoseconds.
#[derive(Clone)]
pub struct MonitorSimpleTimer {
    server: Arc<dyn MBeanServer>,
    object_name: String,
    count_path: AttributePath,
    elapsed_path: AttributePath,
}

impl MonitorSimpleTimer {
    pub fn new(
        server: Arc<dyn MBeanServer>,
        object_name: impl Into<String>,
        count_path: AttributePath,
        elapsed_path: AttributePath,
    ) -> Self {
        Self {
            server,
            object_name: object_name.into(),
            count_path,
            elapsed_path,
        }
    }

    /// Number of timed events
    pub async fn count(&self) -> Result<u64> {
        self.count_path
            .read_u64(self.server.as_ref(), &self.object_name)
            .await
    }

    /// Total elapsed time across all timed events
    pub async fn elapsed_time(&self) -> Result<Duration> {
        let nanos = self
            .elapsed_path
            .read_u64(self.server.as_ref(), &self.object_name)
            .await?;
        Ok(Duration::from_nanos(nanos))
    }

    pub fn count_path(&self) -> &AttributePath {
        &self.count_path
    }

    pub fn elapsed_path(&self) -> &AttributePath {
        &self.elapsed_path
    }
}

/// Any adapter the bridge registers
#[derive(Clone)]
pub enum MetricAdapter {
    Counter(MonitorCounter),
    Gauge(MonitorGauge),
    SimpleTimer(MonitorSimpleTimer),
}

impl MetricAdapter {
    pub fn kind(&self) -> MetricKind {
        match self {
            MetricAdapter::Counter(_) => MetricKind::Counter,
            MetricAdapter::Gauge(_) => MetricKind::Gauge,
            MetricAdapter::SimpleTimer(_) => MetricKind::SimpleTimer,
        }
    }

    /// Object name of the bean this adapter reads
    pub fn object_name(&self) -> &str {
        match self {
            MetricAdapter::Counter(c) => &c.object_name,
            MetricAdapter::Gauge(g) => &g.object_name,
            MetricAdapter::SimpleTimer(t) => &t.object_name,
        }
    }

    /// Pull the current value from the bean
    pub async fn read(&self) -> Result<MetricReading> {
        match self {
            MetricAdapter::Counter(counter) => counter.count().await.map(MetricReading::Count),
            MetricAdapter::Gauge(gauge) => gauge.value().await.map(MetricReading::Gauge),
            MetricAdapter::SimpleTimer(timer) => {
                let count = timer.count().await?;
                let elapsed = timer.elapsed_time().await?;
                Ok(MetricReading::SimpleTimer { count, elapsed })
            }
        }
    }
}

impl std::fmt::Debug for MetricAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetricAdapter::Counter(c) => f
                .debug_struct("MonitorCounter")
                .field("object_name", &c.object_name)
                .field("path", &c.path)
                .finish(),
            MetricAdapter::Gauge(g) => f
                .debug_struct("MonitorGauge")
                .field("object_name", &g.object_name)
                .field("path", &g.path)
                .finish(),
            MetricAdapter::SimpleTimer(t) => f
                .debug_struct("MonitorSimpleTimer")
                .field("object_name", &t.object_name)
                .field("count_path", &t.count_path)
                .field("elapsed_path", &t.elapsed_path)
                .finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::StaticMBeanServer;

    const POOL: &str = "WebSphere:type=ConnectionPoolStats,name=jdbc/exampleDS";

    fn server() -> Arc<dyn MBeanServer> {
        Arc::new(
            StaticMBeanServer::new()
                .with_attribute(POOL, "CreateCount", AttributeValue::from(42u64))
                .with_attribute(POOL, "FreeConnectionCount", AttributeValue::from(3.0))
                .with_attribute(POOL, "Broken", AttributeValue::from(-1i64))
                .with_attribute(POOL, "Name", AttributeValue::from("exampleDS"))
                .with_attribute(
                    POOL,
                    "WaitTimeDetails",
                    AttributeValue::composite(vec![
                        ("count", AttributeValue::from(5u64)),
                        ("total", AttributeValue::from(2_500_000u64)),
                    ]),
                ),
        )
    }

    #[tokio::test]
    async fn test_counter_reads_attribute() {
        let counter = MonitorCounter::new(server(), POOL, AttributePath::new("CreateCount"));
        assert_eq!(counter.count().await.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_counter_reads_sub_attribute() {
        let counter = MonitorCounter::new(
            server(),
            POOL,
            AttributePath::nested("WaitTimeDetails", "count"),
        );
        assert_eq!(counter.count().await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_counter_rejects_negative_and_text() {
        let negative = MonitorCounter::new(server(), POOL, AttributePath::new("Broken"));
        assert!(negative.count().await.is_err());

        let text = MonitorCounter::new(server(), POOL, AttributePath::new("Name"));
        let error = text.count().await.unwrap_err();
        assert!(error.to_string().contains("Name"));
    }

    #[tokio::test]
    async fn test_gauge_reads_value() {
        let gauge = MonitorGauge::new(server(), POOL, AttributePath::new("FreeConnectionCount"));
        assert_eq!(gauge.value().await.unwrap(), 3.0);
    }

    #[tokio::test]
    async fn test_read_failure_surfaces_at_read_time() {
        // building the adapter succeeds even though the attribute is missing
        let gauge = MonitorGauge::new(server(), POOL, AttributePath::new("Missing"));
        assert!(gauge.value().await.is_err());

        let gauge = MonitorGauge::new(
            server(),
            "WebSphere:name=other",
            AttributePath::new("FreeConnectionCount"),
        );
        assert!(gauge.value().await.is_err());
    }

    #[tokio::test]
    async fn test_simple_timer_reads_both_attributes() {
        let timer = MonitorSimpleTimer::new(
            server(),
            POOL,
            AttributePath::nested("WaitTimeDetails", "count"),
            AttributePath::nested("WaitTimeDetails", "total"),
        );

        let reading = MetricAdapter::SimpleTimer(timer).read().await.unwrap();
        assert_eq!(
            reading,
            MetricReading::SimpleTimer {
                count: 5,
                elapsed: Duration::from_millis(2500),
            }
        );
    }

    #[tokio::test]
    async fn test_adapter_kind_and_debug() {
        let adapter = MetricAdapter::Counter(MonitorCounter::new(
            server(),
            POOL,
            AttributePath::from_parts("WaitTimeDetails", Some("count")),
        ));
        assert_eq!(adapter.kind(), MetricKind::Counter);
        assert_eq!(adapter.object_name(), POOL);
        assert!(format!("{adapter:?}").contains("WaitTimeDetails"));
        assert_eq!(adapter.read().await.unwrap(), MetricReading::Count(5));
    }

    #[test]
    fn test_attribute_path_display() {
        assert_eq!(AttributePath::new("PoolSize").to_string(), "PoolSize");
        assert_eq!(
            AttributePath::nested("InUseTimeDetails", "total").to_string(),
            "InUseTimeDetails.total"
        );
        assert_eq!(AttributePath::from_parts("PoolSize", None).sub_attribute(), None);
    }
}

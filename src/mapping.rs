//! Built-in descriptor tables for the standard runtime stats beans
//!
//! Each stats bean type (`type=` key of its object name) maps to a fixed
//! table. Tables for other beans come from configuration.

use super::*;

/// Units used by the built-in tables
pub mod units {
    pub const NONE: &str = "none";
    pub const NANOSECONDS: &str = "nanoseconds";
    pub const MILLISECONDS: &str = "milliseconds";
}

/// Stats bean types with a built-in table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatsBeanType {
    ThreadPool,
    Servlet,
    Session,
    ConnectionPool,
    Rest,
}

impl StatsBeanType {
    /// Match the `type=` key of an object name
    pub fn from_type_key(value: &str) -> Option<Self> {
        match value {
            "ThreadPoolStats" => Some(StatsBeanType::ThreadPool),
            "ServletStats" => Some(StatsBeanType::Servlet),
            "SessionStats" => Some(StatsBeanType::Session),
            "ConnectionPoolStats" => Some(StatsBeanType::ConnectionPool),
            "REST_Stats" => Some(StatsBeanType::Rest),
            _ => None,
        }
    }
}

/// Lookup of the built-in descriptor tables
pub struct MappingTable;

impl MappingTable {
    /// Table for a bean, chosen by the object name's `type=` key
    ///
    /// # Examples
    /// ```rust
    /// use tyl_monitor_metrics::{MappingTable, ObjectName};
    ///
    /// let name = ObjectName::new("WebSphere:type=ThreadPoolStats,name=Default Executor");
    /// let table = MappingTable::for_object_name(&name).unwrap();
    /// assert!(table.rows().iter().any(|row| row.name == "threadpool.activeThreads"));
    /// ```
    pub fn for_object_name(object_name: &ObjectName) -> Option<DescriptorTable> {
        object_name
            .key_property("type")
            .and_then(StatsBeanType::from_type_key)
            .map(Self::table)
    }

    pub fn table(bean_type: StatsBeanType) -> DescriptorTable {
        match bean_type {
            StatsBeanType::ThreadPool => Self::thread_pool(),
            StatsBeanType::Servlet => Self::servlet(),
            StatsBeanType::Session => Self::session(),
            StatsBeanType::ConnectionPool => Self::connection_pool(),
            StatsBeanType::Rest => Self::rest(),
        }
    }

    fn thread_pool() -> DescriptorTable {
        use crate::RegistryType::Vendor;
        vec![
            MetricDescriptor::gauge(Vendor, "threadpool.activeThreads", "ActiveThreads")
                .with_display_name("Active Threads")
                .with_description("The number of threads that are actively running tasks.")
                .with_tag_name("pool"),
            MetricDescriptor::gauge(Vendor, "threadpool.size", "PoolSize")
                .with_display_name("Thread Pool Size")
                .with_description("The size of the thread pool.")
                .with_tag_name("pool"),
        ]
        .into()
    }

    fn servlet() -> DescriptorTable {
        use crate::RegistryType::Vendor;
        vec![
            MetricDescriptor::counter(Vendor, "servlet.request.total", "RequestCount")
                .with_display_name("Total Request")
                .with_description("The number of visits to this servlet since the start of the server.")
                .with_tag_name("servlet"),
            MetricDescriptor::gauge(Vendor, "servlet.responseTime.total", "ResponseTimeDetails")
                .with_sub_attribute("total")
                .with_display_name("Total Response Time")
                .with_description("The total response time of this servlet since the start of the server.")
                .with_unit(units::NANOSECONDS)
                .with_tag_name("servlet"),
        ]
        .into()
    }

    fn session() -> DescriptorTable {
        use crate::RegistryType::Vendor;
        vec![
            MetricDescriptor::counter(Vendor, "session.create.total", "CreateCount")
                .with_display_name("Total Create Count")
                .with_description("The number of sessions logged in since this metric was enabled.")
                .with_tag_name("appname"),
            MetricDescriptor::gauge(Vendor, "session.liveSessions", "LiveCount")
                .with_display_name("Current Live Sessions")
                .with_description("The number of users that are currently logged in.")
                .with_tag_name("appname"),
            MetricDescriptor::gauge(Vendor, "session.activeSessions", "ActiveCount")
                .with_display_name("Current Active Sessions")
                .with_description("The number of concurrently active sessions.")
                .with_tag_name("appname"),
            MetricDescriptor::counter(Vendor, "session.invalidated.total", "InvalidatedCount")
                .with_display_name("Total Invalidated Sessions")
                .with_description("The number of sessions that have logged out since this metric was enabled.")
                .with_tag_name("appname"),
            MetricDescriptor::counter(Vendor, "session.invalidatedbyTimeout.total", "InvalidatedCountbyTimeout")
                .with_display_name("Total Invalidated Sessions by Timeout")
                .with_description("The number of sessions that have logged out by timeout since this metric was enabled.")
                .with_tag_name("appname"),
        ]
        .into()
    }

    fn connection_pool() -> DescriptorTable {
        use crate::RegistryType::Vendor;
        vec![
            MetricDescriptor::counter(Vendor, "connectionpool.create.total", "CreateCount")
                .with_display_name("Create Count")
                .with_description("The number of connections created since the pool was created.")
                .with_tag_name("datasource"),
            MetricDescriptor::counter(Vendor, "connectionpool.destroy.total", "DestroyCount")
                .with_display_name("Destroy Count")
                .with_description("The number of connections destroyed since the pool was created.")
                .with_tag_name("datasource"),
            MetricDescriptor::gauge(Vendor, "connectionpool.managedConnections", "ManagedConnectionCount")
                .with_display_name("Managed Connections Count")
                .with_description("The current number of managed connections in the pool.")
                .with_tag_name("datasource"),
            MetricDescriptor::gauge(Vendor, "connectionpool.connectionHandles", "ConnectionHandleCount")
                .with_display_name("Connection Handles Count")
                .with_description("The number of connection handles in use.")
                .with_tag_name("datasource"),
            MetricDescriptor::gauge(Vendor, "connectionpool.freeConnections", "FreeConnectionCount")
                .with_display_name("Free Connections Count")
                .with_description("The number of managed connections in the free pool.")
                .with_tag_name("datasource"),
            MetricDescriptor::gauge(Vendor, "connectionpool.waitTime.total", "WaitTimeDetails")
                .with_sub_attribute("total")
                .with_display_name("Total Wait Time")
                .with_description("The total wait time on all connection requests since the pool was created.")
                .with_unit(units::MILLISECONDS)
                .with_tag_name("datasource"),
            MetricDescriptor::gauge(Vendor, "connectionpool.inUseTime.total", "InUseTimeDetails")
                .with_sub_attribute("total")
                .with_display_name("Total In Use Time")
                .with_description("The total time all connections were in use since the pool was created.")
                .with_unit(units::MILLISECONDS)
                .with_tag_name("datasource"),
            MetricDescriptor::counter(Vendor, "connectionpool.queuedRequests.total", "WaitTimeDetails")
                .with_sub_attribute("count")
                .with_display_name("Queued Connection Request Count")
                .with_description("The number of connection requests that waited because the pool was full.")
                .with_tag_name("datasource"),
            MetricDescriptor::counter(Vendor, "connectionpool.usedConnections.total", "InUseTimeDetails")
                .with_sub_attribute("count")
                .with_display_name("Used Connections")
                .with_description("The number of connections used since the pool was created.")
                .with_tag_name("datasource"),
        ]
        .into()
    }

    fn rest() -> DescriptorTable {
        vec![MetricDescriptor::simple_timer(
            RegistryType::Base,
            "REST.request",
            ("ResponseTimeDetails", Some("count")),
            ("ResponseTimeDetails", Some("total")),
        )
        .with_display_name("Total Requests and Response Time")
        .with_description("The number of invocations and total response time of this RESTful resource method since the start of the server.")
        .with_unit(units::NANOSECONDS)]
        .into()
    }
}

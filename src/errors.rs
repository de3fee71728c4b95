//! Error handling integration for the monitor metrics bridge
//!
//! Helper functions that build domain-specific errors on top of the TYL
//! framework error system. Following the TYL pattern, these are semantic
//! constructors rather than a custom error type.

use super::*;

/// Create a validation error for a descriptor field or metric name
///
/// # Example
/// ```rust
/// use tyl_monitor_metrics::monitor_error;
///
/// let error = monitor_error("metric_name", "Names cannot contain spaces");
/// ```
pub fn monitor_error(field: impl Into<String>, message: impl Into<String>) -> TylError {
    TylError::validation(field.into(), message.into())
}

/// Create a bridge configuration error
///
/// # Example
/// ```rust
/// use tyl_monitor_metrics::monitor_config_error;
///
/// let error = monitor_config_error("unregister_scope", "Unknown scope");
/// ```
pub fn monitor_config_error(config_key: impl Into<String>, message: impl Into<String>) -> TylError {
    TylError::configuration(format!(
        "Monitor config error for {}: {}",
        config_key.into(),
        message.into()
    ))
}

/// Create an error for a malformed descriptor table row
pub fn descriptor_error(metric_name: impl Into<String>, message: impl Into<String>) -> TylError {
    TylError::configuration(format!(
        "Descriptor error for {}: {}",
        metric_name.into(),
        message.into()
    ))
}

/// Create an error for a bean that the management server does not know
///
/// # Example
/// ```rust
/// use tyl_monitor_metrics::mbean_not_found_error;
///
/// let error = mbean_not_found_error("WebSphere:type=ThreadPoolStats,name=Default Executor");
/// assert!(error.to_string().contains("ThreadPoolStats"));
/// ```
pub fn mbean_not_found_error(object_name: impl Into<String>) -> TylError {
    TylError::internal(format!("MBean not found: {}", object_name.into()))
}

/// Create an error for an attribute missing from an existing bean
pub fn attribute_not_found_error(
    object_name: impl Into<String>,
    attribute: impl Into<String>,
) -> TylError {
    TylError::internal(format!(
        "Attribute {} not found on MBean {}",
        attribute.into(),
        object_name.into()
    ))
}

/// Create an error for an attribute whose value cannot be read as a metric
///
/// Raised by adapters at read time, never at registration time.
///
/// # Example
/// ```rust
/// use tyl_monitor_metrics::attribute_read_error;
///
/// let error = attribute_read_error("WebSphere:name=app", "RequestCount", "not a number");
/// assert!(error.to_string().contains("RequestCount"));
/// ```
pub fn attribute_read_error(
    object_name: impl Into<String>,
    attribute: impl Into<String>,
    message: impl Into<String>,
) -> TylError {
    TylError::internal(format!(
        "Attribute read error for {} on {}: {}",
        attribute.into(),
        object_name.into(),
        message.into()
    ))
}

/// Create an error for a registry that refused a registration
pub fn registration_error(metric_id: impl Into<String>, message: impl Into<String>) -> TylError {
    TylError::internal(format!(
        "Metric registration error for {}: {}",
        metric_id.into(),
        message.into()
    ))
}

/// Helper trait for adding monitor context to existing errors
pub trait MonitorErrorExt {
    /// Add the object name of the bean being read
    fn with_object_name(self, object_name: impl Into<String>) -> TylError;

    /// Add the metric name being registered or read
    fn with_metric_name(self, metric_name: impl Into<String>) -> TylError;
}

impl MonitorErrorExt for TylError {
    fn with_object_name(self, object_name: impl Into<String>) -> TylError {
        TylError::internal(format!("MBean [{}]: {}", object_name.into(), self))
    }

    fn with_metric_name(self, metric_name: impl Into<String>) -> TylError {
        TylError::internal(format!("Metric [{}]: {}", metric_name.into(), self))
    }
}

/// Convert a descriptor table parse failure
///
/// Note: a helper function rather than a From impl to avoid orphan rule issues
pub fn from_serde_json_error(error: serde_json::Error) -> TylError {
    TylError::configuration(format!(
        "Descriptor table parse error (json): {}",
        error
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monitor_error() {
        let error = monitor_error("metric_name", "Invalid characters");
        assert!(error.to_string().contains("Invalid characters"));
    }

    #[test]
    fn test_monitor_config_error() {
        let error = monitor_config_error("unregister_scope", "Unknown scope");
        assert!(error.to_string().contains("Unknown scope"));
    }

    #[test]
    fn test_descriptor_error() {
        let error = descriptor_error("REST.request", "missing elapsed attribute");
        assert!(error.to_string().contains("REST.request"));
        assert!(error.to_string().contains("missing elapsed attribute"));
    }

    #[test]
    fn test_not_found_errors() {
        let error = mbean_not_found_error("WebSphere:type=SessionStats");
        assert!(error.to_string().contains("WebSphere:type=SessionStats"));

        let error = attribute_not_found_error("WebSphere:type=SessionStats", "LiveCount");
        assert!(error.to_string().contains("LiveCount"));
    }

    #[test]
    fn test_registration_error() {
        let error = registration_error("threadpool.size{}", "already registered");
        assert!(error.to_string().contains("already registered"));
    }

    #[test]
    fn test_error_extension_trait() {
        let base_error = attribute_not_found_error("WebSphere:name=app", "ActiveCount");
        let extended = base_error
            .with_object_name("WebSphere:name=app")
            .with_metric_name("session.activeSessions");

        let error_string = extended.to_string();
        assert!(error_string.contains("session.activeSessions"));
        assert!(error_string.contains("ActiveCount"));
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let json_error = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let tyl_error = from_serde_json_error(json_error);
        assert!(tyl_error.to_string().contains("json"));
    }
}

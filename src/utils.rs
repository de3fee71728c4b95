//! Validation and formatting utilities
//!
//! Metric and tag name checks used by descriptor validation and by the
//! in-memory registry, plus the label sanitizer shared with label derivation.

use super::*;
use lazy_static::lazy_static;
use regex::Regex;

const MAX_METRIC_NAME_LENGTH: usize = 255;
const MAX_TAG_NAME_LENGTH: usize = 128;
const MAX_TAG_VALUE_LENGTH: usize = 1024;

lazy_static! {
    static ref METRIC_NAME_REGEX: Regex = Regex::new(r"^[a-zA-Z_][a-zA-Z0-9_.:]*$").unwrap();
    static ref TAG_NAME_REGEX: Regex = Regex::new(r"^[a-zA-Z_][a-zA-Z0-9_]*$").unwrap();
    static ref UNSAFE_LABEL_CHARS: Regex = Regex::new(r"[^a-zA-Z0-9._]").unwrap();
}

/// Validate a metric name
///
/// Names are dotted, e.g. `threadpool.activeThreads` or `REST.request`:
/// - Must not be empty
/// - Must start with a letter or underscore
/// - Can contain letters, numbers, underscores, dots and colons
///
/// # Examples
/// ```rust
/// use tyl_monitor_metrics::validate_metric_name;
///
/// assert!(validate_metric_name("servlet.request.total").is_ok());
/// assert!(validate_metric_name("").is_err());
/// ```
pub fn validate_metric_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(monitor_error("metric_name", "Metric name cannot be empty"));
    }

    if name.len() > MAX_METRIC_NAME_LENGTH {
        return Err(monitor_error(
            "metric_name",
            format!("Metric name too long (max {MAX_METRIC_NAME_LENGTH} chars)"),
        ));
    }

    if !METRIC_NAME_REGEX.is_match(name) {
        return Err(monitor_error(
            "metric_name",
            "Invalid metric name format (must match [a-zA-Z_][a-zA-Z0-9_.:]*)",
        ));
    }

    Ok(())
}

/// Validate a tag name
pub fn validate_tag_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(monitor_error("tag_name", "Tag name cannot be empty"));
    }

    if name.len() > MAX_TAG_NAME_LENGTH {
        return Err(monitor_error(
            "tag_name",
            format!("Tag name too long (max {MAX_TAG_NAME_LENGTH} chars)"),
        ));
    }

    if !TAG_NAME_REGEX.is_match(name) {
        return Err(monitor_error(
            "tag_name",
            "Invalid tag name format (must match [a-zA-Z_][a-zA-Z0-9_]*)",
        ));
    }

    Ok(())
}

/// Validate a complete tag: name format plus value length
pub fn validate_tag(tag: &Tag) -> Result<()> {
    validate_tag_name(&tag.name)?;

    if tag.value.len() > MAX_TAG_VALUE_LENGTH {
        return Err(monitor_error(
            "tag_value",
            format!("Tag value too long (max {MAX_TAG_VALUE_LENGTH} chars)"),
        ));
    }

    Ok(())
}

/// Format tags as `name=value` pairs joined by commas
///
/// # Examples
/// ```rust
/// use tyl_monitor_metrics::{format_tags, Tag};
///
/// let tags = vec![Tag::new("class", "com.foo.Bar"), Tag::new("method", "get")];
/// assert_eq!(format_tags(&tags), "class=com.foo.Bar,method=get");
/// ```
pub fn format_tags(tags: &[Tag]) -> String {
    tags.iter()
        .map(Tag::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

/// Make a bean name safe to use as a tag value
///
/// Spaces and `/` become `_`, then every character outside
/// `[a-zA-Z0-9._]` becomes `_`.
///
/// # Examples
/// ```rust
/// use tyl_monitor_metrics::sanitize_label_value;
///
/// assert_eq!(sanitize_label_value("Default Executor"), "Default_Executor");
/// assert_eq!(sanitize_label_value("app/servlet#1"), "app_servlet_1");
/// ```
pub fn sanitize_label_value(value: &str) -> String {
    let replaced = value.replace(' ', "_").replace('/', "_");
    UNSAFE_LABEL_CHARS.replace_all(&replaced, "_").into_owned()
}

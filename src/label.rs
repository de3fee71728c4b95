//! Object name parsing: instance label derivation and REST tag extraction
//!
//! An object name is a comma separated list of `key=value` properties such as
//! `WebSphere:type=ServletStats,name=myApp.SimpleServlet`. Parsing never
//! fails: a malformed name degrades to a partial label or to `unknown`.

use crate::utils::sanitize_label_value;
use serde::{Deserialize, Serialize};

/// Label used when no recognizable property is present
pub const UNKNOWN_LABEL: &str = "unknown";

const SERVICE_KEY: &str = "service=";
const PORT_KEY: &str = "port=";
const NAME_KEY: &str = "name=";

/// Object name addressing one management-bean instance
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectName(String);

impl ObjectName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Comma separated segments, trimmed
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split(',').map(str::trim)
    }

    /// Value of a key property such as `type`
    ///
    /// The domain prefix (`WebSphere:`) is ignored and surrounding quotes
    /// are removed.
    pub fn key_property(&self, key: &str) -> Option<&str> {
        self.segments().find_map(|segment| {
            let property = match segment.split_once(':') {
                Some((domain, p)) if !domain.contains('=') => p,
                _ => segment,
            };
            let (k, v) = property.split_once('=')?;
            (k.trim() == key).then(|| v.trim().trim_matches('"'))
        })
    }
}

impl From<&str> for ObjectName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for ObjectName {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl std::fmt::Display for ObjectName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Class and method tags extracted from a REST resource bean name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestTags {
    /// Leading path parts before the class, usually the application
    pub context: Option<String>,
    pub class: String,
    pub method: String,
}

/// Derive the instance label for an object name
///
/// Web service beans (`service=` plus `port=`) get
/// `<service-url>.<service-name>.<port>`; otherwise the sanitized `name=`
/// value is used; otherwise `unknown`.
///
/// # Examples
/// ```rust
/// use tyl_monitor_metrics::{derive_label, ObjectName};
///
/// let name = ObjectName::new("WebSphere:type=ThreadPoolStats,name=Default Executor");
/// assert_eq!(derive_label(&name), "Default_Executor");
/// ```
pub fn derive_label(object_name: &ObjectName) -> String {
    let mut service_url = None;
    let mut service_name = None;
    let mut port_name = None;
    let mut bean_name = None;

    for segment in object_name.segments() {
        if segment.contains(SERVICE_KEY) {
            service_url = service_url_of(segment);
            service_name = service_name_of(segment);
            continue;
        }
        if segment.contains(PORT_KEY) {
            port_name = property_value(segment).map(strip_quotes).filter(|p| !p.is_empty());
            continue;
        }
        if segment.contains(NAME_KEY) {
            bean_name = property_value(segment)
                .map(|name| sanitize_label_value(strip_quotes(name).trim()))
                .filter(|name| !name.is_empty());
            break;
        }
    }

    match (service_url, service_name, port_name, bean_name) {
        (Some(url), Some(service), Some(port), _) => format!("{url}.{service}.{port}"),
        (_, _, _, Some(name)) => name,
        _ => UNKNOWN_LABEL.to_string(),
    }
}

/// Extract `class` and `method` tags from a REST resource bean name
///
/// The first segment containing `name=` is split on `/`; the last part is
/// the method signature and the part before it the class. In the method,
/// `()` is removed and any remaining `(` becomes `_`. Returns `None` when no
/// such segment exists or it has fewer than two non-empty parts.
///
/// # Examples
/// ```rust
/// use tyl_monitor_metrics::{rest_tags, ObjectName};
///
/// let name = ObjectName::new("WebSphere:type=REST_Stats,name=restApp/com.foo.Bar/myMethod()");
/// let tags = rest_tags(&name).unwrap();
/// assert_eq!(tags.class, "com.foo.Bar");
/// assert_eq!(tags.method, "myMethod");
/// ```
pub fn rest_tags(object_name: &ObjectName) -> Option<RestTags> {
    let segment = object_name.segments().find(|s| s.contains(NAME_KEY))?;
    let (_, value) = segment.split_once('=')?;

    let parts: Vec<&str> = value.split('/').collect();
    let (method, rest) = parts.split_last()?;
    let (class, context) = rest.split_last()?;

    // the second pass only matters when "()" did not already remove the bracket
    let method = method.replace("()", "").replace('(', "_");
    if class.is_empty() || method.is_empty() {
        return None;
    }

    Some(RestTags {
        context: (!context.is_empty()).then(|| context.join("/")),
        class: class.to_string(),
        method,
    })
}

fn property_value(segment: &str) -> Option<&str> {
    segment.split('=').nth(1).filter(|v| !v.is_empty())
}

fn strip_quotes(value: &str) -> &str {
    value.trim_matches('"')
}

fn service_value(segment: &str) -> Option<String> {
    property_value(segment).map(|v| v.replace('"', ""))
}

fn service_url_of(segment: &str) -> Option<String> {
    let value = service_value(segment)?;
    let open = value.find('{')?;
    let close = value.find('}')?;
    if close <= open {
        return None;
    }

    let url = value[open + 1..close]
        .replace("http://", "")
        .replace("https://", "")
        .replace('/', ".");
    (!url.is_empty()).then_some(url)
}

fn service_name_of(segment: &str) -> Option<String> {
    let value = service_value(segment)?;
    let name = value.rfind('}').map_or(value.as_str(), |i| &value[i + 1..]);
    (!name.is_empty()).then(|| name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const JAXWS_BEAN: &str = "WebSphere:feature=jaxws,service=\"{http://ibm.com/was/wssample/sei/echo/}EchoService12\",port=\"EchoService12Port\",type=WebServiceStats,name=echoApp";

    #[test]
    fn test_web_service_label() {
        let name = ObjectName::new(JAXWS_BEAN);
        assert_eq!(
            derive_label(&name),
            "ibm.com.was.wssample.sei.echo..EchoService12.EchoService12Port"
        );
    }

    #[test]
    fn test_web_service_label_https() {
        let name = ObjectName::new(
            "WebSphere:service=\"{https://example.org/ws}Echo\",port=\"EchoPort\"",
        );
        assert_eq!(derive_label(&name), "example.org.ws.Echo.EchoPort");
    }

    #[test]
    fn test_derivation_is_deterministic() {
        let name = ObjectName::new(JAXWS_BEAN);
        assert_eq!(derive_label(&name), derive_label(&name));
    }

    #[test]
    fn test_name_label() {
        let name = ObjectName::new("WebSphere:type=SessionStats,name=\"My Bean/1\"");
        assert_eq!(derive_label(&name), "My_Bean_1");

        let name = ObjectName::new("WebSphere:type=ServletStats,name=myApp.com.foo.MyServlet");
        assert_eq!(derive_label(&name), "myApp.com.foo.MyServlet");
    }

    #[test]
    fn test_service_without_port_falls_back_to_name() {
        let name = ObjectName::new(
            "WebSphere:service=\"{http://example.org}Echo\",name=echoBean",
        );
        assert_eq!(derive_label(&name), "echoBean");
    }

    #[test]
    fn test_malformed_service_degrades() {
        // no braces: the url is missing, so the composite label cannot be built
        let name = ObjectName::new("WebSphere:service=Echo,port=EchoPort");
        assert_eq!(derive_label(&name), UNKNOWN_LABEL);
    }

    #[test]
    fn test_unknown_label() {
        assert_eq!(derive_label(&ObjectName::new("WebSphere:type=JvmStats")), "unknown");
        assert_eq!(derive_label(&ObjectName::new("")), "unknown");
        assert_eq!(derive_label(&ObjectName::new("WebSphere:name=")), "unknown");
    }

    #[test]
    fn test_name_segment_stops_scan() {
        let name = ObjectName::new("WebSphere:name=first,service=\"{http://a}b\",port=c");
        assert_eq!(derive_label(&name), "first");
    }

    #[test]
    fn test_rest_tags_with_context() {
        let name = ObjectName::new(
            "WebSphere:type=REST_Stats,name=restApp/com.foo.Bar/myMethod()",
        );
        let tags = rest_tags(&name).unwrap();
        assert_eq!(tags.context.as_deref(), Some("restApp"));
        assert_eq!(tags.class, "com.foo.Bar");
        assert_eq!(tags.method, "myMethod");
    }

    #[test]
    fn test_rest_tags_without_context() {
        let name = ObjectName::new("WebSphere:type=REST_Stats,name=com.foo.Bar/myMethod()");
        let tags = rest_tags(&name).unwrap();
        assert_eq!(tags.context, None);
        assert_eq!(tags.class, "com.foo.Bar");
        assert_eq!(tags.method, "myMethod");
    }

    #[test]
    fn test_rest_tags_method_with_parameters() {
        let name = ObjectName::new(
            "WebSphere:type=REST_Stats,name=app/com.foo.Bar/get(java.lang.String)",
        );
        let tags = rest_tags(&name).unwrap();
        assert_eq!(tags.method, "get_java.lang.String)");
    }

    #[test]
    fn test_rest_tags_missing() {
        assert_eq!(rest_tags(&ObjectName::new("WebSphere:type=REST_Stats")), None);
        assert_eq!(rest_tags(&ObjectName::new("WebSphere:name=noSlash")), None);
        assert_eq!(rest_tags(&ObjectName::new("WebSphere:name=com.foo.Bar/")), None);
    }

    #[test]
    fn test_key_property() {
        let name = ObjectName::new("WebSphere:type=ThreadPoolStats,name=\"Default Executor\"");
        assert_eq!(name.key_property("type"), Some("ThreadPoolStats"));
        assert_eq!(name.key_property("name"), Some("Default Executor"));
        assert_eq!(name.key_property("port"), None);
    }
}

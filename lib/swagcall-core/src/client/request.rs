use http::Method;
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Value};

/// Validated parameter values keyed by parameter name, in declaration order.
pub type RequestData = IndexMap<String, Value>;

/// A fully-formed HTTP request, ready for a transport.
///
/// Built fresh on every call, never shared between calls.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestDescriptor {
    /// The HTTP method.
    #[serde(with = "method_serde")]
    pub method: Method,
    /// The absolute URL, with query string and embedded credentials if any.
    pub url: String,
    /// Request headers, in insertion order.
    pub headers: IndexMap<String, String>,
    /// The validated parameter values.
    pub data: RequestData,
}

impl RequestDescriptor {
    /// Creates a request without headers nor data.
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: IndexMap::new(),
            data: RequestData::new(),
        }
    }

    /// Returns a header value.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }
}

mod method_serde {
    use http::Method;
    use serde::Serializer;

    pub(super) fn serialize<S: Serializer>(method: &Method, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(method.as_str())
    }
}

/// Per-call media type overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOptions {
    /// Explicit `Accept` media type, must be declared in `produces`.
    pub accept: Option<String>,
    /// Explicit `Content-Type` media type, must be declared in `consumes`.
    pub content_type: Option<String>,
}

impl RequestOptions {
    /// Creates options without any override.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the `Accept` override.
    #[must_use]
    pub fn with_accept(mut self, accept: impl Into<String>) -> Self {
        self.accept = Some(accept.into());
        self
    }

    /// Sets the `Content-Type` override.
    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

/// Caller arguments of an operation call.
///
/// Either a key-value mapping of parameter values, or a single bare value
/// that stands for the only parameter of a one-parameter operation.
///
/// # Example
///
/// ```rust
/// use serde_json::json;
/// use swagcall_core::Arguments;
///
/// assert!(matches!(Arguments::from(json!({ "id": 1 })), Arguments::Named(_)));
/// assert!(matches!(Arguments::from(json!(1)), Arguments::Single(_)));
/// assert!(matches!(Arguments::from(()), Arguments::Named(_)));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Arguments {
    /// Values keyed by parameter name.
    Named(Map<String, Value>),
    /// A bare value.
    Single(Value),
}

impl Default for Arguments {
    fn default() -> Self {
        Self::Named(Map::new())
    }
}

impl From<Value> for Arguments {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => Self::Named(map),
            Value::Null => Self::default(),
            other => Self::Single(other),
        }
    }
}

impl From<Map<String, Value>> for Arguments {
    fn from(value: Map<String, Value>) -> Self {
        Self::Named(value)
    }
}

impl From<()> for Arguments {
    fn from((): ()) -> Self {
        Self::default()
    }
}

impl From<&str> for Arguments {
    fn from(value: &str) -> Self {
        Self::Single(Value::from(value))
    }
}

impl From<String> for Arguments {
    fn from(value: String) -> Self {
        Self::Single(Value::from(value))
    }
}

impl From<i64> for Arguments {
    fn from(value: i64) -> Self {
        Self::Single(Value::from(value))
    }
}

impl From<f64> for Arguments {
    fn from(value: f64) -> Self {
        Self::Single(Value::from(value))
    }
}

impl From<bool> for Arguments {
    fn from(value: bool) -> Self {
        Self::Single(Value::from(value))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn should_serialize_request() {
        let mut request = RequestDescriptor::new(Method::PUT, "http://example.com/api/do/it");
        request
            .headers
            .insert("Accept".to_string(), "application/json".to_string());
        request.data.insert("theBody".to_string(), json!({ "id": 1 }));

        insta::assert_snapshot!(serde_json::to_string(&request).expect("serializable"), @r#"{"method":"PUT","url":"http://example.com/api/do/it","headers":{"Accept":"application/json"},"data":{"theBody":{"id":1}}}"#);
    }

    #[test]
    fn should_convert_bare_values() {
        assert_eq!(Arguments::from(0_i64), Arguments::Single(json!(0)));
        assert_eq!(Arguments::from("that"), Arguments::Single(json!("that")));
        assert_eq!(Arguments::from(json!(["a", "b"])), Arguments::Single(json!(["a", "b"])));
        assert_eq!(Arguments::from(Value::Null), Arguments::default());
    }
}

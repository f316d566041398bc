use std::sync::LazyLock;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use regex::{Captures, Regex};
use serde_json::Value;
use tracing::debug;
use url::form_urlencoded;

use super::error::MissingParameterError;
use super::operation::OperationDescriptor;
use super::parameters::{ParameterLocation, value_to_string};
use super::request::RequestData;

/// Regular expression for matching path parameters in the format `{param_name}`.
static RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{(?<name>\w+)}").expect("a valid regex"));

/// Legacy placeholder for the response format extension.
const FORMAT: &str = "format";
const DEFAULT_FORMAT: &str = "json";

/// Characters escaped in a path segment, unreserved marks are kept.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Builds the absolute URL of a request from validated data.
///
/// Every `{name}` of the template is replaced by the percent-encoded value of
/// the `path` parameter with that name. An undeclared `{format}` becomes
/// `json`. Then `query` parameters with a value are appended in declaration
/// order, arrays as repeated `name=value` pairs.
///
/// # Errors
///
/// Returns a [`MissingParameterError`] listing the placeholders without value.
pub fn build_url(
    operation: &OperationDescriptor,
    data: &RequestData,
) -> Result<String, MissingParameterError> {
    let template = operation.url_template();
    let mut missings = Vec::new();

    let url = RE.replace_all(&template, |caps: &Captures| {
        let name = &caps["name"];
        match (operation.parameter(name), data.get(name)) {
            (Some(param), Some(value)) if param.location == ParameterLocation::Path => {
                utf8_percent_encode(&value_to_string(value), PATH_SEGMENT).to_string()
            }
            (None, _) if name == FORMAT => DEFAULT_FORMAT.to_string(),
            _ => {
                if !missings.iter().any(|missing| missing == name) {
                    missings.push(name.to_string());
                }
                String::new()
            }
        }
    });

    if !missings.is_empty() {
        return Err(MissingParameterError {
            path: operation.path().to_string(),
            missings,
        });
    }

    let query = build_query(operation, data);
    let url = if query.is_empty() {
        url.into_owned()
    } else if url.contains('?') {
        format!("{url}&{query}")
    } else {
        format!("{url}?{query}")
    };

    debug!(operation = %operation.label(), %url, "url built");
    Ok(url)
}

fn build_query(operation: &OperationDescriptor, data: &RequestData) -> String {
    let mut query = form_urlencoded::Serializer::new(String::new());
    for param in operation.parameters_in(ParameterLocation::Query) {
        match data.get(&param.name) {
            Some(Value::Array(items)) => {
                for item in items {
                    query.append_pair(&param.name, &value_to_string(item));
                }
            }
            Some(value) => {
                query.append_pair(&param.name, &value_to_string(value));
            }
            None => {}
        }
    }
    query.finish()
}

/// `true` when the template has a placeholder no declared path parameter fills.
pub(in crate::client) fn has_unbound_placeholders(operation: &OperationDescriptor) -> bool {
    RE.captures_iter(operation.path())
        .filter_map(|caps| caps.name("name"))
        .map(|name| name.as_str())
        .any(|name| match operation.parameter(name) {
            Some(param) => param.location != ParameterLocation::Path,
            None => name != FORMAT,
        })
}

use indexmap::IndexMap;
use mime::Mime;
use tracing::debug;

use super::param::{ParameterLocation, value_to_string};
use crate::client::error::{MediaTypeError, MediaTypeHeader};
use crate::client::operation::OperationDescriptor;
use crate::client::request::{RequestData, RequestOptions};

/// Name of the `Accept` header.
pub const ACCEPT: &str = "Accept";
/// Name of the `Content-Type` header.
pub const CONTENT_TYPE: &str = "Content-Type";

/// Builds the headers of a request from validated data.
///
/// `Accept` defaults to `application/json`. `Content-Type` is only set when
/// the request carries a body, form fields, or a file. Header parameters with
/// a value are copied as is.
///
/// # Errors
///
/// Returns a [`MediaTypeError`] when an explicit media type is not declared
/// by the operation.
pub fn build_headers(
    operation: &OperationDescriptor,
    data: &RequestData,
    options: &RequestOptions,
) -> Result<IndexMap<String, String>, MediaTypeError> {
    let mut headers = IndexMap::new();

    let accept = match options.accept.as_deref() {
        Some(accept) => {
            check_declared(MediaTypeHeader::Accept, accept, operation.produces())?;
            accept.to_string()
        }
        None => mime::APPLICATION_JSON.to_string(),
    };
    headers.insert(ACCEPT.to_string(), accept);

    if let Some(content_type) = options.content_type.as_deref() {
        check_declared(MediaTypeHeader::ContentType, content_type, operation.consumes())?;
    }
    if let Some(content_type) = content_type(operation, data, options) {
        headers.insert(CONTENT_TYPE.to_string(), content_type);
    }

    for param in operation.parameters_in(ParameterLocation::Header) {
        if let Some(value) = data.get(&param.name) {
            headers.insert(param.name.clone(), value_to_string(value));
        }
    }

    debug!(operation = %operation.label(), ?headers, "headers built");
    Ok(headers)
}

fn content_type(
    operation: &OperationDescriptor,
    data: &RequestData,
    options: &RequestOptions,
) -> Option<String> {
    let mut has_body = false;
    let mut has_form = false;
    let mut has_file = false;
    for param in operation
        .parameters()
        .iter()
        .filter(|param| param.is_body_bearing() && data.contains_key(&param.name))
    {
        if param.location == ParameterLocation::FormData {
            has_form = true;
            has_file |= param.data_type.is_file();
        } else {
            has_body = true;
        }
    }

    if !(has_body || has_form) {
        return None;
    }

    let content_type = if let Some(explicit) = &options.content_type {
        explicit.clone()
    } else if has_file {
        mime::MULTIPART_FORM_DATA.to_string()
    } else if has_form {
        mime::APPLICATION_WWW_FORM_URLENCODED.to_string()
    } else {
        mime::APPLICATION_JSON.to_string()
    };
    Some(content_type)
}

/// An empty declaration accepts any media type.
fn check_declared(
    header: MediaTypeHeader,
    requested: &str,
    supported: &[String],
) -> Result<(), MediaTypeError> {
    if supported.is_empty()
        || supported
            .iter()
            .any(|media_type| same_media_type(media_type, requested))
    {
        return Ok(());
    }

    Err(MediaTypeError {
        header,
        requested: requested.to_string(),
        supported: supported.to_vec(),
    })
}

fn same_media_type(declared: &str, requested: &str) -> bool {
    match (declared.parse::<Mime>(), requested.parse::<Mime>()) {
        (Ok(declared), Ok(requested)) => declared
            .essence_str()
            .eq_ignore_ascii_case(requested.essence_str()),
        _ => declared == requested,
    }
}

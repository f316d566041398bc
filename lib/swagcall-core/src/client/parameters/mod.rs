//! Declared parameters and what the request builder does with their values.
//!
//! - [`ParameterDescriptor`] - a declared parameter with its [`ParameterLocation`] and [`DataType`]
//! - [`prepare_arguments`] and [`validate`] - turn caller arguments into validated request data
//! - [`build_headers`] - negotiates `Accept` and `Content-Type` and writes header parameters

mod param;
pub use self::param::{DataType, ParameterDescriptor, ParameterLocation};
pub(in crate::client) use self::param::value_to_string;

mod validate;
pub use self::validate::{prepare_arguments, validate};

mod headers;
pub use self::headers::{ACCEPT, CONTENT_TYPE, build_headers};

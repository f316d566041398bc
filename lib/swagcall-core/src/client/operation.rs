use std::collections::HashSet;
use std::fmt::Write as _;

use http::Method;
use serde::Deserialize;
use serde_json::Value;

use super::error::DescriptorError;
use super::parameters::{ParameterDescriptor, ParameterLocation};
use super::security::SecurityRequirementSet;

/// A normalized API operation: one method and path with its parameters,
/// media types and security.
///
/// The `basePath` is the absolute prefix of every URL of the API
/// (`scheme://host` followed by the document base path).
///
/// # Example
///
/// ```rust
/// use serde_json::json;
/// use swagcall_core::OperationDescriptor;
///
/// let operation = OperationDescriptor::from_value(json!({
///     "method": "GET",
///     "basePath": "http://example.com/api",
///     "path": "/pets/{id}",
///     "parameters": [{ "in": "path", "name": "id", "type": "integer" }]
/// }))?;
/// assert_eq!(operation.label(), "GET /pets/{id}");
/// # Ok::<(), swagcall_core::DescriptorError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawOperation")]
pub struct OperationDescriptor {
    method: Method,
    base_path: String,
    path: String,
    operation_id: Option<String>,
    parameters: Vec<ParameterDescriptor>,
    consumes: Vec<String>,
    produces: Vec<String>,
    security: Vec<SecurityRequirementSet>,
    models: Vec<String>,
}

impl OperationDescriptor {
    /// Starts building an operation.
    pub fn builder(
        method: Method,
        base_path: impl Into<String>,
        path: impl Into<String>,
    ) -> OperationDescriptorBuilder {
        OperationDescriptorBuilder {
            operation: Self {
                method,
                base_path: base_path.into(),
                path: path.into(),
                operation_id: None,
                parameters: Vec::new(),
                consumes: Vec::new(),
                produces: Vec::new(),
                security: Vec::new(),
                models: Vec::new(),
            },
        }
    }

    /// Reads an operation from its JSON description.
    ///
    /// # Errors
    ///
    /// Returns [`DescriptorError::Json`] with the path of the offending value.
    pub fn from_json(json: &str) -> Result<Self, DescriptorError> {
        let deserializer = &mut serde_json::Deserializer::from_str(json);
        let operation = serde_path_to_error::deserialize(deserializer)?;
        Ok(operation)
    }

    /// Reads an operation from an already parsed JSON value.
    ///
    /// # Errors
    ///
    /// Returns [`DescriptorError::Json`] with the path of the offending value.
    pub fn from_value(value: Value) -> Result<Self, DescriptorError> {
        let operation = serde_path_to_error::deserialize(value)?;
        Ok(operation)
    }

    /// The HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The absolute URL prefix.
    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// The path template, with `{name}` placeholders.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The `operationId`, if declared.
    pub fn operation_id(&self) -> Option<&str> {
        self.operation_id.as_deref()
    }

    /// The declared parameters, in declaration order.
    pub fn parameters(&self) -> &[ParameterDescriptor] {
        &self.parameters
    }

    /// Returns a declared parameter.
    pub fn parameter(&self, name: &str) -> Option<&ParameterDescriptor> {
        self.parameters.iter().find(|param| param.name == name)
    }

    /// Declared parameters at a location, in declaration order.
    pub fn parameters_in(
        &self,
        location: ParameterLocation,
    ) -> impl Iterator<Item = &ParameterDescriptor> {
        self.parameters
            .iter()
            .filter(move |param| param.location == location)
    }

    /// Media types the operation accepts as request body.
    pub fn consumes(&self) -> &[String] {
        &self.consumes
    }

    /// Media types the operation may answer with.
    pub fn produces(&self) -> &[String] {
        &self.produces
    }

    /// Security requirement sets, in evaluation order.
    pub fn security(&self) -> &[SecurityRequirementSet] {
        &self.security
    }

    /// Names of the response models.
    pub fn models(&self) -> &[String] {
        &self.models
    }

    /// `METHOD /path/template`, used to identify the operation in messages.
    pub fn label(&self) -> String {
        format!("{} {}", self.method, self.path)
    }

    /// The URL template: base path followed by the path template.
    ///
    /// A query or fragment of the base path stays after the path.
    pub fn url_template(&self) -> String {
        let (base, suffix) = self
            .base_path
            .find(['?', '#'])
            .map_or((self.base_path.as_str(), ""), |at| self.base_path.split_at(at));
        let base = base.trim_end_matches('/');
        if self.path.is_empty() || self.path.starts_with('/') {
            format!("{base}{}{suffix}", self.path)
        } else {
            format!("{base}/{}{suffix}", self.path)
        }
    }

    /// A canonical description of what a request to this operation looks like.
    pub(in crate::client) fn signature(&self) -> String {
        let mut signature = format!("{} {}", self.method, self.url_template());
        for param in &self.parameters {
            let _ = write!(
                signature,
                "|{}:{}:{}:{}",
                param.location, param.name, param.data_type, param.required
            );
        }
        signature
    }

    fn check(self) -> Result<Self, DescriptorError> {
        url::Url::parse(&self.base_path).map_err(|error| DescriptorError::InvalidBasePath {
            base_path: self.base_path.clone(),
            error,
        })?;

        let mut names = HashSet::with_capacity(self.parameters.len());
        if let Some(duplicate) = self
            .parameters
            .iter()
            .find(|param| !names.insert(param.name.as_str()))
        {
            return Err(DescriptorError::DuplicateParameter {
                name: duplicate.name.clone(),
            });
        }

        Ok(self)
    }
}

/// Builder for [`OperationDescriptor`].
#[derive(Debug, Clone)]
pub struct OperationDescriptorBuilder {
    operation: OperationDescriptor,
}

impl OperationDescriptorBuilder {
    /// Sets the `operationId`.
    #[must_use]
    pub fn operation_id(mut self, operation_id: impl Into<String>) -> Self {
        self.operation.operation_id = Some(operation_id.into());
        self
    }

    /// Adds a parameter.
    #[must_use]
    pub fn parameter(mut self, parameter: ParameterDescriptor) -> Self {
        self.operation.parameters.push(parameter);
        self
    }

    /// Adds a media type to `consumes`.
    #[must_use]
    pub fn consumes(mut self, media_type: impl Into<String>) -> Self {
        self.operation.consumes.push(media_type.into());
        self
    }

    /// Adds a media type to `produces`.
    #[must_use]
    pub fn produces(mut self, media_type: impl Into<String>) -> Self {
        self.operation.produces.push(media_type.into());
        self
    }

    /// Appends a security requirement set.
    #[must_use]
    pub fn security(mut self, requirement: SecurityRequirementSet) -> Self {
        self.operation.security.push(requirement);
        self
    }

    /// Adds a response model.
    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.operation.models.push(model.into());
        self
    }

    /// Builds the operation.
    ///
    /// # Errors
    ///
    /// Fails when the base path is not an absolute URL or when two parameters
    /// share the same name.
    pub fn build(self) -> Result<OperationDescriptor, DescriptorError> {
        self.operation.check()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawOperation {
    method: String,
    base_path: String,
    path: String,
    #[serde(default)]
    operation_id: Option<String>,
    #[serde(default)]
    parameters: Vec<ParameterDescriptor>,
    #[serde(default)]
    consumes: Vec<String>,
    #[serde(default)]
    produces: Vec<String>,
    #[serde(default)]
    security: Vec<SecurityRequirementSet>,
    #[serde(default)]
    models: Vec<String>,
}

impl TryFrom<RawOperation> for OperationDescriptor {
    type Error = DescriptorError;

    fn try_from(value: RawOperation) -> Result<Self, Self::Error> {
        let RawOperation {
            method,
            base_path,
            path,
            operation_id,
            parameters,
            consumes,
            produces,
            security,
            models,
        } = value;

        let method = Method::from_bytes(method.to_ascii_uppercase().as_bytes())
            .map_err(|_| DescriptorError::InvalidMethod { method })?;

        Self {
            method,
            base_path,
            path,
            operation_id,
            parameters,
            consumes,
            produces,
            security,
            models,
        }
        .check()
    }
}

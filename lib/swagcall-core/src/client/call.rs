use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};
use uuid::Uuid;

use super::auth::{AuthSlot, AuthSource};
use super::error::{ErrorKind, RequestError, ValidationErrors};
use super::operation::OperationDescriptor;
use super::parameters::{build_headers, prepare_arguments, validate};
use super::path::{build_url, has_unbound_placeholders};
use super::request::{Arguments, RequestData, RequestDescriptor, RequestOptions};
use super::schema::ApiSchema;
use super::security::apply_security;

/// Receives every built request, or the error that prevented building it.
///
/// The output is handed back to the caller untouched, it can be a response,
/// a future, or anything else.
///
/// Any `Fn(Option<RequestError>, RequestDescriptor) -> O` closure is a transport.
pub trait Transport {
    /// What a call returns.
    type Output;

    /// Sends a request. With an error, the request is the part built so far.
    fn send(&self, error: Option<RequestError>, request: RequestDescriptor) -> Self::Output;
}

impl<F, O> Transport for F
where
    F: Fn(Option<RequestError>, RequestDescriptor) -> O,
{
    type Output = O;

    fn send(&self, error: Option<RequestError>, request: RequestDescriptor) -> Self::Output {
        self(error, request)
    }
}

/// Identifies the shape of the requests of an operation.
///
/// Two operations with the same method, URL template and parameters share it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
#[display("{_0}")]
pub struct RequestShape(Uuid);

impl RequestShape {
    fn of(operation: &OperationDescriptor) -> Self {
        Self(Uuid::new_v5(
            &Uuid::NAMESPACE_URL,
            operation.signature().as_bytes(),
        ))
    }

    /// The underlying identifier.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

/// A callable operation: turns arguments into a request for its transport.
///
/// # Example
///
/// ```rust
/// use http::Method;
/// use swagcall_core::{
///     ApiSchema, AuthData, DataType, OperationDescriptor, OperationHandler, ParameterDescriptor,
///     ParameterLocation, RequestDescriptor, RequestError, RequestOptions,
/// };
///
/// let operation = OperationDescriptor::builder(Method::GET, "http://example.com/api", "/pets/{id}")
///     .parameter(ParameterDescriptor::new("id", ParameterLocation::Path, DataType::Integer))
///     .build()?;
/// let handler = OperationHandler::new(
///     operation,
///     ApiSchema::new(),
///     || None::<AuthData>,
///     |error: Option<RequestError>, request: RequestDescriptor| error.map_or(request.url, |error| error.to_string()),
/// );
///
/// assert_eq!(handler.call(12_i64, &RequestOptions::new()), "http://example.com/api/pets/12");
/// # Ok::<(), swagcall_core::DescriptorError>(())
/// ```
pub struct OperationHandler<T> {
    operation: Arc<OperationDescriptor>,
    schema: Arc<ApiSchema>,
    auth: Arc<dyn AuthSource + Send + Sync>,
    operation_auth: Option<AuthSlot>,
    transport: T,
    shape: RequestShape,
    error_kinds: Vec<ErrorKind>,
}

struct BuildFailure {
    error: RequestError,
    partial: RequestDescriptor,
}

impl BuildFailure {
    fn new(error: impl Into<RequestError>, partial: RequestDescriptor) -> Self {
        Self {
            error: error.into(),
            partial,
        }
    }
}

impl<T> OperationHandler<T>
where
    T: Transport,
{
    /// Creates a handler.
    ///
    /// The auth source is read on each call.
    pub fn new(
        operation: impl Into<Arc<OperationDescriptor>>,
        schema: impl Into<Arc<ApiSchema>>,
        auth: impl AuthSource + Send + Sync + 'static,
        transport: T,
    ) -> Self {
        let operation = operation.into();
        let shape = RequestShape::of(&operation);
        let error_kinds = error_kinds(&operation);
        Self {
            operation,
            schema: schema.into(),
            auth: Arc::new(auth),
            operation_auth: None,
            transport,
            shape,
            error_kinds,
        }
    }

    pub(in crate::client) fn with_operation_auth(mut self, slot: AuthSlot) -> Self {
        self.operation_auth = Some(slot);
        self
    }

    /// Builds a request from the arguments and hands it to the transport.
    ///
    /// When the request cannot be built, the transport gets the error along
    /// with the part of the request built so far. The transport output is
    /// returned unchanged.
    pub fn call(&self, arguments: impl Into<Arguments>, options: &RequestOptions) -> T::Output {
        match self.build_request(arguments.into(), options) {
            Ok(request) => {
                debug!(operation = %self.operation.label(), "request built");
                self.transport.send(None, request)
            }
            Err(BuildFailure { error, partial }) => {
                warn!(operation = %self.operation.label(), kind = %error.kind(), %error, "request not built");
                self.transport.send(Some(error), partial)
            }
        }
    }

    fn build_request(
        &self,
        arguments: Arguments,
        options: &RequestOptions,
    ) -> Result<RequestDescriptor, BuildFailure> {
        let operation = &*self.operation;
        let data = prepare_arguments(operation, arguments);

        let mut request = RequestDescriptor::new(operation.method().clone(), String::new());
        match validate(operation, &self.schema, &data) {
            Ok(valid) => request.data = valid,
            Err(errors) => {
                request.data = data;
                return Err(BuildFailure::new(errors, request));
            }
        }

        match build_url(operation, &request.data) {
            Ok(url) => request.url = url,
            Err(error) => return Err(BuildFailure::new(error, request)),
        }
        match build_headers(operation, &request.data, options) {
            Ok(headers) => request.headers = headers,
            Err(error) => return Err(BuildFailure::new(error, request)),
        }

        let auth = self.auth.auth_data();
        if let Err(error) = apply_security(
            operation.security(),
            &self.schema.security_definitions,
            auth.as_ref(),
            &mut request,
        ) {
            return Err(BuildFailure::new(error, request));
        }

        Ok(request)
    }
}

impl<T> OperationHandler<T> {
    /// The operation this handler calls.
    pub fn operation(&self) -> &OperationDescriptor {
        &self.operation
    }

    /// The kinds of error a call can deliver to the transport.
    pub fn error_kinds(&self) -> &[ErrorKind] {
        &self.error_kinds
    }

    /// The request shape identifier of the operation.
    pub fn request_shape(&self) -> RequestShape {
        self.shape
    }

    /// The operation-level auth slot, when the handler comes from an [`ApiClient`](super::ApiClient).
    pub fn operation_auth(&self) -> Option<&AuthSlot> {
        self.operation_auth.as_ref()
    }

    /// Validates arguments without building a request.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationErrors`] for missing or invalid parameters.
    pub fn validate(&self, arguments: impl Into<Arguments>) -> Result<RequestData, ValidationErrors> {
        let data = prepare_arguments(&self.operation, arguments.into());
        validate(&self.operation, &self.schema, &data)
    }

    /// Builds the URL a call with these arguments would use, without credentials.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::Validation`] for invalid arguments and
    /// [`RequestError::MissingParameter`] for unresolved path segments.
    pub fn url(&self, arguments: impl Into<Arguments>) -> Result<String, RequestError> {
        let data = self.validate(arguments)?;
        let url = build_url(&self.operation, &data)?;
        Ok(url)
    }
}

impl<T> fmt::Debug for OperationHandler<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperationHandler")
            .field("operation", &self.operation.label())
            .field("shape", &self.shape)
            .field("error_kinds", &self.error_kinds)
            .finish_non_exhaustive()
    }
}

fn error_kinds(operation: &OperationDescriptor) -> Vec<ErrorKind> {
    let mut kinds = Vec::new();
    if !operation.parameters().is_empty() {
        kinds.push(ErrorKind::Validation);
    }
    if !operation.security().is_empty() {
        kinds.push(ErrorKind::MissingAuthorization);
    }
    if !operation.produces().is_empty() || !operation.consumes().is_empty() {
        kinds.push(ErrorKind::MediaType);
    }
    if has_unbound_placeholders(operation) {
        kinds.push(ErrorKind::MissingParameter);
    }
    kinds
}

use std::sync::{Arc, PoisonError, RwLock};

use indexmap::IndexMap;
use tracing::debug;

mod builder;
pub use self::builder::ApiClientBuilder;

mod auth;
pub use self::auth::{AuthData, AuthScopeChain, AuthSlot, AuthSource, SecureString};

mod call;
pub use self::call::{OperationHandler, RequestShape, Transport};

mod error;
pub use self::error::{
    AttemptedScheme, DescriptorError, ErrorKind, MediaTypeError, MediaTypeHeader,
    MissingAuthorizationError, MissingParameterError, ParameterError, ParameterProblem,
    RequestError, RequirementFailure, SchemeFailure, ValidationErrors,
};

mod operation;
pub use self::operation::{OperationDescriptor, OperationDescriptorBuilder};

mod parameters;
pub use self::parameters::{
    ACCEPT, CONTENT_TYPE, DataType, ParameterDescriptor, ParameterLocation, build_headers,
    prepare_arguments, validate,
};

mod path;
pub use self::path::build_url;

mod request;
pub use self::request::{Arguments, RequestData, RequestDescriptor, RequestOptions};

mod schema;
pub use self::schema::{ApiSchema, ModelDefinition};

mod security;
pub use self::security::{
    ApiKeyLocation, RequestPatch, SecurityDefinition, SecurityDefinitions, SecurityRequirementSet,
    apply_security, try_apply_requirement,
};

/// Entry point: owns the API schema and the shared auth configuration, and
/// creates one [`OperationHandler`] per operation.
///
/// Credentials resolve from the most specific level: the operation slot of a
/// handler, then the slot of its model, then the api slot of the client.
///
/// Cloning the client shares its schema and every auth slot.
///
/// # Example
///
/// ```rust
/// use http::Method;
/// use swagcall_core::{
///     ApiClient, ApiKeyLocation, OperationDescriptor, RequestDescriptor, RequestError,
///     RequestOptions, SecurityDefinition, SecurityRequirementSet,
/// };
///
/// let client = ApiClient::builder()
///     .with_security_definition("apiKey", SecurityDefinition::api_key("token", ApiKeyLocation::Query))
///     .with_auth("123")
///     .build();
/// let operation = OperationDescriptor::builder(Method::GET, "http://example.com/api", "/pets")
///     .security(SecurityRequirementSet::from_iter(["apiKey"]))
///     .build()?;
/// let list_pets = client.operation_handler("pet", operation, |error: Option<RequestError>, request: RequestDescriptor| {
///     assert!(error.is_none());
///     request.url
/// });
///
/// assert_eq!(list_pets.call((), &RequestOptions::new()), "http://example.com/api/pets?token=123");
///
/// client.model_auth("pet").set("456");
/// assert_eq!(list_pets.call((), &RequestOptions::new()), "http://example.com/api/pets?token=456");
/// # Ok::<(), swagcall_core::DescriptorError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ApiClient {
    schema: Arc<ApiSchema>,
    auth: AuthSlot,
    model_auth: Arc<RwLock<IndexMap<String, AuthSlot>>>,
}

impl ApiClient {
    /// Creates a new `ApiClientBuilder`.
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }

    fn new(schema: ApiSchema, auth: AuthSlot) -> Self {
        Self {
            schema: Arc::new(schema),
            auth,
            model_auth: Arc::default(),
        }
    }

    /// The schema shared by every handler of the client.
    pub fn schema(&self) -> &ApiSchema {
        &self.schema
    }

    /// The api-level auth slot.
    pub fn auth(&self) -> &AuthSlot {
        &self.auth
    }

    /// The auth slot of a model, created empty on first use.
    pub fn model_auth(&self, model: &str) -> AuthSlot {
        if let Some(slot) = self
            .model_auth
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(model)
        {
            return slot.clone();
        }

        self.model_auth
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(model.to_string())
            .or_default()
            .clone()
    }

    /// A fresh chain for an operation of a model, sharing the api and model slots.
    pub fn auth_chain(&self, model: &str) -> AuthScopeChain {
        AuthScopeChain {
            api: self.auth.clone(),
            model: self.model_auth(model),
            operation: AuthSlot::new(),
        }
    }

    /// Creates the handler of an operation of a model.
    ///
    /// The handler owns a new operation-level slot, see
    /// [`OperationHandler::operation_auth`].
    pub fn operation_handler<T>(
        &self,
        model: &str,
        operation: impl Into<Arc<OperationDescriptor>>,
        transport: T,
    ) -> OperationHandler<T>
    where
        T: Transport,
    {
        let chain = self.auth_chain(model);
        let operation_auth = chain.operation.clone();
        let handler = OperationHandler::new(operation, Arc::clone(&self.schema), chain, transport)
            .with_operation_auth(operation_auth);
        debug!(model, operation = %handler.operation().label(), "operation handler created");
        handler
    }
}

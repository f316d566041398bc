use super::ApiClient;
use super::auth::{AuthData, AuthSlot};
use super::schema::{ApiSchema, ModelDefinition};
use super::security::SecurityDefinition;

/// Builder for creating `ApiClient` instances.
///
/// # Default Configuration
///
/// - **Schema**: empty, no model nor security definition
/// - **Auth**: none at the api level
///
/// # Example
///
/// ```rust
/// use swagcall_core::{ApiClient, ApiKeyLocation, ApiSchema, SecurityDefinition};
///
/// let schema = ApiSchema::from_json(r#"{ "definitions": {} }"#)?;
/// let client = ApiClient::builder()
///     .with_schema(schema)
///     .with_security_definition(
///         "apiKey",
///         SecurityDefinition::api_key("token", ApiKeyLocation::Query),
///     )
///     .with_auth("123")
///     .build();
///
/// assert!(client.auth().get().is_some());
/// # Ok::<(), swagcall_core::DescriptorError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct ApiClientBuilder {
    schema: ApiSchema,
    auth: Option<AuthData>,
}

impl ApiClientBuilder {
    /// Builds the client.
    pub fn build(self) -> ApiClient {
        let Self { schema, auth } = self;

        let slot = AuthSlot::new();
        if let Some(auth) = auth {
            slot.set(auth);
        }

        ApiClient::new(schema, slot)
    }

    /// Replaces the schema, keeping nothing from previous calls.
    #[must_use]
    pub fn with_schema(mut self, schema: ApiSchema) -> Self {
        self.schema = schema;
        self
    }

    /// Adds a model definition.
    #[must_use]
    pub fn with_definition(mut self, name: impl Into<String>, model: ModelDefinition) -> Self {
        self.schema.definitions.insert(name.into(), model);
        self
    }

    /// Adds a security definition.
    #[must_use]
    pub fn with_security_definition(
        mut self,
        name: impl Into<String>,
        definition: SecurityDefinition,
    ) -> Self {
        self.schema
            .security_definitions
            .insert(name.into(), definition);
        self
    }

    /// Sets the api-level credentials.
    ///
    /// A `(username, password)` tuple gives basic credentials, a string gives
    /// a token, and [`AuthData::schemes`] gives one credential per scheme.
    #[must_use]
    pub fn with_auth(mut self, auth: impl Into<AuthData>) -> Self {
        self.auth = Some(auth.into());
        self
    }
}

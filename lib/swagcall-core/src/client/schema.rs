use indexmap::IndexMap;
use serde::Deserialize;

use super::error::DescriptorError;
use super::parameters::DataType;
use super::security::{SecurityDefinition, SecurityDefinitions};

/// A model of the schema `definitions`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ModelDefinition {
    /// Property types, keyed by property name.
    #[serde(default)]
    pub properties: IndexMap<String, DataType>,
    /// Names of the properties that must be present.
    #[serde(default)]
    pub required: Vec<String>,
}

impl ModelDefinition {
    /// Creates a model without properties.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an optional property.
    #[must_use]
    pub fn with_property(mut self, name: impl Into<String>, data_type: DataType) -> Self {
        self.properties.insert(name.into(), data_type);
        self
    }

    /// Adds a required property.
    #[must_use]
    pub fn with_required_property(mut self, name: impl Into<String>, data_type: DataType) -> Self {
        let name = name.into();
        self.required.push(name.clone());
        self.properties.insert(name, data_type);
        self
    }
}

/// The API-wide parts of a Swagger document an operation handler needs.
///
/// Model definitions validate model-typed parameters, security definitions
/// tell how each security scheme is applied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSchema {
    /// Models keyed by name.
    #[serde(default)]
    pub definitions: IndexMap<String, ModelDefinition>,
    /// Security schemes keyed by name.
    #[serde(default)]
    pub security_definitions: SecurityDefinitions,
}

impl ApiSchema {
    /// Creates an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads the `definitions` and `securityDefinitions` of a Swagger JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`DescriptorError::Json`] with the path of the offending value.
    pub fn from_json(json: &str) -> Result<Self, DescriptorError> {
        let deserializer = &mut serde_json::Deserializer::from_str(json);
        let schema = serde_path_to_error::deserialize(deserializer)?;
        Ok(schema)
    }

    /// Adds a model definition.
    #[must_use]
    pub fn with_definition(mut self, name: impl Into<String>, model: ModelDefinition) -> Self {
        self.definitions.insert(name.into(), model);
        self
    }

    /// Adds a security definition.
    #[must_use]
    pub fn with_security_definition(
        mut self,
        name: impl Into<String>,
        definition: SecurityDefinition,
    ) -> Self {
        self.security_definitions.insert(name.into(), definition);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::security::ApiKeyLocation;

    #[test]
    fn should_read_swagger_document() {
        let schema = ApiSchema::from_json(
            r##"{
                "swagger": "2.0",
                "host": "example.com",
                "paths": {},
                "securityDefinitions": {
                    "apiKey": { "type": "apiKey", "in": "query", "name": "token" }
                },
                "definitions": {
                    "Model": {
                        "required": ["id"],
                        "properties": {
                            "id": { "type": "string" },
                            "tags": { "type": "array", "items": { "type": "string" } },
                            "owner": { "$ref": "#/definitions/Owner" }
                        }
                    }
                }
            }"##,
        )
        .expect("valid schema");

        let expected = ApiSchema::new()
            .with_definition(
                "Model",
                ModelDefinition::new()
                    .with_required_property("id", DataType::String)
                    .with_property("tags", DataType::array_of(DataType::String))
                    .with_property("owner", DataType::model("Owner")),
            )
            .with_security_definition(
                "apiKey",
                SecurityDefinition::api_key("token", ApiKeyLocation::Query),
            );
        assert_eq!(schema, expected);
    }

    #[test]
    fn should_report_json_path_of_errors() {
        let error = ApiSchema::from_json(
            r#"{ "securityDefinitions": { "apiKey": { "type": "apiKey", "in": "cookie", "name": "token" } } }"#,
        )
        .expect_err("cookie api keys are not supported");

        let DescriptorError::Json(error) = error else {
            panic!("expected a JSON error");
        };
        assert!(
            error
                .path()
                .to_string()
                .starts_with("securityDefinitions.apiKey")
        );
    }
}

use std::fmt;

use serde::Deserialize;
use serde_json::Value;

/// Where a parameter value goes in the outgoing request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, derive_more::Display)]
#[serde(rename_all = "camelCase")]
pub enum ParameterLocation {
    /// A `{name}` segment of the path template.
    #[display("path")]
    Path,
    /// A query string parameter.
    #[display("query")]
    Query,
    /// An HTTP header.
    #[display("header")]
    Header,
    /// A form field, url-encoded or multipart.
    #[serde(alias = "form")]
    #[display("formData")]
    FormData,
    /// The raw request body.
    #[display("body")]
    Body,
}

/// The declared type of a parameter, a model property or an array item.
///
/// Deserializes from the Swagger shape: `{"type": "array", "items": {...}}`,
/// `{"$ref": "#/definitions/Pet"}`, `{"type": "File"}`, or a bare model name
/// as `type`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(from = "RawSchema")]
pub enum DataType {
    /// A JSON string.
    String,
    /// Any JSON number.
    Number,
    /// A JSON number without fractional part.
    Integer,
    /// A JSON boolean.
    Boolean,
    /// A JSON array whose elements all have the item type.
    Array(Box<DataType>),
    /// A file: its content as a string, or an object describing it.
    File,
    /// Any JSON object.
    Object,
    /// A model from the schema definitions.
    Model(String),
    /// No declared type, anything goes.
    Any,
}

impl DataType {
    /// Creates an array type.
    pub fn array_of(item: DataType) -> Self {
        Self::Array(Box::new(item))
    }

    /// Creates a model type.
    pub fn model(name: impl Into<String>) -> Self {
        Self::Model(name.into())
    }

    pub(in crate::client) fn is_file(&self) -> bool {
        matches!(self, Self::File)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String => write!(f, "string"),
            Self::Number => write!(f, "number"),
            Self::Integer => write!(f, "integer"),
            Self::Boolean => write!(f, "boolean"),
            Self::Array(item) => write!(f, "array<{item}>"),
            Self::File => write!(f, "File"),
            Self::Object => write!(f, "object"),
            Self::Model(name) => write!(f, "{name}"),
            Self::Any => write!(f, "any"),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct RawSchema {
    #[serde(rename = "type")]
    type_name: Option<String>,
    items: Option<Box<RawSchema>>,
    #[serde(rename = "$ref")]
    reference: Option<String>,
}

impl From<RawSchema> for DataType {
    fn from(value: RawSchema) -> Self {
        let RawSchema {
            type_name,
            items,
            reference,
        } = value;

        if let Some(reference) = reference {
            let name = reference.rsplit('/').next().unwrap_or(&reference);
            return Self::model(name);
        }

        match type_name.as_deref() {
            Some("string") => Self::String,
            Some("number") => Self::Number,
            Some("integer") => Self::Integer,
            Some("boolean") => Self::Boolean,
            Some("array") => Self::array_of(items.map_or(Self::Any, |items| Self::from(*items))),
            Some("file" | "File") => Self::File,
            Some("object") => Self::Object,
            Some(model) => Self::model(model),
            None => Self::Any,
        }
    }
}

/// A declared parameter of an operation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(from = "RawParameter")]
pub struct ParameterDescriptor {
    /// The parameter name, unique within the operation.
    pub name: String,
    /// Where the value goes.
    pub location: ParameterLocation,
    /// The declared type.
    pub data_type: DataType,
    /// Whether a value must be provided.
    pub required: bool,
}

impl ParameterDescriptor {
    /// Creates an optional parameter.
    pub fn new(name: impl Into<String>, location: ParameterLocation, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            location,
            data_type,
            required: false,
        }
    }

    /// Marks the parameter as required.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Path parameters are always required, whatever their declaration says.
    pub fn is_required(&self) -> bool {
        self.required || self.location == ParameterLocation::Path
    }

    /// `true` for parameters sent in the request body, form fields included.
    pub fn is_body_bearing(&self) -> bool {
        matches!(
            self.location,
            ParameterLocation::Body | ParameterLocation::FormData
        )
    }
}

#[derive(Debug, Deserialize)]
struct RawParameter {
    name: String,
    #[serde(rename = "in")]
    location: ParameterLocation,
    #[serde(default)]
    required: bool,
    schema: Option<RawSchema>,
    #[serde(flatten)]
    inline: RawSchema,
}

impl From<RawParameter> for ParameterDescriptor {
    fn from(value: RawParameter) -> Self {
        let RawParameter {
            name,
            location,
            required,
            schema,
            inline,
        } = value;

        Self {
            name,
            location,
            data_type: DataType::from(schema.unwrap_or(inline)),
            required,
        }
    }
}

/// Name of the JSON type of a value, for error messages.
pub(in crate::client) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Renders a scalar parameter value as it appears in a path, query or header.
///
/// Arrays are joined with commas, objects are rendered as compact JSON.
pub(in crate::client) fn value_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        Value::Bool(flag) => flag.to_string(),
        Value::Number(number) => number.to_string(),
        Value::Array(items) => items
            .iter()
            .map(value_to_string)
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    #[rstest]
    #[case::string(json!({"type": "string"}), DataType::String)]
    #[case::number(json!({"type": "number", "format": "double"}), DataType::Number)]
    #[case::integer(json!({"type": "integer"}), DataType::Integer)]
    #[case::array(json!({"type": "array", "items": {"type": "string"}}), DataType::array_of(DataType::String))]
    #[case::array_without_items(json!({"type": "array"}), DataType::array_of(DataType::Any))]
    #[case::file(json!({"type": "File"}), DataType::File)]
    #[case::reference(json!({"$ref": "#/definitions/Pet"}), DataType::model("Pet"))]
    #[case::bare_model(json!({"type": "Pet"}), DataType::model("Pet"))]
    #[case::untyped(json!({}), DataType::Any)]
    fn should_deserialize_data_type(#[case] input: Value, #[case] expected: DataType) {
        let data_type: DataType = serde_json::from_value(input).expect("valid type");
        assert_eq!(data_type, expected);
    }

    #[test]
    fn should_deserialize_parameters() {
        let parameters: Vec<ParameterDescriptor> = serde_json::from_value(json!([
            { "in": "query", "type": "array", "name": "listOfStuff", "items": { "type": "string" } },
            { "in": "form", "type": "File", "name": "theFile" },
            { "in": "body", "name": "pet", "required": true, "schema": { "$ref": "#/definitions/Pet" } }
        ]))
        .expect("valid parameters");

        assert_eq!(
            parameters,
            vec![
                ParameterDescriptor::new(
                    "listOfStuff",
                    ParameterLocation::Query,
                    DataType::array_of(DataType::String)
                ),
                ParameterDescriptor::new("theFile", ParameterLocation::FormData, DataType::File),
                ParameterDescriptor::new("pet", ParameterLocation::Body, DataType::model("Pet"))
                    .required(),
            ]
        );
    }

    #[test]
    fn should_display_data_types() {
        assert_eq!(
            DataType::array_of(DataType::model("Pet")).to_string(),
            "array<Pet>"
        );
        assert_eq!(ParameterLocation::FormData.to_string(), "formData");
    }

    #[test]
    fn path_parameters_are_always_required() {
        let param = ParameterDescriptor::new("id", ParameterLocation::Path, DataType::String);
        assert!(param.is_required());
    }

    #[test]
    fn should_render_values() {
        assert_eq!(value_to_string(&json!("a b")), "a b");
        assert_eq!(value_to_string(&json!(1.5)), "1.5");
        assert_eq!(value_to_string(&json!([1, "two", true])), "1,two,true");
        assert_eq!(value_to_string(&json!({"id": 1})), r#"{"id":1}"#);
    }
}

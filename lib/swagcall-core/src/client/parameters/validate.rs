use http::{HeaderName, HeaderValue};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::param::{DataType, ParameterLocation, json_type_name, value_to_string};
use crate::client::error::{ParameterError, ParameterProblem, ValidationErrors};
use crate::client::operation::OperationDescriptor;
use crate::client::request::{Arguments, RequestData};
use crate::client::schema::ApiSchema;

/// Largest integer a JSON number can carry without losing precision.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Turns caller arguments into the data of a request.
///
/// A bare value stands for the only parameter of a one-parameter operation.
/// Keys that match no declared parameter and `null` values are dropped, the
/// remaining values follow the declaration order.
pub fn prepare_arguments(operation: &OperationDescriptor, arguments: Arguments) -> RequestData {
    let mut named = match arguments {
        Arguments::Named(named) => named,
        Arguments::Single(value) => match operation.parameters() {
            [param] => Map::from_iter([(param.name.clone(), value)]),
            params => {
                warn!(
                    operation = %operation.label(),
                    parameters = params.len(),
                    "bare argument ignored, the operation does not have a single parameter"
                );
                Map::new()
            }
        },
    };

    let mut data = RequestData::with_capacity(named.len());
    for param in operation.parameters() {
        match named.remove(&param.name) {
            Some(Value::Null) | None => {}
            Some(value) => {
                data.insert(param.name.clone(), value);
            }
        }
    }

    if !named.is_empty() {
        let pruned = named.keys().collect::<Vec<_>>();
        warn!(operation = %operation.label(), ?pruned, "unknown arguments pruned");
    }

    data
}

/// Validates request data against the declared parameters.
///
/// Every parameter is checked, the error lists all the problems found.
/// Returns the coerced values in declaration order.
///
/// # Errors
///
/// Returns [`ValidationErrors`] when a required parameter is missing or a
/// value does not match its declared type.
pub fn validate(
    operation: &OperationDescriptor,
    schema: &ApiSchema,
    data: &RequestData,
) -> Result<RequestData, ValidationErrors> {
    let mut valid = RequestData::with_capacity(data.len());
    let mut errors = Vec::new();

    for param in operation.parameters() {
        let value = data.get(&param.name).filter(|value| !value.is_null());
        let checked = match value {
            Some(value) if param.location == ParameterLocation::Header => {
                check_value(&param.data_type, value, schema)
                    .and_then(|value| check_header(&param.name, value))
                    .map(Some)
            }
            Some(value) => check_value(&param.data_type, value, schema).map(Some),
            None if param.is_required() => Err(ParameterProblem::Missing),
            None => Ok(None),
        };

        match checked {
            Ok(Some(value)) => {
                valid.insert(param.name.clone(), value);
            }
            Ok(None) => {}
            Err(problem) => errors.push(ParameterError {
                name: param.name.clone(),
                problem,
            }),
        }
    }

    if errors.is_empty() {
        debug!(operation = %operation.label(), parameters = valid.len(), "arguments validated");
        Ok(valid)
    } else {
        debug!(operation = %operation.label(), errors = errors.len(), "invalid arguments");
        Err(ValidationErrors {
            operation: operation.label(),
            errors,
        })
    }
}

fn check_value(
    data_type: &DataType,
    value: &Value,
    schema: &ApiSchema,
) -> Result<Value, ParameterProblem> {
    let mismatch = || ParameterProblem::InvalidType {
        expected: data_type.to_string(),
        found: json_type_name(value),
    };

    match (data_type, value) {
        (DataType::Any, _)
        | (DataType::String, Value::String(_))
        | (DataType::Number, Value::Number(_))
        | (DataType::Boolean, Value::Bool(_))
        | (DataType::Object, Value::Object(_))
        | (DataType::File, Value::String(_) | Value::Object(_)) => Ok(value.clone()),
        (DataType::Integer, Value::Number(number)) => {
            if number.is_i64() || number.is_u64() {
                return Ok(value.clone());
            }
            number
                .as_f64()
                .and_then(integral)
                .map(Value::from)
                .ok_or_else(mismatch)
        }
        (DataType::Array(item), Value::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(index, element)| {
                check_value(item, element, schema).map_err(|problem| {
                    ParameterProblem::InvalidItem {
                        index,
                        problem: Box::new(problem),
                    }
                })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        (DataType::Model(model), Value::Object(properties)) => {
            check_model(model, properties, schema).map(Value::Object)
        }
        (DataType::Model(model), _) if !schema.definitions.contains_key(model) => {
            Err(ParameterProblem::UnknownModel {
                model: model.clone(),
            })
        }
        _ => Err(mismatch()),
    }
}

fn check_header(name: &str, value: Value) -> Result<Value, ParameterProblem> {
    let invalid = |message: String| ParameterProblem::InvalidHeader { message };
    HeaderName::from_bytes(name.as_bytes()).map_err(|err| invalid(err.to_string()))?;
    HeaderValue::from_str(&value_to_string(&value)).map_err(|err| invalid(err.to_string()))?;
    Ok(value)
}

fn check_model(
    model: &str,
    properties: &Map<String, Value>,
    schema: &ApiSchema,
) -> Result<Map<String, Value>, ParameterProblem> {
    let Some(definition) = schema.definitions.get(model) else {
        return Err(ParameterProblem::UnknownModel {
            model: model.to_string(),
        });
    };

    let mut checked = properties.clone();
    for (property, data_type) in &definition.properties {
        let invalid = |problem| ParameterProblem::InvalidProperty {
            property: property.clone(),
            problem: Box::new(problem),
        };

        match properties.get(property).filter(|value| !value.is_null()) {
            Some(value) => {
                let value = check_value(data_type, value, schema).map_err(invalid)?;
                checked.insert(property.clone(), value);
            }
            None if definition.required.contains(property) => {
                return Err(invalid(ParameterProblem::Missing));
            }
            None => {}
        }
    }

    // required properties without a declared type
    if let Some(property) = definition
        .required
        .iter()
        .find(|name| properties.get(name.as_str()).is_none_or(Value::is_null))
    {
        return Err(ParameterProblem::InvalidProperty {
            property: property.clone(),
            problem: Box::new(ParameterProblem::Missing),
        });
    }

    Ok(checked)
}

#[allow(clippy::cast_possible_truncation)]
fn integral(number: f64) -> Option<i64> {
    (number.fract() == 0.0 && number.abs() <= MAX_SAFE_INTEGER).then_some(number as i64)
}

//! Parameter declarations and argument validation

use crate::error::DispatchError;
use serde_json::{json, Map, Value};

/// JSON type of a declared parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    String,
    Number,
    Boolean,
    StringList,
    /// A string restricted to the listed values
    Selector(&'static [&'static str]),
}

impl ParamKind {
    fn schema(&self) -> Value {
        match self {
            ParamKind::String => json!({"type": "string"}),
            ParamKind::Number => json!({"type": "number"}),
            ParamKind::Boolean => json!({"type": "boolean"}),
            ParamKind::StringList => json!({"type": "array", "items": {"type": "string"}}),
            ParamKind::Selector(allowed) => json!({"type": "string", "enum": allowed}),
        }
    }
}

/// A parameter an action accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
    pub required: bool,
    pub description: &'static str,
}

impl ParamSpec {
    pub const fn required(name: &'static str, kind: ParamKind, description: &'static str) -> Self {
        Self {
            name,
            kind,
            required: true,
            description,
        }
    }

    pub const fn optional(name: &'static str, kind: ParamKind, description: &'static str) -> Self {
        Self {
            name,
            kind,
            required: false,
            description,
        }
    }

    /// Check one supplied value against the declared kind
    fn check(&self, value: &Value) -> Result<(), DispatchError> {
        let expected = match self.kind {
            ParamKind::String if value.is_string() => return Ok(()),
            ParamKind::Number if value.is_number() => return Ok(()),
            ParamKind::Boolean if value.is_boolean() => return Ok(()),
            ParamKind::StringList => match value.as_array() {
                Some(items) if items.iter().all(Value::is_string) => return Ok(()),
                _ => "a list of strings",
            },
            ParamKind::Selector(allowed) => match value.as_str() {
                Some(choice) if allowed.contains(&choice) => return Ok(()),
                Some(choice) => {
                    return Err(DispatchError::InvalidSelector {
                        param: self.name.to_string(),
                        value: choice.to_string(),
                        allowed: allowed.to_vec(),
                    })
                }
                None => "a string",
            },
            ParamKind::String => "a string",
            ParamKind::Number => "a number",
            ParamKind::Boolean => "a boolean",
        };

        Err(DispatchError::InvalidParameter(format!(
            "'{}' must be {}",
            self.name, expected
        )))
    }
}

/// JSON schema describing an argument object
pub fn input_schema(params: &[ParamSpec]) -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();

    for param in params {
        let mut schema = param.kind.schema();
        if let Some(obj) = schema.as_object_mut() {
            obj.insert("description".into(), Value::String(param.description.into()));
        }
        properties.insert(param.name.to_string(), schema);
        if param.required {
            required.push(Value::String(param.name.to_string()));
        }
    }

    let mut schema = Map::new();
    schema.insert("type".into(), json!("object"));
    schema.insert("properties".into(), Value::Object(properties));
    if !required.is_empty() {
        schema.insert("required".into(), Value::Array(required));
    }
    Value::Object(schema)
}

/// Arguments that passed declaration checks
///
/// Only declared parameters are kept; a `null` value counts as absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActionArgs {
    values: Map<String, Value>,
}

impl ActionArgs {
    /// Validate caller arguments against declared parameters
    ///
    /// `null` is accepted as "no arguments"; any other non-object is rejected.
    pub fn validate(params: &[ParamSpec], supplied: &Value) -> Result<Self, DispatchError> {
        let empty = Map::new();
        let supplied = match supplied {
            Value::Object(map) => map,
            Value::Null => &empty,
            _ => {
                return Err(DispatchError::InvalidRequest(
                    "arguments must be a JSON object".to_string(),
                ))
            }
        };

        let mut values = Map::new();
        for param in params {
            match supplied.get(param.name) {
                Some(Value::Null) | None if param.required => {
                    return Err(DispatchError::MissingParameter(param.name.to_string()));
                }
                Some(Value::Null) | None => {}
                Some(value) => {
                    param.check(value)?;
                    values.insert(param.name.to_string(), value.clone());
                }
            }
        }

        Ok(Self { values })
    }

    pub fn str(&self, name: &str) -> Option<&str> {
        self.values.get(name).and_then(Value::as_str)
    }

    pub fn number(&self, name: &str) -> Option<f64> {
        self.values.get(name).and_then(Value::as_f64)
    }

    pub fn bool(&self, name: &str) -> Option<bool> {
        self.values.get(name).and_then(Value::as_bool)
    }

    pub fn string_list(&self, name: &str) -> Option<Vec<String>> {
        self.values.get(name).and_then(Value::as_array).map(|items| {
            items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect()
        })
    }

    /// A string parameter that validation guaranteed to be present
    pub fn require_str(&self, name: &str) -> Result<&str, DispatchError> {
        self.str(name)
            .ok_or_else(|| DispatchError::MissingParameter(name.to_string()))
    }

    /// A number parameter that validation guaranteed to be present
    pub fn require_number(&self, name: &str) -> Result<f64, DispatchError> {
        self.number(name)
            .ok_or_else(|| DispatchError::MissingParameter(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PARAMS: &[ParamSpec] = &[
        ParamSpec::required(
            "component",
            ParamKind::Selector(&["nozzle", "bed", "enclosure"]),
            "Heater",
        ),
        ParamSpec::required("temperature", ParamKind::Number, "Target"),
        ParamSpec::optional("reset", ParamKind::Boolean, "Reset"),
        ParamSpec::optional("filenames", ParamKind::StringList, "Files"),
    ];

    #[test]
    fn test_valid_arguments() {
        let args = ActionArgs::validate(
            PARAMS,
            &json!({"component": "bed", "temperature": 60, "reset": true, "extra": 1}),
        )
        .unwrap();

        assert_eq!(args.str("component"), Some("bed"));
        assert_eq!(args.number("temperature"), Some(60.0));
        assert_eq!(args.bool("reset"), Some(true));
        assert!(args.str("extra").is_none());
    }

    #[test]
    fn test_missing_required() {
        let err = ActionArgs::validate(PARAMS, &json!({"component": "bed"})).unwrap_err();
        assert_eq!(err.to_string(), "Missing required parameter 'temperature'");

        let err = ActionArgs::validate(PARAMS, &Value::Null).unwrap_err();
        assert!(matches!(err, DispatchError::MissingParameter(ref p) if p == "component"));
    }

    #[test]
    fn test_null_optional_is_absent() {
        let args = ActionArgs::validate(
            PARAMS,
            &json!({"component": "nozzle", "temperature": 0, "reset": null}),
        )
        .unwrap();
        assert!(args.bool("reset").is_none());
    }

    #[test]
    fn test_selector_outside_enumeration() {
        let err = ActionArgs::validate(PARAMS, &json!({"component": "chamber", "temperature": 1}))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid component 'chamber'. Must be one of: nozzle, bed, enclosure"
        );
    }

    #[test]
    fn test_wrong_types() {
        let err = ActionArgs::validate(PARAMS, &json!({"component": "bed", "temperature": "hot"}))
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid parameter: 'temperature' must be a number");

        let err = ActionArgs::validate(
            PARAMS,
            &json!({"component": "bed", "temperature": 1, "filenames": [1, 2]}),
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid parameter: 'filenames' must be a list of strings"
        );
    }

    #[test]
    fn test_non_object_arguments() {
        let err = ActionArgs::validate(PARAMS, &json!([1, 2])).unwrap_err();
        assert!(matches!(err, DispatchError::InvalidRequest(_)));
    }

    #[test]
    fn test_input_schema() {
        let schema = input_schema(PARAMS);
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["required"], json!(["component", "temperature"]));
        assert_eq!(
            schema["properties"]["component"]["enum"],
            json!(["nozzle", "bed", "enclosure"])
        );
        assert_eq!(schema["properties"]["filenames"]["items"]["type"], "string");

        let empty = input_schema(&[]);
        assert_eq!(empty, json!({"type": "object", "properties": {}}));
    }
}

//! Function calling types

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// JSON-schema shape describing function parameters.
///
/// Properties live in a `BTreeMap` so serialized request bodies are stable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct FunctionJsonSchema {
    #[serde(rename = "type")]
    pub schema_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<String, FunctionJsonSchema>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<FunctionJsonSchema>>,
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
}

impl FunctionJsonSchema {
    /// An empty `{"type": "object"}` schema.
    pub fn object() -> Self {
        Self {
            schema_type: "object".to_string(),
            ..Default::default()
        }
    }

    /// A scalar schema such as `string` or `number`.
    pub fn scalar(schema_type: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            schema_type: schema_type.into(),
            description: Some(description.into()),
            ..Default::default()
        }
    }

    /// Add a property; `required` marks it in the parent's `required` list.
    pub fn with_property(
        mut self,
        name: impl Into<String>,
        schema: FunctionJsonSchema,
        required: bool,
    ) -> Self {
        let name = name.into();
        if required {
            self.required.get_or_insert_with(Vec::new).push(name.clone());
        }
        self.properties
            .get_or_insert_with(BTreeMap::new)
            .insert(name, schema);
        self
    }

    pub fn with_enum(mut self, values: Vec<String>) -> Self {
        self.enum_values = Some(values);
        self
    }
}

/// Function declaration offered to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDefinition {
    /// Name the model uses to call the function.
    pub name: String,
    pub description: String,
    /// JSON Schema of the arguments object. `None` means no arguments.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<FunctionJsonSchema>,
}

impl FunctionDefinition {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: None,
        }
    }

    pub fn with_parameters(mut self, parameters: FunctionJsonSchema) -> Self {
        self.parameters = Some(parameters);
        self
    }

    /// Parameters as JSON; backends that require a schema get an empty object schema.
    pub fn parameters_json(&self) -> serde_json::Value {
        let schema = self
            .parameters
            .clone()
            .unwrap_or_else(FunctionJsonSchema::object);
        serde_json::to_value(schema).unwrap_or_else(|_| serde_json::json!({"type": "object"}))
    }
}

/// Directive controlling whether and which function the model must call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FunctionCallMode {
    None,
    Auto,
    Required,
    Function { name: String },
}

impl FunctionCallMode {
    pub fn function(name: impl Into<String>) -> Self {
        Self::Function { name: name.into() }
    }
}

/// A function invocation requested by the model (or replayed by the caller).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    /// Backend call id, echoed back with the function result.
    pub id: String,
    pub name: String,
    /// Arguments as returned by the backend: a JSON string or a JSON object.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arguments: Option<serde_json::Value>,
}

impl FunctionCall {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: Option<serde_json::Value>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments,
        }
    }

    /// Arguments rendered as a JSON string (`"{}"` when absent).
    pub fn arguments_string(&self) -> String {
        match &self.arguments {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => "{}".to_string(),
        }
    }

    /// Arguments as a JSON object, parsing string arguments when needed.
    pub fn arguments_object(&self) -> Result<serde_json::Value, serde_json::Error> {
        match &self.arguments {
            Some(serde_json::Value::String(s)) if s.trim().is_empty() => {
                Ok(serde_json::json!({}))
            }
            Some(serde_json::Value::String(s)) => serde_json::from_str(s),
            Some(other) => Ok(other.clone()),
            None => Ok(serde_json::json!({})),
        }
    }
}

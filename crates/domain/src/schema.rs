//! Action input schemas.
//!
//! An [`InputSchema`] is the subset of JSON Schema a thing declares for an
//! action's input: an object with typed, optionally bounded fields and a
//! list of required field names. The transport validates every invocation
//! against it before the action is constructed.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::value::ValueType;

/// Schema of one input field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldSchema {
    #[serde(rename = "type")]
    pub value_type: ValueType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
}

impl FieldSchema {
    #[must_use]
    pub fn new(value_type: ValueType) -> Self {
        Self {
            value_type,
            minimum: None,
            maximum: None,
        }
    }

    #[must_use]
    pub fn minimum(mut self, minimum: f64) -> Self {
        self.minimum = Some(minimum);
        self
    }

    #[must_use]
    pub fn maximum(mut self, maximum: f64) -> Self {
        self.maximum = Some(maximum);
        self
    }

    fn check(&self, name: &str, value: &serde_json::Value) -> Result<(), ValidationError> {
        if !self.value_type.accepts_json(value) {
            return Err(ValidationError::WrongType {
                field: name.to_string(),
                expected: self.value_type,
            });
        }
        if let Some(n) = value.as_f64() {
            if self.minimum.is_some_and(|min| n < min) || self.maximum.is_some_and(|max| n > max) {
                return Err(ValidationError::OutOfRange(name.to_string()));
            }
        }
        Ok(())
    }
}

/// Object schema declared for an action's input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputSchema {
    #[serde(rename = "type")]
    kind: ValueType,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    #[serde(default)]
    pub properties: BTreeMap<String, FieldSchema>,
}

impl Default for InputSchema {
    fn default() -> Self {
        Self {
            kind: ValueType::Object,
            required: Vec::new(),
            properties: BTreeMap::new(),
        }
    }
}

impl InputSchema {
    /// Create a builder for an object schema.
    #[must_use]
    pub fn builder() -> InputSchemaBuilder {
        InputSchemaBuilder::default()
    }

    /// Validate an invocation payload.
    ///
    /// `null` is treated as an empty object so actions without required
    /// fields can be invoked with no input at all. Fields not declared in
    /// the schema are allowed through untouched.
    ///
    /// # Errors
    ///
    /// - [`ValidationError::NotAnObject`] when `input` is neither an object nor `null`
    /// - [`ValidationError::MissingField`] for the first absent required field
    /// - [`ValidationError::WrongType`] / [`ValidationError::OutOfRange`] for a
    ///   declared field whose value does not match its schema
    pub fn validate(&self, input: &serde_json::Value) -> Result<(), ValidationError> {
        let empty = serde_json::Map::new();
        let fields = match input {
            serde_json::Value::Object(map) => map,
            serde_json::Value::Null => &empty,
            _ => return Err(ValidationError::NotAnObject),
        };

        if let Some(missing) = self.required.iter().find(|name| !fields.contains_key(*name)) {
            return Err(ValidationError::MissingField(missing.clone()));
        }

        for (name, value) in fields {
            if let Some(schema) = self.properties.get(name) {
                schema.check(name, value)?;
            }
        }
        Ok(())
    }
}

/// Step-by-step builder for [`InputSchema`].
#[derive(Debug, Default)]
pub struct InputSchemaBuilder {
    schema: InputSchema,
}

impl InputSchemaBuilder {
    /// Declare a field that must be present.
    #[must_use]
    pub fn required(mut self, name: impl Into<String>, field: FieldSchema) -> Self {
        let name = name.into();
        self.schema.required.push(name.clone());
        self.schema.properties.insert(name, field);
        self
    }

    /// Declare a field that may be omitted.
    #[must_use]
    pub fn optional(mut self, name: impl Into<String>, field: FieldSchema) -> Self {
        self.schema.properties.insert(name.into(), field);
        self
    }

    #[must_use]
    pub fn build(self) -> InputSchema {
        self.schema
    }
}

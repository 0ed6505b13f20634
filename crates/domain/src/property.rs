//! Property metadata — the schema a property's values must satisfy.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::value::{PropertyValue, ValueType};

/// Item schema for `array` properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemsSchema {
    #[serde(rename = "type")]
    pub value_type: ValueType,
}

/// Descriptive and constraining metadata attached to a property.
///
/// The constraints (`type`, `items`, `minimum`, `maximum`, `enum`) double as
/// the property's built-in write validator, see [`accepts`](Self::accepts).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyMetadata {
    #[serde(rename = "@type", default, skip_serializing_if = "Option::is_none")]
    pub semantic_type: Option<String>,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub value_type: ValueType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<ItemsSchema>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
    #[serde(rename = "enum", default, skip_serializing_if = "Vec::is_empty")]
    pub allowed: Vec<PropertyValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub read_only: bool,
}

impl PropertyMetadata {
    /// Create a builder for a property of the given type.
    #[must_use]
    pub fn builder(value_type: ValueType) -> PropertyMetadataBuilder {
        PropertyMetadataBuilder::new(value_type)
    }

    /// Whether `value` satisfies every declared constraint.
    #[must_use]
    pub fn accepts(&self, value: &PropertyValue) -> bool {
        if !self.value_type.matches(value) {
            return false;
        }
        if let (Some(items), PropertyValue::Array(values)) = (self.items, value) {
            if !values.iter().all(|v| items.value_type.matches(v)) {
                return false;
            }
        }
        if let Some(n) = value.as_f64() {
            if self.minimum.is_some_and(|min| n < min) || self.maximum.is_some_and(|max| n > max) {
                return false;
            }
        }
        self.allowed.is_empty() || self.allowed.contains(value)
    }

    /// Check that the metadata itself is coherent.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyName`] when `title` is empty and
    /// [`ValidationError::InvalidRange`] when `minimum > maximum`.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if let (Some(min), Some(max)) = (self.minimum, self.maximum) {
            if min > max {
                return Err(ValidationError::InvalidRange);
            }
        }
        Ok(())
    }
}

/// Step-by-step builder for [`PropertyMetadata`].
#[derive(Debug)]
pub struct PropertyMetadataBuilder {
    inner: PropertyMetadata,
}

impl PropertyMetadataBuilder {
    fn new(value_type: ValueType) -> Self {
        Self {
            inner: PropertyMetadata {
                semantic_type: None,
                title: String::new(),
                description: None,
                value_type,
                items: None,
                minimum: None,
                maximum: None,
                allowed: Vec::new(),
                unit: None,
                read_only: false,
            },
        }
    }

    #[must_use]
    pub fn semantic_type(mut self, semantic_type: impl Into<String>) -> Self {
        self.inner.semantic_type = Some(semantic_type.into());
        self
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.inner.title = title.into();
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.inner.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn items(mut self, value_type: ValueType) -> Self {
        self.inner.items = Some(ItemsSchema { value_type });
        self
    }

    #[must_use]
    pub fn minimum(mut self, minimum: f64) -> Self {
        self.inner.minimum = Some(minimum);
        self
    }

    #[must_use]
    pub fn maximum(mut self, maximum: f64) -> Self {
        self.inner.maximum = Some(maximum);
        self
    }

    #[must_use]
    pub fn allowed(mut self, value: impl Into<PropertyValue>) -> Self {
        self.inner.allowed.push(value.into());
        self
    }

    #[must_use]
    pub fn unit(mut self, unit: impl Into<String>) -> Self {
        self.inner.unit = Some(unit.into());
        self
    }

    #[must_use]
    pub fn read_only(mut self, read_only: bool) -> Self {
        self.inner.read_only = read_only;
        self
    }

    /// Consume the builder, validate, and return the metadata.
    ///
    /// # Errors
    ///
    /// See [`PropertyMetadata::validate`].
    pub fn build(self) -> Result<PropertyMetadata, ValidationError> {
        self.inner.validate()?;
        Ok(self.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score() -> PropertyMetadata {
        PropertyMetadata::builder(ValueType::Number)
            .semantic_type("LevelProperty")
            .title("Score")
            .minimum(0.0)
            .maximum(1.0)
            .build()
            .unwrap()
    }

    #[test]
    fn should_accept_value_within_range() {
        assert!(score().accepts(&PropertyValue::Number(0.4)));
        assert!(score().accepts(&PropertyValue::Integer(1)));
    }

    #[test]
    fn should_reject_value_outside_range() {
        assert!(!score().accepts(&PropertyValue::Number(1.5)));
        assert!(!score().accepts(&PropertyValue::Number(-0.1)));
    }

    #[test]
    fn should_reject_value_of_wrong_type() {
        assert!(!score().accepts(&PropertyValue::String("high".to_string())));
    }

    #[test]
    fn should_check_array_item_types() {
        let meta = PropertyMetadata::builder(ValueType::Array)
            .title("Words")
            .items(ValueType::String)
            .build()
            .unwrap();
        assert!(meta.accepts(&PropertyValue::strings(["a", "b"])));
        assert!(!meta.accepts(&PropertyValue::Array(vec![PropertyValue::Integer(1)])));
    }

    #[test]
    fn should_restrict_to_enum_values() {
        let meta = PropertyMetadata::builder(ValueType::String)
            .title("Language")
            .allowed("en")
            .allowed("zh")
            .build()
            .unwrap();
        assert!(meta.accepts(&"zh".into()));
        assert!(!meta.accepts(&"fr".into()));
    }

    #[test]
    fn should_reject_empty_title() {
        let result = PropertyMetadata::builder(ValueType::Number).build();
        assert_eq!(result.unwrap_err(), ValidationError::EmptyName);
    }

    #[test]
    fn should_reject_inverted_range() {
        let result = PropertyMetadata::builder(ValueType::Number)
            .title("Bad")
            .minimum(2.0)
            .maximum(1.0)
            .build();
        assert_eq!(result.unwrap_err(), ValidationError::InvalidRange);
    }

    #[test]
    fn should_serialize_with_web_thing_keys() {
        let json = serde_json::to_value(score()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "@type": "LevelProperty",
                "title": "Score",
                "type": "number",
                "minimum": 0.0,
                "maximum": 1.0,
            })
        );
    }

    #[test]
    fn should_serialize_read_only_flag_when_set() {
        let meta = PropertyMetadata::builder(ValueType::Boolean)
            .title("On")
            .read_only(true)
            .build()
            .unwrap();
        let json = serde_json::to_value(meta).unwrap();
        assert_eq!(json["readOnly"], serde_json::json!(true));
    }
}

//! Property store — the named, schema-constrained state of a thing.

use std::collections::HashMap;

use nlpthing_domain::error::{DefinitionError, PropertyError, ValidationError};
use nlpthing_domain::property::PropertyMetadata;
use nlpthing_domain::value::PropertyValue;

use crate::value_cell::{SubscriptionHandle, ValueCell};

/// Extra write check layered on top of a property's metadata constraints.
pub type PropertyValidator = Box<dyn Fn(&PropertyValue) -> bool + Send + Sync>;

/// One named property: its metadata and the cell holding its value.
#[derive(Debug)]
pub struct Property {
    metadata: PropertyMetadata,
    cell: ValueCell<PropertyValue>,
}

impl Property {
    #[must_use]
    pub fn metadata(&self) -> &PropertyMetadata {
        &self.metadata
    }

    #[must_use]
    pub fn value(&self) -> PropertyValue {
        self.cell.get()
    }
}

/// Named collection of observable properties.
///
/// Properties are added with [`define`](Self::define), which needs `&mut
/// self`. Once the store is shared inside a thing only reads, validated
/// writes and subscriptions remain possible, so the set of names is fixed.
#[derive(Debug, Default)]
pub struct PropertyStore {
    properties: HashMap<String, Property>,
    order: Vec<String>,
}

impl PropertyStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new property.
    ///
    /// Every write, including `initial`, must satisfy the metadata
    /// constraints and, when given, `validator`.
    ///
    /// # Errors
    ///
    /// - [`DefinitionError::DuplicateProperty`] if `name` is taken
    /// - [`DefinitionError::InvalidInitialValue`] if `initial` is rejected
    /// - [`DefinitionError::Validation`] if `name` is empty or the metadata is incoherent
    pub fn define(
        &mut self,
        name: impl Into<String>,
        initial: PropertyValue,
        metadata: PropertyMetadata,
        validator: Option<PropertyValidator>,
    ) -> Result<(), DefinitionError> {
        let name = name.into();
        if name.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        if self.properties.contains_key(&name) {
            return Err(DefinitionError::DuplicateProperty(name));
        }
        metadata.validate()?;

        let constraints = metadata.clone();
        let cell = ValueCell::with_validator(initial, move |value| {
            constraints.accepts(value) && validator.as_ref().is_none_or(|check| check(value))
        })
        .map_err(|_| DefinitionError::InvalidInitialValue(name.clone()))?;

        self.order.push(name.clone());
        self.properties.insert(name, Property { metadata, cell });
        Ok(())
    }

    /// Current value of `name`.
    ///
    /// # Errors
    ///
    /// Returns [`PropertyError::Unknown`] if no such property exists.
    pub fn read(&self, name: &str) -> Result<PropertyValue, PropertyError> {
        Ok(self.get(name)?.value())
    }

    /// Validated write; subscribers have been notified when this returns.
    ///
    /// # Errors
    ///
    /// Returns [`PropertyError::Unknown`] if no such property exists and
    /// [`PropertyError::InvalidValue`] if the value is rejected.
    pub fn write(&self, name: &str, value: PropertyValue) -> Result<(), PropertyError> {
        let property = self.get(name)?;
        property.cell.set(value).map_err(|_| {
            tracing::debug!(property = %name, "rejected invalid property value");
            PropertyError::InvalidValue(name.to_string())
        })?;
        tracing::debug!(property = %name, "property updated");
        Ok(())
    }

    /// Subscribe to changes of `name`.
    ///
    /// # Errors
    ///
    /// Returns [`PropertyError::Unknown`] if no such property exists.
    pub fn observe<F>(&self, name: &str, callback: F) -> Result<SubscriptionHandle, PropertyError>
    where
        F: Fn(&PropertyValue, &PropertyValue) + Send + Sync + 'static,
    {
        Ok(self.get(name)?.cell.subscribe(callback))
    }

    /// Metadata of `name`.
    ///
    /// # Errors
    ///
    /// Returns [`PropertyError::Unknown`] if no such property exists.
    pub fn metadata(&self, name: &str) -> Result<&PropertyMetadata, PropertyError> {
        Ok(self.get(name)?.metadata())
    }

    /// Properties in definition order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Property)> {
        self.order
            .iter()
            .filter_map(|name| self.properties.get(name).map(|p| (name.as_str(), p)))
    }

    /// Metadata snapshots in definition order.
    #[must_use]
    pub fn descriptions(&self) -> Vec<(String, PropertyMetadata)> {
        self.iter()
            .map(|(name, property)| (name.to_string(), property.metadata.clone()))
            .collect()
    }

    /// Current values in definition order.
    #[must_use]
    pub fn values(&self) -> Vec<(String, PropertyValue)> {
        self.iter()
            .map(|(name, property)| (name.to_string(), property.value()))
            .collect()
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.properties.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    fn get(&self, name: &str) -> Result<&Property, PropertyError> {
        self.properties
            .get(name)
            .ok_or_else(|| PropertyError::Unknown(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nlpthing_domain::value::ValueType;
    use std::sync::{Arc, Mutex};

    fn score_metadata() -> PropertyMetadata {
        PropertyMetadata::builder(ValueType::Number)
            .title("Score")
            .minimum(0.0)
            .maximum(1.0)
            .build()
            .unwrap()
    }

    fn words_metadata() -> PropertyMetadata {
        PropertyMetadata::builder(ValueType::Array)
            .title("Words")
            .items(ValueType::String)
            .build()
            .unwrap()
    }

    fn make_store() -> PropertyStore {
        let mut store = PropertyStore::new();
        store
            .define("score", PropertyValue::Integer(1), score_metadata(), None)
            .unwrap();
        store
            .define("words", PropertyValue::Array(Vec::new()), words_metadata(), None)
            .unwrap();
        store
    }

    #[test]
    fn should_read_initial_value() {
        let store = make_store();
        assert_eq!(store.read("score").unwrap(), PropertyValue::Integer(1));
    }

    #[test]
    fn should_read_back_written_value() {
        let store = make_store();
        store.write("score", PropertyValue::Number(0.25)).unwrap();
        assert_eq!(store.read("score").unwrap(), PropertyValue::Number(0.25));
    }

    #[test]
    fn should_reject_value_violating_metadata() {
        let store = make_store();
        let result = store.write("score", PropertyValue::Number(3.0));
        assert_eq!(
            result.unwrap_err(),
            PropertyError::InvalidValue("score".to_string())
        );
        assert_eq!(store.read("score").unwrap(), PropertyValue::Integer(1));
    }

    #[test]
    fn should_apply_custom_validator_on_top_of_metadata() {
        let mut store = PropertyStore::new();
        store
            .define(
                "words",
                PropertyValue::Array(Vec::new()),
                words_metadata(),
                Some(Box::new(|value: &PropertyValue| {
                    value.as_strings().is_some_and(|items| items.len() <= 2)
                })),
            )
            .unwrap();

        assert!(store.write("words", PropertyValue::strings(["a", "b"])).is_ok());
        assert!(store
            .write("words", PropertyValue::strings(["a", "b", "c"]))
            .is_err());
    }

    #[test]
    fn should_report_unknown_property() {
        let store = make_store();
        assert_eq!(
            store.read("missing").unwrap_err(),
            PropertyError::Unknown("missing".to_string())
        );
        assert!(matches!(
            store.write("missing", PropertyValue::Bool(true)),
            Err(PropertyError::Unknown(_))
        ));
        assert!(store.observe("missing", |_, _| {}).is_err());
    }

    #[test]
    fn should_reject_duplicate_definition() {
        let mut store = make_store();
        let result = store.define("score", PropertyValue::Integer(0), score_metadata(), None);
        assert_eq!(
            result.unwrap_err(),
            DefinitionError::DuplicateProperty("score".to_string())
        );
    }

    #[test]
    fn should_reject_invalid_initial_value() {
        let mut store = PropertyStore::new();
        let result = store.define("score", PropertyValue::Number(2.0), score_metadata(), None);
        assert_eq!(
            result.unwrap_err(),
            DefinitionError::InvalidInitialValue("score".to_string())
        );
        assert!(store.is_empty());
    }

    #[test]
    fn should_reject_empty_name() {
        let mut store = PropertyStore::new();
        let result = store.define("", PropertyValue::Integer(0), score_metadata(), None);
        assert!(matches!(result, Err(DefinitionError::Validation(_))));
    }

    #[test]
    fn should_notify_observer_before_write_returns() {
        let store = make_store();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_in_cb = Arc::clone(&seen);
        let _sub = store
            .observe("score", move |old, new| {
                seen_in_cb.lock().unwrap().push((old.clone(), new.clone()));
            })
            .unwrap();

        store.write("score", PropertyValue::Number(0.5)).unwrap();

        assert_eq!(
            *seen.lock().unwrap(),
            vec![(PropertyValue::Integer(1), PropertyValue::Number(0.5))]
        );
    }

    #[test]
    fn should_list_values_in_definition_order() {
        let store = make_store();
        let names: Vec<_> = store.values().into_iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["score", "words"]);
        let titles: Vec<_> = store
            .descriptions()
            .into_iter()
            .map(|(_, metadata)| metadata.title)
            .collect();
        assert_eq!(titles, vec!["Score", "Words"]);
        assert_eq!(store.len(), 2);
        assert!(store.contains("words"));
    }
}

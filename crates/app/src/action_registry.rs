//! Action registry — what a thing can be asked to do.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Weak};

use nlpthing_domain::error::{
    ActionError, ActionExecutionError, DefinitionError, NotFoundError, ValidationError,
};
use nlpthing_domain::schema::InputSchema;
use nlpthing_domain::thing::{ActionDescription, Link};

use crate::action::{Action, ActionContext, ActionFuture, ActionHandler};
use crate::property_store::PropertyStore;

/// A registered action: its name, declared input shape and handler.
#[derive(Clone)]
pub struct ActionDescriptor {
    name: String,
    title: String,
    description: Option<String>,
    input: InputSchema,
    handler: ActionHandler,
}

impl ActionDescriptor {
    /// Create a builder for an action called `name`.
    #[must_use]
    pub fn builder(name: impl Into<String>) -> ActionDescriptorBuilder {
        ActionDescriptorBuilder {
            name: name.into(),
            title: None,
            description: None,
            input: InputSchema::default(),
            handler: None,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn input_schema(&self) -> &InputSchema {
        &self.input
    }

    /// Validate `input` and create a fresh pending [`Action`].
    ///
    /// A `null` input is recorded as an empty object.
    ///
    /// # Errors
    ///
    /// Returns the [`ValidationError`] of the first schema violation; no
    /// action is created in that case.
    pub fn instantiate(
        &self,
        properties: Weak<PropertyStore>,
        input: serde_json::Value,
    ) -> Result<Action, ValidationError> {
        self.input.validate(&input)?;
        let input = if input.is_null() {
            serde_json::Value::Object(serde_json::Map::new())
        } else {
            input
        };
        Ok(Action::new(
            self.name.clone(),
            input,
            properties,
            Arc::clone(&self.handler),
        ))
    }

    /// Entry for the thing description.
    #[must_use]
    pub fn description(&self) -> ActionDescription {
        ActionDescription {
            title: self.title.clone(),
            description: self.description.clone(),
            input: self.input.clone(),
            links: vec![Link::new("action", format!("/actions/{}", self.name))],
        }
    }
}

impl std::fmt::Debug for ActionDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionDescriptor")
            .field("name", &self.name)
            .field("title", &self.title)
            .field("input", &self.input)
            .finish_non_exhaustive()
    }
}

/// Step-by-step builder for [`ActionDescriptor`].
pub struct ActionDescriptorBuilder {
    name: String,
    title: Option<String>,
    description: Option<String>,
    input: InputSchema,
    handler: Option<ActionHandler>,
}

impl ActionDescriptorBuilder {
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn input(mut self, input: InputSchema) -> Self {
        self.input = input;
        self
    }

    /// Bind the computation run for each invocation.
    #[must_use]
    pub fn handler<F, Fut>(mut self, handler: F) -> Self
    where
        F: Fn(ActionContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), ActionExecutionError>> + Send + 'static,
    {
        self.handler = Some(Arc::new(move |ctx| -> ActionFuture {
            Box::pin(handler(ctx))
        }));
        self
    }

    /// Consume the builder and return an [`ActionDescriptor`].
    ///
    /// The title defaults to the name.
    ///
    /// # Errors
    ///
    /// - [`DefinitionError::Validation`] if the name is empty
    /// - [`DefinitionError::MissingHandler`] if no handler was bound
    pub fn build(self) -> Result<ActionDescriptor, DefinitionError> {
        if self.name.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        let handler = self
            .handler
            .ok_or_else(|| DefinitionError::MissingHandler(self.name.clone()))?;
        Ok(ActionDescriptor {
            title: self.title.unwrap_or_else(|| self.name.clone()),
            name: self.name,
            description: self.description,
            input: self.input,
            handler,
        })
    }
}

/// Name → descriptor mapping, fixed once the thing is built.
#[derive(Debug, Default)]
pub struct ActionRegistry {
    descriptors: HashMap<String, ActionDescriptor>,
    order: Vec<String>,
}

impl ActionRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError::DuplicateAction`] if the name is taken.
    pub fn register(&mut self, descriptor: ActionDescriptor) -> Result<(), DefinitionError> {
        if self.descriptors.contains_key(descriptor.name()) {
            return Err(DefinitionError::DuplicateAction(descriptor.name.clone()));
        }
        self.order.push(descriptor.name.clone());
        self.descriptors.insert(descriptor.name.clone(), descriptor);
        Ok(())
    }

    /// Descriptor registered under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError::NotFound`] if nothing is registered under `name`.
    pub fn lookup(&self, name: &str) -> Result<&ActionDescriptor, ActionError> {
        self.descriptors.get(name).ok_or_else(|| {
            NotFoundError {
                entity: "Action",
                id: name.to_string(),
            }
            .into()
        })
    }

    /// Descriptors in registration order.
    pub fn descriptors(&self) -> impl Iterator<Item = &ActionDescriptor> {
        self.order
            .iter()
            .filter_map(|name| self.descriptors.get(name))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

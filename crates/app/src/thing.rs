//! Thing — one identity over a property store, an action registry and an executor.
//!
//! This is the unit a transport is handed. Its sets of properties and
//! actions are fixed by [`ThingBuilder::build`]; afterwards only property
//! values and the action history change.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::broadcast;

use nlpthing_domain::action::{ActionSnapshot, ActionStatus};
use nlpthing_domain::error::{ActionError, NotFoundError, PropertyError, ThingError};
use nlpthing_domain::event::ThingEvent;
use nlpthing_domain::id::ActionId;
use nlpthing_domain::property::PropertyMetadata;
use nlpthing_domain::thing::{Link, PropertyDescription, ThingDescription, ThingInfo};
use nlpthing_domain::value::PropertyValue;

use crate::action_registry::{ActionDescriptor, ActionRegistry};
use crate::event_bus::InProcessEventBus;
use crate::executor::{ActionExecutor, ExecutorConfig};
use crate::ports::EventPublisher;
use crate::property_store::{PropertyStore, PropertyValidator};
use crate::value_cell::SubscriptionHandle;

/// Default capacity of the thing's event channel.
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

struct PropertyDefinition {
    name: String,
    initial: PropertyValue,
    metadata: PropertyMetadata,
    validator: Option<PropertyValidator>,
}

/// A web-connected virtual device.
pub struct Thing {
    info: ThingInfo,
    properties: Arc<PropertyStore>,
    actions: ActionRegistry,
    executor: ActionExecutor,
    bus: Arc<InProcessEventBus>,
    _forwarders: Vec<SubscriptionHandle>,
}

impl Thing {
    /// Create a builder for a thing with the given identity.
    #[must_use]
    pub fn builder(info: ThingInfo) -> ThingBuilder {
        ThingBuilder {
            info,
            properties: Vec::new(),
            actions: Vec::new(),
            config: ExecutorConfig::default(),
            runtime: None,
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }

    #[must_use]
    pub fn info(&self) -> &ThingInfo {
        &self.info
    }

    #[must_use]
    pub fn properties(&self) -> &PropertyStore {
        &self.properties
    }

    /// Current value of property `name`.
    ///
    /// # Errors
    ///
    /// Returns [`PropertyError::Unknown`] if no such property exists.
    pub fn read_property(&self, name: &str) -> Result<PropertyValue, PropertyError> {
        self.properties.read(name)
    }

    /// Validated write of property `name` on behalf of the application.
    ///
    /// # Errors
    ///
    /// Returns [`PropertyError::Unknown`] or [`PropertyError::InvalidValue`].
    pub fn write_property(&self, name: &str, value: PropertyValue) -> Result<(), PropertyError> {
        self.properties.write(name, value)
    }

    /// Write on behalf of a remote client, which may not touch read-only properties.
    ///
    /// # Errors
    ///
    /// Returns [`PropertyError::ReadOnly`] for read-only properties, otherwise
    /// as [`write_property`](Self::write_property).
    pub fn write_property_remote(
        &self,
        name: &str,
        value: PropertyValue,
    ) -> Result<(), PropertyError> {
        if self.properties.metadata(name)?.read_only {
            return Err(PropertyError::ReadOnly(name.to_string()));
        }
        self.properties.write(name, value)
    }

    /// Descriptor of action `name`.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError::NotFound`] for unknown names.
    pub fn action_descriptor(&self, name: &str) -> Result<&ActionDescriptor, ActionError> {
        self.actions.lookup(name)
    }

    /// Validate `input`, create the action and schedule it.
    ///
    /// Returns as soon as the action is recorded; the computation runs later.
    ///
    /// # Errors
    ///
    /// - [`ThingError::Action`] with `NotFound` for unknown action names
    /// - [`ThingError::Validation`] if `input` violates the action's schema
    pub fn invoke(&self, name: &str, input: serde_json::Value) -> Result<ActionId, ThingError> {
        self.request(name, input).map(|snapshot| snapshot.id)
    }

    /// Like [`invoke`](Self::invoke), returning the pending snapshot taken
    /// before the action was handed to the executor.
    ///
    /// The snapshot stays valid even if the action finishes and is evicted
    /// before the caller looks at it.
    ///
    /// # Errors
    ///
    /// Same as [`invoke`](Self::invoke).
    pub fn request(
        &self,
        name: &str,
        input: serde_json::Value,
    ) -> Result<ActionSnapshot, ThingError> {
        let descriptor = self.actions.lookup(name)?;
        let action = descriptor.instantiate(Arc::downgrade(&self.properties), input)?;
        let snapshot = action.snapshot();
        let id = self.executor.submit(action);
        tracing::info!(action = %name, %id, "action requested");
        Ok(snapshot)
    }

    /// Snapshot of action `id`, which must be an invocation of `name`.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError::NotFound`] if the id is unknown or belongs to another action.
    pub fn action_status(&self, name: &str, id: ActionId) -> Result<ActionSnapshot, ActionError> {
        let snapshot = self.executor.status_of(id)?;
        if snapshot.name != name {
            return Err(request_not_found(id));
        }
        Ok(snapshot)
    }

    /// Snapshot of action `id`, whatever its name.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError::NotFound`] for unknown or evicted ids.
    pub fn action_status_by_id(&self, id: ActionId) -> Result<ActionSnapshot, ActionError> {
        self.executor.status_of(id)
    }

    /// Request cancellation of action `id`.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError::NotFound`] or [`ActionError::AlreadyTerminal`].
    pub fn cancel_action(&self, id: ActionId) -> Result<ActionStatus, ActionError> {
        self.executor.cancel(id)
    }

    /// Cancel (if still active) and forget action `id` of action `name`.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError::NotFound`] if the id is unknown or belongs to another action.
    pub fn remove_action(&self, name: &str, id: ActionId) -> Result<ActionSnapshot, ActionError> {
        self.action_status(name, id)?;
        self.executor.remove(id)
    }

    /// Tracked actions, oldest first, optionally only those named `name`.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError::NotFound`] if `name` is not a registered action.
    pub fn list_actions(&self, name: Option<&str>) -> Result<Vec<ActionSnapshot>, ActionError> {
        if let Some(name) = name {
            self.actions.lookup(name)?;
        }
        Ok(self.executor.list(name))
    }

    /// Receive every [`ThingEvent`] published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ThingEvent> {
        self.bus.subscribe()
    }

    /// The thing description document.
    #[must_use]
    pub fn description(&self) -> ThingDescription {
        let properties: BTreeMap<_, _> = self
            .properties
            .descriptions()
            .into_iter()
            .map(|(name, metadata)| {
                let href = format!("/properties/{name}");
                (
                    name,
                    PropertyDescription {
                        metadata,
                        links: vec![Link::new("property", href)],
                    },
                )
            })
            .collect();
        let actions = self
            .actions
            .descriptors()
            .map(|descriptor| (descriptor.name().to_string(), descriptor.description()))
            .collect();

        ThingDescription {
            id: self.info.id.clone(),
            title: self.info.title.clone(),
            context: self.info.context.clone(),
            types: self.info.types.clone(),
            description: self.info.description.clone(),
            properties,
            actions,
            links: vec![
                Link::new("properties", "/properties"),
                Link::new("actions", "/actions"),
                Link::new("alternate", "/events/stream").with_media_type("text/event-stream"),
            ],
        }
    }
}

impl std::fmt::Debug for Thing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Thing")
            .field("info", &self.info)
            .field("properties", &self.properties)
            .field("actions", &self.actions)
            .field("executor", &self.executor)
            .finish_non_exhaustive()
    }
}

/// Step-by-step builder for [`Thing`].
///
/// Definition errors are collected lazily and reported by [`build`](Self::build).
pub struct ThingBuilder {
    info: ThingInfo,
    properties: Vec<PropertyDefinition>,
    actions: Vec<ActionDescriptor>,
    config: ExecutorConfig,
    runtime: Option<Handle>,
    event_capacity: usize,
}

impl ThingBuilder {
    /// Add a property constrained by its metadata only.
    #[must_use]
    pub fn property(
        self,
        name: impl Into<String>,
        initial: impl Into<PropertyValue>,
        metadata: PropertyMetadata,
    ) -> Self {
        self.property_with_validator(name, initial, metadata, None)
    }

    /// Add a property with an extra write check.
    #[must_use]
    pub fn property_with_validator(
        mut self,
        name: impl Into<String>,
        initial: impl Into<PropertyValue>,
        metadata: PropertyMetadata,
        validator: Option<PropertyValidator>,
    ) -> Self {
        self.properties.push(PropertyDefinition {
            name: name.into(),
            initial: initial.into(),
            metadata,
            validator,
        });
        self
    }

    #[must_use]
    pub fn action(mut self, descriptor: ActionDescriptor) -> Self {
        self.actions.push(descriptor);
        self
    }

    #[must_use]
    pub fn executor_config(mut self, config: ExecutorConfig) -> Self {
        self.config = config;
        self
    }

    /// Runtime actions are spawned on. Defaults to the ambient one at build time.
    #[must_use]
    pub fn runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    #[must_use]
    pub fn event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity.max(1);
        self
    }

    /// Freeze the definitions and return the [`Thing`].
    ///
    /// # Errors
    ///
    /// - [`ThingError::Validation`] if the identity is invalid
    /// - [`ThingError::Definition`] for duplicate names, invalid initial values
    ///   or incoherent metadata
    /// - [`ThingError::NoRuntime`] if no runtime was given and none is current
    pub fn build(self) -> Result<Thing, ThingError> {
        self.info.validate()?;
        let runtime = match self.runtime {
            Some(runtime) => runtime,
            None => Handle::try_current().map_err(|_| ThingError::NoRuntime)?,
        };

        let mut store = PropertyStore::new();
        for definition in self.properties {
            store.define(
                definition.name,
                definition.initial,
                definition.metadata,
                definition.validator,
            )?;
        }
        let properties = Arc::new(store);

        let mut actions = ActionRegistry::new();
        for descriptor in self.actions {
            actions.register(descriptor)?;
        }

        let bus = Arc::new(InProcessEventBus::new(self.event_capacity));
        let mut forwarders = Vec::with_capacity(properties.len());
        for (name, _) in properties.iter() {
            let forward_to = Arc::clone(&bus);
            let property = name.to_string();
            forwarders.push(properties.observe(name, move |_, value| {
                forward_to.publish(ThingEvent::PropertyStatus {
                    name: property.clone(),
                    value: value.clone(),
                });
            })?);
        }

        let executor = ActionExecutor::new(runtime, self.config, bus.clone());

        tracing::info!(
            thing = %self.info.id,
            properties = properties.len(),
            actions = actions.len(),
            "thing ready"
        );
        Ok(Thing {
            info: self.info,
            properties,
            actions,
            executor,
            bus,
            _forwarders: forwarders,
        })
    }
}

fn request_not_found(id: ActionId) -> ActionError {
    NotFoundError {
        entity: "ActionRequest",
        id: id.to_string(),
    }
    .into()
}

//! # nlpthing-app
//!
//! Device runtime: observable properties, registered actions and the
//! asynchronous executor that runs them.
//!
//! ## Responsibilities
//! - [`value_cell`]: a validated, observable value with synchronous subscribers
//! - [`property_store`]: the named, schema-constrained state of a thing
//! - [`action_registry`]: action names bound to input schemas and handlers
//! - [`executor`]: off-caller execution, status tracking, history eviction
//! - [`thing`]: the façade a transport drives
//! - [`nlp`]: the NLP thing definition, computing through a [`ports::TextAnalyzer`]
//! - Define **port traits** that adapters implement (`EventPublisher`, `TextAnalyzer`)
//!
//! ## Dependency rule
//! Depends on `nlpthing-domain` only (plus `tokio` for tasks and channels).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

use std::sync::{Mutex, MutexGuard, PoisonError};

pub mod action;
pub mod action_registry;
pub mod event_bus;
pub mod executor;
pub mod nlp;
pub mod ports;
pub mod property_store;
pub mod thing;
pub mod value_cell;

/// Lock a mutex, recovering the data if a panicking holder poisoned it.
///
/// Every mutex in this crate guards data that stays consistent between
/// statements, so a poisoned lock is still safe to use.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::{Arc, Mutex};

    use nlpthing_domain::event::ThingEvent;
    use nlpthing_domain::property::PropertyMetadata;
    use nlpthing_domain::value::{PropertyValue, ValueType};

    use crate::ports::EventPublisher;
    use crate::property_store::PropertyStore;

    /// Publisher that keeps every event it receives.
    #[derive(Debug, Default)]
    pub struct RecordingPublisher {
        events: Mutex<Vec<ThingEvent>>,
    }

    impl RecordingPublisher {
        pub fn events(&self) -> Vec<ThingEvent> {
            self.events.lock().unwrap().clone()
        }
    }

    impl EventPublisher for RecordingPublisher {
        fn publish(&self, event: ThingEvent) {
            self.events.lock().unwrap().push(event);
        }
    }

    /// Store with a single `score` number in `0..=1`, initially `1`.
    pub fn number_store() -> Arc<PropertyStore> {
        let mut store = PropertyStore::new();
        store
            .define(
                "score",
                PropertyValue::Integer(1),
                PropertyMetadata::builder(ValueType::Number)
                    .title("Score")
                    .minimum(0.0)
                    .maximum(1.0)
                    .build()
                    .unwrap(),
                None,
            )
            .unwrap();
        Arc::new(store)
    }
}

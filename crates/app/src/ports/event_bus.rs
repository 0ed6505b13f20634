//! Event bus port — fan-out of thing events.

use std::sync::Arc;

use nlpthing_domain::event::ThingEvent;

/// Publishes thing events to interested subscribers.
///
/// Called from property subscribers and from action tasks, so publishing is
/// synchronous and must not block.
pub trait EventPublisher: Send + Sync {
    /// Publish an event to all current subscribers.
    fn publish(&self, event: ThingEvent);
}

impl<T: EventPublisher + ?Sized> EventPublisher for Arc<T> {
    fn publish(&self, event: ThingEvent) {
        (**self).publish(event);
    }
}

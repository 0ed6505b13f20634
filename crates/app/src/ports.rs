//! Port definitions — traits that adapters implement.
//!
//! Ports are the boundaries between the device runtime and the outside world.
//! They are defined here (in `app`) so that both the runtime and the adapter
//! layer can depend on them without creating circular dependencies.

pub mod analyzer;
pub mod event_bus;

pub use analyzer::TextAnalyzer;
pub use event_bus::EventPublisher;

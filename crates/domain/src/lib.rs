//! # nlpthing-domain
//!
//! Pure domain model for the nlpthing device runtime.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **property values** and the **metadata** that constrains them
//! - Define **input schemas** declared by actions and their validation
//! - Define the **action lifecycle** (status, transitions, snapshots)
//! - Define the **thing description** document and the **events** pushed to observers
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.

pub mod error;
pub mod id;
pub mod time;

pub mod action;
pub mod event;
pub mod property;
pub mod schema;
pub mod thing;
pub mod value;

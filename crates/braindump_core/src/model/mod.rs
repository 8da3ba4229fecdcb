//! Domain model for classified brain-dump items.
//!
//! # Responsibility
//! - Define the durable `Item` record shared by event/task/note views.
//! - Define the fixed tag palette used by classification and rendering.
//!
//! # Invariants
//! - Every item is identified by a stable, unique `ItemId`.
//! - Deletion is a hard removal from the store; there are no tombstones.

pub mod item;
pub mod tag;

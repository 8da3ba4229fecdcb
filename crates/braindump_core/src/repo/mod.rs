//! Persistence layer: key/value storage and the item collection codec.
//!
//! # Responsibility
//! - Define the key/value contract the item store and analytics build on.
//! - Keep SQLite details and JSON decoding out of the service layer.
//!
//! # Invariants
//! - Item loads never fail from the caller's perspective; malformed records
//!   are dropped one at a time.
//! - Item saves never fail from the caller's perspective; errors are logged.

pub mod item_store;
pub mod kv_store;

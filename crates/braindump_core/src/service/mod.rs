//! Use-case services over the classifier and the item store.
//!
//! # Responsibility
//! - Turn raw text into new items (`process_service`).
//! - Apply user actions to the persisted item sequence (`item_service`).
//! - Keep front ends free of storage and HTTP details.

pub mod item_service;
pub mod process_service;

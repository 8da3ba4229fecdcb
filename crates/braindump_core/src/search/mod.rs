//! In-memory filtering and match highlighting over items.
//!
//! # Invariants
//! - Matching is case-insensitive and treats the query as literal text.
//! - A blank query matches every item of the selected kind.

pub mod filter;
pub mod highlight;

//! Flutter bridge for Braindump core.

pub mod api;

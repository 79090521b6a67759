//! Domain layer types and invariants.

pub mod app;
pub mod content;
pub mod error;
pub mod ids;
pub mod options;

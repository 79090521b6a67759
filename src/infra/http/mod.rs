//! HTTP framework adapters over the section loader.

mod middleware;

pub use middleware::{ContentState, content_layer};

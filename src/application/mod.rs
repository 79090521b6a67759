//! Application services: the section loader and its collaborator seams.

pub mod error;
pub mod fetcher;
pub mod loader;

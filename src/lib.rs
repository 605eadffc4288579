//! Toucan - a static site build pipeline over a typed content graph.
//!
//! Contents are converted against declared content types, linked by
//! relations, queried, and assembled into scoped render contexts per
//! pipeline. See [`build::build_site`] for the entry point.

pub mod build;
pub mod cli;
pub mod config;
pub mod content;
pub mod error;
pub mod iterator;
pub mod loader;
pub mod logger;
pub mod query;
pub mod render;
pub mod schema;
pub mod transform;
pub mod utils;
pub mod validate;

#[cfg(test)]
mod fixtures;

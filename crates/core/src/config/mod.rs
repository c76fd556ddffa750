//! Configuration loading and schema definitions
//!
//! Layout settings, repository declarations and the optional explicit
//! project registry, read from `.relayout.toml`.

mod loader;
mod schema;

pub use loader::{Config, CONFIG_CANDIDATES};
pub use schema::*;

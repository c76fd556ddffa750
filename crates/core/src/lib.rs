//! Core utilities for relayout
//!
//! This crate provides shared functionality used by the layout configurator
//! and the command-line tool:
//!
//! - **Error handling**: Errors with codes, context, and recovery suggestions
//! - **Configuration**: TOML-based configuration with validation
//! - **Paths**: Lexical normalisation and absolute path resolution
//!
//! # Example
//!
//! ```rust,no_run
//! use relayout_core::{config::Config, paths};
//!
//! let config = Config::load(None, std::path::Path::new(".")).expect("invalid config");
//! let build = paths::normalize(std::path::Path::new("/repo/android/build/../../build"));
//! assert_eq!(build, std::path::PathBuf::from("/repo/build"));
//! # let _ = config;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod paths;

pub use error::{Error, ErrorCode, Result, ResultExt};

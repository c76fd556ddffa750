//! Terminal output utilities for relayout
//!
//! Provides shared CLI functionality:
//! - Status messages
//! - Size, duration and count formatting
//! - Spinners for filesystem work

#![warn(missing_docs)]

pub mod output;
pub mod progress;

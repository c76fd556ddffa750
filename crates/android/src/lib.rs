//! Shared build directory layout for Android Gradle projects
//!
//! This crate relocates every subproject's output into one build folder
//! shared with the rest of the repository:
//! - Project model and registry
//! - Build root computation and per-subproject output directories
//! - Evaluation ordering anchored on the application module
//! - Repository declarations
//! - Cleaning the shared build tree
//! - Reading subprojects from `settings.gradle(.kts)`
//!
//! # Example
//!
//! ```rust
//! use relayout_android::layout::{BuildLayout, LayoutSettings};
//! use relayout_android::project::{Project, ProjectRegistry};
//!
//! let mut registry = ProjectRegistry::new(Project::root("/repo/android"));
//! registry.add(Project::new("app", "/repo/android/app")).unwrap();
//!
//! let layout = BuildLayout::configure(&mut registry, &LayoutSettings::default()).unwrap();
//! assert_eq!(layout.build_root, std::path::PathBuf::from("/repo/build"));
//! assert_eq!(
//!     registry.get("app").unwrap().build_dir,
//!     std::path::PathBuf::from("/repo/build/app")
//! );
//! ```

#![warn(missing_docs)]

pub mod clean;
pub mod layout;
pub mod plan;
pub mod project;
pub mod repositories;
pub mod settings;

pub use layout::{BuildLayout, LayoutSettings};
pub use project::{Project, ProjectRegistry};

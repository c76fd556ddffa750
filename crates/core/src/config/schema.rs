//! Configuration schema definitions

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration schema
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConfigSchema {
    /// Build directory wiring
    #[serde(default)]
    pub layout: LayoutConfig,

    /// Dependency repositories declared for every project
    #[serde(default)]
    pub repositories: RepositoriesConfig,

    /// Log output
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Explicit project registry; when empty the settings script is read instead
    #[serde(default)]
    pub projects: Vec<ProjectEntry>,
}

impl ConfigSchema {
    /// Check values that deserialize fine but cannot produce a usable layout
    pub fn validate(&self) -> Result<()> {
        if self.layout.build_dir_offset.trim().is_empty() {
            return Err(Error::config_validation("layout.build_dir_offset must not be empty"));
        }
        if Path::new(&self.layout.default_build_dir).is_absolute() {
            return Err(Error::config_validation(format!(
                "layout.default_build_dir must be relative to the project directory, got {}",
                self.layout.default_build_dir
            )));
        }
        if let Some(anchor) = self
            .layout
            .evaluation_anchors
            .iter()
            .find(|a| a.trim_start_matches(':').trim().is_empty())
        {
            return Err(Error::config_validation(format!(
                "layout.evaluation_anchors contains an empty project name: {anchor:?}"
            )));
        }
        for entry in &self.projects {
            if entry.name.trim().is_empty() {
                return Err(Error::config_validation(format!(
                    "[[projects]] entry for {} has an empty name",
                    entry.dir.display()
                )));
            }
        }
        for entry in &self.repositories.order {
            if let RepositoryEntry::Custom { name, url } = entry {
                if name.trim().is_empty() || url.trim().is_empty() {
                    return Err(Error::config_validation(
                        "custom repositories need both a name and a url",
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Build directory wiring
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Offset applied to the root project's default build directory
    #[serde(default = "default_build_dir_offset")]
    pub build_dir_offset: String,

    /// Build directory of a project before relocation, relative to its dir
    #[serde(default = "default_default_build_dir")]
    pub default_build_dir: String,

    /// Subprojects evaluated before every other subproject
    #[serde(default = "default_evaluation_anchors")]
    pub evaluation_anchors: Vec<String>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            build_dir_offset: default_build_dir_offset(),
            default_build_dir: default_default_build_dir(),
            evaluation_anchors: default_evaluation_anchors(),
        }
    }
}

fn default_build_dir_offset() -> String {
    "../../build".to_string()
}

fn default_default_build_dir() -> String {
    "build".to_string()
}

fn default_evaluation_anchors() -> Vec<String> {
    vec!["app".to_string()]
}

/// Repository declarations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoriesConfig {
    /// Repositories in lookup order
    #[serde(default = "default_repository_order")]
    pub order: Vec<RepositoryEntry>,
}

impl Default for RepositoriesConfig {
    fn default() -> Self {
        Self {
            order: default_repository_order(),
        }
    }
}

fn default_repository_order() -> Vec<RepositoryEntry> {
    vec![
        RepositoryEntry::Named("google".to_string()),
        RepositoryEntry::Named("mavenCentral".to_string()),
    ]
}

/// A repository given by well-known name or explicit url
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RepositoryEntry {
    /// `"google"`, `"mavenCentral"`
    Named(String),
    /// `{ name = "jitpack", url = "https://jitpack.io" }`
    Custom {
        /// Display name
        name: String,
        /// Base url
        url: String,
    },
}

/// Log output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

/// One subproject in the explicit registry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectEntry {
    /// Project name; also the name of its output directory
    pub name: String,

    /// Project directory, relative to the root project
    pub dir: PathBuf,

    /// Gradle-style path such as `:feature:login`; defaults to `:<name>`
    #[serde(default)]
    pub path: Option<String>,
}

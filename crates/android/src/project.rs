//! Project model and registry
//!
//! The registry is an explicit value handed to the configurator; nothing in
//! this crate keeps a global project list.

use relayout_core::config::ProjectEntry;
use relayout_core::error::{Error, Result};
use relayout_core::paths;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Build directory a project uses before relocation, relative to its dir
pub const DEFAULT_BUILD_DIR: &str = "build";

/// A root project or subproject
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Project name; subprojects get an output directory of this name
    pub name: String,
    /// Gradle-style path: `:` for the root, `:app`, `:feature:login`
    pub path: String,
    /// Project directory
    pub dir: PathBuf,
    /// Build directory before any relocation
    pub default_build_dir: PathBuf,
    /// Current build directory
    pub build_dir: PathBuf,
}

impl Project {
    /// A subproject at `dir` named `name`, with Gradle path `:<name>`
    pub fn new(name: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        let name = name.into();
        let path = format!(":{name}");
        Self::with_parts(name, path, dir.into())
    }

    /// The root project at `dir`, named after its directory
    pub fn root(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        let name = dir
            .file_name()
            .map_or_else(|| "root".to_string(), |n| n.to_string_lossy().into_owned());
        Self::with_parts(name, ":".to_string(), dir)
    }

    fn with_parts(name: String, path: String, dir: PathBuf) -> Self {
        let dir = paths::normalize(&dir);
        let default_build_dir = dir.join(DEFAULT_BUILD_DIR);
        Self {
            name,
            path,
            build_dir: default_build_dir.clone(),
            default_build_dir,
            dir,
        }
    }

    /// Override the Gradle path
    #[must_use]
    pub fn with_gradle_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Rename the project (used for `rootProject.name`)
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Use a different pre-relocation build directory, relative to the project dir
    #[must_use]
    pub fn with_default_build_dir(mut self, relative: impl AsRef<Path>) -> Self {
        self.default_build_dir = paths::resolve_against(&self.dir, relative.as_ref());
        self.build_dir = self.default_build_dir.clone();
        self
    }

    /// Whether the build directory has been moved away from its default
    pub fn is_relocated(&self) -> bool {
        self.build_dir != self.default_build_dir
    }

    /// Resolve every directory against the working directory, leaving
    /// absolute ones untouched apart from normalisation
    pub fn make_absolute(&mut self) -> Result<()> {
        self.dir = paths::absolute(&self.dir)?;
        self.default_build_dir = paths::absolute(&self.default_build_dir)?;
        self.build_dir = paths::absolute(&self.build_dir)?;
        Ok(())
    }

    fn rebase(mut self, root_dir: &Path) -> Self {
        if self.dir.is_relative() {
            let relative_build = self
                .default_build_dir
                .strip_prefix(&self.dir)
                .map(Path::to_path_buf)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_BUILD_DIR));
            self.dir = paths::resolve_against(root_dir, &self.dir);
            self.default_build_dir = self.dir.join(relative_build);
            self.build_dir = self.default_build_dir.clone();
        }
        self
    }
}

/// The root project plus its subprojects, keyed by name
#[derive(Debug, Clone)]
pub struct ProjectRegistry {
    root: Project,
    subprojects: Vec<Project>,
}

impl ProjectRegistry {
    /// Create a registry for `root` with no subprojects
    pub fn new(root: Project) -> Self {
        Self {
            root,
            subprojects: Vec::new(),
        }
    }

    /// Build a registry from `[[projects]]` configuration entries
    pub fn from_entries(
        root: Project,
        entries: &[ProjectEntry],
        default_build_dir: &Path,
    ) -> Result<Self> {
        let mut registry = Self::new(root);
        for entry in entries {
            let mut project =
                Project::new(&entry.name, &entry.dir).with_default_build_dir(default_build_dir);
            if let Some(path) = &entry.path {
                project = project.with_gradle_path(path);
            }
            registry.add(project)?;
        }
        Ok(registry)
    }

    /// Register a subproject. Relative dirs are taken relative to the root project.
    pub fn add(&mut self, project: Project) -> Result<()> {
        if self.position(&project.name).is_some()
            || self.subprojects.iter().any(|p| p.path == project.path)
        {
            return Err(Error::duplicate_project(&project.name));
        }
        tracing::trace!(name = %project.name, path = %project.path, "Registered subproject");
        self.subprojects.push(project.rebase(&self.root.dir));
        Ok(())
    }

    /// The root project
    pub fn root(&self) -> &Project {
        &self.root
    }

    /// The root project, mutably
    pub fn root_mut(&mut self) -> &mut Project {
        &mut self.root
    }

    /// Subprojects in registration order
    pub fn subprojects(&self) -> &[Project] {
        &self.subprojects
    }

    /// Subprojects in registration order, mutably
    pub fn subprojects_mut(&mut self) -> &mut [Project] {
        &mut self.subprojects
    }

    /// Make the root project and every subproject absolute.
    ///
    /// Subprojects added under a relative root stay relative until this runs.
    pub fn resolve_dirs(&mut self) -> Result<()> {
        self.root.make_absolute()?;
        for project in &mut self.subprojects {
            project.make_absolute()?;
        }
        Ok(())
    }

    /// Look up a subproject by name (`app`) or Gradle path (`:app`)
    pub fn get(&self, key: &str) -> Option<&Project> {
        self.position(key).map(|i| &self.subprojects[i])
    }

    /// Whether a subproject is registered under `key`
    pub fn contains(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    /// Names of all subprojects in registration order
    pub fn names(&self) -> Vec<&str> {
        self.subprojects.iter().map(|p| p.name.as_str()).collect()
    }

    /// Number of subprojects
    pub fn len(&self) -> usize {
        self.subprojects.len()
    }

    /// Whether there are no subprojects
    pub fn is_empty(&self) -> bool {
        self.subprojects.is_empty()
    }

    fn position(&self, key: &str) -> Option<usize> {
        if key.starts_with(':') {
            if let Some(i) = self.subprojects.iter().position(|p| p.path == key) {
                return Some(i);
            }
        }
        let name = key.trim_start_matches(':');
        self.subprojects.iter().position(|p| p.name == name)
    }
}

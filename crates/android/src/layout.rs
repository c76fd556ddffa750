//! Build layout configuration
//!
//! Moves the root project's build directory to `<root>/build/../../build`
//! and gives every subproject under the root its own directory there. The
//! pass runs once, before any other configuration, and is idempotent.

use crate::plan::EvaluationPlan;
use crate::project::{Project, ProjectRegistry};
use crate::repositories::RepositorySet;
use relayout_core::config::ConfigSchema;
use relayout_core::error::Result;
use relayout_core::paths;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Offset from the root project's default build directory to the shared build root
pub const DEFAULT_BUILD_DIR_OFFSET: &str = "../../build";

/// Project evaluated before every other subproject unless configured otherwise
pub const DEFAULT_EVALUATION_ANCHOR: &str = "app";

/// Inputs to a configuration pass
#[derive(Debug, Clone)]
pub struct LayoutSettings {
    /// Applied to the root project's default build directory
    pub build_dir_offset: PathBuf,
    /// Subprojects evaluated first, in order
    pub evaluation_anchors: Vec<String>,
    /// Repositories declared for every project
    pub repositories: RepositorySet,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            build_dir_offset: PathBuf::from(DEFAULT_BUILD_DIR_OFFSET),
            evaluation_anchors: vec![DEFAULT_EVALUATION_ANCHOR.to_string()],
            repositories: RepositorySet::default(),
        }
    }
}

impl LayoutSettings {
    /// Settings from a loaded configuration file
    pub fn from_schema(schema: &ConfigSchema) -> Result<Self> {
        Ok(Self {
            build_dir_offset: PathBuf::from(&schema.layout.build_dir_offset),
            evaluation_anchors: schema.layout.evaluation_anchors.clone(),
            repositories: RepositorySet::from_entries(&schema.repositories.order)?,
        })
    }
}

/// Compute the shared build root from the root project's default build directory.
///
/// The result is absolute and lexically normalised. A relative
/// `default_build_dir` is resolved against the working directory, which is
/// the only way this can fail.
pub fn compute_root_build_dir(default_build_dir: &Path, offset: &Path) -> Result<PathBuf> {
    paths::absolute(&default_build_dir.join(offset))
}

/// Why a subproject kept its build directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    /// The project directory is not beneath the root project directory
    OutsideRoot {
        /// The project directory
        dir: PathBuf,
    },
}

/// What happened to one subproject's build directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AssignmentOutcome {
    /// Build directory was pointed into the shared build root
    Relocated {
        /// Previous build directory
        from: PathBuf,
        /// New build directory
        to: PathBuf,
    },
    /// Build directory was left unchanged
    Skipped {
        /// Why
        #[serde(flatten)]
        reason: SkipReason,
    },
}

/// Result of assigning one subproject
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Assignment {
    /// Subproject name
    pub project: String,
    /// What happened
    #[serde(flatten)]
    pub outcome: AssignmentOutcome,
}

impl Assignment {
    /// Whether the subproject now builds into the shared root
    pub fn is_relocated(&self) -> bool {
        matches!(self.outcome, AssignmentOutcome::Relocated { .. })
    }
}

/// Point every subproject under `root_dir` at `<root_build_dir>/<name>`.
///
/// Subprojects outside `root_dir` keep whatever build directory they had.
/// Each assignment depends only on its own subproject, so order is irrelevant.
pub fn assign_subproject_dirs(
    root_build_dir: &Path,
    root_dir: &Path,
    subprojects: &mut [Project],
) -> Vec<Assignment> {
    subprojects
        .iter_mut()
        .map(|project| {
            let outcome = if paths::is_within(&project.dir, root_dir) {
                let to = root_build_dir.join(&project.name);
                let from = std::mem::replace(&mut project.build_dir, to.clone());
                tracing::debug!(
                    project = %project.name,
                    build_dir = %to.display(),
                    "Relocated build directory"
                );
                AssignmentOutcome::Relocated { from, to }
            } else {
                tracing::debug!(
                    project = %project.name,
                    dir = %project.dir.display(),
                    "Project is outside the root project, keeping its build directory"
                );
                AssignmentOutcome::Skipped {
                    reason: SkipReason::OutsideRoot {
                        dir: project.dir.clone(),
                    },
                }
            };
            Assignment {
                project: project.name.clone(),
                outcome,
            }
        })
        .collect()
}

/// Final directory of one project after configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectLayout {
    /// Project name
    pub name: String,
    /// Gradle path
    pub path: String,
    /// Project directory
    pub dir: PathBuf,
    /// Build directory after configuration
    pub build_dir: PathBuf,
}

impl From<&Project> for ProjectLayout {
    fn from(project: &Project) -> Self {
        Self {
            name: project.name.clone(),
            path: project.path.clone(),
            dir: project.dir.clone(),
            build_dir: project.build_dir.clone(),
        }
    }
}

/// Snapshot of a completed configuration pass
#[derive(Debug, Clone, Serialize)]
pub struct BuildLayout {
    /// Shared build root; also the root project's build directory
    pub build_root: PathBuf,
    /// Root project
    pub root: ProjectLayout,
    /// Subprojects in registry order
    pub projects: Vec<ProjectLayout>,
    /// Per-subproject outcome
    pub assignments: Vec<Assignment>,
    /// Declared repositories, in lookup order
    pub repositories: RepositorySet,
    /// Evaluation ordering
    pub plan: EvaluationPlan,
}

impl BuildLayout {
    /// Run the configuration pass over `registry`.
    ///
    /// Evaluation anchors are resolved first, so a missing anchor fails before
    /// any build directory changes.
    pub fn configure(registry: &mut ProjectRegistry, settings: &LayoutSettings) -> Result<Self> {
        let mut plan = EvaluationPlan::unordered(registry);
        for anchor in &settings.evaluation_anchors {
            plan.declare_anchor(registry, anchor)?;
        }

        registry.resolve_dirs()?;
        let build_root =
            compute_root_build_dir(&registry.root().default_build_dir, &settings.build_dir_offset)?;
        let root_dir = registry.root().dir.clone();
        registry.root_mut().build_dir = build_root.clone();
        tracing::info!(build_root = %build_root.display(), "Computed shared build root");

        let assignments =
            assign_subproject_dirs(&build_root, &root_dir, registry.subprojects_mut());

        Ok(Self {
            build_root,
            root: ProjectLayout::from(registry.root()),
            projects: registry.subprojects().iter().map(ProjectLayout::from).collect(),
            assignments,
            repositories: settings.repositories.clone(),
            plan,
        })
    }

    /// Final layout of a subproject by name (`login`) or Gradle path (`:feature:login`)
    pub fn project(&self, key: &str) -> Option<&ProjectLayout> {
        if key.starts_with(':') {
            if let Some(project) = self.projects.iter().find(|p| p.path == key) {
                return Some(project);
            }
        }
        let name = key.trim_start_matches(':');
        self.projects.iter().find(|p| p.name == name)
    }

    /// Subprojects left outside the shared build root
    pub fn skipped(&self) -> impl Iterator<Item = &Assignment> {
        self.assignments.iter().filter(|a| !a.is_relocated())
    }

    /// Pretty JSON for machine consumption
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

//! Reading subprojects from `settings.gradle.kts` / `settings.gradle`
//!
//! This is the project registry collaborator: the layout itself never
//! discovers projects. Only the declarative subset is understood:
//! `include(...)`, `rootProject.name = ...` and
//! `project(":x").projectDir = file("...")`.

use crate::project::{Project, ProjectRegistry};
use once_cell::sync::Lazy;
use regex::Regex;
use relayout_core::config::ConfigSchema;
use relayout_core::error::{Error, Result, ResultExt};
use relayout_core::paths;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Settings script names, Kotlin DSL first
pub const SETTINGS_FILES: [&str; 2] = ["settings.gradle.kts", "settings.gradle"];

static BLOCK_COMMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)/\*.*?\*/").expect("block comment regex"));

static INCLUDE_CALL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\binclude\s*\(([^)]*)\)").expect("include call regex"));

static INCLUDE_BARE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*include\s+([^(\n][^\n]*)$").expect("include regex"));

static QUOTED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"["']([^"']+)["']"#).expect("quoted string regex"));

static ROOT_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"rootProject\.name\s*=\s*["']([^"']+)["']"#).expect("root name regex")
});

static PROJECT_DIR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r#"project\(\s*["']([^"']+)["']\s*\)\.projectDir\s*=\s*"#,
        r#"(?:file|new\s+File)\(\s*(?:[A-Za-z_.]+\s*,\s*)?["']([^"']+)["']\s*\)"#,
    ))
    .expect("projectDir regex")
});

/// A project declared by a settings script
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncludedProject {
    /// Gradle path, always starting with `:`
    pub path: String,
    /// Explicit `projectDir`, relative to the root project
    pub dir: Option<PathBuf>,
}

impl IncludedProject {
    /// Last path segment
    pub fn name(&self) -> &str {
        self.path.rsplit(':').next().unwrap_or(&self.path)
    }

    /// Directory Gradle uses unless `projectDir` is overridden
    pub fn default_dir(&self) -> PathBuf {
        self.path.trim_start_matches(':').split(':').collect()
    }
}

/// Parsed settings script
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    /// `rootProject.name`, if set
    pub root_name: Option<String>,
    /// Included projects in declaration order, parents before children
    pub projects: Vec<IncludedProject>,
}

impl Settings {
    /// Parse settings script source
    pub fn parse(source: &str) -> Self {
        let source = strip_comments(source);

        let mut declared: Vec<String> = Vec::new();
        let mut push = |raw: &str| {
            let path = if raw.starts_with(':') {
                raw.to_string()
            } else {
                format!(":{raw}")
            };
            // Gradle creates intermediate projects for nested paths
            let segments: Vec<&str> = path.trim_start_matches(':').split(':').collect();
            for depth in 1..=segments.len() {
                let prefix = format!(":{}", segments[..depth].join(":"));
                if !declared.contains(&prefix) {
                    declared.push(prefix);
                }
            }
        };

        let mut calls: Vec<(usize, &str)> = INCLUDE_CALL
            .captures_iter(&source)
            .filter_map(|c| c.get(1).map(|m| (m.start(), m.as_str())))
            .collect();
        calls.extend(
            INCLUDE_BARE
                .captures_iter(&source)
                .filter_map(|c| c.get(1).map(|m| (m.start(), m.as_str()))),
        );
        calls.sort_by_key(|(pos, _)| *pos);

        for (_, args) in calls {
            for quoted in QUOTED.captures_iter(args) {
                push(&quoted[1]);
            }
        }

        let dirs: HashMap<String, PathBuf> = PROJECT_DIR
            .captures_iter(&source)
            .map(|c| {
                let path = c[1].to_string();
                let path = if path.starts_with(':') { path } else { format!(":{path}") };
                (path, PathBuf::from(&c[2]))
            })
            .collect();

        let root_name = ROOT_NAME.captures(&source).map(|c| c[1].to_string());

        Self {
            root_name,
            projects: declared
                .into_iter()
                .map(|path| IncludedProject {
                    dir: dirs.get(&path).cloned(),
                    path,
                })
                .collect(),
        }
    }

    /// Read the first settings script found in `root_dir`
    pub fn discover(root_dir: &Path) -> Result<Option<(PathBuf, Self)>> {
        for name in SETTINGS_FILES {
            let file = root_dir.join(name);
            if file.is_file() {
                let source = std::fs::read_to_string(&file)
                    .map_err(Error::from)
                    .context(format!("Reading {}", file.display()))?;
                tracing::debug!(file = %file.display(), "Parsed settings script");
                return Ok(Some((file, Self::parse(&source))));
            }
        }
        Ok(None)
    }

    /// Turn the declarations into a registry rooted at `root`
    pub fn into_registry(self, root: Project, default_build_dir: &Path) -> Result<ProjectRegistry> {
        let root = match self.root_name {
            Some(name) => root.with_name(name),
            None => root,
        };
        let mut registry = ProjectRegistry::new(root);
        for included in self.projects {
            let dir = included.dir.clone().unwrap_or_else(|| included.default_dir());
            let project = Project::new(included.name(), dir)
                .with_gradle_path(&included.path)
                .with_default_build_dir(default_build_dir);
            registry.add(project)?;
        }
        Ok(registry)
    }
}

fn strip_comments(source: &str) -> String {
    let without_blocks = BLOCK_COMMENT.replace_all(source, "");
    without_blocks
        .lines()
        .filter(|line| !line.trim_start().starts_with("//"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Build the registry for `root_dir`: `[[projects]]` from the configuration
/// when present, otherwise the settings script, otherwise no subprojects.
pub fn load_registry(root_dir: &Path, schema: &ConfigSchema) -> Result<ProjectRegistry> {
    let default_build_dir = Path::new(&schema.layout.default_build_dir);
    let root = Project::root(paths::absolute(root_dir)?).with_default_build_dir(default_build_dir);

    if !schema.projects.is_empty() {
        return ProjectRegistry::from_entries(root, &schema.projects, default_build_dir);
    }

    match Settings::discover(&root.dir)? {
        Some((file, settings)) => settings
            .into_registry(root, default_build_dir)
            .context(format!("Declared in {}", file.display())),
        None => {
            tracing::warn!(
                root = %root.dir.display(),
                "No settings script or [[projects]] found; configuration fails unless \
                 layout.evaluation_anchors is empty"
            );
            Ok(ProjectRegistry::new(root))
        }
    }
}

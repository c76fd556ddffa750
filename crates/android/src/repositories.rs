//! Dependency repositories
//!
//! Declared for every project in lookup order. Nothing here contacts them.

use relayout_core::config::RepositoryEntry;
use relayout_core::error::{Error, Result};
use serde::Serialize;

/// A Maven repository reachable by name
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Repository {
    /// Name as written in build scripts
    pub name: String,
    /// Base url
    pub url: String,
}

impl Repository {
    /// Google's Maven repository
    pub fn google() -> Self {
        Self::custom("google", "https://dl.google.com/dl/android/maven2/")
    }

    /// Maven Central
    pub fn maven_central() -> Self {
        Self::custom("mavenCentral", "https://repo.maven.apache.org/maven2/")
    }

    /// The Gradle plugin portal
    pub fn gradle_plugin_portal() -> Self {
        Self::custom("gradlePluginPortal", "https://plugins.gradle.org/m2/")
    }

    /// Any repository given by name and url
    pub fn custom(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }

    /// Resolve a well-known repository name
    pub fn well_known(name: &str) -> Option<Self> {
        match name {
            "google" => Some(Self::google()),
            "mavenCentral" => Some(Self::maven_central()),
            "gradlePluginPortal" => Some(Self::gradle_plugin_portal()),
            _ => None,
        }
    }

    /// Resolve a configuration entry
    pub fn from_entry(entry: &RepositoryEntry) -> Result<Self> {
        match entry {
            RepositoryEntry::Named(name) => {
                Self::well_known(name).ok_or_else(|| Error::unknown_repository(name))
            }
            RepositoryEntry::Custom { name, url } => Ok(Self::custom(name, url)),
        }
    }
}

/// Repositories in the order they are queried
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RepositorySet(Vec<Repository>);

impl Default for RepositorySet {
    fn default() -> Self {
        Self(vec![Repository::google(), Repository::maven_central()])
    }
}

impl RepositorySet {
    /// An empty set
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Resolve configuration entries, keeping their order
    pub fn from_entries(entries: &[RepositoryEntry]) -> Result<Self> {
        let mut set = Self::new();
        for entry in entries {
            set.declare(Repository::from_entry(entry)?)?;
        }
        Ok(set)
    }

    /// Append a repository; a second declaration of the same name is rejected
    pub fn declare(&mut self, repository: Repository) -> Result<()> {
        if self.0.iter().any(|r| r.name == repository.name) {
            return Err(Error::config_validation(format!(
                "Repository '{}' is declared more than once",
                repository.name
            )));
        }
        self.0.push(repository);
        Ok(())
    }

    /// Repositories in lookup order
    pub fn iter(&self) -> std::slice::Iter<'_, Repository> {
        self.0.iter()
    }

    /// Names in lookup order
    pub fn names(&self) -> Vec<&str> {
        self.0.iter().map(|r| r.name.as_str()).collect()
    }

    /// Number of repositories
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no repository is declared
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a RepositorySet {
    type Item = &'a Repository;
    type IntoIter = std::slice::Iter<'a, Repository>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relayout_core::ErrorCode;

    #[test]
    fn test_default_order_is_google_then_maven_central() {
        let set = RepositorySet::default();
        assert_eq!(set.names(), vec!["google", "mavenCentral"]);
    }

    #[test]
    fn test_from_entries_mixed() {
        let set = RepositorySet::from_entries(&[
            RepositoryEntry::Named("mavenCentral".into()),
            RepositoryEntry::Custom {
                name: "jitpack".into(),
                url: "https://jitpack.io".into(),
            },
        ])
        .unwrap();

        assert_eq!(set.names(), vec!["mavenCentral", "jitpack"]);
        assert_eq!(set.iter().nth(1).unwrap().url, "https://jitpack.io");
    }

    #[test]
    fn test_unknown_name_is_rejected() {
        let err = Repository::from_entry(&RepositoryEntry::Named("jcenter".into())).unwrap_err();
        assert_eq!(err.code, ErrorCode::UnknownRepository);
    }

    #[test]
    fn test_duplicate_declaration_is_rejected() {
        let mut set = RepositorySet::default();
        assert!(set.declare(Repository::google()).is_err());
        assert_eq!(set.len(), 2);
    }
}

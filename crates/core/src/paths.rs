//! Path utilities
//!
//! Build layouts are pure path arithmetic: nothing here touches the
//! filesystem except [`absolute`], which may consult the working directory.

use crate::error::{Error, Result};
use std::path::{Component, Path, PathBuf};

/// Lexically normalise a path, folding `.` and `..` components.
///
/// Symlinks are not resolved. A `..` at the filesystem root stays at the
/// root; leading `..` components of a relative path are kept.
#[must_use]
pub fn normalize(path: &Path) -> PathBuf {
    let mut out: Vec<Component<'_>> = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }

    if out.is_empty() {
        return PathBuf::from(".");
    }
    out.iter().collect()
}

/// Resolve `path` against the working directory (if relative) and normalise.
pub fn absolute(path: &Path) -> Result<PathBuf> {
    let resolved = std::path::absolute(path).map_err(|e| {
        Error::from(e).with_context(format!("Resolving {}", path.display()))
    })?;
    Ok(normalize(&resolved))
}

/// Resolve `path` against `base` (if relative) and normalise.
#[must_use]
pub fn resolve_against(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        normalize(path)
    } else {
        normalize(&base.join(path))
    }
}

/// Component-wise descendant check; `/repo/android2` is not under `/repo/android`.
#[must_use]
pub fn is_within(path: &Path, ancestor: &Path) -> bool {
    normalize(path).starts_with(normalize(ancestor))
}

/// Whether `path` is a filesystem root such as `/` or `C:\`.
#[must_use]
pub fn is_filesystem_root(path: &Path) -> bool {
    path.parent().is_none()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_normalize_parent_components() {
        assert_eq!(
            normalize(Path::new("/repo/android/build/../../build")),
            PathBuf::from("/repo/build")
        );
    }

    #[test]
    fn test_normalize_cur_dir() {
        assert_eq!(normalize(Path::new("/a/./b/.")), PathBuf::from("/a/b"));
    }

    #[test]
    fn test_normalize_clamps_at_root() {
        assert_eq!(normalize(Path::new("/a/../../..")), PathBuf::from("/"));
    }

    #[test]
    fn test_normalize_keeps_leading_parent_on_relative() {
        assert_eq!(normalize(Path::new("../x/../y")), PathBuf::from("../y"));
        assert_eq!(normalize(Path::new("a/..")), PathBuf::from("."));
    }

    #[test]
    fn test_resolve_against() {
        let base = Path::new("/repo/android");
        assert_eq!(resolve_against(base, Path::new("app")), PathBuf::from("/repo/android/app"));
        assert_eq!(resolve_against(base, Path::new("/elsewhere")), PathBuf::from("/elsewhere"));
    }

    #[test]
    fn test_is_within_is_component_wise() {
        assert!(is_within(Path::new("/repo/android/app"), Path::new("/repo/android")));
        assert!(is_within(Path::new("/repo/android"), Path::new("/repo/android")));
        assert!(!is_within(Path::new("/repo/android2/app"), Path::new("/repo/android")));
        assert!(!is_within(Path::new("/repo/android/../ios"), Path::new("/repo/android")));
    }

    #[test]
    fn test_absolute_of_relative_path_is_absolute() {
        let abs = absolute(Path::new("some/dir/..")).unwrap();
        assert!(abs.is_absolute());
        assert!(abs.ends_with("some"));
    }

    #[test]
    fn test_is_filesystem_root() {
        assert!(is_filesystem_root(Path::new("/")));
        assert!(!is_filesystem_root(Path::new("/repo")));
    }

    proptest! {
        #[test]
        fn prop_normalize_is_idempotent(
            segments in prop::collection::vec("[a-z]{1,6}|\\.|\\.\\.", 0..8)
        ) {
            let path = PathBuf::from("/").join(segments.join("/"));
            let once = normalize(&path);
            prop_assert_eq!(normalize(&once), once.clone());
            prop_assert!(once
                .components()
                .all(|c| !matches!(c, Component::CurDir | Component::ParentDir)));
        }
    }
}

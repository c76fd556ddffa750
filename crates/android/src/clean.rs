//! Deleting the shared build tree

use crate::layout::BuildLayout;
use relayout_core::error::{Error, Result};
use relayout_core::paths;
use serde::Serialize;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// What a clean removed, or would remove
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CleanReport {
    /// Target path
    pub path: PathBuf,
    /// Whether anything existed at the path
    pub existed: bool,
    /// Whether it was deleted
    pub removed: bool,
    /// Regular files and symlinks under the target
    pub files: usize,
    /// Directories under the target, including itself
    pub dirs: usize,
    /// Total size of the files
    pub bytes: u64,
}

/// Measure what [`clean`] would delete, without deleting it
pub fn plan_clean(target: &Path) -> Result<CleanReport> {
    let mut report = CleanReport {
        path: target.to_path_buf(),
        ..CleanReport::default()
    };

    let meta = match fs::symlink_metadata(target) {
        Ok(meta) => meta,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(report),
        Err(e) => {
            return Err(Error::from(e).with_context(format!("Inspecting {}", target.display())));
        }
    };
    report.existed = true;

    if !meta.is_dir() {
        report.files = 1;
        report.bytes = meta.len();
        return Ok(report);
    }

    for entry in WalkDir::new(target) {
        let entry = entry.map_err(|e| {
            let message = e.to_string();
            e.into_io_error()
                .map_or_else(|| Error::io(message), Error::from)
                .with_context(format!("Walking {}", target.display()))
        })?;
        if entry.file_type().is_dir() {
            report.dirs += 1;
        } else {
            report.files += 1;
            if let Ok(meta) = entry.metadata() {
                report.bytes += meta.len();
            }
        }
    }

    Ok(report)
}

/// Recursively delete `target`.
///
/// An absent target is a successful no-op, so cleaning twice is fine.
/// Failures are returned as-is and never retried.
pub fn clean(target: &Path) -> Result<CleanReport> {
    if paths::is_filesystem_root(target) {
        return Err(Error::unsafe_clean_target(target));
    }

    let mut report = plan_clean(target)?;
    if !report.existed {
        tracing::info!(path = %target.display(), "Nothing to clean");
        return Ok(report);
    }

    let removal = if report.dirs > 0 {
        fs::remove_dir_all(target)
    } else {
        fs::remove_file(target)
    };

    match removal {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => {
            return Err(Error::from(e).with_context(format!("Deleting {}", target.display())));
        }
    }

    report.removed = true;
    tracing::info!(
        path = %target.display(),
        files = report.files,
        bytes = report.bytes,
        "Deleted build directory"
    );
    Ok(report)
}

/// Clean a configured layout's build root.
///
/// Refuses when the build root contains the root project itself, which a
/// bad `build_dir_offset` such as `../..` would otherwise wipe out.
pub fn clean_layout(layout: &BuildLayout) -> Result<CleanReport> {
    check_target(&layout.build_root, &layout.root.dir)?;
    clean(&layout.build_root)
}

/// Like [`clean_layout`] but only measures
pub fn plan_clean_layout(layout: &BuildLayout) -> Result<CleanReport> {
    check_target(&layout.build_root, &layout.root.dir)?;
    plan_clean(&layout.build_root)
}

fn check_target(build_root: &Path, root_dir: &Path) -> Result<()> {
    if paths::is_filesystem_root(build_root) || paths::is_within(root_dir, build_root) {
        return Err(Error::unsafe_clean_target(build_root)
            .with_context(format!("Root project is at {}", root_dir.display())));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::LayoutSettings;
    use crate::project::{Project, ProjectRegistry};
    use relayout_core::ErrorCode;
    use tempfile::TempDir;

    fn populate(dir: &Path) {
        fs::create_dir_all(dir.join("app/intermediates")).unwrap();
        fs::write(dir.join("app/intermediates/classes.dex"), b"0123456789").unwrap();
        fs::write(dir.join("app/output.apk"), b"abc").unwrap();
    }

    #[test]
    fn test_clean_removes_tree() {
        let tmp = TempDir::new().unwrap();
        let target = tmp.path().join("build");
        populate(&target);

        let report = clean(&target).unwrap();

        assert!(report.existed);
        assert!(report.removed);
        assert_eq!(report.files, 2);
        assert_eq!(report.dirs, 3);
        assert_eq!(report.bytes, 13);
        assert!(!target.exists());
    }

    #[test]
    fn test_clean_twice_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let target = tmp.path().join("build");
        populate(&target);

        clean(&target).unwrap();
        let second = clean(&target).unwrap();

        assert!(!second.existed);
        assert!(!second.removed);
        assert!(!target.exists());
    }

    #[test]
    fn test_plan_clean_does_not_delete() {
        let tmp = TempDir::new().unwrap();
        let target = tmp.path().join("build");
        populate(&target);

        let report = plan_clean(&target).unwrap();

        assert!(report.existed);
        assert!(!report.removed);
        assert_eq!(report.files, 2);
        assert!(target.join("app/output.apk").exists());
    }

    #[test]
    fn test_clean_plain_file_target() {
        let tmp = TempDir::new().unwrap();
        let target = tmp.path().join("build");
        fs::write(&target, b"stale").unwrap();

        let report = clean(&target).unwrap();
        assert_eq!(report.files, 1);
        assert!(!target.exists());
    }

    #[test]
    fn test_clean_refuses_filesystem_root() {
        let err = clean(Path::new("/")).unwrap_err();
        assert_eq!(err.code, ErrorCode::UnsafeCleanTarget);
    }

    #[test]
    fn test_clean_layout_removes_shared_build_root() {
        let tmp = TempDir::new().unwrap();
        let root_dir = tmp.path().join("repo/android");
        fs::create_dir_all(root_dir.join("app")).unwrap();
        populate(&tmp.path().join("repo/build"));

        let mut registry = ProjectRegistry::new(Project::root(&root_dir));
        registry.add(Project::new("app", "app")).unwrap();
        let layout = BuildLayout::configure(&mut registry, &LayoutSettings::default()).unwrap();

        let report = clean_layout(&layout).unwrap();

        assert!(report.removed);
        assert!(!tmp.path().join("repo/build").exists());
        assert!(root_dir.join("app").exists());
    }

    #[test]
    fn test_clean_layout_refuses_ancestor_of_root() {
        let tmp = TempDir::new().unwrap();
        let root_dir = tmp.path().join("repo/android");
        fs::create_dir_all(&root_dir).unwrap();

        let mut registry = ProjectRegistry::new(Project::root(&root_dir));
        registry.add(Project::new("app", "app")).unwrap();
        let settings = LayoutSettings {
            build_dir_offset: PathBuf::from("../.."),
            ..LayoutSettings::default()
        };
        let layout = BuildLayout::configure(&mut registry, &settings).unwrap();

        let err = clean_layout(&layout).unwrap_err();
        assert_eq!(err.code, ErrorCode::UnsafeCleanTarget);
        assert!(root_dir.exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_clean_failure_is_reported() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new().unwrap();
        let target = tmp.path().join("build");
        populate(&target);
        let locked = target.join("app");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o555)).unwrap();

        let result = clean(&target);
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        // Root can delete regardless of permissions
        if let Err(err) = result {
            assert_eq!(err.code, ErrorCode::PermissionDenied);
            assert!(err.context.unwrap().starts_with("Deleting"));
            assert!(target.exists());
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_plan_clean_keeps_permission_error_kind() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new().unwrap();
        let target = tmp.path().join("build");
        populate(&target);
        let locked = target.join("app");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        let result = plan_clean(&target);
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        // Root can read regardless of permissions
        if let Err(err) = result {
            assert_eq!(err.code, ErrorCode::PermissionDenied);
            assert!(err.context.unwrap().starts_with("Walking"));
        }
    }
}

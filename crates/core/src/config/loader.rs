//! Configuration file loading

use super::schema::ConfigSchema;
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

/// File names probed under the root project, in order
pub const CONFIG_CANDIDATES: [&str; 3] =
    [".relayout.toml", "relayout.toml", ".config/relayout.toml"];

/// Configuration wrapper
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Parsed and validated settings
    pub schema: ConfigSchema,
    /// File the settings came from, if any
    pub path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from an explicit path, a file found under `root`, or defaults
    pub fn load(path: Option<&Path>, root: &Path) -> Result<Self> {
        let config_path = match path {
            Some(p) if !p.exists() => return Err(Error::config_not_found(p)),
            Some(p) => Some(p.to_path_buf()),
            None => find_config_file(root),
        };

        let schema = if let Some(ref p) = config_path {
            load_config_file(p)?
        } else {
            ConfigSchema::default()
        };
        schema.validate()?;

        Ok(Self {
            schema,
            path: config_path,
        })
    }
}

/// Find configuration file in standard locations
fn find_config_file(root: &Path) -> Option<PathBuf> {
    CONFIG_CANDIDATES
        .iter()
        .map(|candidate| root.join(candidate))
        .find(|candidate| candidate.is_file())
}

/// Load and parse a TOML configuration file
fn load_config_file(path: &Path) -> Result<ConfigSchema> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::from(e).with_context(format!("Failed to read config file {}", path.display()))
    })?;

    toml::from_str(&content).map_err(|e| {
        Error::from(e).with_context(format!("Failed to parse config file {}", path.display()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorCode;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.path.is_none());
        assert_eq!(config.schema.layout.build_dir_offset, "../../build");
    }

    #[test]
    fn test_config_load_without_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load(None, dir.path()).unwrap();
        assert!(config.path.is_none());
        assert_eq!(config.schema.layout.evaluation_anchors, vec!["app"]);
    }

    #[test]
    fn test_config_discovers_candidate_under_root() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(".config")).unwrap();
        std::fs::write(
            dir.path().join(".config/relayout.toml"),
            "[layout]\nbuild_dir_offset = \"../out\"\n",
        )
        .unwrap();

        let config = Config::load(None, dir.path()).unwrap();
        assert_eq!(config.path, Some(dir.path().join(".config/relayout.toml")));
        assert_eq!(config.schema.layout.build_dir_offset, "../out");
    }

    #[test]
    fn test_config_explicit_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = Config::load(Some(&dir.path().join("nope.toml")), dir.path()).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigNotFound);
    }

    #[test]
    fn test_config_parse_error_has_context() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join(".relayout.toml");
        std::fs::write(&file, "[layout\n").unwrap();

        let err = Config::load(None, dir.path()).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigParseError);
        assert!(err.context.unwrap().contains(".relayout.toml"));
    }

    #[test]
    fn test_config_validation_runs_on_load() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("relayout.toml");
        std::fs::write(file, "[layout]\nbuild_dir_offset = \"\"\n").unwrap();

        let err = Config::load(None, dir.path()).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigValidationError);
    }
}

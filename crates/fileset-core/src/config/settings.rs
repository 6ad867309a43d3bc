//! File set description loaded from a TOML file.
//!
//! ```toml
//! base = "src"
//! case_sensitive = false
//! include = ["**/*.rs"]
//! exclude = ["**/generated/**"]
//! ignore_errors = ["access-denied"]
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ErrorKind, FileSetError, FileSetResult};
use crate::fileset::FileSet;
use crate::fs::FileSystem;

/// A file set as written in a configuration file.
///
/// Every field has a default, so an empty file is valid (and selects nothing).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSetConfig {
    #[serde(default = "default_base")]
    pub base: String,
    #[serde(default)]
    pub case_sensitive: bool,
    #[serde(default)]
    pub include: Vec<String>,
    #[serde(default)]
    pub exclude: Vec<String>,
    /// Listing failures of these kinds are logged and the folder skipped.
    #[serde(default)]
    pub ignore_errors: Vec<ErrorKind>,
}

impl Default for FileSetConfig {
    fn default() -> Self {
        Self {
            base: default_base(),
            case_sensitive: false,
            include: Vec::new(),
            exclude: Vec::new(),
            ignore_errors: Vec::new(),
        }
    }
}

impl FileSetConfig {
    /// Loads a configuration from a TOML file at `path`.
    ///
    /// # Errors
    ///
    /// - [`FileSetError::NotFound`] if the file does not exist.
    /// - [`FileSetError::AccessDenied`] if the file is not readable.
    /// - [`FileSetError::Config`] if the TOML is malformed.
    pub fn load(path: &Path) -> FileSetResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| FileSetError::from_io(&path.to_string_lossy(), e))?;
        Self::parse(&content)
    }

    /// Parses a configuration from TOML text.
    pub fn parse(content: &str) -> FileSetResult<Self> {
        toml::from_str(content).map_err(|e| FileSetError::Config(e.to_string()))
    }

    /// Builds a [`FileSet`] over `fs` from this configuration.
    ///
    /// Each kind in `ignore_errors` gets a handler that logs the failure.
    pub fn to_file_set<F: FileSystem>(&self, fs: F) -> FileSet<F> {
        let mut set = FileSet::new(fs, self.base.clone());
        set.case_sensitive(self.case_sensitive);
        for glob in &self.include {
            set.include(glob.clone());
        }
        for glob in &self.exclude {
            set.exclude(glob.clone());
        }
        for &kind in &self.ignore_errors {
            set.catch(kind, move |err| {
                tracing::warn!("ignoring {} error: {}", kind, err);
            });
        }
        set
    }
}

fn default_base() -> String {
    ".".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::memory::MemoryFileSystem;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn default_config() {
        let config = FileSetConfig::default();
        assert_eq!(config.base, ".");
        assert!(!config.case_sensitive);
        assert!(config.include.is_empty());
        assert!(config.exclude.is_empty());
        assert!(config.ignore_errors.is_empty());
    }

    #[test]
    fn load_full_toml() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("fileset.toml");
        fs::write(
            &path,
            r#"
base = "assets"
case_sensitive = true
include = ["**/*.png", "icons/*.svg"]
exclude = ["**/draft/**"]
ignore_errors = ["access-denied", "not-found"]
"#,
        )
        .unwrap();

        let config = FileSetConfig::load(&path).unwrap();

        assert_eq!(config.base, "assets");
        assert!(config.case_sensitive);
        assert_eq!(config.include, vec!["**/*.png", "icons/*.svg"]);
        assert_eq!(config.exclude, vec!["**/draft/**"]);
        assert_eq!(
            config.ignore_errors,
            vec![ErrorKind::AccessDenied, ErrorKind::NotFound]
        );
    }

    #[test]
    fn load_empty_toml_uses_all_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("fileset.toml");
        fs::write(&path, "").unwrap();

        assert_eq!(FileSetConfig::load(&path).unwrap(), FileSetConfig::default());
    }

    #[test]
    fn load_nonexistent_returns_not_found() {
        let tmp = TempDir::new().unwrap();
        let result = FileSetConfig::load(&tmp.path().join("nonexistent.toml"));
        assert!(matches!(result.unwrap_err(), FileSetError::NotFound(_)));
    }

    #[test]
    fn load_invalid_toml_returns_config_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("fileset.toml");
        fs::write(&path, "this is not valid [[[toml").unwrap();

        let result = FileSetConfig::load(&path);
        assert!(matches!(result.unwrap_err(), FileSetError::Config(_)));
    }

    #[test]
    fn unknown_error_kind_is_rejected() {
        let result = FileSetConfig::parse(r#"ignore_errors = ["sometimes"]"#);
        assert!(matches!(result.unwrap_err(), FileSetError::Config(_)));
    }

    #[test]
    fn round_trips_through_toml() {
        let config = FileSetConfig {
            include: vec!["**/*".to_string()],
            ignore_errors: vec![ErrorKind::Io],
            ..FileSetConfig::default()
        };
        let text = toml::to_string(&config).unwrap();
        assert!(text.contains("ignore_errors = [\"io\"]"));
        assert_eq!(FileSetConfig::parse(&text).unwrap(), config);
    }

    #[tokio::test]
    async fn builds_a_file_set_that_ignores_configured_errors() {
        let fs = MemoryFileSystem::builder()
            .add_file("keep/a.txt")
            .add_file("keep/b.log")
            .add_file("locked/c.txt")
            .fail_listing("locked", ErrorKind::AccessDenied)
            .build();
        let config = FileSetConfig::parse(
            r#"
base = "/"
include = ["**/*"]
exclude = ["**/*.log"]
ignore_errors = ["io"]
"#,
        )
        .unwrap();

        let set = config.to_file_set(fs);
        assert_eq!(set.includes(), ["**/*"]);
        assert_eq!(set.get_files().await.unwrap(), vec!["keep/a.txt"]);
    }

    #[tokio::test]
    async fn without_ignored_kinds_failures_propagate() {
        let fs = MemoryFileSystem::builder()
            .add_file("locked/c.txt")
            .fail_listing("locked", ErrorKind::AccessDenied)
            .build();
        let config = FileSetConfig {
            base: "/".to_string(),
            include: vec!["**/*".to_string()],
            ..FileSetConfig::default()
        };
        assert!(matches!(
            config.to_file_set(fs).get_files().await,
            Err(FileSetError::AccessDenied(_))
        ));
    }
}

//! Library configuration, read from an optional TOML file.

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::{
    error::{LibraryError, Result},
    persistence::FileSnapshotStore,
};

/// Whether a book may be held by more than one visitor at a time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RentalPolicy {
    /// Any number of visitors may list the same book
    #[default]
    Permissive,
    /// Renting fails while another visitor holds the book
    SingleHolder,
}

/// Where snapshots live and how rentals are validated
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct LibraryConfig {
    /// Directory holding both snapshot files
    pub data_dir: PathBuf,
    /// Books snapshot file name, relative to `data_dir`
    pub books_file: PathBuf,
    /// Visitors snapshot file name, relative to `data_dir`
    pub visitors_file: PathBuf,
    /// Rental validation policy
    pub rental_policy: RentalPolicy,
}

/// Values given on the command line, taking precedence over the file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    /// Replaces `data_dir`
    pub data_dir: Option<PathBuf>,
    /// Replaces `books_file`
    pub books_file: Option<PathBuf>,
    /// Replaces `visitors_file`
    pub visitors_file: Option<PathBuf>,
    /// Forces `RentalPolicy::SingleHolder`; unset leaves the file's policy
    pub single_holder: bool,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            books_file: PathBuf::from("books.json"),
            visitors_file: PathBuf::from("visitors.json"),
            rental_policy: RentalPolicy::default(),
        }
    }
}

impl LibraryConfig {
    /// Parse a TOML document; missing keys keep their defaults
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::Config` if the document is not valid.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| LibraryError::Config(e.to_string()))
    }

    /// Read and parse a TOML file
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::Config` if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            let path = path.display();
            LibraryError::Config(format!("cannot read {path}: {e}"))
        })?;
        Self::from_toml_str(&contents)
    }

    /// Layer command-line overrides on top of this configuration
    #[must_use]
    pub fn apply_overrides(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(data_dir) = overrides.data_dir {
            self.data_dir = data_dir;
        }
        if let Some(books_file) = overrides.books_file {
            self.books_file = books_file;
        }
        if let Some(visitors_file) = overrides.visitors_file {
            self.visitors_file = visitors_file;
        }
        if overrides.single_holder {
            self.rental_policy = RentalPolicy::SingleHolder;
        }
        self
    }

    /// Full path of the books snapshot
    #[must_use]
    pub fn books_path(&self) -> PathBuf {
        self.data_dir.join(&self.books_file)
    }

    /// Full path of the visitors snapshot
    #[must_use]
    pub fn visitors_path(&self) -> PathBuf {
        self.data_dir.join(&self.visitors_file)
    }

    /// File-backed snapshot store for this configuration
    #[must_use]
    pub fn snapshot_store(&self) -> FileSnapshotStore {
        FileSnapshotStore::new(self.books_path(), self.visitors_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_legacy_file_names() {
        let config = LibraryConfig::default();
        assert_eq!(config.books_path(), Path::new(".").join("books.json"));
        assert_eq!(config.visitors_path(), Path::new(".").join("visitors.json"));
        assert_eq!(config.rental_policy, RentalPolicy::Permissive);
    }

    #[test]
    #[allow(clippy::expect_used)]
    fn test_partial_toml_keeps_defaults() {
        let config = LibraryConfig::from_toml_str(
            r#"
data_dir = "/var/lib/library"
rental_policy = "single-holder"
"#,
        )
        .expect("config should parse");
        let expected = Path::new("/var/lib/library").join("books.json");
        assert_eq!(config.books_path(), expected);
        assert_eq!(config.rental_policy, RentalPolicy::SingleHolder);
    }

    #[test]
    fn test_unknown_policy_is_rejected() {
        let result = LibraryConfig::from_toml_str(r#"rental_policy = "sometimes""#);
        assert!(matches!(result, Err(LibraryError::Config(_))));
    }

    #[test]
    #[allow(clippy::expect_used)]
    fn test_from_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("library.toml");
        fs::write(&path, "books_file = \"catalog.json\"\n").expect("config written");
        let config = LibraryConfig::from_file(&path).expect("config should load");
        assert_eq!(config.books_file, PathBuf::from("catalog.json"));
        assert!(LibraryConfig::from_file(&dir.path().join("missing.toml")).is_err());
    }

    #[test]
    #[allow(clippy::expect_used)]
    fn test_flags_override_file_values() {
        let toml = "data_dir = \"/srv\"\nbooks_file = \"a.json\"\n";
        let file = LibraryConfig::from_toml_str(toml).expect("config should parse");
        let overrides = ConfigOverrides {
            books_file: Some(PathBuf::from("b.json")),
            single_holder: true,
            ..ConfigOverrides::default()
        };
        let config = file.apply_overrides(overrides);
        assert_eq!(config.data_dir, PathBuf::from("/srv"));
        assert_eq!(config.books_file, PathBuf::from("b.json"));
        assert_eq!(config.visitors_file, PathBuf::from("visitors.json"));
        assert_eq!(config.rental_policy, RentalPolicy::SingleHolder);
    }

    #[test]
    fn test_empty_overrides_keep_file_values() {
        let file = LibraryConfig {
            data_dir: PathBuf::from("/srv"),
            rental_policy: RentalPolicy::SingleHolder,
            ..LibraryConfig::default()
        };
        let config = file.clone().apply_overrides(ConfigOverrides::default());
        assert_eq!(config, file);
    }
}

//! Harness configuration: the initial contents of a virtual store.
//!
//! ```yaml
//! folders: [/data, /data/out]
//! files:
//!   - path: /data/input.txt
//!     content: "seed"
//!     writable: false
//! faults: [/data/out/broken.log]
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::adapters::memory::MemoryStore;
use crate::error::ConfigError;

/// Environment variable naming the default config file.
pub const CONFIG_ENV: &str = "MOCKFS_CONFIG";

/// A file to place in the store before the harness runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedFile {
    /// Absolute path of the file.
    pub path: String,
    /// Initial content.
    #[serde(default)]
    pub content: String,
    /// Whether streams may open the file for writing.
    #[serde(default = "default_writable")]
    pub writable: bool,
}

fn default_writable() -> bool {
    true
}

/// Initial store layout plus the paths that should fail with simulated faults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HarnessConfig {
    /// Folders to create, ancestors included.
    #[serde(default)]
    pub folders: Vec<String>,
    /// Files to create, after the folders.
    #[serde(default)]
    pub files: Vec<SeedFile>,
    /// Paths on which every write and close reports a fault.
    #[serde(default)]
    pub faults: Vec<String>,
}

impl HarnessConfig {
    /// Loads a config from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        serde_yaml::from_str(&content)
            .map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })
    }

    /// Loads the config at `path`, or at `$MOCKFS_CONFIG` when `path` is
    /// `None`. With neither, returns the empty config.
    ///
    /// # Errors
    ///
    /// Returns an error if the selected file cannot be read or parsed.
    pub fn resolve(path: Option<&Path>) -> Result<Self, ConfigError> {
        let from_env = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
        match path.map(Path::to_path_buf).or(from_env) {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    /// Builds a fresh store holding the configured folders, files and faults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Seed`] if an entry conflicts with the store's
    /// layout rules (for example a file whose parent folder is missing).
    pub fn build_store(&self) -> Result<MemoryStore, ConfigError> {
        let store = MemoryStore::new();
        for folder in &self.folders {
            if !store.create_folder(folder) {
                return Err(ConfigError::Seed {
                    path: folder.clone(),
                    reason: "a file is in the way".to_string(),
                });
            }
        }
        for file in &self.files {
            if !store.put_file(&file.path, file.content.as_bytes()) {
                return Err(ConfigError::Seed {
                    path: file.path.clone(),
                    reason: "parent folder missing or path is a folder".to_string(),
                });
            }
            if !file.writable {
                store.set_writable(&file.path, false);
            }
        }
        for path in &self.faults {
            store.inject_fault(path);
        }
        Ok(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::store::{FileNode, VirtualStore};

    const SAMPLE: &str = "
folders: [/data/out]
files:
  - path: /data/input.txt
    content: seed
    writable: false
  - path: /data/out/empty.txt
faults: [/data/out/broken.log]
";

    #[test]
    fn parses_and_builds_store() {
        let config: HarnessConfig = serde_yaml::from_str(SAMPLE).unwrap();
        assert_eq!(config.files.len(), 2);
        assert!(config.files[1].writable);
        assert!(config.files[1].content.is_empty());

        let store = config.build_store().unwrap();
        assert!(store.find("/data").is_some_and(|n| n.is_folder()));
        let input = store.find("/data/input.txt").unwrap();
        assert_eq!(input.contents(), b"seed");
        assert!(!input.has_write_permission());
        assert!(store.should_inject_fault("/data/out/broken.log"));
        assert!(!store.should_inject_fault("/data/input.txt"));
    }

    #[test]
    fn rejects_file_without_parent() {
        let config = HarnessConfig {
            files: vec![SeedFile {
                path: "/nope/f".into(),
                content: String::new(),
                writable: true,
            }],
            ..HarnessConfig::default()
        };
        let err = config.build_store().unwrap_err();
        assert!(matches!(err, ConfigError::Seed { ref path, .. } if path == "/nope/f"));
    }

    #[test]
    fn rejects_unknown_keys() {
        let result: Result<HarnessConfig, _> = serde_yaml::from_str("fault: [/a]\n");
        assert!(result.is_err());
    }

    #[test]
    fn load_reports_missing_file() {
        let err = HarnessConfig::load(Path::new("/definitely/not/here.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn load_from_disk() {
        let dir = std::env::temp_dir().join("mockfs_config_test_load");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("harness.yaml");
        std::fs::write(&path, SAMPLE).unwrap();

        let config = HarnessConfig::resolve(Some(&path)).unwrap();
        assert_eq!(config.faults, vec!["/data/out/broken.log".to_string()]);

        let _ = std::fs::remove_dir_all(&dir);
    }
}

//! Migrator configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Engine configuration supplied by the integrator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MigratorConfig {
    /// Config name, used for file names and the log prefix
    pub name: String,
    /// Project root that relative paths resolve against
    pub root: PathBuf,
    /// Schema version documents are migrated to
    pub latest_version: u64,
    /// Marker inserted into backup file names
    pub backup_marker: String,
    /// Package manifest key, defaults to `name`
    pub manifest_key: Option<String>,
}

impl MigratorConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With config name
    #[inline]
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// With project root
    #[inline]
    #[must_use]
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    /// With latest schema version
    #[inline]
    #[must_use]
    pub fn with_latest_version(mut self, version: u64) -> Self {
        self.latest_version = version;
        self
    }

    /// With backup marker
    #[inline]
    #[must_use]
    pub fn with_backup_marker(mut self, marker: impl Into<String>) -> Self {
        self.backup_marker = marker.into();
        self
    }

    /// With package manifest key
    #[inline]
    #[must_use]
    pub fn with_manifest_key(mut self, key: impl Into<String>) -> Self {
        self.manifest_key = Some(key.into());
        self
    }

    /// Key the config is embedded under in `package.json`
    #[inline]
    #[must_use]
    pub fn manifest_key(&self) -> &str {
        self.manifest_key.as_deref().unwrap_or(&self.name)
    }

    /// Prefix for log lines, e.g. `[percy]`
    #[must_use]
    pub fn log_prefix(&self) -> String {
        format!("[{}]", self.name)
    }

    /// Resolve `path` against the project root
    #[must_use]
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

impl Default for MigratorConfig {
    fn default() -> Self {
        Self {
            name: "percy".to_string(),
            root: PathBuf::from("."),
            latest_version: 2,
            backup_marker: "old".to_string(),
            manifest_key: None,
        }
    }
}

/// Arguments of one migrate invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrateArgs {
    /// Explicit source config file
    pub source: Option<PathBuf>,
    /// Output file, possibly in another format
    pub destination: Option<PathBuf>,
    /// Print the result instead of writing it
    pub dry_run: bool,
}

impl MigrateArgs {
    /// Create default arguments: search for the config, migrate in place
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With explicit source path
    #[inline]
    #[must_use]
    pub fn with_source(mut self, source: impl Into<PathBuf>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// With destination path
    #[inline]
    #[must_use]
    pub fn with_destination(mut self, destination: impl Into<PathBuf>) -> Self {
        self.destination = Some(destination.into());
        self
    }

    /// With dry run flag
    #[inline]
    #[must_use]
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

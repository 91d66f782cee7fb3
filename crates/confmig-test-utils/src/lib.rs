//! Testing utilities for confmig workspace
//!
//! Temporary project directories and config fixtures.

#![allow(missing_docs)]

use confmig_core::MigratorConfig;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A throwaway project root, removed on drop
#[derive(Debug)]
pub struct TestProject {
    dir: TempDir,
}

impl TestProject {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    /// Project seeded with `.percy.yml` at version 1
    pub fn with_default_config() -> Self {
        let project = Self::new();
        project.write(".percy.yml", "version: 1\n");
        project
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.root().join(relative)
    }

    /// Write a file, creating parent directories
    pub fn write(&self, relative: &str, contents: &str) {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, contents).unwrap();
    }

    /// File contents, or `None` if it does not exist
    pub fn read(&self, relative: &str) -> Option<String> {
        std::fs::read_to_string(self.path(relative)).ok()
    }

    pub fn exists(&self, relative: &str) -> bool {
        self.path(relative).exists()
    }

    /// Default migrator config rooted at this project
    pub fn config(&self) -> MigratorConfig {
        MigratorConfig::new().with_root(self.root())
    }
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

/// Pretty JSON the way `package.json` files are usually written
pub fn manifest_json(value: &serde_json::Value) -> String {
    serde_json::to_string_pretty(value).unwrap() + "\n"
}

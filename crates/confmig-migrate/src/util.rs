//! Mutation helper handed to migration steps
//!
//! A fresh [`MigrationUtil`] is bound to the document for every step. Writes
//! made through it are recorded so a run can report which paths changed.

use crate::error::MigrationError;
use confmig_codec::ConfigDocument;
use serde_json::Value;

/// Helper bound to the document under migration
#[derive(Debug)]
pub struct MigrationUtil<'a> {
    config: &'a mut ConfigDocument,
    touched: Vec<String>,
    notices: Vec<String>,
}

impl<'a> MigrationUtil<'a> {
    /// Bind a helper to `config`
    #[inline]
    #[must_use]
    pub fn new(config: &'a mut ConfigDocument) -> Self {
        Self {
            config,
            touched: Vec::new(),
            notices: Vec::new(),
        }
    }

    /// Document being migrated
    #[inline]
    #[must_use]
    pub fn config(&self) -> &ConfigDocument {
        self.config
    }

    /// Mutable document access
    ///
    /// Changes made this way are not recorded in [`touched`](Self::touched).
    #[inline]
    pub fn config_mut(&mut self) -> &mut ConfigDocument {
        self.config
    }

    /// Value at dotted path
    #[inline]
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&Value> {
        self.config.get(path)
    }

    /// Check whether a dotted path is present
    #[inline]
    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.config.contains(path)
    }

    /// Move `from` to `to` unchanged
    ///
    /// Returns whether `from` was present. No-op otherwise.
    pub fn map(&mut self, from: &str, to: &str) -> bool {
        self.map_with(from, to, |value| value)
    }

    /// Move `from` to `to`, transforming the value
    ///
    /// Returns whether `from` was present. No-op otherwise.
    pub fn map_with<F>(&mut self, from: &str, to: &str, transform: F) -> bool
    where
        F: FnOnce(Value) -> Value,
    {
        let Some(value) = self.config.remove(from) else {
            return false;
        };
        self.config.set(to, transform(value));
        self.record(from);
        self.record(to);
        true
    }

    /// Move `from` to `to` with a fallible transform
    ///
    /// The document is left unchanged when the transform fails.
    ///
    /// # Errors
    /// Returns the transform's error.
    pub fn try_map<F>(&mut self, from: &str, to: &str, transform: F) -> Result<bool, MigrationError>
    where
        F: FnOnce(&Value) -> Result<Value, MigrationError>,
    {
        let Some(current) = self.config.get(from) else {
            return Ok(false);
        };
        let value = transform(current)?;
        self.config.remove(from);
        self.config.set(to, value);
        self.record(from);
        self.record(to);
        Ok(true)
    }

    /// Move a deprecated `from` to `to`, leaving a notice for the user
    ///
    /// Returns whether `from` was present.
    pub fn deprecate(&mut self, from: &str, to: &str) -> bool {
        if !self.map(from, to) {
            return false;
        }
        let notice = format!("The '{from}' option is deprecated, use '{to}' instead");
        tracing::warn!(from, to, "deprecated config option");
        self.notices.push(notice);
        true
    }

    /// Set value at dotted path
    pub fn set(&mut self, path: &str, value: Value) {
        self.config.set(path, value);
        self.record(path);
    }

    /// Remove value at dotted path
    pub fn del(&mut self, path: &str) -> Option<Value> {
        let removed = self.config.remove(path)?;
        self.record(path);
        Some(removed)
    }

    /// Paths written through this helper, in first-touch order
    #[inline]
    #[must_use]
    pub fn touched(&self) -> &[String] {
        &self.touched
    }

    /// Deprecation notices raised through this helper
    #[inline]
    #[must_use]
    pub fn notices(&self) -> &[String] {
        &self.notices
    }

    /// Consume into touched paths and notices
    #[must_use]
    pub fn finish(self) -> (Vec<String>, Vec<String>) {
        (self.touched, self.notices)
    }

    fn record(&mut self, path: &str) {
        if !self.touched.iter().any(|p| p == path) {
            self.touched.push(path.to_string());
        }
    }
}

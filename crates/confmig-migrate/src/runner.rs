//! Migration runner
//!
//! Applies every registered step, in order, to one document and then stamps
//! the latest schema version on it.

use crate::error::MigrationError;
use crate::registry::MigrationRegistry;
use crate::util::MigrationUtil;
use confmig_codec::ConfigDocument;

/// Summary of one migration run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationReport {
    /// Version the document declared before the run
    pub from_version: u64,
    /// Version stamped after the run
    pub to_version: u64,
    /// Number of steps applied
    pub steps_applied: usize,
    /// Paths written by steps, in first-touch order
    pub touched: Vec<String>,
    /// Deprecation notices raised by steps
    pub notices: Vec<String>,
}

/// Runs a registry's steps against documents
#[derive(Debug, Clone, Copy)]
pub struct MigrationRunner<'r> {
    registry: &'r MigrationRegistry,
    latest_version: u64,
}

impl<'r> MigrationRunner<'r> {
    /// Create runner targeting `latest_version`
    #[inline]
    #[must_use]
    pub fn new(registry: &'r MigrationRegistry, latest_version: u64) -> Self {
        Self {
            registry,
            latest_version,
        }
    }

    /// Version documents are migrated to
    #[inline]
    #[must_use]
    pub fn latest_version(&self) -> u64 {
        self.latest_version
    }

    /// Migrate `config` in place
    ///
    /// Each step sees the document exactly as the previous step left it.
    ///
    /// # Errors
    /// Returns the first failing step's error unchanged. The document may
    /// hold partial changes from earlier steps and must be discarded.
    pub fn run(&self, config: &mut ConfigDocument) -> Result<MigrationReport, MigrationError> {
        let from_version = config.version();
        let mut touched: Vec<String> = Vec::new();
        let mut notices = Vec::new();

        for (index, step) in self.registry.iter().enumerate() {
            tracing::debug!(index, step = step.name(), "applying migration step");

            let mut util = MigrationUtil::new(config);
            step.apply(&mut util)?;

            let (step_touched, step_notices) = util.finish();
            for path in step_touched {
                if !touched.contains(&path) {
                    touched.push(path);
                }
            }
            notices.extend(step_notices);
        }

        config.set_version(self.latest_version);
        tracing::debug!(
            from_version,
            to_version = self.latest_version,
            steps = self.registry.len(),
            "migration run complete"
        );

        Ok(MigrationReport {
            from_version,
            to_version: self.latest_version,
            steps_applied: self.registry.len(),
            touched,
            notices,
        })
    }
}

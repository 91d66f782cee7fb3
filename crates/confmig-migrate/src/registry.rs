//! Migration registry
//!
//! Provides [`MigrationRegistry`], the ordered list of steps a run applies.
//! The registry is an explicit object owned by the caller: plugins register
//! into it before a run, and test suites clear it between cases. Nothing in
//! the engine clears it implicitly.

use crate::error::MigrationError;
use crate::util::MigrationUtil;
use std::fmt;
use std::sync::Arc;

/// A single migration step
///
/// Closures of the right shape implement this automatically; implement it on
/// a type to give the step a name in diagnostics.
pub trait MigrationStep: Send + Sync {
    /// Apply the step to the document the helper is bound to
    ///
    /// # Errors
    /// Any error aborts the run and is returned to the caller unchanged.
    fn apply(&self, util: &mut MigrationUtil<'_>) -> Result<(), MigrationError>;

    /// Name used in diagnostics
    fn name(&self) -> &str {
        "anonymous"
    }
}

impl<F> MigrationStep for F
where
    F: Fn(&mut MigrationUtil<'_>) -> Result<(), MigrationError> + Send + Sync,
{
    fn apply(&self, util: &mut MigrationUtil<'_>) -> Result<(), MigrationError> {
        self(util)
    }
}

/// Ordered registry of migration steps
///
/// Steps run in registration order. Duplicates are kept and all run.
#[derive(Clone, Default)]
pub struct MigrationRegistry {
    steps: Vec<Arc<dyn MigrationStep>>,
}

impl fmt::Debug for MigrationRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MigrationRegistry")
            .field("steps", &self.steps.iter().map(|s| s.name()).collect::<Vec<_>>())
            .finish()
    }
}

impl MigrationRegistry {
    /// Create new empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Append a closure step
    pub fn add<F>(&mut self, step: F)
    where
        F: Fn(&mut MigrationUtil<'_>) -> Result<(), MigrationError> + Send + Sync + 'static,
    {
        self.steps.push(Arc::new(step));
    }

    /// Append a named step
    pub fn add_step<S: MigrationStep + 'static>(&mut self, step: S) {
        self.steps.push(Arc::new(step));
    }

    /// Append every step from `other`, after the existing ones
    pub fn add_all(&mut self, other: &MigrationRegistry) {
        self.steps.extend(other.steps.iter().cloned());
    }

    /// Remove all steps
    #[inline]
    pub fn clear(&mut self) {
        self.steps.clear();
    }

    /// Get number of registered steps
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Check if registry is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Iterate over steps in registration order
    pub fn iter(&self) -> impl Iterator<Item = &dyn MigrationStep> {
        self.steps.iter().map(|s| &**s)
    }
}

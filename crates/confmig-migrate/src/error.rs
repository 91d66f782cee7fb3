//! Error types for migration steps

/// Errors raised by migration steps
///
/// The runner returns these unmodified, so the message a step produces is
/// the message the user sees.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MigrationError {
    /// Step-specific failure
    #[error("{0}")]
    Step(String),

    /// A value could not be migrated
    #[error("invalid value for '{path}': {message}")]
    InvalidValue {
        /// Dotted path of the offending entry
        path: String,
        /// What was wrong with it
        message: String,
    },
}

impl MigrationError {
    /// Create step failure
    pub fn step(message: impl Into<String>) -> Self {
        Self::Step(message.into())
    }

    /// Create invalid value error for path
    pub fn invalid_value(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            path: path.into(),
            message: message.into(),
        }
    }
}

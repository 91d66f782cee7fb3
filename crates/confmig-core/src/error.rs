//! Error types for the migration driver

use confmig_codec::CodecError;
use confmig_migrate::MigrationError;
use std::path::PathBuf;

/// Reasons a migrate invocation is rejected
///
/// The display text is what follows `Error: ` on the error channel.
#[derive(Debug, thiserror::Error)]
pub enum MigrateError {
    /// No config file at the explicit path or any search location
    #[error("Config file not found")]
    NotFound,

    /// Parsing or serializing failed
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// A migration step failed
    #[error(transparent)]
    Migration(#[from] MigrationError),

    /// File system operation failed
    #[error("{}: {source}", path.display())]
    Io {
        /// Path being read or written
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

impl MigrateError {
    /// Create I/O error for path
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Check if no config file was found
    #[inline]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use confmig_codec::Format;

    #[test]
    fn not_found_display() {
        let err = MigrateError::NotFound;
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Config file not found");
    }

    #[test]
    fn codec_error_is_transparent() {
        let err = MigrateError::from(CodecError::parse(Format::Yaml, "bad indentation"));
        assert!(!err.is_not_found());
        assert_eq!(err.to_string(), "bad indentation");
    }

    #[test]
    fn migration_error_is_transparent() {
        let err = MigrateError::from(MigrationError::step("unsupported option"));
        assert_eq!(err.to_string(), "unsupported option");
    }

    #[test]
    fn io_error_names_path() {
        let err = MigrateError::io(
            "/project/.percy.yml",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(err.to_string(), "/project/.percy.yml: denied");
    }
}

//! Error types for config codecs
//!
//! Parse errors keep the underlying parser's message verbatim so callers can
//! show it to users unchanged.

use crate::codecs::Format;
use std::path::PathBuf;

/// Errors raised while parsing or serializing a config file
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// Source text could not be interpreted
    #[error("{message}")]
    Parse {
        /// Format that rejected the input
        format: Format,
        /// Underlying parser message
        message: String,
    },

    /// No codec handles the path
    #[error("unsupported config format: {}", path.display())]
    UnsupportedFormat {
        /// Path that matched no codec
        path: PathBuf,
    },

    /// Document could not be rendered in the target format
    #[error("failed to write {format} config: {message}")]
    Serialize {
        /// Target format
        format: Format,
        /// Underlying serializer message
        message: String,
    },

    /// Host document does not embed the config
    #[error("no \"{key}\" entry in {file}")]
    MissingEntry {
        /// Key the config lives under
        key: String,
        /// Host document file name
        file: String,
    },

    /// Config root is not a mapping
    #[error("config must be a mapping, found {found}")]
    NotAMapping {
        /// Format the root was read from
        format: Format,
        /// Shape that was found instead
        found: &'static str,
    },
}

impl CodecError {
    /// Create parse error
    pub fn parse(format: Format, message: impl Into<String>) -> Self {
        Self::Parse {
            format,
            message: message.into(),
        }
    }

    /// Create serialize error
    pub fn serialize(format: Format, message: impl Into<String>) -> Self {
        Self::Serialize {
            format,
            message: message.into(),
        }
    }

    /// Create unsupported format error for path
    pub fn unsupported(path: impl Into<PathBuf>) -> Self {
        Self::UnsupportedFormat { path: path.into() }
    }

    /// Check if the source text was rejected
    #[inline]
    #[must_use]
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            Self::Parse { .. } | Self::MissingEntry { .. } | Self::NotAMapping { .. }
        )
    }
}

/// Result type alias for codec operations
pub type CodecResult<T> = Result<T, CodecError>;

//! Config codecs for different on-disk formats
//!
//! Each codec is a parse/serialize pair bound to one format:
//! - YAML documents (`.yml`, `.yaml`) and extension-less rc files
//! - JSON documents (`.json`)
//! - JS modules exporting an object literal (`.js`, `.cjs`, `.mjs`)
//! - The package manifest (`package.json`), which embeds the config under a key

use crate::document::ConfigDocument;
use crate::error::CodecError;
use std::fmt;
use std::path::Path;

mod js;
mod json;
mod manifest;
mod yaml;

pub use js::JsModuleCodec;
pub use json::JsonCodec;
pub use manifest::{ManifestCodec, MANIFEST_FILE};
pub use yaml::{RcCodec, YamlCodec};

/// Supported on-disk formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// YAML document
    Yaml,
    /// Extension-less rc file holding YAML
    Rc,
    /// JSON document
    Json,
    /// JS module exporting the config
    JsModule,
    /// Config embedded in a package manifest
    Manifest,
}

impl Format {
    /// Short name used in messages
    #[inline]
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Format::Yaml => "yaml",
            Format::Rc => "rc",
            Format::Json => "json",
            Format::JsModule => "js",
            Format::Manifest => "manifest",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Codec trait for converting between file text and config documents
///
/// Implement this trait to add support for new formats.
pub trait ConfigCodec: Send + Sync + 'static {
    /// Format handled by this codec
    fn format(&self) -> Format;

    /// Supported file extensions (without dot)
    fn extensions(&self) -> &[&str];

    /// Check if this codec can handle the given path
    fn can_handle(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.extensions().contains(&ext))
    }

    /// Codec priority (higher = tried first when multiple codecs match)
    fn priority(&self) -> i32 {
        0
    }

    /// Parse file text into a document
    ///
    /// # Errors
    /// Returns `CodecError::Parse` carrying the parser's message.
    fn parse(&self, source: &str) -> Result<ConfigDocument, CodecError>;

    /// Render a document as file text
    ///
    /// # Errors
    /// Returns `CodecError::Serialize` if the document cannot be rendered.
    fn serialize(&self, document: &ConfigDocument) -> Result<String, CodecError>;

    /// Whether the file hosts the config as a sub-tree of a larger document
    fn is_host_document(&self) -> bool {
        false
    }

    /// Whether `source` actually carries a config
    ///
    /// Always true for standalone formats; host documents check for their key.
    ///
    /// # Errors
    /// Returns `CodecError::Parse` if a host document cannot be parsed.
    fn embeds_config(&self, source: &str) -> Result<bool, CodecError> {
        let _ = source;
        Ok(true)
    }

    /// Render `document` into the file's full text
    ///
    /// Standalone formats ignore `existing`; host documents replace only their
    /// sub-tree within it.
    ///
    /// # Errors
    /// Returns an error if `existing` cannot be parsed or rendering fails.
    fn embed(&self, existing: Option<&str>, document: &ConfigDocument) -> Result<String, CodecError> {
        let _ = existing;
        self.serialize(document)
    }
}

/// Codec registration for extension-based dispatch
pub struct CodecRegistry {
    codecs: Vec<Box<dyn ConfigCodec>>,
}

impl Default for CodecRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CodecRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodecRegistry")
            .field("codec_count", &self.codecs.len())
            .field("extensions", &self.all_extensions())
            .finish()
    }
}

impl CodecRegistry {
    /// Create empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self { codecs: Vec::new() }
    }

    /// Register a codec
    pub fn register<C: ConfigCodec>(&mut self, codec: C) {
        self.codecs.push(Box::new(codec));
        // Stable sort keeps registration order among equal priorities
        self.codecs.sort_by_key(|c| std::cmp::Reverse(c.priority()));
    }

    /// Find codec for path
    ///
    /// # Errors
    /// Returns `CodecError::UnsupportedFormat` when no codec matches.
    pub fn resolve(&self, path: &Path) -> Result<&dyn ConfigCodec, CodecError> {
        let codec = self
            .codecs
            .iter()
            .find(|c| c.can_handle(path))
            .map(|c| &**c)
            .ok_or_else(|| CodecError::unsupported(path))?;
        tracing::debug!(path = %path.display(), format = %codec.format(), "resolved codec");
        Ok(codec)
    }

    /// Get all registered extensions
    #[must_use]
    pub fn all_extensions(&self) -> Vec<&str> {
        self.codecs
            .iter()
            .flat_map(|c| c.extensions())
            .copied()
            .collect()
    }

    /// Number of registered codecs
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.codecs.len()
    }

    /// Check if registry is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.codecs.is_empty()
    }
}

/// Create default codec registry with built-in codecs
///
/// `manifest_key` is the package manifest entry the config is embedded under.
#[must_use]
pub fn default_codecs(manifest_key: &str) -> CodecRegistry {
    let mut registry = CodecRegistry::new();

    registry.register(ManifestCodec::new(manifest_key));
    registry.register(YamlCodec);
    registry.register(RcCodec);
    registry.register(JsonCodec);
    registry.register(JsModuleCodec);

    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestCodec;

    impl ConfigCodec for TestCodec {
        fn format(&self) -> Format {
            Format::Json
        }

        fn extensions(&self) -> &[&str] {
            &["test"]
        }

        fn parse(&self, _source: &str) -> Result<ConfigDocument, CodecError> {
            Ok(ConfigDocument::new())
        }

        fn serialize(&self, _document: &ConfigDocument) -> Result<String, CodecError> {
            Ok(String::new())
        }
    }

    #[test]
    fn codec_can_handle_by_extension() {
        let codec = TestCodec;

        assert!(codec.can_handle(Path::new("file.test")));
        assert!(codec.can_handle(Path::new("/path/to/file.test")));
        assert!(!codec.can_handle(Path::new("file.txt")));
        assert!(!codec.can_handle(Path::new("file")));
    }

    #[test]
    fn registry_resolve() {
        let mut registry = CodecRegistry::new();
        registry.register(TestCodec);

        assert!(registry.resolve(Path::new("file.test")).is_ok());

        let err = registry.resolve(Path::new("file.txt")).err().unwrap();
        assert!(matches!(err, CodecError::UnsupportedFormat { .. }));
    }

    #[test]
    fn default_resolution_by_path() {
        let registry = default_codecs("percy");
        let format_of = |p: &str| registry.resolve(Path::new(p)).unwrap().format();

        assert_eq!(format_of(".percy.yml"), Format::Yaml);
        assert_eq!(format_of("config/percy.yaml"), Format::Yaml);
        assert_eq!(format_of(".percyrc"), Format::Rc);
        assert_eq!(format_of(".percy.json"), Format::Json);
        assert_eq!(format_of(".percy.js"), Format::JsModule);
        assert_eq!(format_of("percy.config.cjs"), Format::JsModule);
        assert_eq!(format_of("package.json"), Format::Manifest);
        assert_eq!(format_of("nested/package.json"), Format::Manifest);
    }

    #[test]
    fn default_rejects_unknown_extension() {
        let registry = default_codecs("percy");
        assert!(registry.resolve(Path::new(".percy.toml")).is_err());
    }

    #[test]
    fn registry_all_extensions() {
        let registry = default_codecs("percy");
        let exts = registry.all_extensions();

        assert!(exts.contains(&"yml"));
        assert!(exts.contains(&"json"));
        assert!(exts.contains(&"js"));
        assert_eq!(registry.len(), 5);
    }

    #[test]
    fn registry_debug() {
        let registry = default_codecs("percy");
        let debug_str = format!("{registry:?}");
        assert!(debug_str.contains("CodecRegistry"));
    }
}

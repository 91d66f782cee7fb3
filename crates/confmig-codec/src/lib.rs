//! confmig codecs
//!
//! The boundary between config files on disk and the in-memory
//! [`ConfigDocument`] that migrations operate on.
//!
//! # Architecture
//!
//! ```text
//! file text → ConfigCodec::parse → ConfigDocument → ConfigCodec::serialize → file text
//!                      ↑
//!          CodecRegistry::resolve(path)
//! ```
//!
//! Codecs are picked by path: extension for standalone formats, file name for
//! the package manifest host document, and no extension at all for rc files.
//!
//! # Example
//!
//! ```rust
//! use confmig_codec::default_codecs;
//! use std::path::Path;
//!
//! let codecs = default_codecs("percy");
//! let yaml = codecs.resolve(Path::new(".percy.yml")).unwrap();
//! let mut doc = yaml.parse("version: 1\n").unwrap();
//! doc.set_version(2);
//!
//! let js = codecs.resolve(Path::new(".percy.js")).unwrap();
//! assert_eq!(js.serialize(&doc).unwrap(), "module.exports = {\n  version: 2\n}\n");
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod codecs;
pub mod document;
pub mod error;

// Re-exports for convenience
pub use codecs::{
    default_codecs, CodecRegistry, ConfigCodec, Format, JsModuleCodec, JsonCodec, ManifestCodec,
    RcCodec, YamlCodec, MANIFEST_FILE,
};
pub use document::{ConfigDocument, DEFAULT_VERSION, VERSION_KEY};
pub use error::{CodecError, CodecResult};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

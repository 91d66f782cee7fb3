//! Package manifest codec
//!
//! `package.json` is a host document: the config lives under a named key and
//! every sibling entry must survive a write untouched. The manifest's own
//! indentation is detected and reused.

use super::json::{to_pretty_json, DEFAULT_INDENT};
use super::{ConfigCodec, Format};
use crate::document::{value_kind, ConfigDocument};
use crate::error::CodecError;
use serde_json::{Map, Value};
use std::path::Path;

/// File name of the package manifest
pub const MANIFEST_FILE: &str = "package.json";

/// Codec for a config embedded in `package.json`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestCodec {
    key: String,
}

impl ManifestCodec {
    /// Create codec reading the entry under `key`
    #[inline]
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    /// Entry key the config is embedded under
    #[inline]
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    fn parse_host(source: &str) -> Result<Map<String, Value>, CodecError> {
        let value: Value = serde_json::from_str(source)
            .map_err(|e| CodecError::parse(Format::Manifest, e.to_string()))?;

        match value {
            Value::Object(map) => Ok(map),
            other => Err(CodecError::NotAMapping {
                format: Format::Manifest,
                found: value_kind(&other),
            }),
        }
    }
}

impl ConfigCodec for ManifestCodec {
    fn format(&self) -> Format {
        Format::Manifest
    }

    fn extensions(&self) -> &[&str] {
        &["json"]
    }

    fn can_handle(&self, path: &Path) -> bool {
        path.file_name().is_some_and(|name| name == MANIFEST_FILE)
    }

    fn priority(&self) -> i32 {
        10 // Must win over the plain JSON codec
    }

    fn parse(&self, source: &str) -> Result<ConfigDocument, CodecError> {
        let mut host = Self::parse_host(source)?;
        let entry = host.shift_remove(&self.key).ok_or_else(|| CodecError::MissingEntry {
            key: self.key.clone(),
            file: MANIFEST_FILE.to_string(),
        })?;

        ConfigDocument::from_value(entry).map_err(|other| CodecError::NotAMapping {
            format: Format::Manifest,
            found: value_kind(&other),
        })
    }

    fn serialize(&self, document: &ConfigDocument) -> Result<String, CodecError> {
        to_pretty_json(Format::Manifest, document.as_map(), DEFAULT_INDENT)
    }

    fn is_host_document(&self) -> bool {
        true
    }

    fn embeds_config(&self, source: &str) -> Result<bool, CodecError> {
        Self::parse_host(source).map(|host| host.contains_key(&self.key))
    }

    fn embed(&self, existing: Option<&str>, document: &ConfigDocument) -> Result<String, CodecError> {
        let (mut host, indent) = match existing {
            Some(source) => (Self::parse_host(source)?, detect_indent(source)),
            None => (Map::new(), DEFAULT_INDENT),
        };

        // Existing keys keep their position on insert
        host.insert(self.key.clone(), document.clone().into_value());
        to_pretty_json(Format::Manifest, &host, indent)
    }
}

/// Indentation of the first indented line, defaulting to two spaces
fn detect_indent(source: &str) -> &str {
    source
        .lines()
        .skip(1)
        .map(|line| {
            let width = line.len() - line.trim_start_matches([' ', '\t']).len();
            &line[..width]
        })
        .find(|indent| !indent.is_empty())
        .unwrap_or(DEFAULT_INDENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn manifest(value: &Value) -> String {
        serde_json::to_string_pretty(value).unwrap() + "\n"
    }

    #[test]
    fn manifest_handles_only_package_json() {
        let codec = ManifestCodec::new("percy");
        assert!(codec.can_handle(Path::new("package.json")));
        assert!(codec.can_handle(Path::new("/app/package.json")));
        assert!(!codec.can_handle(Path::new(".percy.json")));
    }

    #[test]
    fn manifest_parses_embedded_entry() {
        let codec = ManifestCodec::new("percy");
        let source = manifest(&json!({
            "name": "some-package",
            "percy": { "version": 1, "snapshot": { "widths": [375] } }
        }));

        let doc = codec.parse(&source).unwrap();
        assert_eq!(doc.version(), 1);
        assert_eq!(doc.get("snapshot.widths"), Some(&json!([375])));
    }

    #[test]
    fn manifest_missing_entry() {
        let codec = ManifestCodec::new("percy");
        let err = codec.parse(r#"{"name": "some-package"}"#).unwrap_err();

        assert_eq!(err.to_string(), "no \"percy\" entry in package.json");
        assert!(!codec.embeds_config(r#"{"name": "some-package"}"#).unwrap());
        assert!(codec.embeds_config(r#"{"percy": {}}"#).unwrap());
        assert!(codec.embeds_config("not json").unwrap_err().is_parse_error());
    }

    #[test]
    fn embed_replaces_only_the_entry() {
        let codec = ManifestCodec::new("percy");
        let pkg = json!({
            "name": "some-package",
            "version": "0.1.0",
            "scripts": {},
            "percy": { "version": 1 },
            "dependencies": {},
            "devDependencies": {}
        });

        let mut migrated = codec.parse(&manifest(&pkg)).unwrap();
        migrated.set_version(2);
        let out = codec.embed(Some(&manifest(&pkg)), &migrated).unwrap();

        let mut expected = pkg.clone();
        expected["percy"] = json!({ "version": 2 });
        assert_eq!(out, manifest(&expected));
    }

    #[test]
    fn embed_preserves_indentation() {
        let codec = ManifestCodec::new("percy");
        let source = "{\n    \"name\": \"pkg\",\n    \"percy\": {\n        \"version\": 1\n    }\n}\n";

        let mut doc = codec.parse(source).unwrap();
        doc.set_version(2);

        assert_eq!(
            codec.embed(Some(source), &doc).unwrap(),
            "{\n    \"name\": \"pkg\",\n    \"percy\": {\n        \"version\": 2\n    }\n}\n"
        );
    }

    #[test]
    fn embed_without_existing_manifest() {
        let codec = ManifestCodec::new("percy");
        let mut doc = ConfigDocument::new();
        doc.set_version(2);

        assert_eq!(
            codec.embed(None, &doc).unwrap(),
            "{\n  \"percy\": {\n    \"version\": 2\n  }\n}\n"
        );
    }

    #[test]
    fn detect_indent_variants() {
        assert_eq!(detect_indent("{\n\t\"a\": 1\n}"), "\t");
        assert_eq!(detect_indent("{\n    \"a\": 1\n}"), "    ");
        assert_eq!(detect_indent("{}"), "  ");
    }
}

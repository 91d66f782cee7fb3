//! YAML config codec
//!
//! Uses serde_yaml for parsing and rendering. Rc files (`.percyrc`) carry no
//! extension and are read as YAML too.

use super::{ConfigCodec, Format};
use crate::document::{value_kind, ConfigDocument};
use crate::error::CodecError;
use serde_json::Value;
use std::path::Path;

fn parse_yaml(format: Format, source: &str) -> Result<ConfigDocument, CodecError> {
    if source.trim().is_empty() {
        return Ok(ConfigDocument::new());
    }

    let value: Value =
        serde_yaml::from_str(source).map_err(|e| CodecError::parse(format, e.to_string()))?;

    ConfigDocument::from_value(value).map_err(|other| CodecError::NotAMapping {
        format,
        found: value_kind(&other),
    })
}

fn render_yaml(format: Format, document: &ConfigDocument) -> Result<String, CodecError> {
    serde_yaml::to_string(document.as_map()).map_err(|e| CodecError::serialize(format, e.to_string()))
}

/// YAML codec
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlCodec;

impl ConfigCodec for YamlCodec {
    fn format(&self) -> Format {
        Format::Yaml
    }

    fn extensions(&self) -> &[&str] {
        &["yaml", "yml"]
    }

    fn parse(&self, source: &str) -> Result<ConfigDocument, CodecError> {
        parse_yaml(Format::Yaml, source)
    }

    fn serialize(&self, document: &ConfigDocument) -> Result<String, CodecError> {
        render_yaml(Format::Yaml, document)
    }
}

/// Rc file codec, YAML without an extension
#[derive(Debug, Clone, Copy, Default)]
pub struct RcCodec;

impl ConfigCodec for RcCodec {
    fn format(&self) -> Format {
        Format::Rc
    }

    fn extensions(&self) -> &[&str] {
        &[]
    }

    fn can_handle(&self, path: &Path) -> bool {
        path.file_name().is_some() && path.extension().is_none()
    }

    fn parse(&self, source: &str) -> Result<ConfigDocument, CodecError> {
        parse_yaml(Format::Rc, source)
    }

    fn serialize(&self, document: &ConfigDocument) -> Result<String, CodecError> {
        render_yaml(Format::Rc, document)
    }
}

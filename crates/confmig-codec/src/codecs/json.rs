//! JSON config codec
//!
//! Uses serde_json; output is pretty-printed with a trailing newline.

use super::{ConfigCodec, Format};
use crate::document::{value_kind, ConfigDocument};
use crate::error::CodecError;
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use serde_json::Value;

/// Default indentation for rendered JSON
pub(crate) const DEFAULT_INDENT: &str = "  ";

/// Render a value as pretty JSON using `indent`, ending with a newline
pub(crate) fn to_pretty_json<T: Serialize + ?Sized>(
    format: Format,
    value: &T,
    indent: &str,
) -> Result<String, CodecError> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(indent.as_bytes());
    let mut ser = Serializer::with_formatter(&mut buf, formatter);
    value
        .serialize(&mut ser)
        .map_err(|e| CodecError::serialize(format, e.to_string()))?;

    let mut out = String::from_utf8(buf).map_err(|e| CodecError::serialize(format, e.to_string()))?;
    out.push('\n');
    Ok(out)
}

/// JSON codec
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl ConfigCodec for JsonCodec {
    fn format(&self) -> Format {
        Format::Json
    }

    fn extensions(&self) -> &[&str] {
        &["json"]
    }

    fn parse(&self, source: &str) -> Result<ConfigDocument, CodecError> {
        let value: Value =
            serde_json::from_str(source).map_err(|e| CodecError::parse(Format::Json, e.to_string()))?;

        ConfigDocument::from_value(value).map_err(|other| CodecError::NotAMapping {
            format: Format::Json,
            found: value_kind(&other),
        })
    }

    fn serialize(&self, document: &ConfigDocument) -> Result<String, CodecError> {
        to_pretty_json(Format::Json, document.as_map(), DEFAULT_INDENT)
    }
}

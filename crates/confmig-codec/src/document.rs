//! Config document model
//!
//! A configuration is an insertion-ordered mapping from string keys to
//! arbitrary JSON-shaped values. Migration steps address nested entries with
//! dotted paths (`snapshot.widths`), so every accessor here takes a path.

use serde_json::{Map, Value};

/// Key holding the schema version
pub const VERSION_KEY: &str = "version";

/// Version assumed when a document carries none
pub const DEFAULT_VERSION: u64 = 1;

/// Parsed configuration document
///
/// Key order is preserved from the source file so that serializing an
/// untouched document reproduces the original layout.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConfigDocument {
    entries: Map<String, Value>,
}

impl ConfigDocument {
    /// Create empty document
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create from an existing mapping
    #[inline]
    #[must_use]
    pub fn from_map(entries: Map<String, Value>) -> Self {
        Self { entries }
    }

    /// Create from a root value
    ///
    /// `null` (an empty file) becomes an empty document. Any other
    /// non-mapping root is handed back unchanged.
    ///
    /// # Errors
    /// Returns the value itself if it is not a mapping.
    pub fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::Object(entries) => Ok(Self { entries }),
            Value::Null => Ok(Self::new()),
            other => Err(other),
        }
    }

    /// Schema version, `DEFAULT_VERSION` when absent or not an integer
    #[must_use]
    pub fn version(&self) -> u64 {
        self.entries
            .get(VERSION_KEY)
            .and_then(Value::as_u64)
            .unwrap_or(DEFAULT_VERSION)
    }

    /// Whether the document declares an integer version
    #[inline]
    #[must_use]
    pub fn has_version(&self) -> bool {
        self.entries.get(VERSION_KEY).is_some_and(Value::is_u64)
    }

    /// Set the schema version
    ///
    /// An existing `version` entry keeps its position; otherwise the entry is
    /// placed first.
    pub fn set_version(&mut self, version: u64) {
        if self.entries.contains_key(VERSION_KEY) {
            self.entries.insert(VERSION_KEY.to_string(), Value::from(version));
            return;
        }

        let mut entries = Map::with_capacity(self.entries.len() + 1);
        entries.insert(VERSION_KEY.to_string(), Value::from(version));
        entries.extend(std::mem::take(&mut self.entries));
        self.entries = entries;
    }

    /// Get value at dotted path
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let mut current = self.entries.get(segments.next()?)?;
        for segment in segments {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    }

    /// Get mutable value at dotted path
    pub fn get_mut(&mut self, path: &str) -> Option<&mut Value> {
        let mut segments = path.split('.');
        let mut current = self.entries.get_mut(segments.next()?)?;
        for segment in segments {
            current = current.as_object_mut()?.get_mut(segment)?;
        }
        Some(current)
    }

    /// Check whether a dotted path is present
    #[inline]
    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    /// Set value at dotted path, returning the previous value
    ///
    /// Intermediate mappings are created as needed; a non-mapping value in
    /// the way is replaced.
    pub fn set(&mut self, path: &str, value: Value) -> Option<Value> {
        let (parents, leaf) = split_leaf(path);
        let mut current = &mut self.entries;
        for segment in parents.into_iter().flat_map(|p| p.split('.')) {
            let slot = current
                .entry(segment.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !slot.is_object() {
                *slot = Value::Object(Map::new());
            }
            current = match slot {
                Value::Object(map) => map,
                _ => unreachable!("slot was just made a mapping"),
            };
        }
        current.insert(leaf.to_string(), value)
    }

    /// Remove value at dotted path
    ///
    /// Sibling order is preserved.
    pub fn remove(&mut self, path: &str) -> Option<Value> {
        let (parents, leaf) = split_leaf(path);
        let mut current = &mut self.entries;
        for segment in parents.into_iter().flat_map(|p| p.split('.')) {
            current = current.get_mut(segment)?.as_object_mut()?;
        }
        current.shift_remove(leaf)
    }

    /// Underlying mapping
    #[inline]
    #[must_use]
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.entries
    }

    /// Consume into the underlying mapping
    #[inline]
    #[must_use]
    pub fn into_map(self) -> Map<String, Value> {
        self.entries
    }

    /// Consume into a root value
    #[inline]
    #[must_use]
    pub fn into_value(self) -> Value {
        Value::Object(self.entries)
    }

    /// Top-level keys in document order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Number of top-level entries
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if document has no entries
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<Map<String, Value>> for ConfigDocument {
    fn from(entries: Map<String, Value>) -> Self {
        Self::from_map(entries)
    }
}

fn split_leaf(path: &str) -> (Option<&str>, &str) {
    match path.rsplit_once('.') {
        Some((parents, leaf)) => (Some(parents), leaf),
        None => (None, path),
    }
}

/// Human-readable name of a value's shape, for error messages
#[must_use]
pub fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "mapping",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn document(value: Value) -> ConfigDocument {
        ConfigDocument::from_value(value).unwrap()
    }

    #[test]
    fn version_defaults_to_one() {
        let doc = document(json!({ "snapshot": {} }));
        assert_eq!(doc.version(), DEFAULT_VERSION);
        assert!(!doc.has_version());

        let doc = document(json!({ "version": "two" }));
        assert_eq!(doc.version(), DEFAULT_VERSION);
    }

    #[test]
    fn set_version_keeps_position() {
        let mut doc = document(json!({ "a": 1, "version": 1, "b": 2 }));
        doc.set_version(2);

        assert_eq!(doc.keys().collect::<Vec<_>>(), ["a", "version", "b"]);
        assert_eq!(doc.version(), 2);
    }

    #[test]
    fn set_version_inserts_first_when_absent() {
        let mut doc = document(json!({ "a": 1, "b": 2 }));
        doc.set_version(2);

        assert_eq!(doc.keys().collect::<Vec<_>>(), ["version", "a", "b"]);
    }

    #[test]
    fn get_nested_path() {
        let doc = document(json!({
            "snapshot": { "widths": [375, 1280], "min-height": 1024 },
            "debug": true
        }));

        assert_eq!(doc.get("snapshot.widths"), Some(&json!([375, 1280])));
        assert_eq!(doc.get("debug"), Some(&json!(true)));
        assert_eq!(doc.get("snapshot.missing"), None);
        assert_eq!(doc.get("debug.nested"), None);
    }

    #[test]
    fn set_creates_intermediates() {
        let mut doc = ConfigDocument::new();
        doc.set("discovery.network-idle-timeout", json!(100));

        assert_eq!(doc.get("discovery.network-idle-timeout"), Some(&json!(100)));
    }

    #[test]
    fn set_replaces_scalar_parent() {
        let mut doc = document(json!({ "agent": true }));
        doc.set("agent.asset-discovery", json!({}));

        assert_eq!(doc.get("agent"), Some(&json!({ "asset-discovery": {} })));
    }

    #[test]
    fn remove_preserves_sibling_order() {
        let mut doc = document(json!({ "a": 1, "b": 2, "c": 3, "d": 4 }));
        assert_eq!(doc.remove("b"), Some(json!(2)));

        assert_eq!(doc.keys().collect::<Vec<_>>(), ["a", "c", "d"]);
    }

    #[test]
    fn remove_nested() {
        let mut doc = document(json!({ "agent": { "x": 1, "y": 2 } }));
        assert_eq!(doc.remove("agent.x"), Some(json!(1)));
        assert_eq!(doc.get("agent"), Some(&json!({ "y": 2 })));
        assert_eq!(doc.remove("agent.x"), None);
        assert_eq!(doc.remove("missing.x"), None);
    }

    #[test]
    fn from_value_rejects_scalars() {
        assert!(ConfigDocument::from_value(json!(null)).unwrap().is_empty());
        assert_eq!(ConfigDocument::from_value(json!([1])), Err(json!([1])));
    }

    #[test]
    fn value_kinds() {
        assert_eq!(value_kind(&json!([])), "sequence");
        assert_eq!(value_kind(&json!({})), "mapping");
        assert_eq!(value_kind(&json!("s")), "string");
    }
}

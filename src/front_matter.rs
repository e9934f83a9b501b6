//! Front matter scanning and the `FrontMatter` mapping.
//!
//! Content files may open with a JSON object that carries metadata for the
//! rest of the pipeline — the layout to inherit from, a title, a permalink,
//! a draft flag:
//!
//! ```text
//! {
//!     "title": "Hello",
//!     "layout": "article"
//! }
//! The body starts here. Braces in the body { are just text }.
//! ```
//!
//! ## The split is delimiter counting, not parsing
//!
//! [`scan`] separates metadata from body by counting braces: `{` increments
//! a nesting counter, `}` decrements it, and the metadata buffer ends the
//! moment the counter returns to zero. No JSON parser runs during the split,
//! so braces appearing later in the body are never mistaken for metadata.
//! The extracted buffer is decoded with `serde_json` afterwards.
//!
//! ## Immutable, order-preserving mapping
//!
//! [`FrontMatter`] is an ordered mapping from dotted string keys to JSON
//! values. It is never mutated: [`FrontMatter::with_data`] returns a new
//! instance produced by a recursive deep merge, so instances are safe to
//! share across parallel renders.

use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("front matter is not a JSON object")]
    NotAnObject,
    #[error("malformed front matter: {0}")]
    Json(#[from] serde_json::Error),
}

/// Split raw file text into `(metadata, body)`.
///
/// If the input does not start with `{`, the metadata is empty and the whole
/// input is body. Otherwise characters belong to the metadata buffer while
/// the brace counter is above zero, or at the `}` that brings it back to
/// exactly zero. The body is trimmed of surrounding whitespace.
pub fn scan(raw: &str) -> (String, String) {
    if !raw.starts_with('{') {
        return (String::new(), raw.trim().to_string());
    }

    let mut meta = String::new();
    let mut body = String::new();
    let mut depth = 0u32;
    let mut in_meta = true;

    for c in raw.chars() {
        if in_meta {
            match c {
                '{' => {
                    depth += 1;
                    meta.push(c);
                }
                '}' => {
                    depth -= 1;
                    meta.push(c);
                    if depth == 0 {
                        // Metadata ends here; everything after is body.
                        in_meta = false;
                    }
                }
                _ => meta.push(c),
            }
        } else {
            body.push(c);
        }
    }

    (meta, body.trim().to_string())
}

/// Ordered front-matter mapping with dotted-key access and deep merge.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrontMatter {
    data: Map<String, Value>,
}

impl FrontMatter {
    pub fn new() -> Self {
        Self { data: Map::new() }
    }

    /// Decode a scanned metadata buffer. Empty or whitespace-only input is
    /// an empty mapping, never an error.
    pub fn parse(meta: &str) -> Result<Self, ParseError> {
        if meta.trim().is_empty() {
            return Ok(Self::new());
        }
        match serde_json::from_str(meta)? {
            Value::Object(data) => Ok(Self { data }),
            _ => Err(ParseError::NotAnObject),
        }
    }

    pub fn from_map(data: Map<String, Value>) -> Self {
        Self { data }
    }

    /// Look up a value by dotted key, traversing nested objects:
    /// `get("author.name")` reads `{"author": {"name": ...}}`.
    pub fn get(&self, dotted_key: &str) -> Option<&Value> {
        let mut segments = dotted_key.split('.');
        let mut current = self.data.get(segments.next()?)?;
        for segment in segments {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    }

    /// Shorthand for string-typed keys (`layout`, `title`, `permalink`).
    pub fn get_str(&self, dotted_key: &str) -> Option<&str> {
        self.get(dotted_key).and_then(Value::as_str)
    }

    pub fn contains(&self, dotted_key: &str) -> bool {
        self.get(dotted_key).is_some()
    }

    /// Return a new mapping with `new_data` deep-merged over this one.
    ///
    /// Keys from `new_data` win on conflict; when both sides hold an object
    /// the two are merged recursively instead of replaced wholesale. The
    /// receiver is left untouched.
    #[must_use]
    pub fn with_data(&self, new_data: &FrontMatter) -> FrontMatter {
        let mut merged = self.data.clone();
        merge_into(&mut merged, &new_data.data);
        FrontMatter { data: merged }
    }

    /// Convenience for deriving a single top-level key.
    #[must_use]
    pub fn with_value(&self, key: &str, value: Value) -> FrontMatter {
        let mut single = Map::new();
        single.insert(key.to_string(), value);
        self.with_data(&FrontMatter { data: single })
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.data
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

fn merge_into(base: &mut Map<String, Value>, overlay: &Map<String, Value>) {
    for (key, value) in overlay {
        match (base.get_mut(key), value) {
            (Some(Value::Object(existing)), Value::Object(incoming)) => {
                merge_into(existing, incoming);
            }
            _ => {
                base.insert(key.clone(), value.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // =========================================================================
    // scan() tests
    // =========================================================================

    #[test]
    fn scan_without_leading_brace_is_all_body() {
        let (meta, body) = scan("# Just markdown\n\nNo metadata here.");
        assert_eq!(meta, "");
        assert_eq!(body, "# Just markdown\n\nNo metadata here.");
    }

    #[test]
    fn scan_splits_metadata_from_body() {
        let (meta, body) = scan("{\"title\": \"Hi\"}\nThe body.");
        assert_eq!(meta, "{\"title\": \"Hi\"}");
        assert_eq!(body, "The body.");
    }

    #[test]
    fn scan_handles_nested_objects() {
        let raw = "{\"a\": {\"b\": {\"c\": 1}}}\nbody";
        let (meta, body) = scan(raw);
        assert_eq!(meta, "{\"a\": {\"b\": {\"c\": 1}}}");
        assert_eq!(body, "body");
    }

    #[test]
    fn scan_ignores_braces_in_body() {
        let raw = "{\"k\": 1}\nSome {braces} in the } body {";
        let (meta, body) = scan(raw);
        assert_eq!(meta, "{\"k\": 1}");
        assert_eq!(body, "Some {braces} in the } body {");
    }

    #[test]
    fn scan_trims_body_whitespace() {
        let (_, body) = scan("{}\n\n   trimmed   \n");
        assert_eq!(body, "trimmed");
    }

    #[test]
    fn scan_empty_input() {
        let (meta, body) = scan("");
        assert_eq!(meta, "");
        assert_eq!(body, "");
    }

    #[test]
    fn scan_metadata_only_no_body() {
        let (meta, body) = scan("{\"title\": \"x\"}");
        assert_eq!(meta, "{\"title\": \"x\"}");
        assert_eq!(body, "");
    }

    #[test]
    fn scan_roundtrips_balanced_metadata() {
        // Property from the contract: any balanced-brace object is recovered
        // exactly, regardless of braces in the body.
        let cases = [
            "{\"a\": 1, \"b\": [1, 2, {\"c\": true}]}",
            "{\"s\": \"no braces\", \"n\": null}",
            "{\"nested\": {\"deep\": {\"er\": \"yes\"}}}",
        ];
        for meta_src in cases {
            let raw = format!("{meta_src}\nbody with }} stray {{ braces");
            let (meta, _) = scan(&raw);
            let original: Value = serde_json::from_str(meta_src).unwrap();
            let recovered: Value = serde_json::from_str(&meta).unwrap();
            assert_eq!(original, recovered);
        }
    }

    // =========================================================================
    // FrontMatter tests
    // =========================================================================

    #[test]
    fn parse_empty_is_empty_mapping() {
        assert!(FrontMatter::parse("").unwrap().is_empty());
        assert!(FrontMatter::parse("   \n").unwrap().is_empty());
    }

    #[test]
    fn parse_malformed_is_error() {
        let err = FrontMatter::parse("{\"title\": }").unwrap_err();
        assert!(matches!(err, ParseError::Json(_)));
    }

    #[test]
    fn parse_non_object_is_error() {
        let err = FrontMatter::parse("[1, 2]").unwrap_err();
        assert!(matches!(err, ParseError::NotAnObject));
    }

    #[test]
    fn dotted_get_traverses_nested_objects() {
        let fm = FrontMatter::parse("{\"author\": {\"name\": \"Ada\"}}").unwrap();
        assert_eq!(fm.get_str("author.name"), Some("Ada"));
        assert_eq!(fm.get("author.missing"), None);
        assert_eq!(fm.get("missing"), None);
    }

    #[test]
    fn with_data_new_keys_win() {
        let a = FrontMatter::parse("{\"title\": \"old\", \"keep\": 1}").unwrap();
        let b = FrontMatter::parse("{\"title\": \"new\"}").unwrap();
        let merged = a.with_data(&b);
        assert_eq!(merged.get_str("title"), Some("new"));
        assert_eq!(merged.get("keep"), Some(&json!(1)));
    }

    #[test]
    fn with_data_merges_nested_mappings_recursively() {
        let a = FrontMatter::parse("{\"site\": {\"name\": \"W\", \"lang\": \"en\"}}").unwrap();
        let b = FrontMatter::parse("{\"site\": {\"lang\": \"pt\"}}").unwrap();
        let merged = a.with_data(&b);
        assert_eq!(merged.get_str("site.lang"), Some("pt"));
        assert_eq!(merged.get_str("site.name"), Some("W"));
    }

    #[test]
    fn with_data_leaves_receiver_unchanged() {
        let a = FrontMatter::parse("{\"title\": \"old\"}").unwrap();
        let b = FrontMatter::parse("{\"title\": \"new\"}").unwrap();
        let _ = a.with_data(&b);
        assert_eq!(a.get_str("title"), Some("old"));
    }

    #[test]
    fn with_data_empty_overlay_is_identity() {
        let a = FrontMatter::parse("{\"x\": [1, 2, 3]}").unwrap();
        assert_eq!(a.with_data(&FrontMatter::new()), a);
    }

    #[test]
    fn with_data_is_associative() {
        let a = FrontMatter::parse("{\"a\": 1, \"n\": {\"x\": 1}}").unwrap();
        let b = FrontMatter::parse("{\"b\": 2, \"n\": {\"y\": 2}}").unwrap();
        let c = FrontMatter::parse("{\"a\": 3, \"n\": {\"x\": 9}}").unwrap();
        assert_eq!(a.with_data(&b).with_data(&c), a.with_data(&b.with_data(&c)));
    }
}

//! Hierarchical query keys.

use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// One segment of a [`QueryKey`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeyPart {
    Str(String),
    /// Canonical JSON of a parameter object: keys sorted, nulls dropped.
    Params(String),
}

impl fmt::Display for KeyPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyPart::Str(s) => write!(f, "{:?}", s),
            KeyPart::Params(json) => write!(f, "{}", json),
        }
    }
}

/// Ordered tuple addressing one cached read, e.g.
/// `["vocabulary", "words", {"page": 2}]`. Equal tuples address the same
/// entry; a key matches every prefix of itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryKey(Vec<KeyPart>);

impl QueryKey {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a string segment.
    pub fn push(mut self, part: impl Into<String>) -> Self {
        self.0.push(KeyPart::Str(part.into()));
        self
    }

    /// Append a parameter segment. Serialization that fails (only possible
    /// for maps with non-string keys) degrades to `null`.
    pub fn with_params<P: Serialize + ?Sized>(mut self, params: &P) -> Self {
        let value = serde_json::to_value(params).unwrap_or(Value::Null);
        self.0.push(KeyPart::Params(canonical_json(value)));
        self
    }

    pub fn parts(&self) -> &[KeyPart] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether `prefix` is a leading sub-tuple of this key. The empty key
    /// matches everything.
    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        self.0.starts_with(&prefix.0)
    }

    /// First segment, the key's domain (`auth`, `vocabulary`, `practice`).
    pub fn domain(&self) -> Option<&str> {
        match self.0.first() {
            Some(KeyPart::Str(s)) => Some(s),
            _ => None,
        }
    }
}

fn strip_nulls(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k, strip_nulls(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(strip_nulls).collect()),
        other => other,
    }
}

fn canonical_json(value: Value) -> String {
    // serde_json's default map is ordered, so object keys come out sorted.
    strip_nulls(value).to_string()
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, part) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", part)?;
        }
        write!(f, "]")
    }
}

impl<const N: usize> From<[&str; N]> for QueryKey {
    fn from(parts: [&str; N]) -> Self {
        parts.into_iter().fold(QueryKey::new(), QueryKey::push)
    }
}

impl From<&str> for QueryKey {
    fn from(part: &str) -> Self {
        QueryKey::new().push(part)
    }
}

impl From<Vec<KeyPart>> for QueryKey {
    fn from(parts: Vec<KeyPart>) -> Self {
        QueryKey(parts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn prefix_matching() {
        let key = QueryKey::from(["practice", "sessions", "recent"]);
        assert!(key.starts_with(&QueryKey::from(["practice"])));
        assert!(key.starts_with(&QueryKey::from(["practice", "sessions"])));
        assert!(key.starts_with(&key.clone()));
        assert!(key.starts_with(&QueryKey::new()));
        assert!(!key.starts_with(&QueryKey::from(["practice", "stats"])));
        assert!(!QueryKey::from(["practice"]).starts_with(&key));
        // Segment-wise, not string-wise.
        assert!(!QueryKey::from(["vocabulary", "words"])
            .starts_with(&QueryKey::from(["vocabulary", "word"])));
    }

    #[test]
    fn params_are_canonical() {
        let a = QueryKey::from(["vocabulary", "words"]).with_params(&json!({"page": 1, "limit": 20}));
        let b = QueryKey::from(["vocabulary", "words"])
            .with_params(&json!({"limit": 20, "page": 1, "query": null}));
        assert_eq!(a, b);
        assert_eq!(a.to_string(), r#"["vocabulary","words",{"limit":20,"page":1}]"#);

        let c = QueryKey::from(["vocabulary", "words"]).with_params(&json!({"page": 2, "limit": 20}));
        assert_ne!(a, c);
    }

    #[test]
    fn domain_is_first_segment() {
        assert_eq!(QueryKey::from(["auth", "user"]).domain(), Some("auth"));
        assert_eq!(QueryKey::new().domain(), None);
    }
}

//! Vocabulary search parameters.

use serde::{Deserialize, Serialize};

use super::{Validate, ValidationErrors, MAX_PAGE_SIZE, MAX_QUERY_LEN};
use crate::types::{Difficulty, SortField, SortOrder};

/// Filters for word listings. Part of the cache key of the listing they
/// produce, so unset fields are omitted when serialized: the default value
/// and `{}` address the same cache entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VocabularySearchParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<SortField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<SortOrder>,
}

impl VocabularySearchParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = Some(difficulty);
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn with_page(mut self, page: u32, limit: u32) -> Self {
        self.page = Some(page);
        self.limit = Some(limit);
        self
    }

    pub fn with_sort(mut self, sort: SortField, order: SortOrder) -> Self {
        self.sort = Some(sort);
        self.order = Some(order);
        self
    }

    /// Query-string pairs. Tags repeat as `tags[]`.
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut out = Vec::new();
        if let Some(q) = &self.query {
            out.push(("query".to_string(), q.clone()));
        }
        if let Some(d) = self.difficulty {
            out.push(("difficulty".to_string(), d.as_str().to_string()));
        }
        if let Some(c) = &self.category {
            out.push(("category".to_string(), c.clone()));
        }
        for tag in &self.tags {
            out.push(("tags[]".to_string(), tag.clone()));
        }
        if let Some(p) = self.page {
            out.push(("page".to_string(), p.to_string()));
        }
        if let Some(l) = self.limit {
            out.push(("limit".to_string(), l.to_string()));
        }
        if let Some(s) = self.sort {
            out.push(("sort".to_string(), s.as_str().to_string()));
        }
        if let Some(o) = self.order {
            out.push(("order".to_string(), o.as_str().to_string()));
        }
        out
    }
}

impl Validate for VocabularySearchParams {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Some(q) = &self.query {
            if q.chars().count() > MAX_QUERY_LEN {
                errors.add(
                    "query",
                    format!("Search query must be at most {} characters", MAX_QUERY_LEN),
                );
            }
        }
        if let Some(c) = &self.category {
            if c.trim().is_empty() {
                errors.add("category", "Category cannot be blank");
            }
        }
        if self.tags.iter().any(|t| t.trim().is_empty()) {
            errors.add("tags", "Tags cannot be blank");
        }
        if self.page == Some(0) {
            errors.add("page", "Page must be at least 1");
        }
        if let Some(limit) = self.limit {
            if limit == 0 || limit > MAX_PAGE_SIZE {
                errors.add(
                    "limit",
                    format!("Limit must be between 1 and {}", MAX_PAGE_SIZE),
                );
            }
        }
        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_params_serialize_to_empty_object() {
        let value = serde_json::to_value(VocabularySearchParams::default()).unwrap();
        assert_eq!(value, serde_json::json!({}));
    }

    #[test]
    fn query_pairs_repeat_tags() {
        let params = VocabularySearchParams::new()
            .with_difficulty(Difficulty::Advanced)
            .with_tag("th")
            .with_tag("vowels")
            .with_page(2, 20);
        assert_eq!(
            params.to_query(),
            vec![
                ("difficulty".to_string(), "advanced".to_string()),
                ("tags[]".to_string(), "th".to_string()),
                ("tags[]".to_string(), "vowels".to_string()),
                ("page".to_string(), "2".to_string()),
                ("limit".to_string(), "20".to_string()),
            ]
        );
    }

    #[test]
    fn pagination_bounds() {
        let errs = VocabularySearchParams::new()
            .with_page(0, 500)
            .validate()
            .unwrap_err();
        assert!(errs.has("page"));
        assert!(errs.has("limit"));
        assert!(VocabularySearchParams::new().with_page(1, 100).validate().is_ok());
    }
}

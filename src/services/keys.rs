//! Query keys of every cached read.
//!
//! ```text
//! auth/user
//! vocabulary/words/{params}   vocabulary/word/{id}   vocabulary/practice
//! vocabulary/categories       vocabulary/tags
//! practice/stats              practice/goals
//! practice/sessions/recent    practice/sessions/{id} practice/sessions/word/{id}
//! ```

use crate::cache::QueryKey;
use crate::schema::VocabularySearchParams;

pub const AUTH: &str = "auth";
pub const VOCABULARY: &str = "vocabulary";
pub const PRACTICE: &str = "practice";

pub fn auth_user() -> QueryKey {
    QueryKey::from([AUTH, "user"])
}

pub fn vocabulary() -> QueryKey {
    QueryKey::from([VOCABULARY])
}

/// Prefix of every word listing, whatever its filters.
pub fn word_lists() -> QueryKey {
    QueryKey::from([VOCABULARY, "words"])
}

pub fn words(params: &VocabularySearchParams) -> QueryKey {
    word_lists().with_params(params)
}

pub fn word(id: &str) -> QueryKey {
    QueryKey::from([VOCABULARY, "word", id])
}

pub fn practice_words() -> QueryKey {
    QueryKey::from([VOCABULARY, "practice"])
}

pub fn categories() -> QueryKey {
    QueryKey::from([VOCABULARY, "categories"])
}

pub fn tags() -> QueryKey {
    QueryKey::from([VOCABULARY, "tags"])
}

pub fn practice() -> QueryKey {
    QueryKey::from([PRACTICE])
}

pub fn stats() -> QueryKey {
    QueryKey::from([PRACTICE, "stats"])
}

/// Prefix of every session read.
pub fn sessions() -> QueryKey {
    QueryKey::from([PRACTICE, "sessions"])
}

pub fn recent_sessions() -> QueryKey {
    QueryKey::from([PRACTICE, "sessions", "recent"])
}

pub fn session(id: &str) -> QueryKey {
    QueryKey::from([PRACTICE, "sessions", id])
}

pub fn sessions_by_word(word_id: &str) -> QueryKey {
    QueryKey::from([PRACTICE, "sessions", "word", word_id])
}

pub fn goals() -> QueryKey {
    QueryKey::from([PRACTICE, "goals"])
}

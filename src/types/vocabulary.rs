//! Vocabulary types.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Beginner => "beginner",
            Difficulty::Intermediate => "intermediate",
            Difficulty::Advanced => "advanced",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    pub id: String,
    pub word: String,
    /// Phonetic transcription.
    pub ipa: String,
    #[serde(default)]
    pub definition: String,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub practice_count: u32,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PracticeWord {
    #[serde(flatten)]
    pub word: Word,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_practiced: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best_score: Option<f64>,
    #[serde(default)]
    pub attempts_count: u32,
}

/// One page of a word listing or search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VocabularyPage {
    pub words: Vec<Word>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
}

impl VocabularyPage {
    /// Apply `f` to the practice counter of every word with `word_id`.
    /// Returns whether any word matched.
    pub fn adjust_practice_count(&mut self, word_id: &str, f: impl Fn(u32) -> u32) -> bool {
        let mut touched = false;
        for word in self.words.iter_mut().filter(|w| w.id == word_id) {
            word.practice_count = f(word.practice_count);
            touched = true;
        }
        touched
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    Word,
    Difficulty,
    PracticeCount,
    CreatedAt,
}

impl SortField {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::Word => "word",
            SortField::Difficulty => "difficulty",
            SortField::PracticeCount => "practice_count",
            SortField::CreatedAt => "created_at",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

use std::sync::Arc;
use std::time::Duration;

use super::keys;
use crate::api::{check_id, VocabularyApi};
use crate::cache::{Mutation, MutationStatus, QueryClient, QueryOptions};
use crate::schema::{Validate, VocabularySearchParams};
use crate::types::{PracticeWord, VocabularyPage, Word};
use crate::Result;

pub const WORDS_STALE_TIME: Duration = Duration::from_secs(2 * 60);
pub const WORD_STALE_TIME: Duration = Duration::from_secs(5 * 60);
pub const PRACTICE_WORDS_STALE_TIME: Duration = Duration::from_secs(60);
pub const REFERENCE_STALE_TIME: Duration = Duration::from_secs(10 * 60);

pub struct VocabularyMutations {
    pub add_to_practice: Mutation<()>,
    pub remove_from_practice: Mutation<()>,
    /// Search results live in this mutation's state, not in the cache.
    pub search: Mutation<VocabularyPage>,
}

impl VocabularyMutations {
    fn new() -> Self {
        Self {
            add_to_practice: Mutation::new(keys::VOCABULARY, "add_to_practice"),
            remove_from_practice: Mutation::new(keys::VOCABULARY, "remove_from_practice"),
            search: Mutation::new(keys::VOCABULARY, "search"),
        }
    }
}

#[derive(Clone)]
pub struct VocabularyService {
    api: VocabularyApi,
    query: QueryClient,
    mutations: Arc<VocabularyMutations>,
}

impl VocabularyService {
    pub fn new(api: VocabularyApi, query: QueryClient) -> Self {
        Self {
            api,
            query,
            mutations: Arc::new(VocabularyMutations::new()),
        }
    }

    pub fn mutations(&self) -> &VocabularyMutations {
        &self.mutations
    }

    fn options(&self, stale_time: Duration) -> QueryOptions {
        self.query.defaults().clone().with_stale_time(stale_time)
    }

    /// One page of words. Each distinct filter set is its own cache entry.
    pub async fn words(&self, params: &VocabularySearchParams) -> Result<VocabularyPage> {
        params.validate()?;
        let api = self.api.clone();
        let owned = params.clone();
        self.query
            .read(keys::words(params), &self.options(WORDS_STALE_TIME), move || {
                let api = api.clone();
                let params = owned.clone();
                async move { api.get_words(&params).await }
            })
            .await
    }

    pub async fn word(&self, id: &str) -> Result<Word> {
        check_id("word_id", id)?;
        let api = self.api.clone();
        let owned = id.to_string();
        self.query
            .read(keys::word(id), &self.options(WORD_STALE_TIME), move || {
                let api = api.clone();
                let id = owned.clone();
                async move { api.get_word(&id).await }
            })
            .await
    }

    pub async fn practice_words(&self) -> Result<Vec<PracticeWord>> {
        let api = self.api.clone();
        self.query
            .read(
                keys::practice_words(),
                &self.options(PRACTICE_WORDS_STALE_TIME),
                move || {
                    let api = api.clone();
                    async move { api.get_practice_words().await }
                },
            )
            .await
    }

    pub async fn categories(&self) -> Result<Vec<String>> {
        let api = self.api.clone();
        self.query
            .read(keys::categories(), &self.options(REFERENCE_STALE_TIME), move || {
                let api = api.clone();
                async move { api.get_categories().await }
            })
            .await
    }

    pub async fn tags(&self) -> Result<Vec<String>> {
        let api = self.api.clone();
        self.query
            .read(keys::tags(), &self.options(REFERENCE_STALE_TIME), move || {
                let api = api.clone();
                async move { api.get_tags().await }
            })
            .await
    }

    pub async fn search_words(
        &self,
        query: &str,
        params: &VocabularySearchParams,
    ) -> Result<VocabularyPage> {
        self.mutations
            .search
            .run(self.api.search_words(query, params), |_| ())
            .await
    }

    pub fn search_results(&self) -> Option<VocabularyPage> {
        self.mutations.search.status().data().cloned()
    }

    pub async fn add_to_practice(&self, word_id: &str) -> Result<()> {
        self.mutations
            .add_to_practice
            .run(self.api.add_to_practice(word_id), |_| {
                self.after_practice_change(word_id, |count| count.saturating_add(1))
            })
            .await
    }

    /// The cached counter never drops below zero.
    pub async fn remove_from_practice(&self, word_id: &str) -> Result<()> {
        self.mutations
            .remove_from_practice
            .run(self.api.remove_from_practice(word_id), |_| {
                self.after_practice_change(word_id, |count| count.saturating_sub(1))
            })
            .await
    }

    pub fn add_to_practice_state(&self) -> MutationStatus<()> {
        self.mutations.add_to_practice.status()
    }

    pub fn remove_from_practice_state(&self) -> MutationStatus<()> {
        self.mutations.remove_from_practice.status()
    }

    fn after_practice_change(&self, word_id: &str, adjust: impl Fn(u32) -> u32) {
        self.query.invalidate_queries(&keys::practice_words());
        self.query
            .update_queries_data(&keys::word_lists(), |_, mut page: VocabularyPage| {
                page.adjust_practice_count(word_id, &adjust).then_some(page)
            });
    }
}

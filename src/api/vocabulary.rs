use std::sync::Arc;

use reqwest::Method;

use super::{check_id, validated};
use crate::schema::VocabularySearchParams;
use crate::transport::{HttpTransport, RequestBody, RequestConfig};
use crate::types::{PracticeWord, VocabularyPage, Word};
use crate::Result;

#[derive(Clone)]
pub struct VocabularyApi {
    http: Arc<HttpTransport>,
}

impl VocabularyApi {
    pub fn new(http: Arc<HttpTransport>) -> Self {
        Self { http }
    }

    pub async fn get_words(&self, params: &VocabularySearchParams) -> Result<VocabularyPage> {
        validated(params)?;
        self.http
            .get(
                "/vocabulary",
                RequestConfig::default().with_query(params.to_query()),
            )
            .await
    }

    pub async fn get_word(&self, id: &str) -> Result<Word> {
        check_id("word_id", id)?;
        self.http
            .get(&format!("/vocabulary/{}", id), RequestConfig::default())
            .await
    }

    pub async fn add_to_practice(&self, word_id: &str) -> Result<()> {
        check_id("word_id", word_id)?;
        self.http
            .execute(
                Method::POST,
                &format!("/vocabulary/{}/practice", word_id),
                RequestBody::Empty,
            )
            .await
    }

    pub async fn remove_from_practice(&self, word_id: &str) -> Result<()> {
        check_id("word_id", word_id)?;
        self.http
            .execute(
                Method::DELETE,
                &format!("/vocabulary/{}/practice", word_id),
                RequestBody::Empty,
            )
            .await
    }

    pub async fn get_practice_words(&self) -> Result<Vec<PracticeWord>> {
        self.http
            .get("/vocabulary/practice", RequestConfig::default())
            .await
    }

    /// `query` overrides any query already present in `params`.
    pub async fn search_words(
        &self,
        query: &str,
        params: &VocabularySearchParams,
    ) -> Result<VocabularyPage> {
        let params = VocabularySearchParams {
            query: Some(query.to_string()),
            ..params.clone()
        };
        validated(&params)?;
        self.http
            .get(
                "/vocabulary/search",
                RequestConfig::default().with_query(params.to_query()),
            )
            .await
    }

    pub async fn get_categories(&self) -> Result<Vec<String>> {
        self.http
            .get("/vocabulary/categories", RequestConfig::default())
            .await
    }

    pub async fn get_tags(&self) -> Result<Vec<String>> {
        self.http
            .get("/vocabulary/tags", RequestConfig::default())
            .await
    }
}

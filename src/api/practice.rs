use std::sync::Arc;

use reqwest::Method;
use serde_json::json;

use super::{check_id, validated};
use crate::schema::{GoalUpdate, NewGoal};
use crate::transport::{HttpTransport, RequestBody, RequestConfig};
use crate::types::{PracticeFeedback, PracticeGoal, PracticeSession, PracticeStats, Recording};
use crate::Result;

/// Default page size of session listings.
pub const DEFAULT_SESSION_LIMIT: u32 = 10;

/// Multipart field carrying a recording.
const AUDIO_FIELD: &str = "audio";

#[derive(Clone)]
pub struct PracticeApi {
    http: Arc<HttpTransport>,
}

impl PracticeApi {
    pub fn new(http: Arc<HttpTransport>) -> Self {
        Self { http }
    }

    pub async fn start_session(&self, word_id: &str) -> Result<PracticeSession> {
        check_id("word_id", word_id)?;
        self.http
            .post("/practice/sessions", &json!({ "word_id": word_id }))
            .await
    }

    pub async fn submit_recording(
        &self,
        session_id: &str,
        recording: &Recording,
    ) -> Result<PracticeFeedback> {
        check_id("session_id", session_id)?;
        let body = RequestBody::Multipart {
            field: AUDIO_FIELD.to_string(),
            bytes: recording.bytes.clone(),
            file_name: recording.file_name.clone(),
            mime: recording.mime.clone(),
        };
        self.http
            .send(
                Method::POST,
                &format!("/practice/sessions/{}/submit", session_id),
                body,
                RequestConfig::default(),
            )
            .await?
            .json()
    }

    pub async fn get_session(&self, session_id: &str) -> Result<PracticeSession> {
        check_id("session_id", session_id)?;
        self.http
            .get(
                &format!("/practice/sessions/{}", session_id),
                RequestConfig::default(),
            )
            .await
    }

    pub async fn get_stats(&self) -> Result<PracticeStats> {
        self.http
            .get("/practice/stats", RequestConfig::default())
            .await
    }

    pub async fn get_recent_sessions(&self, limit: u32) -> Result<Vec<PracticeSession>> {
        self.http
            .get(
                "/practice/sessions/recent",
                RequestConfig::default().with_param("limit", limit),
            )
            .await
    }

    pub async fn get_sessions_by_word(
        &self,
        word_id: &str,
        limit: u32,
    ) -> Result<Vec<PracticeSession>> {
        check_id("word_id", word_id)?;
        self.http
            .get(
                &format!("/practice/sessions/word/{}", word_id),
                RequestConfig::default().with_param("limit", limit),
            )
            .await
    }

    pub async fn delete_session(&self, session_id: &str) -> Result<()> {
        check_id("session_id", session_id)?;
        self.http
            .execute(
                Method::DELETE,
                &format!("/practice/sessions/{}", session_id),
                RequestBody::Empty,
            )
            .await
    }

    pub async fn get_goals(&self) -> Result<Vec<PracticeGoal>> {
        self.http
            .get("/practice/goals", RequestConfig::default())
            .await
    }

    pub async fn create_goal(&self, goal: &NewGoal) -> Result<PracticeGoal> {
        validated(goal)?;
        self.http.post("/practice/goals", goal).await
    }

    pub async fn update_goal(&self, goal_id: &str, update: &GoalUpdate) -> Result<PracticeGoal> {
        check_id("goal_id", goal_id)?;
        validated(update)?;
        self.http
            .put(&format!("/practice/goals/{}", goal_id), update)
            .await
    }

    pub async fn delete_goal(&self, goal_id: &str) -> Result<()> {
        check_id("goal_id", goal_id)?;
        self.http
            .execute(
                Method::DELETE,
                &format!("/practice/goals/{}", goal_id),
                RequestBody::Empty,
            )
            .await
    }
}

//! Mock backend fixture shared by the integration tests.

#![allow(dead_code)]

use mockito::{Matcher, Mock, Server, ServerGuard};
use pronounce_client::cache::{QueryOptions, RetryPolicy};
use pronounce_client::schema::LoginForm;
use pronounce_client::{AppContext, ClientConfig, MemoryNavigator};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

/// A mock backend plus a client context pointed at it.
pub struct MockBackend {
    pub server: ServerGuard,
    pub navigator: Arc<MemoryNavigator>,
    pub ctx: AppContext,
}

impl MockBackend {
    pub async fn new() -> Self {
        Self::at_path("/dashboard").await
    }

    /// Start with the navigator on `path`.
    pub async fn at_path(path: &str) -> Self {
        let server = Server::new_async().await;
        let navigator = Arc::new(MemoryNavigator::new(path));
        // Keep retry backoff short so retrying tests finish quickly.
        let config = ClientConfig::new(server.url()).with_query_defaults(
            QueryOptions::default().with_retry(
                RetryPolicy::default().with_base_delay(Duration::from_millis(5)),
            ),
        );
        let ctx = AppContext::builder(config)
            .with_navigator(navigator.clone())
            .build()
            .expect("context builds");
        Self {
            server,
            navigator,
            ctx,
        }
    }

    pub async fn mock_json(&mut self, method: &str, path: &str, status: usize, body: Value) -> Mock {
        self.server
            .mock(method, path)
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .create_async()
            .await
    }

    /// Like [`mock_json`](Self::mock_json) with an exact call count.
    pub async fn expect_json(
        &mut self,
        method: &str,
        path: &str,
        status: usize,
        body: Value,
        hits: usize,
    ) -> Mock {
        self.server
            .mock(method, path)
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .expect(hits)
            .create_async()
            .await
    }

    /// GET with any query string.
    pub async fn expect_get_any_query(&mut self, path: &str, body: Value, hits: usize) -> Mock {
        self.server
            .mock("GET", path)
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .expect(hits)
            .create_async()
            .await
    }

    /// Sign in as Ada through the auth service.
    pub async fn sign_in(&mut self) -> Mock {
        let mock = self
            .mock_json("POST", "/auth/login", 200, auth_response_json())
            .await;
        self.ctx
            .auth()
            .login(&LoginForm::new("ada@example.com", "correct horse"))
            .await
            .expect("login succeeds");
        mock
    }
}

pub fn user_json() -> Value {
    json!({
        "id": "u1",
        "name": "Ada",
        "email": "ada@example.com",
        "native_language": "fr",
        "created_at": "2024-01-01T00:00:00Z",
        "updated_at": "2024-01-01T00:00:00Z"
    })
}

pub fn auth_response_json() -> Value {
    json!({ "user": user_json(), "token": "session-token" })
}

pub fn word_json(id: &str, practice_count: u32) -> Value {
    json!({
        "id": id,
        "word": format!("word-{}", id),
        "ipa": "/wɜːd/",
        "definition": "",
        "difficulty": "beginner",
        "category": "basics",
        "tags": ["th"],
        "practice_count": practice_count,
        "created_at": "2024-01-01T00:00:00Z",
        "updated_at": "2024-01-01T00:00:00Z"
    })
}

pub fn page_json(words: Vec<Value>) -> Value {
    let total = words.len();
    json!({
        "words": words,
        "total": total,
        "page": 1,
        "limit": 20,
        "total_pages": 1
    })
}

pub fn session_json(id: &str) -> Value {
    json!({
        "id": id,
        "word_id": "w1",
        "user_id": "u1",
        "created_at": "2024-05-01T10:00:00Z",
        "updated_at": "2024-05-01T10:00:00Z"
    })
}

pub fn stats_json() -> Value {
    json!({
        "total_sessions": 12,
        "average_score": 81.5,
        "words_practiced": 7,
        "current_streak": 3,
        "daily_goal_progress": 0.5,
        "weekly_progress": [],
        "monthly_progress": [],
        "difficulty_breakdown": {"beginner": 5},
        "category_breakdown": {}
    })
}

pub fn feedback_json(score: f64) -> Value {
    json!({
        "overall_score": score,
        "phoneme_scores": {"θ": 72.0},
        "suggestions": ["Place the tongue between the teeth"],
        "accuracy": 80.0,
        "fluency": 85.0,
        "pronunciation": 78.0,
        "word_accuracy": 90.0,
        "rhythm_score": 70.0,
        "stress_score": 75.0
    })
}

pub fn goal_json(id: &str) -> Value {
    json!({
        "id": id,
        "user_id": "u1",
        "type": "daily_sessions",
        "target_value": 3,
        "current_value": 1,
        "start_date": "2024-05-01",
        "end_date": "2024-05-31",
        "is_active": true
    })
}

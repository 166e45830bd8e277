use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use super::keys;
use crate::api::{check_id, PracticeApi, DEFAULT_SESSION_LIMIT};
use crate::cache::{Mutation, QueryClient, QueryOptions};
use crate::schema::{GoalUpdate, NewGoal};
use crate::types::{PracticeFeedback, PracticeGoal, PracticeSession, PracticeStats, Recording};
use crate::Result;

pub const STATS_STALE_TIME: Duration = Duration::from_secs(60);
pub const RECENT_SESSIONS_STALE_TIME: Duration = Duration::from_secs(30);
pub const GOALS_STALE_TIME: Duration = Duration::from_secs(5 * 60);

/// Upper bound on the cached recent-sessions list.
pub const RECENT_SESSIONS_CAP: usize = 10;

pub struct PracticeMutations {
    pub start_session: Mutation<PracticeSession>,
    pub submit_recording: Mutation<PracticeFeedback>,
    pub delete_session: Mutation<()>,
    pub create_goal: Mutation<PracticeGoal>,
    pub update_goal: Mutation<PracticeGoal>,
    pub delete_goal: Mutation<()>,
}

impl PracticeMutations {
    fn new() -> Self {
        Self {
            start_session: Mutation::new(keys::PRACTICE, "start_session"),
            submit_recording: Mutation::new(keys::PRACTICE, "submit_recording"),
            delete_session: Mutation::new(keys::PRACTICE, "delete_session"),
            create_goal: Mutation::new(keys::PRACTICE, "create_goal"),
            update_goal: Mutation::new(keys::PRACTICE, "update_goal"),
            delete_goal: Mutation::new(keys::PRACTICE, "delete_goal"),
        }
    }
}

/// Practice sessions, statistics and goals.
#[derive(Clone)]
pub struct PracticeService {
    api: PracticeApi,
    query: QueryClient,
    mutations: Arc<PracticeMutations>,
}

impl PracticeService {
    pub fn new(api: PracticeApi, query: QueryClient) -> Self {
        Self {
            api,
            query,
            mutations: Arc::new(PracticeMutations::new()),
        }
    }

    pub fn mutations(&self) -> &PracticeMutations {
        &self.mutations
    }

    fn options(&self, stale_time: Duration) -> QueryOptions {
        self.query.defaults().clone().with_stale_time(stale_time)
    }

    pub async fn stats(&self) -> Result<PracticeStats> {
        let api = self.api.clone();
        self.query
            .read(keys::stats(), &self.options(STATS_STALE_TIME), move || {
                let api = api.clone();
                async move { api.get_stats().await }
            })
            .await
    }

    pub async fn recent_sessions(&self) -> Result<Vec<PracticeSession>> {
        let api = self.api.clone();
        self.query
            .read(
                keys::recent_sessions(),
                &self.options(RECENT_SESSIONS_STALE_TIME),
                move || {
                    let api = api.clone();
                    async move { api.get_recent_sessions(DEFAULT_SESSION_LIMIT).await }
                },
            )
            .await
    }

    pub async fn session(&self, id: &str) -> Result<PracticeSession> {
        check_id("session_id", id)?;
        let api = self.api.clone();
        let owned = id.to_string();
        self.query
            .read(keys::session(id), self.query.defaults(), move || {
                let api = api.clone();
                let id = owned.clone();
                async move { api.get_session(&id).await }
            })
            .await
    }

    pub async fn sessions_by_word(&self, word_id: &str) -> Result<Vec<PracticeSession>> {
        check_id("word_id", word_id)?;
        let api = self.api.clone();
        let owned = word_id.to_string();
        self.query
            .read(
                keys::sessions_by_word(word_id),
                self.query.defaults(),
                move || {
                    let api = api.clone();
                    let word_id = owned.clone();
                    async move {
                        api.get_sessions_by_word(&word_id, DEFAULT_SESSION_LIMIT)
                            .await
                    }
                },
            )
            .await
    }

    pub async fn goals(&self) -> Result<Vec<PracticeGoal>> {
        let api = self.api.clone();
        self.query
            .read(keys::goals(), &self.options(GOALS_STALE_TIME), move || {
                let api = api.clone();
                async move { api.get_goals().await }
            })
            .await
    }

    /// Start a session and put it at the head of the cached recent list.
    pub async fn start_session(&self, word_id: &str) -> Result<PracticeSession> {
        self.mutations
            .start_session
            .run(self.api.start_session(word_id), |session| {
                self.invalidate_progress();
                let result = self.query.upsert_query_data(
                    &keys::recent_sessions(),
                    |old: Option<Vec<PracticeSession>>| {
                        let mut list = Vec::with_capacity(RECENT_SESSIONS_CAP);
                        list.push(session.clone());
                        list.extend(
                            old.unwrap_or_default()
                                .into_iter()
                                .take(RECENT_SESSIONS_CAP - 1),
                        );
                        list
                    },
                );
                if let Err(err) = result {
                    warn!(error = %err, "failed to cache new practice session");
                }
            })
            .await
    }

    /// Score a recording and attach the feedback to the matching cached
    /// recent session. Other entries are left as they were.
    pub async fn submit_recording(
        &self,
        session_id: &str,
        recording: &Recording,
    ) -> Result<PracticeFeedback> {
        self.mutations
            .submit_recording
            .run(self.api.submit_recording(session_id, recording), |feedback| {
                self.invalidate_progress();
                self.query.update_query_data(
                    &keys::recent_sessions(),
                    |mut list: Vec<PracticeSession>| {
                        for session in list.iter_mut().filter(|s| s.id == session_id) {
                            session.apply_feedback(feedback);
                        }
                        list
                    },
                );
            })
            .await
    }

    pub async fn delete_session(&self, session_id: &str) -> Result<()> {
        self.mutations
            .delete_session
            .run(self.api.delete_session(session_id), |_| {
                self.query.update_query_data(
                    &keys::recent_sessions(),
                    |mut list: Vec<PracticeSession>| {
                        list.retain(|s| s.id != session_id);
                        list
                    },
                );
                self.query.remove_queries(&keys::session(session_id));
                self.query.invalidate_queries(&keys::stats());
            })
            .await
    }

    pub async fn create_goal(&self, goal: &NewGoal) -> Result<PracticeGoal> {
        self.mutations
            .create_goal
            .run(self.api.create_goal(goal), |_| self.invalidate_goals())
            .await
    }

    pub async fn update_goal(&self, goal_id: &str, update: &GoalUpdate) -> Result<PracticeGoal> {
        self.mutations
            .update_goal
            .run(self.api.update_goal(goal_id, update), |_| {
                self.invalidate_goals()
            })
            .await
    }

    pub async fn delete_goal(&self, goal_id: &str) -> Result<()> {
        self.mutations
            .delete_goal
            .run(self.api.delete_goal(goal_id), |_| self.invalidate_goals())
            .await
    }

    fn invalidate_progress(&self) {
        self.query.invalidate_queries(&keys::stats());
        self.query.invalidate_queries(&keys::sessions());
    }

    fn invalidate_goals(&self) {
        self.query.invalidate_queries(&keys::goals());
    }
}

//! 业务服务模块：声明每个资源的缓存读取与变更副作用。
//!
//! # Services
//!
//! Per-resource services built on the resource clients and the shared
//! [`QueryClient`](crate::cache::QueryClient). A service declares what each
//! read fetches, under which key and for how long it stays fresh, and what
//! every mutation does to the cache once it succeeds. Reads go through
//! [`QueryClient::read`](crate::cache::QueryClient::read), so a cached value
//! outlives a failing backend.
//!
//! | Mutation | Cache effect on success |
//! |----------|-------------------------|
//! | login / register / refresh | write `auth/user`; invalidate `practice` and `vocabulary` |
//! | logout | clear cache and session (also on failure) |
//! | start session | invalidate stats and sessions; prepend to recent list (max 10) |
//! | submit recording | invalidate stats and sessions; attach feedback to the recent entry |
//! | delete session | drop it from the recent list; invalidate stats |
//! | goal create / update / delete | invalidate `practice/goals` |
//! | add / remove practice word | invalidate `vocabulary/practice`; adjust counters in every word list |
//!
//! Failures are stored in each mutation's observable state and logged; no
//! mutation is retried.

mod auth;
pub mod keys;
mod practice;
mod vocabulary;

pub use auth::{AuthMutations, AuthService, USER_STALE_TIME};
pub use practice::{
    PracticeMutations, PracticeService, GOALS_STALE_TIME, RECENT_SESSIONS_CAP,
    RECENT_SESSIONS_STALE_TIME, STATS_STALE_TIME,
};
pub use vocabulary::{
    VocabularyMutations, VocabularyService, PRACTICE_WORDS_STALE_TIME, REFERENCE_STALE_TIME,
    WORDS_STALE_TIME, WORD_STALE_TIME,
};

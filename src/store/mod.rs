//! 会话状态模块：保存当前登录用户，并派生“已认证”标志。
//!
//! # Session Store
//!
//! The smallest piece of shared identity state: the current user and a
//! loading flag. `is_authenticated` is derived from the user on every read and
//! is never stored on its own.
//!
//! The store is created once with the [`AppContext`](crate::AppContext) and
//! lives as long as it. Besides logout, the session-expired hook (401) is the
//! only path that clears it.

mod session;

pub use session::{LoadingGuard, SessionState, SessionStore};

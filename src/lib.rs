//! # pronounce-client
//!
//! 发音练习应用的客户端运行时：HTTP 传输、资源客户端、查询缓存与会话状态。
//!
//! Client runtime for the pronunciation-coaching API.
//!
//! ## Overview
//!
//! The crate turns imperative API calls into a consistent, observable cache:
//!
//! - **Transport**: one HTTP client with a fixed base URL, a cookie store for
//!   the session, an interceptor pipeline and normalized errors.
//! - **Resource clients**: typed wrappers for the auth, vocabulary and
//!   practice endpoint families.
//! - **Query cache**: hierarchical keys, staleness windows, bounded retry,
//!   in-flight de-duplication and sequence-numbered writes.
//! - **Session store**: the signed-in user, observable.
//! - **Services**: per-resource reads and mutations with their cache effects.
//!
//! Control flow: caller → service → resource client → transport → backend →
//! interceptors → cache update → session update.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pronounce_client::{AppContext, ClientConfig};
//! use pronounce_client::schema::{LoginForm, VocabularySearchParams};
//!
//! #[tokio::main]
//! async fn main() -> pronounce_client::Result<()> {
//!     let ctx = AppContext::new(ClientConfig::from_env()?)?;
//!     ctx.auth().login(&LoginForm::new("ada@example.com", "secret-pass")).await?;
//!
//!     let page = ctx.vocabulary().words(&VocabularySearchParams::default()).await?;
//!     println!("{} words", page.total);
//!
//!     ctx.auth().logout().await;
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`config`] | Client configuration and environment overrides |
//! | [`transport`] | HTTP transport and error normalization |
//! | [`interceptors`] | Request/response hooks: dev logging, status logging, 401 guard |
//! | [`navigation`] | Location abstraction used by the 401 guard |
//! | [`types`] | Entities exchanged with the backend |
//! | [`schema`] | Client-side validated input shapes |
//! | [`api`] | Resource clients |
//! | [`cache`] | Query cache, retry policy and mutations |
//! | [`store`] | Session store |
//! | [`services`] | Cached reads and mutations per resource |
//! | [`logging`] | Subscriber setup |

pub mod api;
pub mod cache;
pub mod config;
pub mod context;
pub mod interceptors;
pub mod logging;
pub mod navigation;
pub mod schema;
pub mod services;
pub mod store;
pub mod transport;
pub mod types;

mod error;

pub use cache::{Mutation, MutationStatus, QueryClient, QueryKey, QueryOptions, RetryPolicy};
pub use config::ClientConfig;
pub use context::{AppContext, AppContextBuilder};
pub use error::{Error, ErrorContext};
pub use navigation::{LogNavigator, MemoryNavigator, Navigator};
pub use store::{LoadingGuard, SessionState, SessionStore};
pub use transport::ApiError;

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

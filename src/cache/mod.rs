//! 查询缓存模块：以层级键缓存读取结果，并管理失效、重试与变更状态。
//!
//! # Query Cache Module
//!
//! A process-wide cache of server reads addressed by hierarchical keys, plus
//! the mutation primitive that writes through it.
//!
//! ## Overview
//!
//! - Reads are keyed by ordered tuples (`["vocabulary", "words", {params}]`);
//!   identical tuples share one entry and one in-flight request.
//! - Each read declares a staleness window. [`QueryClient::read`] serves
//!   data past its window at once and refreshes it in the background;
//!   invalidated data is refetched before the read returns. A failed
//!   refresh keeps the previous data and records the error on the entry.
//! - Failed reads retry with bounded exponential backoff, except 401/403.
//! - Invalidating a prefix marks every key extending it stale.
//! - Writes carry sequence numbers; results of superseded fetches are dropped.
//!
//! ## Key Components
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`QueryClient`] | Fetch/read/patch/invalidate verbs over the shared cache |
//! | [`QueryCache`] | Entry storage, sequence numbers, change events |
//! | [`QueryKey`] | Hierarchical key with canonical parameter segments |
//! | [`QueryOptions`] / [`RetryPolicy`] | Staleness window and retry rules per read |
//! | [`Mutation`] | Write operation with observable `Idle/Pending/Success/Error` state |
//!
//! ## Example
//!
//! ```rust
//! use pronounce_client::cache::{QueryClient, QueryKey, QueryOptions};
//! use std::time::Duration;
//!
//! # async fn demo() -> pronounce_client::Result<()> {
//! let client = QueryClient::default();
//! let options = QueryOptions::default().with_stale_time(Duration::from_secs(600));
//! let tags: Vec<String> = client
//!     .fetch_query(QueryKey::from(["vocabulary", "tags"]), &options, || async {
//!         Ok(vec!["vowels".to_string()])
//!     })
//!     .await?;
//! client.invalidate_queries(&QueryKey::from(["vocabulary"]));
//! # Ok(())
//! # }
//! ```

mod backend;
mod key;
mod manager;
mod mutation;
mod options;

pub use backend::{CacheEvent, CacheEventKind, CacheStats, QueryCache, QueryState, SharedFetch};
pub use key::{KeyPart, QueryKey};
pub use manager::{QueryClient, QuerySubscription};
pub use mutation::{Mutation, MutationStatus};
pub use options::{
    QueryOptions, RetryPolicy, DEFAULT_MAX_RETRIES, DEFAULT_RETRY_DELAY, DEFAULT_STALE_TIME,
    MAX_RETRY_DELAY,
};

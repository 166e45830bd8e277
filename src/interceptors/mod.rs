//! 拦截器模块：在请求发出前与响应返回后执行横切逻辑（计时、日志、会话守卫）。
//!
//! Interceptor hooks around every outbound request.
//!
//! The transport runs a request stage before sending and a response stage
//! (success or failure) after it settles:
//! - The request stage tags the request with an id and a start instant; it
//!   never mutates the semantic request.
//! - The success stage passes the response through unchanged.
//! - The failure stage sees the already-normalized [`ApiError`] and may run
//!   side effects (logging, the 401 session guard).
//!
//! Interceptors observe; they cannot rewrite results.

mod logging;
mod session;

pub use logging::{DevLogInterceptor, StatusLogInterceptor};
pub use session::{SessionExpiredHook, SessionGuardInterceptor};

use async_trait::async_trait;
use reqwest::Method;
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

use crate::transport::ApiError;

/// Per-request tag created by the request stage.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: String,
    pub method: Method,
    pub path: String,
    pub started_at: Instant,
}

impl RequestContext {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            request_id: Uuid::new_v4().to_string(),
            method,
            path: path.into(),
            started_at: Instant::now(),
        }
    }

    pub fn elapsed_ms(&self) -> u128 {
        self.started_at.elapsed().as_millis()
    }
}

#[async_trait]
pub trait Interceptor: Send + Sync {
    async fn on_request(&self, _ctx: &RequestContext) {}

    async fn on_response(&self, _ctx: &RequestContext, _status: u16) {}

    async fn on_error(&self, _ctx: &RequestContext, _err: &ApiError) {}
}

/// Runs interceptor hooks in registration order.
#[derive(Clone)]
pub struct InterceptorPipeline {
    pub(crate) interceptors: Vec<Arc<dyn Interceptor>>,
}

impl InterceptorPipeline {
    pub fn new() -> Self {
        Self {
            interceptors: Vec::new(),
        }
    }

    pub fn with<I: Interceptor + 'static>(mut self, interceptor: I) -> Self {
        self.interceptors.push(Arc::new(interceptor));
        self
    }

    pub fn with_shared(mut self, interceptor: Arc<dyn Interceptor>) -> Self {
        self.interceptors.push(interceptor);
        self
    }

    pub fn len(&self) -> usize {
        self.interceptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interceptors.is_empty()
    }

    /// Run hooks around `f`, which performs the actual call and reports the
    /// response status on success.
    pub async fn execute<T, F, Fut>(&self, ctx: &RequestContext, f: F) -> Result<T, ApiError>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<(u16, T), ApiError>>,
    {
        for ic in &self.interceptors {
            ic.on_request(ctx).await;
        }

        match f().await {
            Ok((status, value)) => {
                for ic in &self.interceptors {
                    ic.on_response(ctx, status).await;
                }
                Ok(value)
            }
            Err(err) => {
                for ic in &self.interceptors {
                    ic.on_error(ctx, &err).await;
                }
                Err(err)
            }
        }
    }
}

impl Default for InterceptorPipeline {
    fn default() -> Self {
        Self::new()
    }
}

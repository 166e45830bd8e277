//! Logging interceptors.

use async_trait::async_trait;
use tracing::{debug, error, warn};

use super::{Interceptor, RequestContext};
use crate::transport::{ApiError, StatusClass};

/// Development-mode request log: one line per settled request with latency.
#[derive(Debug, Clone, Copy, Default)]
pub struct DevLogInterceptor;

#[async_trait]
impl Interceptor for DevLogInterceptor {
    async fn on_request(&self, ctx: &RequestContext) {
        debug!(
            request_id = ctx.request_id.as_str(),
            method = %ctx.method,
            path = ctx.path.as_str(),
            "request started"
        );
    }

    async fn on_response(&self, ctx: &RequestContext, status: u16) {
        debug!(
            request_id = ctx.request_id.as_str(),
            method = %ctx.method,
            path = ctx.path.as_str(),
            status,
            elapsed_ms = ctx.elapsed_ms() as u64,
            "request completed"
        );
    }

    async fn on_error(&self, ctx: &RequestContext, err: &ApiError) {
        warn!(
            request_id = ctx.request_id.as_str(),
            method = %ctx.method,
            path = ctx.path.as_str(),
            status = err.status,
            elapsed_ms = ctx.elapsed_ms() as u64,
            message = err.message.as_str(),
            "request failed"
        );
    }
}

/// Logs the status classes that have no other side effect: 403, 404 and 5xx.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatusLogInterceptor;

#[async_trait]
impl Interceptor for StatusLogInterceptor {
    async fn on_error(&self, ctx: &RequestContext, err: &ApiError) {
        match err.class() {
            StatusClass::Forbidden => {
                error!(path = ctx.path.as_str(), "access forbidden");
            }
            StatusClass::NotFound => {
                error!(path = ctx.path.as_str(), "resource not found");
            }
            StatusClass::ServerError => {
                error!(
                    path = ctx.path.as_str(),
                    status = err.status,
                    "server error occurred"
                );
            }
            _ => {}
        }
    }
}

//! 401 session guard.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::warn;

use super::{Interceptor, RequestContext};
use crate::navigation::Navigator;
use crate::transport::ApiError;

/// Callback run after a 401 has been observed (clears local session state).
pub type SessionExpiredHook = Arc<dyn Fn() + Send + Sync>;

/// Treats any 401 as "session invalid": navigates to the login page unless
/// the current location already is the login page, then runs the
/// session-expired hook if one is installed.
pub struct SessionGuardInterceptor {
    navigator: Arc<dyn Navigator>,
    login_path: String,
    on_expired: Option<SessionExpiredHook>,
}

impl SessionGuardInterceptor {
    pub fn new(navigator: Arc<dyn Navigator>, login_path: impl Into<String>) -> Self {
        Self {
            navigator,
            login_path: login_path.into(),
            on_expired: None,
        }
    }

    pub fn with_hook(mut self, hook: SessionExpiredHook) -> Self {
        self.on_expired = Some(hook);
        self
    }
}

#[async_trait]
impl Interceptor for SessionGuardInterceptor {
    async fn on_error(&self, ctx: &RequestContext, err: &ApiError) {
        if !err.is_unauthorized() {
            return;
        }
        warn!(path = ctx.path.as_str(), "session invalid (401)");

        let on_login_page = self
            .navigator
            .current_path()
            .map(|p| p == self.login_path)
            .unwrap_or(false);
        if !on_login_page {
            self.navigator.navigate(&self.login_path);
        }

        if let Some(hook) = &self.on_expired {
            hook();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::MemoryNavigator;
    use reqwest::Method;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn unauthorized_navigates_once_and_runs_hook() {
        let nav = Arc::new(MemoryNavigator::new("/practice"));
        let calls = Arc::new(AtomicUsize::new(0));
        let hook_calls = calls.clone();
        let guard = SessionGuardInterceptor::new(nav.clone(), "/login").with_hook(Arc::new(
            move || {
                hook_calls.fetch_add(1, Ordering::SeqCst);
            },
        ));
        let ctx = RequestContext::new(Method::GET, "/auth/me");
        let err = ApiError::new("Unauthorized").with_status(401);

        guard.on_error(&ctx, &err).await;
        // Already on the login page now: no second navigation.
        guard.on_error(&ctx, &err).await;

        assert_eq!(nav.history(), vec!["/login".to_string()]);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn other_statuses_are_ignored() {
        let nav = Arc::new(MemoryNavigator::new("/practice"));
        let guard = SessionGuardInterceptor::new(nav.clone(), "/login");
        let ctx = RequestContext::new(Method::GET, "/practice/stats");

        for status in [403u16, 404, 500] {
            guard
                .on_error(&ctx, &ApiError::new("nope").with_status(status))
                .await;
        }
        guard.on_error(&ctx, &ApiError::new("connection refused")).await;

        assert!(nav.history().is_empty());
    }
}

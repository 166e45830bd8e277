use crate::types::{User, UserPatch};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub user: Option<User>,
    pub loading: bool,
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

/// Shared, observable session. Clones share state.
#[derive(Clone)]
pub struct SessionStore {
    state: Arc<watch::Sender<SessionState>>,
    /// Outstanding [`LoadingGuard`]s. Only changed under the channel lock.
    loaders: Arc<AtomicUsize>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(SessionState::default());
        Self {
            state: Arc::new(tx),
            loaders: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Replace the current user wholesale.
    pub fn set_auth(&self, user: User) {
        debug!(user_id = %user.id, "session established");
        self.state.send_modify(|s| s.user = Some(user));
    }

    pub fn clear_auth(&self) {
        self.state.send_if_modified(|s| {
            let had_user = s.user.take().is_some();
            if had_user {
                debug!("session cleared");
            }
            had_user
        });
    }

    /// Merge `patch` into the current user. No-op when signed out.
    pub fn update_user(&self, patch: &UserPatch) -> bool {
        self.state.send_if_modified(|s| match s.user.as_mut() {
            Some(user) => {
                patch.apply_to(user);
                true
            }
            None => false,
        })
    }

    pub fn set_loading(&self, loading: bool) {
        self.state.send_if_modified(|s| {
            let changed = s.loading != loading;
            s.loading = loading;
            changed
        });
    }

    /// Mark the session as loading until the returned guard is dropped.
    /// Overlapping loads keep the flag set until the last one ends, and a
    /// cancelled load releases it when its future is dropped.
    pub fn begin_loading(&self) -> LoadingGuard {
        self.state.send_if_modified(|s| {
            self.loaders.fetch_add(1, Ordering::SeqCst);
            let changed = !s.loading;
            s.loading = true;
            changed
        });
        LoadingGuard {
            store: self.clone(),
        }
    }

    pub fn user(&self) -> Option<User> {
        self.state.borrow().user.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    pub fn snapshot(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }
}

/// Returned by [`SessionStore::begin_loading`].
#[must_use = "loading ends as soon as the guard is dropped"]
pub struct LoadingGuard {
    store: SessionStore,
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        let loaders = &self.store.loaders;
        self.store.state.send_if_modified(|s| {
            let last = loaders.fetch_sub(1, Ordering::SeqCst) == 1;
            if last && s.loading {
                s.loading = false;
                true
            } else {
                false
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ada() -> User {
        User {
            id: "u1".into(),
            name: "Ada".into(),
            email: "ada@example.com".into(),
            native_language: None,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    #[test]
    fn authenticated_tracks_user() {
        let store = SessionStore::new();
        assert!(!store.is_authenticated());
        store.set_auth(ada());
        assert!(store.is_authenticated());
        store.clear_auth();
        assert!(!store.is_authenticated());
        assert_eq!(store.user(), None);
    }

    #[test]
    fn update_user_requires_a_user() {
        let store = SessionStore::new();
        let patch = UserPatch {
            name: Some("Grace".into()),
            ..Default::default()
        };
        assert!(!store.update_user(&patch));
        assert_eq!(store.user(), None);

        store.set_auth(ada());
        assert!(store.update_user(&patch));
        let user = store.user().unwrap();
        assert_eq!(user.name, "Grace");
        assert_eq!(user.email, "ada@example.com");
    }

    #[test]
    fn overlapping_loads_end_with_the_last_guard() {
        let store = SessionStore::new();
        let first = store.begin_loading();
        let second = store.clone().begin_loading();
        assert!(store.is_loading());

        drop(first);
        assert!(store.is_loading());
        drop(second);
        assert!(!store.is_loading());
    }

    #[tokio::test]
    async fn cancelled_load_releases_the_flag() {
        let store = SessionStore::new();
        let pending = {
            let store = store.clone();
            async move {
                let _loading = store.begin_loading();
                std::future::pending::<()>().await;
            }
        };
        let outcome =
            tokio::time::timeout(std::time::Duration::from_millis(5), pending).await;
        assert!(outcome.is_err());
        assert!(!store.is_loading());
    }

    #[tokio::test]
    async fn subscribers_see_changes() {
        let store = SessionStore::new();
        let mut rx = store.subscribe();
        let clone = store.clone();
        clone.set_auth(ada());
        rx.changed().await.unwrap();
        assert!(rx.borrow().is_authenticated());

        store.set_loading(true);
        rx.changed().await.unwrap();
        assert!(rx.borrow().loading);
    }
}

//! Location abstraction used by the 401 session guard.
//!
//! The embedding application decides what "navigate to the login page"
//! means (a browser redirect, a router push, a CLI message).

use std::sync::{Mutex, PoisonError};
use tracing::info;

pub trait Navigator: Send + Sync {
    /// Current location path, if known.
    fn current_path(&self) -> Option<String>;

    /// Perform a full navigation to `path`.
    fn navigate(&self, path: &str);
}

/// Navigator for headless use: records nothing, only logs.
#[derive(Debug, Default)]
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn current_path(&self) -> Option<String> {
        None
    }

    fn navigate(&self, path: &str) {
        info!(path, "session expired; navigation requested");
    }
}

/// In-memory navigator that tracks the current path and every navigation.
#[derive(Debug)]
pub struct MemoryNavigator {
    state: Mutex<NavState>,
}

#[derive(Debug)]
struct NavState {
    current: String,
    history: Vec<String>,
}

impl MemoryNavigator {
    pub fn new(initial_path: impl Into<String>) -> Self {
        Self {
            state: Mutex::new(NavState {
                current: initial_path.into(),
                history: Vec::new(),
            }),
        }
    }

    /// Paths navigated to, oldest first.
    pub fn history(&self) -> Vec<String> {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .history
            .clone()
    }
}

impl Default for MemoryNavigator {
    fn default() -> Self {
        Self::new("/")
    }
}

impl Navigator for MemoryNavigator {
    fn current_path(&self) -> Option<String> {
        Some(
            self.state
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .current
                .clone(),
        )
    }

    fn navigate(&self, path: &str) {
        let mut st = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        st.current = path.to_string();
        st.history.push(path.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_navigator_tracks_history() {
        let nav = MemoryNavigator::new("/dashboard");
        assert_eq!(nav.current_path().as_deref(), Some("/dashboard"));
        nav.navigate("/login");
        assert_eq!(nav.current_path().as_deref(), Some("/login"));
        assert_eq!(nav.history(), vec!["/login".to_string()]);
    }
}

//! Observable mutations.

use crate::{Error, Result};
use std::future::Future;
use tokio::sync::watch;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq)]
pub enum MutationStatus<T> {
    Idle,
    Pending,
    Success(T),
    Error(Error),
}

impl<T> MutationStatus<T> {
    pub fn is_idle(&self) -> bool {
        matches!(self, MutationStatus::Idle)
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, MutationStatus::Pending)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, MutationStatus::Success(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, MutationStatus::Error(_))
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            MutationStatus::Success(data) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&Error> {
        match self {
            MutationStatus::Error(err) => Some(err),
            _ => None,
        }
    }
}

/// One named write operation with observable state.
///
/// Each run moves the state `Pending -> Success | Error`. Failures are logged
/// under the mutation's domain and never retried.
pub struct Mutation<T> {
    domain: &'static str,
    name: &'static str,
    state: watch::Sender<MutationStatus<T>>,
}

impl<T: Clone> Mutation<T> {
    pub fn new(domain: &'static str, name: &'static str) -> Self {
        let (state, _) = watch::channel(MutationStatus::Idle);
        Self {
            domain,
            name,
            state,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn status(&self) -> MutationStatus<T> {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<MutationStatus<T>> {
        self.state.subscribe()
    }

    pub fn is_pending(&self) -> bool {
        self.state.borrow().is_pending()
    }

    pub fn reset(&self) {
        self.state.send_replace(MutationStatus::Idle);
    }

    /// Drive `op`; on success run `on_success` (cache effects) before the
    /// state flips to `Success`.
    pub async fn run<Fut, S>(&self, op: Fut, on_success: S) -> Result<T>
    where
        Fut: Future<Output = Result<T>>,
        S: FnOnce(&T),
    {
        self.state.send_replace(MutationStatus::Pending);
        match op.await {
            Ok(data) => {
                on_success(&data);
                self.state.send_replace(MutationStatus::Success(data.clone()));
                Ok(data)
            }
            Err(err) => {
                if let Error::Validation(errors) = &err {
                    debug!(domain = self.domain, mutation = self.name, %errors, "mutation rejected by validation");
                } else {
                    warn!(domain = self.domain, mutation = self.name, error = %err, "mutation failed");
                }
                self.state.send_replace(MutationStatus::Error(err.clone()));
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::ApiError;

    #[tokio::test]
    async fn success_runs_effects_then_publishes() {
        let mutation: Mutation<u32> = Mutation::new("practice", "create_goal");
        let mut rx = mutation.subscribe();
        let mut seen = None;
        let out = mutation.run(async { Ok(5) }, |v| seen = Some(*v)).await.unwrap();
        assert_eq!(out, 5);
        assert_eq!(seen, Some(5));
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), MutationStatus::Success(5));
    }

    #[tokio::test]
    async fn failure_is_observable_and_skips_effects() {
        let mutation: Mutation<u32> = Mutation::new("vocabulary", "add_to_practice");
        let err = Error::Api(ApiError::new("Not Found").with_status(404));
        let mut called = false;
        let res = mutation.run(async { Err(err.clone()) }, |_| called = true).await;
        assert_eq!(res.unwrap_err(), err);
        assert!(!called);
        assert_eq!(mutation.status().error(), Some(&err));

        mutation.reset();
        assert!(mutation.status().is_idle());
    }
}

//! 资源客户端模块：将后端资源族映射为类型化调用。
//!
//! # Resource Clients
//!
//! One client per backend resource family. Each call issues exactly one
//! transport request and returns the decoded payload or the normalized error
//! unchanged. No caching, no retry, no state.
//!
//! Calls taking a form validate it first; a validation failure returns
//! [`Error::Validation`](crate::Error::Validation) and never reaches the
//! transport.
//!
//! | Client | Endpoints |
//! |--------|-----------|
//! | [`AuthApi`] | `/auth/login`, `/auth/register`, `/auth/me`, `/auth/change-password`, `/auth/logout`, `/auth/refresh` |
//! | [`VocabularyApi`] | `/vocabulary`, `/vocabulary/{id}`, `/vocabulary/{id}/practice`, `/vocabulary/practice`, `/vocabulary/search`, `/vocabulary/categories`, `/vocabulary/tags` |
//! | [`PracticeApi`] | `/practice/sessions...`, `/practice/stats`, `/practice/goals...` |

mod auth;
mod practice;
mod vocabulary;

pub use auth::AuthApi;
pub use practice::{PracticeApi, DEFAULT_SESSION_LIMIT};
pub use vocabulary::VocabularyApi;

use crate::schema::{Validate, ValidationErrors};
use crate::Result;

/// Run `form`'s rules, mapping a failure into the crate error.
pub(crate) fn validated<V: Validate + ?Sized>(form: &V) -> Result<()> {
    form.validate().map_err(Into::into)
}

/// Reject identifiers that would produce a malformed path.
pub(crate) fn check_id(field: &str, id: &str) -> Result<()> {
    let mut errors = ValidationErrors::new();
    if id.trim().is_empty() {
        errors.add(field, "Identifier is required");
    } else if id.contains(['/', '?', '#']) {
        errors.add(field, "Identifier contains reserved characters");
    }
    errors.into_result().map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_checked() {
        assert!(check_id("word_id", "w-1").is_ok());
        assert!(check_id("word_id", " ").unwrap_err().validation().unwrap().has("word_id"));
        assert!(check_id("session_id", "a/b").is_err());
    }
}

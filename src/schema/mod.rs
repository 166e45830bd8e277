//! 表单校验模块：在发起网络请求前校验所有用户输入。
//!
//! Client-side input schemas.
//!
//! Every form is validated against a fixed rule set before dispatch. A
//! failure blocks the network call and reports field-level messages; it
//! never reaches the transport.
//!
//! | Form | Used by |
//! |------|---------|
//! | [`LoginForm`] | `POST /auth/login` |
//! | [`RegisterForm`] | `POST /auth/register` |
//! | [`ChangePasswordForm`] | `POST /auth/change-password` |
//! | [`VocabularySearchParams`] | `GET /vocabulary`, `GET /vocabulary/search` |
//! | [`NewGoal`] / [`GoalUpdate`] | `POST/PUT /practice/goals` |

mod auth;
mod error;
mod practice;
mod vocabulary;

pub use auth::{ChangePasswordForm, LoginForm, RegisterForm};
pub use error::ValidationErrors;
pub use practice::{GoalUpdate, NewGoal};
pub use vocabulary::VocabularySearchParams;

use once_cell::sync::Lazy;
use regex::Regex;

pub const MIN_PASSWORD_LEN: usize = 8;
pub const MAX_NAME_LEN: usize = 100;
pub const MAX_QUERY_LEN: usize = 100;
pub const MAX_PAGE_SIZE: u32 = 100;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9](?:[A-Za-z0-9\-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9\-]*[A-Za-z0-9])?)+$")
        .expect("email pattern is valid")
});

static DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{4}-(0[1-9]|1[0-2])-(0[1-9]|[12]\d|3[01])(T\d{2}:\d{2}(:\d{2}(\.\d+)?)?(Z|[+\-]\d{2}:\d{2})?)?$")
        .expect("date pattern is valid")
});

/// A request shape that can be checked before it is sent.
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationErrors>;
}

pub(crate) fn is_email(value: &str) -> bool {
    EMAIL_RE.is_match(value)
}

/// ISO-8601 date (`2024-05-01`) optionally followed by a time part.
pub(crate) fn is_iso_date(value: &str) -> bool {
    DATE_RE.is_match(value)
}

pub(crate) fn check_email(errors: &mut ValidationErrors, field: &str, value: &str) {
    if value.trim().is_empty() {
        errors.add(field, "Email is required");
    } else if !is_email(value.trim()) {
        errors.add(field, "Invalid email address");
    }
}

pub(crate) fn check_new_password(errors: &mut ValidationErrors, field: &str, value: &str) {
    if value.chars().count() < MIN_PASSWORD_LEN {
        errors.add(
            field,
            format!("Password must be at least {} characters", MIN_PASSWORD_LEN),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_pattern() {
        assert!(is_email("ada@example.com"));
        assert!(is_email("first.last+tag@mail.example.co.uk"));
        assert!(!is_email("ada@"));
        assert!(!is_email("ada@example"));
        assert!(!is_email("@example.com"));
        assert!(!is_email("ada example@example.com"));
    }

    #[test]
    fn date_pattern() {
        assert!(is_iso_date("2024-05-01"));
        assert!(is_iso_date("2024-05-01T10:00:00Z"));
        assert!(is_iso_date("2024-05-01T10:00:00.123+02:00"));
        assert!(!is_iso_date("2024-13-01"));
        assert!(!is_iso_date("05/01/2024"));
        assert!(!is_iso_date(""));
    }
}

//! Authentication forms.

use serde::{Deserialize, Serialize};

use super::{check_email, check_new_password, Validate, ValidationErrors, MAX_NAME_LEN};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl Validate for LoginForm {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        check_email(&mut errors, "email", &self.email);
        if self.password.is_empty() {
            errors.add("password", "Password is required");
        }
        errors.into_result()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
    /// Checked locally, never sent.
    #[serde(skip_serializing, default)]
    pub confirm_password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub native_language: Option<String>,
}

impl Validate for RegisterForm {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let name = self.name.trim();
        if name.is_empty() {
            errors.add("name", "Name is required");
        } else if name.chars().count() > MAX_NAME_LEN {
            errors.add(
                "name",
                format!("Name must be at most {} characters", MAX_NAME_LEN),
            );
        }
        check_email(&mut errors, "email", &self.email);
        check_new_password(&mut errors, "password", &self.password);
        if self.confirm_password != self.password {
            errors.add("confirm_password", "Passwords don't match");
        }
        if let Some(lang) = &self.native_language {
            if lang.trim().is_empty() {
                errors.add("native_language", "Native language cannot be blank");
            }
        }
        errors.into_result()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangePasswordForm {
    pub current_password: String,
    pub new_password: String,
    #[serde(skip_serializing, default)]
    pub confirm_password: String,
}

impl Validate for ChangePasswordForm {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if self.current_password.is_empty() {
            errors.add("current_password", "Current password is required");
        }
        check_new_password(&mut errors, "new_password", &self.new_password);
        if !self.current_password.is_empty() && self.new_password == self.current_password {
            errors.add(
                "new_password",
                "New password must differ from the current password",
            );
        }
        if self.confirm_password != self.new_password {
            errors.add("confirm_password", "Passwords don't match");
        }
        errors.into_result()
    }
}

//! Identity types.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub native_language: Option<String>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

/// Partial user used to merge changes into the session's current user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub native_language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl UserPatch {
    pub fn apply_to(&self, user: &mut User) {
        if let Some(name) = &self.name {
            user.name = name.clone();
        }
        if let Some(email) = &self.email {
            user.email = email.clone();
        }
        if let Some(lang) = &self.native_language {
            user.native_language = Some(lang.clone());
        }
        if let Some(updated_at) = &self.updated_at {
            user.updated_at = updated_at.clone();
        }
    }
}

/// Result of login/register/refresh: consumed once, then discarded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthResponse {
    pub user: User,
    #[serde(default, alias = "access_token")]
    pub token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_response_accepts_access_token_alias() {
        let resp: AuthResponse = serde_json::from_value(serde_json::json!({
            "access_token": "jwt",
            "user": {"id": "u1", "name": "Ada", "email": "ada@example.com"}
        }))
        .unwrap();
        assert_eq!(resp.token, "jwt");
        assert_eq!(resp.user.native_language, None);
    }

    #[test]
    fn patch_only_touches_present_fields() {
        let mut user = User {
            id: "u1".into(),
            name: "Ada".into(),
            email: "ada@example.com".into(),
            native_language: None,
            created_at: "2024-01-01T00:00:00Z".into(),
            updated_at: "2024-01-01T00:00:00Z".into(),
        };
        UserPatch {
            native_language: Some("fr".into()),
            ..Default::default()
        }
        .apply_to(&mut user);
        assert_eq!(user.name, "Ada");
        assert_eq!(user.native_language.as_deref(), Some("fr"));
    }
}

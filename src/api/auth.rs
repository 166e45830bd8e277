use std::sync::Arc;

use reqwest::Method;

use super::validated;
use crate::schema::{ChangePasswordForm, LoginForm, RegisterForm};
use crate::transport::{HttpTransport, RequestBody, RequestConfig};
use crate::types::{AuthResponse, User};
use crate::Result;

#[derive(Clone)]
pub struct AuthApi {
    http: Arc<HttpTransport>,
}

impl AuthApi {
    pub fn new(http: Arc<HttpTransport>) -> Self {
        Self { http }
    }

    pub async fn login(&self, form: &LoginForm) -> Result<AuthResponse> {
        validated(form)?;
        self.http.post("/auth/login", form).await
    }

    pub async fn register(&self, form: &RegisterForm) -> Result<AuthResponse> {
        validated(form)?;
        self.http.post("/auth/register", form).await
    }

    pub async fn me(&self) -> Result<User> {
        self.http.get("/auth/me", RequestConfig::default()).await
    }

    pub async fn change_password(&self, form: &ChangePasswordForm) -> Result<()> {
        validated(form)?;
        self.http
            .execute(
                Method::POST,
                "/auth/change-password",
                RequestBody::json(form)?,
            )
            .await
    }

    pub async fn logout(&self) -> Result<()> {
        self.http
            .execute(Method::POST, "/auth/logout", RequestBody::Empty)
            .await
    }

    pub async fn refresh_token(&self) -> Result<AuthResponse> {
        self.http
            .send(
                Method::POST,
                "/auth/refresh",
                RequestBody::Empty,
                RequestConfig::default(),
            )
            .await?
            .json()
    }
}

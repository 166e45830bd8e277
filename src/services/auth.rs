use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use super::keys;
use crate::api::AuthApi;
use crate::cache::{Mutation, MutationStatus, QueryClient, QueryOptions, RetryPolicy};
use crate::schema::{ChangePasswordForm, LoginForm, RegisterForm};
use crate::store::SessionStore;
use crate::types::{AuthResponse, User};
use crate::Result;

pub const USER_STALE_TIME: Duration = Duration::from_secs(5 * 60);

/// Observable state of each auth mutation.
pub struct AuthMutations {
    pub login: Mutation<AuthResponse>,
    pub register: Mutation<AuthResponse>,
    pub refresh: Mutation<AuthResponse>,
    pub change_password: Mutation<()>,
    pub logout: Mutation<()>,
}

impl AuthMutations {
    fn new() -> Self {
        Self {
            login: Mutation::new(keys::AUTH, "login"),
            register: Mutation::new(keys::AUTH, "register"),
            refresh: Mutation::new(keys::AUTH, "refresh"),
            change_password: Mutation::new(keys::AUTH, "change_password"),
            logout: Mutation::new(keys::AUTH, "logout"),
        }
    }
}

/// Identity reads and the mutations that establish or end a session.
#[derive(Clone)]
pub struct AuthService {
    api: AuthApi,
    query: QueryClient,
    session: SessionStore,
    mutations: Arc<AuthMutations>,
}

impl AuthService {
    pub fn new(api: AuthApi, query: QueryClient, session: SessionStore) -> Self {
        Self {
            api,
            query,
            session,
            mutations: Arc::new(AuthMutations::new()),
        }
    }

    pub fn mutations(&self) -> &AuthMutations {
        &self.mutations
    }

    fn user_options(&self) -> QueryOptions {
        let defaults = self.query.defaults();
        QueryOptions::default()
            .with_stale_time(USER_STALE_TIME)
            .with_retry(RetryPolicy::current_user().with_base_delay(defaults.retry.base_delay))
    }

    /// The signed-in user. Not requested at all while the session store is
    /// signed out.
    pub async fn current_user(&self) -> Result<Option<User>> {
        if !self.session.is_authenticated() {
            return Ok(None);
        }
        let api = self.api.clone();
        let _loading = self.session.begin_loading();
        self.query
            .read(keys::auth_user(), &self.user_options(), move || {
                let api = api.clone();
                async move { api.me().await }
            })
            .await
            .map(Some)
    }

    /// Drop the cached user and fetch it again.
    pub async fn refetch_user(&self) -> Result<Option<User>> {
        self.query.invalidate_queries(&keys::auth_user());
        self.current_user().await
    }

    pub async fn login(&self, form: &LoginForm) -> Result<AuthResponse> {
        self.mutations
            .login
            .run(self.api.login(form), |resp| self.establish(resp))
            .await
    }

    pub async fn register(&self, form: &RegisterForm) -> Result<AuthResponse> {
        self.mutations
            .register
            .run(self.api.register(form), |resp| self.establish(resp))
            .await
    }

    /// Renew the session; same cache effects as a login.
    pub async fn refresh_session(&self) -> Result<AuthResponse> {
        self.mutations
            .refresh
            .run(self.api.refresh_token(), |resp| self.establish(resp))
            .await
    }

    pub async fn change_password(&self, form: &ChangePasswordForm) -> Result<()> {
        self.mutations
            .change_password
            .run(self.api.change_password(form), |_| {
                info!("password changed");
            })
            .await
    }

    /// End the session. Local state is cleared even when the server call
    /// fails; the failure stays visible in [`logout_state`](Self::logout_state).
    pub async fn logout(&self) {
        if let Err(err) = self.mutations.logout.run(self.api.logout(), |_| ()).await {
            warn!(error = %err, "logout failed; clearing local session anyway");
        }
        self.session.clear_auth();
        self.query.clear();
    }

    pub fn login_state(&self) -> MutationStatus<AuthResponse> {
        self.mutations.login.status()
    }

    pub fn register_state(&self) -> MutationStatus<AuthResponse> {
        self.mutations.register.status()
    }

    pub fn change_password_state(&self) -> MutationStatus<()> {
        self.mutations.change_password.status()
    }

    pub fn logout_state(&self) -> MutationStatus<()> {
        self.mutations.logout.status()
    }

    fn establish(&self, resp: &AuthResponse) {
        self.session.set_auth(resp.user.clone());
        if let Err(err) = self.query.set_query_data(&keys::auth_user(), &resp.user) {
            warn!(error = %err, "failed to cache signed-in user");
        }
        self.query.invalidate_queries(&keys::practice());
        self.query.invalidate_queries(&keys::vocabulary());
    }
}

//! Process-wide client context.
//!
//! [`AppContext`] owns the one transport, query cache and session store of a
//! process and hands out the services built on them. It is created once at
//! startup and passed to whatever needs it; nothing in the crate is global.

use std::sync::Arc;

use tracing::info;

use crate::api::{AuthApi, PracticeApi, VocabularyApi};
use crate::cache::QueryClient;
use crate::config::ClientConfig;
use crate::interceptors::{
    DevLogInterceptor, Interceptor, InterceptorPipeline, SessionExpiredHook,
    SessionGuardInterceptor, StatusLogInterceptor,
};
use crate::navigation::{LogNavigator, Navigator};
use crate::services::{AuthService, PracticeService, VocabularyService};
use crate::store::SessionStore;
use crate::transport::HttpTransport;
use crate::Result;

pub struct AppContextBuilder {
    config: ClientConfig,
    navigator: Option<Arc<dyn Navigator>>,
    interceptors: Vec<Arc<dyn Interceptor>>,
}

impl AppContextBuilder {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            navigator: None,
            interceptors: Vec::new(),
        }
    }

    /// Where the 401 guard sends the user. Defaults to [`LogNavigator`].
    pub fn with_navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    /// Extra interceptor, run after the built-in ones.
    pub fn with_interceptor(mut self, interceptor: Arc<dyn Interceptor>) -> Self {
        self.interceptors.push(interceptor);
        self
    }

    pub fn build(self) -> Result<AppContext> {
        let mut config = self.config;
        config.validate()?;

        let navigator = self
            .navigator
            .unwrap_or_else(|| Arc::new(LogNavigator));
        let query = QueryClient::new(config.query_defaults.clone());
        let session = SessionStore::new();

        // A 401 leaves no usable session: drop local identity and every
        // cached read along with the navigation.
        let hook: SessionExpiredHook = {
            let query = query.clone();
            let session = session.clone();
            Arc::new(move || {
                session.clear_auth();
                query.clear();
            })
        };

        let mut pipeline = InterceptorPipeline::new();
        if config.dev_mode {
            pipeline = pipeline.with(DevLogInterceptor);
        }
        pipeline = pipeline
            .with(StatusLogInterceptor)
            .with(
                SessionGuardInterceptor::new(navigator.clone(), config.login_path.clone())
                    .with_hook(hook),
            );
        for interceptor in self.interceptors {
            pipeline = pipeline.with_shared(interceptor);
        }

        let http = Arc::new(HttpTransport::new(&config, pipeline)?);
        info!(
            base_url = config.base_url.as_str(),
            dev_mode = config.dev_mode,
            "client context ready"
        );

        Ok(AppContext {
            auth: AuthService::new(AuthApi::new(http.clone()), query.clone(), session.clone()),
            vocabulary: VocabularyService::new(VocabularyApi::new(http.clone()), query.clone()),
            practice: PracticeService::new(PracticeApi::new(http.clone()), query.clone()),
            config,
            http,
            query,
            session,
            navigator,
        })
    }
}

/// Transport, cache, session and services of one process. Clones share
/// everything.
#[derive(Clone)]
pub struct AppContext {
    config: ClientConfig,
    http: Arc<HttpTransport>,
    query: QueryClient,
    session: SessionStore,
    navigator: Arc<dyn Navigator>,
    auth: AuthService,
    vocabulary: VocabularyService,
    practice: PracticeService,
}

impl AppContext {
    pub fn builder(config: ClientConfig) -> AppContextBuilder {
        AppContextBuilder::new(config)
    }

    pub fn new(config: ClientConfig) -> Result<Self> {
        AppContextBuilder::new(config).build()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn transport(&self) -> &Arc<HttpTransport> {
        &self.http
    }

    pub fn query(&self) -> &QueryClient {
        &self.query
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn navigator(&self) -> &Arc<dyn Navigator> {
        &self.navigator
    }

    pub fn auth(&self) -> &AuthService {
        &self.auth
    }

    pub fn vocabulary(&self) -> &VocabularyService {
        &self.vocabulary
    }

    pub fn practice(&self) -> &PracticeService {
        &self.practice
    }
}

//! Usage: Wiring of config, session store, transport and navigator into the operations the
//! views call.

use crate::app::navigation::Navigator;
use crate::commands::auth::{self, LoginForm, RegistrationForm};
use crate::commands::session::{GateOutcome, SessionGate};
use crate::gateway::oauth::authorize_url;
use crate::gateway::oauth::exchange_flow::{FlowState, OAuthExchangeFlow};
use crate::gateway::transport::CredentialTransport;
use crate::infra::config::AuthConfig;
use crate::infra::session_store::SessionStore;
use crate::shared::error::{AppResult, AuthFailure};
use std::sync::Arc;

pub struct AuthApp {
    config: AuthConfig,
    transport: Arc<CredentialTransport>,
    oauth: OAuthExchangeFlow,
    gate: SessionGate,
}

impl AuthApp {
    /// Build the client for one page/process lifetime. Reads the persisted session.
    pub fn init(config: AuthConfig, navigator: Arc<dyn Navigator>) -> AppResult<Self> {
        config.validate()?;
        let store = Arc::new(SessionStore::init(config.session_file()?)?);
        Self::with_store(config, store, navigator)
    }

    pub fn with_store(
        config: AuthConfig,
        store: Arc<SessionStore>,
        navigator: Arc<dyn Navigator>,
    ) -> AppResult<Self> {
        let transport = Arc::new(CredentialTransport::new(&config, store, navigator)?);
        let oauth = OAuthExchangeFlow::new(Arc::clone(&transport), config.app_origin_url()?);
        let gate = SessionGate::new(Arc::clone(&transport));

        tracing::info!(
            api_base_url = %config.api_base_url,
            has_session = transport.store().has_session(),
            "auth client ready"
        );

        Ok(Self {
            config,
            transport,
            oauth,
            gate,
        })
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    pub fn session_store(&self) -> &Arc<SessionStore> {
        self.transport.store()
    }

    pub fn navigator(&self) -> &Arc<dyn Navigator> {
        self.transport.navigator()
    }

    pub fn transport(&self) -> &Arc<CredentialTransport> {
        &self.transport
    }

    pub fn is_authenticated(&self) -> bool {
        self.session_store().has_session()
    }

    pub async fn login(&self, form: &LoginForm) -> Result<(), AuthFailure> {
        auth::login(&self.transport, form).await
    }

    pub async fn register(&self, form: &RegistrationForm) -> Result<(), AuthFailure> {
        auth::register(&self.transport, form).await
    }

    pub fn github_authorize_url(&self) -> AppResult<String> {
        authorize_url::github_authorize_url(&self.config)
    }

    /// Entry point of the GitHub callback view; `callback_url` is the URL it was opened with.
    pub async fn complete_github_login(&self, callback_url: &str) -> FlowState {
        self.oauth.activate(callback_url).await
    }

    pub fn oauth_flow(&self) -> &OAuthExchangeFlow {
        &self.oauth
    }

    pub async fn activate_protected_view(&self) -> GateOutcome {
        self.gate.activate().await
    }

    pub fn logout(&self) {
        self.gate.logout();
    }
}

//! Usage: HTTP transport for the auth backend (bearer injection + unauthorized interceptor).
//!
//! Every call reads the session synchronously and attaches `Authorization: Bearer <token>`
//! when one exists. A 401 response invalidates the session and redirects to the login
//! route, except for paths listed in `UnauthorizedPolicy`, where 401 means "wrong
//! credentials" and is left to the caller.

use crate::app::navigation::{redirect_to_login, Navigator};
use crate::gateway::endpoints::Endpoint;
use crate::infra::config::AuthConfig;
use crate::infra::session_store::SessionStore;
use crate::shared::error::{AppError, AppResult};
use reqwest::{Method, StatusCode, Url};
use serde_json::Value;
use std::sync::Arc;

#[derive(Debug, Clone, thiserror::Error)]
pub enum TransportError {
    /// No response (connect/DNS/TLS failure, timeout, body read failure).
    #[error("SYSTEM_ERROR: request to {path} failed: {message}")]
    Network { path: String, message: String },
    #[error("AUTH_UNAUTHORIZED: {path} rejected the request (session_invalidated={session_invalidated})")]
    Unauthorized {
        path: String,
        body: Value,
        session_invalidated: bool,
    },
    #[error("HTTP_STATUS: {path} returned status={status}")]
    Status { path: String, status: u16, body: Value },
    #[error("SEC_INVALID_INPUT: invalid request target {path}: {message}")]
    InvalidTarget { path: String, message: String },
}

impl TransportError {
    /// Response body of a rejected call, if the backend answered.
    pub fn body(&self) -> Option<&Value> {
        match self {
            Self::Unauthorized { body, .. } | Self::Status { body, .. } => Some(body),
            Self::Network { .. } | Self::InvalidTarget { .. } => None,
        }
    }

    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network { .. })
    }
}

impl From<TransportError> for AppError {
    fn from(value: TransportError) -> Self {
        AppError::from(value.to_string())
    }
}

/// Paths whose 401 responses must not invalidate the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnauthorizedPolicy {
    exempt_paths: Vec<&'static str>,
}

impl Default for UnauthorizedPolicy {
    fn default() -> Self {
        Self {
            exempt_paths: vec![Endpoint::Login.path(), Endpoint::Register.path()],
        }
    }
}

impl UnauthorizedPolicy {
    pub fn with_exempt_paths(exempt_paths: Vec<&'static str>) -> Self {
        Self { exempt_paths }
    }

    pub fn exempt_paths(&self) -> &[&'static str] {
        &self.exempt_paths
    }

    /// Matches on the request URL path, so an API base with a path prefix still matches.
    pub fn is_exempt(&self, url: &Url) -> bool {
        let path = url.path().trim_end_matches('/');
        self.exempt_paths
            .iter()
            .any(|exempt| path.ends_with(exempt.trim_end_matches('/')))
    }
}

pub struct CredentialTransport {
    client: reqwest::Client,
    base: Url,
    store: Arc<SessionStore>,
    navigator: Arc<dyn Navigator>,
    policy: UnauthorizedPolicy,
}

impl CredentialTransport {
    pub fn new(
        config: &AuthConfig,
        store: Arc<SessionStore>,
        navigator: Arc<dyn Navigator>,
    ) -> AppResult<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| format!("SYSTEM_ERROR: failed to build http client: {e}"))?;

        Ok(Self {
            client,
            base: config.api_base()?,
            store,
            navigator,
            policy: UnauthorizedPolicy::default(),
        })
    }

    pub fn with_policy(mut self, policy: UnauthorizedPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> &UnauthorizedPolicy {
        &self.policy
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    pub fn navigator(&self) -> &Arc<dyn Navigator> {
        &self.navigator
    }

    pub async fn call(
        &self,
        endpoint: Endpoint,
        body: Option<&Value>,
    ) -> Result<Value, TransportError> {
        self.request(endpoint.method(), endpoint.path(), body).await
    }

    /// Send a JSON request to `path` (relative to the API base) and return the JSON body
    /// of a 2xx response. Non-JSON success bodies come back as `Value::Null`.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value, TransportError> {
        let url = self
            .base
            .join(path.trim_start_matches('/'))
            .map_err(|e| TransportError::InvalidTarget {
                path: path.to_string(),
                message: e.to_string(),
            })?;

        let mut request = self.client.request(method.clone(), url.clone());
        if let Some(token) = self.store.get() {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            tracing::warn!(method = %method, path, "auth request failed without response: {e}");
            TransportError::Network {
                path: path.to_string(),
                message: e.to_string(),
            }
        })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| TransportError::Network {
            path: path.to_string(),
            message: format!("response read failed: {e}"),
        })?;
        let body = serde_json::from_str::<Value>(&text).unwrap_or(Value::Null);

        tracing::debug!(method = %method, path, status = status.as_u16(), "auth request completed");

        if status == StatusCode::UNAUTHORIZED {
            let session_invalidated = !self.policy.is_exempt(&url);
            if session_invalidated {
                self.invalidate_session(path);
            } else {
                tracing::debug!(path, "401 on exempt path; session left untouched");
            }
            return Err(TransportError::Unauthorized {
                path: path.to_string(),
                body,
                session_invalidated,
            });
        }

        if !status.is_success() {
            return Err(TransportError::Status {
                path: path.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        Ok(body)
    }

    fn invalidate_session(&self, path: &str) {
        let had_session = self.store.clear();
        let redirected = redirect_to_login(self.navigator.as_ref());
        tracing::warn!(
            path,
            had_session,
            redirected,
            "unauthorized response; session invalidated"
        );
    }
}

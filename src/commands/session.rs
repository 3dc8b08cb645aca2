//! Usage: Protected-view gate (`GET /auth/me` on every activation) and manual logout.

use crate::app::navigation::redirect_to_login;
use crate::domain::normalize::{normalize, AuthOutcome, CallContext};
use crate::domain::user::User;
use crate::gateway::credentials::failure_from_transport;
use crate::gateway::endpoints::Endpoint;
use crate::gateway::transport::{CredentialTransport, TransportError};
use crate::shared::error::AuthFailure;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome {
    /// Session is valid; render the view for this user.
    Authenticated(User),
    /// No usable session; the user has been sent to the login route.
    Redirected,
    /// Backend unreachable. The session is kept; show the message.
    Unavailable(AuthFailure),
}

pub struct SessionGate {
    transport: Arc<CredentialTransport>,
}

impl SessionGate {
    pub fn new(transport: Arc<CredentialTransport>) -> Self {
        Self { transport }
    }

    /// Validate the session for one protected-view activation. Issues at most one
    /// current-user fetch and resolves before the caller renders anything.
    pub async fn activate(&self) -> GateOutcome {
        let store = self.transport.store();
        if !store.has_session() {
            tracing::debug!("protected view without session; redirecting");
            redirect_to_login(self.transport.navigator().as_ref());
            return GateOutcome::Redirected;
        }

        match self.transport.call(Endpoint::CurrentUser, None).await {
            Ok(body) => match normalize(&body, CallContext::CurrentUser) {
                AuthOutcome::User(user) => {
                    tracing::debug!(user_id = %user.id, "session validated");
                    GateOutcome::Authenticated(user)
                }
                AuthOutcome::Token(_) | AuthOutcome::Failure(_) => {
                    tracing::warn!("current-user payload carried no user record");
                    self.drop_session()
                }
            },
            // The transport already cleared the session and redirected.
            Err(TransportError::Unauthorized {
                session_invalidated: true,
                ..
            }) => GateOutcome::Redirected,
            Err(err) if err.is_network() => {
                GateOutcome::Unavailable(failure_from_transport(&err, CallContext::CurrentUser))
            }
            Err(err) => {
                tracing::warn!("current-user fetch failed: {err}");
                self.drop_session()
            }
        }
    }

    /// Manual logout: forget the token locally and go to the login route. No server call.
    pub fn logout(&self) {
        let had_session = self.transport.store().clear();
        tracing::info!(had_session, "logout");
        redirect_to_login(self.transport.navigator().as_ref());
    }

    fn drop_session(&self) -> GateOutcome {
        self.transport.store().clear();
        redirect_to_login(self.transport.navigator().as_ref());
        GateOutcome::Redirected
    }
}

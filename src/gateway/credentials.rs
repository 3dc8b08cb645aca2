//! Usage: Shared tail of every credential-acquisition call (normalize -> persist -> navigate).

use crate::app::navigation::{NavigationMode, Navigator, Route};
use crate::domain::normalize::{failure_message, normalize, AuthOutcome, CallContext};
use crate::gateway::transport::TransportError;
use crate::infra::session_store::SessionStore;
use crate::shared::error::{AuthFailure, FailureKind};
use serde_json::Value;

pub const NETWORK_FAILURE_MESSAGE: &str =
    "Unable to reach the server. Check your connection and try again.";
const STORAGE_FAILURE_MESSAGE: &str = "Signed in, but the session could not be saved locally.";

/// Turn a 2xx payload into an established session.
///
/// A user record without a token only counts when a session already exists; the existing
/// token is kept.
pub(crate) fn establish_session(
    body: &Value,
    context: CallContext,
    store: &SessionStore,
    navigator: &dyn Navigator,
    mode: NavigationMode,
) -> Result<(), AuthFailure> {
    match normalize(body, context) {
        AuthOutcome::Token(token) => {
            store.set(&token).map_err(|e| {
                tracing::error!(?context, "failed to persist session: {e}");
                AuthFailure::new(FailureKind::Storage, STORAGE_FAILURE_MESSAGE)
            })?;
        }
        AuthOutcome::User(user) if store.has_session() => {
            tracing::debug!(?context, user_id = %user.id, "user record accepted with existing session");
        }
        AuthOutcome::User(_) => {
            tracing::warn!(?context, "user record returned without any session token");
            return Err(AuthFailure::new(
                FailureKind::Rejected,
                context.default_failure_message(),
            ));
        }
        AuthOutcome::Failure(message) => {
            return Err(AuthFailure::new(FailureKind::Rejected, message));
        }
    }

    navigator.navigate(Route::Home, mode);
    Ok(())
}

/// Display-ready failure for a call that did not return 2xx.
pub(crate) fn failure_from_transport(err: &TransportError, context: CallContext) -> AuthFailure {
    match err {
        TransportError::Network { .. } => {
            AuthFailure::new(FailureKind::Transport, NETWORK_FAILURE_MESSAGE)
        }
        TransportError::Unauthorized {
            body,
            session_invalidated: false,
            ..
        } => AuthFailure::new(
            FailureKind::InvalidCredentials,
            failure_message(body, context),
        ),
        TransportError::Unauthorized { body, .. } | TransportError::Status { body, .. } => {
            AuthFailure::new(FailureKind::Rejected, failure_message(body, context))
        }
        TransportError::InvalidTarget { .. } => {
            tracing::error!(?context, "auth request not sent: {err}");
            AuthFailure::new(FailureKind::Rejected, context.default_rejection_message())
        }
    }
}

//! Bird authentication client.
//!
//! Acquires a bearer token through password login, registration or the GitHub OAuth code
//! exchange, persists it in a [`SessionStore`], attaches it to every backend call and
//! invalidates it when the backend answers 401.

mod app;
mod commands;
mod domain;
mod gateway;
mod infra;
mod shared;

pub use app::auth_app::AuthApp;
pub use app::logging::{init as init_logging, LogOptions};
pub use app::navigation::{HistoryNavigator, NavigationEvent, NavigationMode, Navigator, Route};
pub use commands::auth::{
    validate_login, validate_registration, LoginForm, RegistrationForm, MIN_PASSWORD_LEN,
};
pub use commands::session::{GateOutcome, SessionGate};
pub use domain::normalize::{failure_message, normalize, AuthOutcome, CallContext};
pub use domain::user::{RoleDescriptor, User};
pub use gateway::credentials::NETWORK_FAILURE_MESSAGE;
pub use gateway::endpoints::Endpoint;
pub use gateway::oauth::authorize_url::{github_authorize_url, redirect_uri};
pub use gateway::oauth::callback::{parse_callback_url, OAuthCallbackPayload};
pub use gateway::oauth::exchange_flow::{FlowState, OAuthExchangeFlow, MISSING_CODE_MESSAGE};
pub use gateway::transport::{CredentialTransport, TransportError, UnauthorizedPolicy};
pub use infra::config::AuthConfig;
pub use infra::session_store::SessionStore;
pub use shared::error::{AppError, AppResult, AuthFailure, FailureKind};
pub use shared::single_flight::SingleFlight;

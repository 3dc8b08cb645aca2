//! Usage: Password login and registration commands (pre-flight validation + acquisition).

use crate::app::navigation::NavigationMode;
use crate::domain::normalize::CallContext;
use crate::gateway::credentials::{establish_session, failure_from_transport};
use crate::gateway::endpoints::Endpoint;
use crate::gateway::transport::CredentialTransport;
use crate::shared::error::AuthFailure;
use serde::Serialize;

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Default)]
pub struct RegistrationForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct RegisterRequest<'a> {
    name: &'a str,
    email: &'a str,
    password: &'a str,
}

pub fn validate_login(form: &LoginForm) -> Result<(), AuthFailure> {
    if form.email.trim().is_empty() || form.password.is_empty() {
        return Err(AuthFailure::validation("Email and password are required"));
    }
    Ok(())
}

pub fn validate_registration(form: &RegistrationForm) -> Result<(), AuthFailure> {
    if form.name.trim().is_empty() || form.email.trim().is_empty() {
        return Err(AuthFailure::validation("Name and email are required"));
    }
    if form.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthFailure::validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    if form.password != form.confirm_password {
        return Err(AuthFailure::validation("Passwords do not match"));
    }
    Ok(())
}

/// `POST /auth/login`; on success the session is stored and the user is sent home.
pub async fn login(transport: &CredentialTransport, form: &LoginForm) -> Result<(), AuthFailure> {
    validate_login(form)?;
    let body = to_body(&LoginRequest {
        email: form.email.trim(),
        password: &form.password,
    });
    acquire(transport, Endpoint::Login, body).await
}

/// `POST /auth/register`; validation failures never reach the network.
pub async fn register(
    transport: &CredentialTransport,
    form: &RegistrationForm,
) -> Result<(), AuthFailure> {
    validate_registration(form)?;
    let body = to_body(&RegisterRequest {
        name: form.name.trim(),
        email: form.email.trim(),
        password: &form.password,
    });
    acquire(transport, Endpoint::Register, body).await
}

async fn acquire(
    transport: &CredentialTransport,
    endpoint: Endpoint,
    body: serde_json::Value,
) -> Result<(), AuthFailure> {
    let context: CallContext = endpoint.context();
    let result = match transport.call(endpoint, Some(&body)).await {
        Ok(response) => establish_session(
            &response,
            context,
            transport.store(),
            transport.navigator().as_ref(),
            NavigationMode::Push,
        ),
        Err(err) => Err(failure_from_transport(&err, context)),
    };

    match &result {
        Ok(()) => tracing::info!(endpoint = endpoint.path(), "credential acquisition succeeded"),
        Err(failure) => tracing::info!(
            endpoint = endpoint.path(),
            kind = ?failure.kind,
            "credential acquisition failed"
        ),
    }
    result
}

fn to_body<T: Serialize>(request: &T) -> serde_json::Value {
    // Plain string fields; serialization cannot fail.
    serde_json::to_value(request).unwrap_or_default()
}

//! Usage: Reconcile the backend's inconsistent auth payloads into one `AuthOutcome`.
//!
//! Precedence, first match wins:
//! 1. top-level `token` string
//! 2. success envelope (`code` 2xx) whose `data` is a token string, an `AuthResponse`
//!    record carrying `token`, or a user record
//! 3. top-level user record (`email` present)
//! 4. failure with the payload `message` or the call site's default message

use crate::domain::user::User;
use serde_json::Value;

/// Which call produced the payload; picks the fallback message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallContext {
    Login,
    Register,
    GitHubExchange,
    CurrentUser,
}

impl CallContext {
    /// Shown when a 2xx payload carries neither a session nor a message.
    pub fn default_failure_message(self) -> &'static str {
        match self {
            Self::Login => "Login failed",
            Self::Register => "Registration failed",
            Self::GitHubExchange => "GitHub authorization failed",
            Self::CurrentUser => "Could not load the current user",
        }
    }

    /// Shown when the backend rejects the call without a message.
    pub fn default_rejection_message(self) -> &'static str {
        match self {
            Self::Login => "Invalid email or password",
            Self::Register => "Registration failed. Try another email.",
            Self::GitHubExchange => "Error while signing in with GitHub",
            Self::CurrentUser => "Session is no longer valid",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    Token(String),
    User(User),
    Failure(String),
}

pub fn normalize(body: &Value, context: CallContext) -> AuthOutcome {
    if let Some(token) = body.get("token").and_then(non_empty_str) {
        return AuthOutcome::Token(token);
    }

    if is_success_envelope(body) {
        match body.get("data") {
            Some(Value::String(data)) if !data.trim().is_empty() => {
                return AuthOutcome::Token(data.trim().to_string());
            }
            Some(data @ Value::Object(_)) => {
                if let Some(token) = data.get("token").and_then(non_empty_str) {
                    return AuthOutcome::Token(token);
                }
                if let Some(user) = User::from_value(data) {
                    return AuthOutcome::User(user);
                }
            }
            _ => {}
        }
    }

    if let Some(user) = User::from_value(body) {
        return AuthOutcome::User(user);
    }

    AuthOutcome::Failure(message_or(body, context.default_failure_message()))
}

/// Display message for a non-2xx response body.
pub fn failure_message(body: &Value, context: CallContext) -> String {
    message_or(body, context.default_rejection_message())
}

fn message_or(body: &Value, fallback: &str) -> String {
    body.get("message")
        .and_then(non_empty_str)
        .unwrap_or_else(|| fallback.to_string())
}

fn is_success_envelope(body: &Value) -> bool {
    let code = match body.get("code") {
        Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
        Some(Value::Number(n)) => n.as_i64(),
        _ => None,
    };
    code.is_some_and(|c| (200..300).contains(&c))
}

fn non_empty_str(value: &Value) -> Option<String> {
    value
        .as_str()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

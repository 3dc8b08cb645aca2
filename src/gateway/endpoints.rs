//! Usage: Fixed table of backend auth endpoints (method, path, normalizer context).

use crate::domain::normalize::CallContext;
use reqwest::Method;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Login,
    Register,
    GitHubCallback,
    CurrentUser,
}

impl Endpoint {
    pub fn method(self) -> Method {
        match self {
            Self::CurrentUser => Method::GET,
            Self::Login | Self::Register | Self::GitHubCallback => Method::POST,
        }
    }

    pub fn path(self) -> &'static str {
        match self {
            Self::Login => "/auth/login",
            Self::Register => "/auth/register",
            Self::GitHubCallback => "/auth/github/callback",
            Self::CurrentUser => "/auth/me",
        }
    }

    pub fn context(self) -> CallContext {
        match self {
            Self::Login => CallContext::Login,
            Self::Register => CallContext::Register,
            Self::GitHubCallback => CallContext::GitHubExchange,
            Self::CurrentUser => CallContext::CurrentUser,
        }
    }
}

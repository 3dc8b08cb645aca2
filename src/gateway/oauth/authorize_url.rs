//! Usage: Build the GitHub authorize URL that starts the OAuth web flow.

use crate::app::navigation::Route;
use crate::infra::config::AuthConfig;
use crate::shared::error::AppResult;

pub const GITHUB_AUTHORIZE_URL: &str = "https://github.com/login/oauth/authorize";
pub const GITHUB_SCOPE: &str = "user:email";

/// `{app_origin}/auth/github/callback`, the redirect registered with the OAuth app.
pub fn redirect_uri(config: &AuthConfig) -> AppResult<String> {
    let origin = config.app_origin_url()?;
    let origin = origin.as_str().trim_end_matches('/');
    Ok(format!("{origin}{}", Route::GITHUB_CALLBACK_PATH))
}

pub fn github_authorize_url(config: &AuthConfig) -> AppResult<String> {
    let client_id = config.github_client_id.trim();
    if client_id.is_empty() {
        tracing::warn!("github client id is not configured; authorize url will be rejected");
    }
    let redirect_uri = redirect_uri(config)?;
    Ok(format!(
        "{GITHUB_AUTHORIZE_URL}?client_id={}&redirect_uri={}&scope={GITHUB_SCOPE}",
        urlencoding::encode(client_id),
        urlencoding::encode(&redirect_uri),
    ))
}

//! Usage: Parse the OAuth redirect that lands on the GitHub callback route.

use crate::shared::error::AppResult;
use reqwest::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthCallbackPayload {
    pub code: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

impl OAuthCallbackPayload {
    /// Provider-side refusal (e.g. the user denied access), as a display message.
    pub fn provider_error(&self) -> Option<&str> {
        self.error_description
            .as_deref()
            .or(self.error.as_deref())
    }
}

/// Parse `target`, either an absolute URL or a path+query resolved against `origin`.
pub fn parse_callback_url(target: &str, origin: &Url) -> AppResult<OAuthCallbackPayload> {
    let url = match Url::parse(target) {
        Ok(url) => url,
        Err(_) => origin
            .join(target)
            .map_err(|e| format!("SEC_INVALID_INPUT: invalid oauth callback url: {e}"))?,
    };

    let mut code: Option<String> = None;
    let mut error: Option<String> = None;
    let mut error_description: Option<String> = None;

    for (key, value) in url.query_pairs() {
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        match key.as_ref() {
            "code" if code.is_none() => code = Some(value.to_string()),
            "error" if error.is_none() => error = Some(value.to_string()),
            "error_description" if error_description.is_none() => {
                error_description = Some(value.to_string())
            }
            _ => {}
        }
    }

    Ok(OAuthCallbackPayload {
        code,
        error,
        error_description,
    })
}

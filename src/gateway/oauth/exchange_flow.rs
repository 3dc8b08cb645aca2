//! Usage: One-shot GitHub authorization-code exchange (`Idle -> CodeExtracted -> Exchanging
//! -> Established | Failed`).
//!
//! The provider invalidates a code on first use, so the exchange request is guarded by a
//! `SingleFlight` keyed on the code: it is spawned once and runs to completion even if the
//! activating view goes away, and re-entrant activations share that dispatch instead of
//! submitting the consumed code again.

use crate::app::navigation::{NavigationMode, Route};
use crate::domain::normalize::CallContext;
use crate::gateway::credentials::{establish_session, failure_from_transport};
use crate::gateway::endpoints::Endpoint;
use crate::gateway::oauth::callback::parse_callback_url;
use crate::gateway::transport::CredentialTransport;
use crate::shared::error::{AuthFailure, FailureKind};
use crate::shared::mutex_ext::MutexExt;
use crate::shared::security::fingerprint;
use crate::shared::single_flight::SingleFlight;
use reqwest::Url;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const MISSING_CODE_MESSAGE: &str = "no authorization code received";
const INVALID_CALLBACK_MESSAGE: &str = "The GitHub sign-in link is invalid";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowState {
    Idle,
    CodeExtracted,
    Exchanging,
    Established,
    Failed(AuthFailure),
}

impl FlowState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Established | Self::Failed(_))
    }

    pub fn failure(&self) -> Option<&AuthFailure> {
        match self {
            Self::Failed(failure) => Some(failure),
            _ => None,
        }
    }

    /// Where a failed flow offers to send the user back to.
    pub fn return_route(&self) -> Option<Route> {
        matches!(self, Self::Failed(_)).then_some(Route::Login)
    }

    fn rank(&self) -> u8 {
        match self {
            Self::Idle => 0,
            Self::CodeExtracted => 1,
            Self::Exchanging => 2,
            Self::Established | Self::Failed(_) => 3,
        }
    }
}

#[derive(Debug)]
struct Tracked {
    // Fingerprint of the code the state belongs to.
    code_key: Option<String>,
    state: FlowState,
}

/// State the dispatched exchange task shares with the flow.
struct FlowShared {
    transport: Arc<CredentialTransport>,
    tracked: Mutex<Tracked>,
    dispatched: AtomicUsize,
}

pub struct OAuthExchangeFlow {
    shared: Arc<FlowShared>,
    origin: Url,
    latch: SingleFlight<String, FlowState>,
}

impl OAuthExchangeFlow {
    pub fn new(transport: Arc<CredentialTransport>, origin: Url) -> Self {
        Self {
            shared: Arc::new(FlowShared {
                transport,
                tracked: Mutex::new(Tracked {
                    code_key: None,
                    state: FlowState::Idle,
                }),
                dispatched: AtomicUsize::new(0),
            }),
            origin,
            latch: SingleFlight::new(),
        }
    }

    pub fn state(&self) -> FlowState {
        self.shared.tracked.lock_or_recover().state.clone()
    }

    /// Number of exchange requests actually sent.
    pub fn dispatched_exchanges(&self) -> usize {
        self.shared.dispatched.load(Ordering::SeqCst)
    }

    /// Run the flow for the redirect URL the callback view was opened with.
    ///
    /// Safe to call repeatedly and safe to abandon: the exchange runs on its own task,
    /// and activations for a code already claimed await that task's final state.
    pub async fn activate(&self, callback_url: &str) -> FlowState {
        let payload = match parse_callback_url(callback_url, &self.origin) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!("oauth callback url rejected: {e}");
                return self
                    .shared
                    .fail(None, FailureKind::Rejected, INVALID_CALLBACK_MESSAGE);
            }
        };

        let Some(code) = payload.code.clone() else {
            if let Some(provider_error) = payload.provider_error() {
                tracing::info!(error = ?payload.error, "github denied authorization");
                return self.shared.fail(None, FailureKind::Rejected, provider_error);
            }
            tracing::info!("oauth callback without authorization code");
            return self
                .shared
                .fail(None, FailureKind::MissingCode, MISSING_CODE_MESSAGE);
        };

        let code_key = fingerprint(&code);
        if self.latch.is_claimed(&code) {
            tracing::debug!(code = %code_key, "exchange already dispatched for code; joining");
        } else {
            self.shared
                .transition(Some(&code_key), FlowState::CodeExtracted);
        }

        let shared = Arc::clone(&self.shared);
        let task_key = code_key.clone();
        let outcome = self
            .latch
            .run(code.clone(), move || exchange(shared, code, task_key))
            .await;

        outcome.unwrap_or_else(|| {
            self.shared.fail(
                Some(&code_key),
                FailureKind::Rejected,
                CallContext::GitHubExchange.default_rejection_message(),
            )
        })
    }
}

async fn exchange(shared: Arc<FlowShared>, code: String, code_key: String) -> FlowState {
    shared.transition(Some(&code_key), FlowState::Exchanging);
    shared.dispatched.fetch_add(1, Ordering::SeqCst);
    tracing::info!(code = %code_key, "exchanging github authorization code");

    let context = CallContext::GitHubExchange;
    let body = serde_json::json!({ "code": code });
    let result = match shared
        .transport
        .call(Endpoint::GitHubCallback, Some(&body))
        .await
    {
        Ok(body) => establish_session(
            &body,
            context,
            shared.transport.store(),
            shared.transport.navigator().as_ref(),
            NavigationMode::Replace,
        ),
        Err(err) => Err(failure_from_transport(&err, context)),
    };

    let next = match result {
        Ok(()) => {
            tracing::info!(code = %code_key, "github sign-in established");
            FlowState::Established
        }
        Err(failure) => {
            tracing::warn!(code = %code_key, kind = ?failure.kind, "github sign-in failed");
            FlowState::Failed(failure)
        }
    };
    shared.transition(Some(&code_key), next.clone());
    next
}

impl FlowShared {
    fn fail(&self, code_key: Option<&str>, kind: FailureKind, message: &str) -> FlowState {
        let state = FlowState::Failed(AuthFailure::new(kind, message));
        self.transition(code_key, state.clone());
        state
    }

    /// Record `next`; for the same code the state only moves forward.
    fn transition(&self, code_key: Option<&str>, next: FlowState) {
        let mut tracked = self.tracked.lock_or_recover();
        let same_code = tracked.code_key.as_deref() == code_key;
        if same_code && code_key.is_some() && next.rank() <= tracked.state.rank() {
            return;
        }
        tracked.code_key = code_key.map(str::to_string);
        tracked.state = next;
    }
}

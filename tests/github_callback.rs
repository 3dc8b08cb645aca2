mod support;

use bird_auth::{FailureKind, FlowState, NavigationMode, Navigator, Route, MISSING_CODE_MESSAGE};
use serde_json::json;
use std::time::Duration;
use support::{Harness, MockBackend, MockResponse};

const CALLBACK: &str = "/auth/github/callback";

/// Simulates the browser arriving on the callback route from the login page.
fn arrive_on_callback(h: &Harness) {
    h.nav.navigate(Route::GitHubCallback, NavigationMode::Push);
}

#[tokio::test]
async fn code_exchange_establishes_session_and_replaces_history_entry() {
    let backend = MockBackend::start().await;
    backend.respond(CALLBACK, MockResponse::ok(json!({"token": "tok_1"})));
    let h = Harness::new(backend.base_url(), Route::Login);
    arrive_on_callback(&h);

    let state = h
        .app
        .complete_github_login("http://localhost:5173/auth/github/callback?code=abc123")
        .await;

    assert_eq!(state, FlowState::Established);
    assert_eq!(h.app.oauth_flow().state(), FlowState::Established);
    assert_eq!(h.token().as_deref(), Some("tok_1"));

    let requests = backend.requests_to(CALLBACK);
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, "POST");
    assert_eq!(requests[0].body, json!({"code": "abc123"}));

    // The callback entry was replaced, so going back skips it.
    assert_eq!(h.nav.entries(), vec![Route::Login, Route::Home]);
    let last = h.nav.events().pop().expect("navigation");
    assert_eq!(last.route, Route::Home);
    assert_eq!(last.mode, NavigationMode::Replace);
    assert_eq!(h.nav.back(), Some(Route::Login));
}

#[tokio::test]
async fn missing_code_fails_immediately_without_network() {
    let backend = MockBackend::start().await;
    let h = Harness::new(backend.base_url(), Route::GitHubCallback);

    let state = h.app.complete_github_login("/auth/github/callback").await;

    let failure = state.failure().expect("failed");
    assert_eq!(failure.kind, FailureKind::MissingCode);
    assert_eq!(failure.message, MISSING_CODE_MESSAGE);
    assert_eq!(state.return_route(), Some(Route::Login));
    assert!(backend.requests().is_empty());
    assert_eq!(h.app.oauth_flow().dispatched_exchanges(), 0);
    assert_eq!(h.token(), None);
}

#[tokio::test]
async fn concurrent_activations_dispatch_one_exchange() {
    let backend = MockBackend::start().await;
    backend.respond(
        CALLBACK,
        MockResponse::ok(json!({"token": "tok_once"})).delayed(Duration::from_millis(50)),
    );
    let h = Harness::new(backend.base_url(), Route::GitHubCallback);
    let url = "/auth/github/callback?code=abc123";

    let (first, second) = tokio::join!(
        h.app.complete_github_login(url),
        h.app.complete_github_login(url)
    );

    assert_eq!(first, FlowState::Established);
    assert_eq!(second, FlowState::Established);
    assert_eq!(backend.requests_to(CALLBACK).len(), 1);
    assert_eq!(h.app.oauth_flow().dispatched_exchanges(), 1);
    assert_eq!(h.nav.events().len(), 1);
}

#[tokio::test]
async fn reactivation_after_completion_does_not_resubmit_code() {
    let backend = MockBackend::start().await;
    backend.respond(
        CALLBACK,
        MockResponse::json(400, json!({"code": "400", "message": "bad_verification_code"})),
    );
    let h = Harness::new(backend.base_url(), Route::GitHubCallback);
    let url = "/auth/github/callback?code=used-code";

    let first = h.app.complete_github_login(url).await;
    let second = h.app.complete_github_login(url).await;

    assert_eq!(first, second);
    let failure = first.failure().expect("failed");
    assert_eq!(failure.kind, FailureKind::Rejected);
    assert_eq!(failure.message, "bad_verification_code");
    assert_eq!(backend.requests_to(CALLBACK).len(), 1);
    assert!(h.nav.events().is_empty());
}

#[tokio::test]
async fn distinct_codes_are_exchanged_separately() {
    let backend = MockBackend::start().await;
    backend.respond(CALLBACK, MockResponse::ok(json!({"code": "200", "data": "tok_2"})));
    let h = Harness::new(backend.base_url(), Route::GitHubCallback);

    h.app
        .complete_github_login("/auth/github/callback?code=first")
        .await;
    h.app
        .complete_github_login("/auth/github/callback?code=second")
        .await;

    assert_eq!(backend.requests_to(CALLBACK).len(), 2);
    assert_eq!(h.app.oauth_flow().dispatched_exchanges(), 2);
}

#[tokio::test]
async fn provider_denial_is_terminal_without_network() {
    let backend = MockBackend::start().await;
    let h = Harness::new(backend.base_url(), Route::GitHubCallback);

    let state = h
        .app
        .complete_github_login(
            "/auth/github/callback?error=access_denied&error_description=The+user+has+denied+your+application+access.",
        )
        .await;

    assert_eq!(
        state.failure().map(|f| f.message.as_str()),
        Some("The user has denied your application access.")
    );
    assert!(backend.requests().is_empty());
}

#[tokio::test]
async fn failed_envelope_without_message_uses_github_default() {
    let backend = MockBackend::start().await;
    backend.respond(CALLBACK, MockResponse::ok(json!({"code": "500"})));
    let h = Harness::new(backend.base_url(), Route::GitHubCallback);

    let state = h
        .app
        .complete_github_login("/auth/github/callback?code=abc123")
        .await;

    assert_eq!(
        state.failure().map(|f| f.message.as_str()),
        Some("GitHub authorization failed")
    );
    assert_eq!(h.token(), None);
}

#[test]
fn authorize_url_points_back_to_callback_route() {
    let h = Harness::new("http://localhost:8081", Route::Login);
    assert_eq!(
        h.app.github_authorize_url().expect("url"),
        "https://github.com/login/oauth/authorize?client_id=Iv1.testclient&redirect_uri=http%3A%2F%2Flocalhost%3A5173%2Fauth%2Fgithub%2Fcallback&scope=user:email"
    );
}

#[tokio::test]
async fn abandoned_activation_still_completes_and_is_not_resent() {
    let backend = MockBackend::start().await;
    backend.respond(
        CALLBACK,
        MockResponse::ok(json!({"token": "tok_slow"})).delayed(Duration::from_millis(200)),
    );
    let h = Harness::new(backend.base_url(), Route::GitHubCallback);
    let url = "/auth/github/callback?code=abc123";

    // The view is torn down before the backend answers.
    let abandoned =
        tokio::time::timeout(Duration::from_millis(50), h.app.complete_github_login(url)).await;
    assert!(abandoned.is_err());

    let remounted = h.app.complete_github_login(url).await;

    assert_eq!(remounted, FlowState::Established);
    assert_eq!(backend.requests_to(CALLBACK).len(), 1);
    assert_eq!(h.app.oauth_flow().dispatched_exchanges(), 1);
    assert_eq!(h.token().as_deref(), Some("tok_slow"));
    assert_eq!(h.nav.events().len(), 1);
}

#[tokio::test]
async fn unauthorized_exchange_invalidates_session_and_redirects_once() {
    let backend = MockBackend::start().await;
    backend.respond(
        CALLBACK,
        MockResponse::json(401, json!({"code": "401", "message": "bad_verification_code"})),
    );
    let h = Harness::new(backend.base_url(), Route::GitHubCallback);
    h.seed_token("tok_prior");

    let state = h
        .app
        .complete_github_login("/auth/github/callback?code=abc123")
        .await;

    let failure = state.failure().expect("failed");
    assert_eq!(failure.kind, FailureKind::Rejected);
    assert_eq!(failure.message, "bad_verification_code");
    assert_eq!(state.return_route(), Some(Route::Login));
    assert_eq!(h.token(), None);
    assert!(!h.app.session_store().path().exists());

    let events = h.nav.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].route, Route::Login);
    assert_eq!(events[0].mode, NavigationMode::Replace);

    // The login view's gate finds no session and stays put.
    assert_eq!(
        h.app.activate_protected_view().await,
        bird_auth::GateOutcome::Redirected
    );
    assert_eq!(h.nav.events().len(), 1);
    assert!(backend.requests_to("/auth/me").is_empty());
}

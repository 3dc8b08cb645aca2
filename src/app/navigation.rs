//! Usage: Routes the auth core navigates to, and the `Navigator` seam to the host's router.

use crate::shared::mutex_ext::MutexExt;
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    /// Authenticated entry point.
    Home,
    /// Unauthenticated entry point.
    Login,
    Register,
    GitHubCallback,
}

impl Route {
    pub const GITHUB_CALLBACK_PATH: &'static str = "/auth/github/callback";

    pub fn path(self) -> &'static str {
        match self {
            Self::Home => "/",
            Self::Login => "/login",
            Self::Register => "/register",
            Self::GitHubCallback => Self::GITHUB_CALLBACK_PATH,
        }
    }

    /// Resolve a location path (query ignored). Unknown paths fall back to `Home`.
    pub fn from_path(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let path = match path.trim_end_matches('/') {
            "" => "/",
            trimmed => trimmed,
        };
        match path {
            "/login" => Self::Login,
            "/register" => Self::Register,
            Self::GITHUB_CALLBACK_PATH => Self::GitHubCallback,
            _ => Self::Home,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationMode {
    Push,
    /// Replace the current history entry so back-navigation cannot return to it.
    Replace,
}

/// Host router. Implementations must be cheap and non-blocking.
pub trait Navigator: Send + Sync {
    fn current(&self) -> Route;

    fn navigate(&self, route: Route, mode: NavigationMode);
}

/// Send the user to the unauthenticated entry point unless they are already there.
///
/// Returns whether a navigation happened.
pub(crate) fn redirect_to_login(navigator: &dyn Navigator) -> bool {
    if navigator.current() == Route::Login {
        tracing::debug!("already on login route; redirect skipped");
        return false;
    }
    navigator.navigate(Route::Login, NavigationMode::Replace);
    true
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationEvent {
    pub route: Route,
    pub mode: NavigationMode,
}

#[derive(Debug)]
struct History {
    entries: Vec<Route>,
    events: Vec<NavigationEvent>,
}

/// In-memory history stack. Serves headless hosts and records every navigation.
#[derive(Debug)]
pub struct HistoryNavigator {
    inner: Mutex<History>,
}

impl HistoryNavigator {
    pub fn new(initial: Route) -> Self {
        Self {
            inner: Mutex::new(History {
                entries: vec![initial],
                events: Vec::new(),
            }),
        }
    }

    pub fn entries(&self) -> Vec<Route> {
        self.inner.lock_or_recover().entries.clone()
    }

    pub fn events(&self) -> Vec<NavigationEvent> {
        self.inner.lock_or_recover().events.clone()
    }

    /// Pop the current entry, like the browser back button. Returns the new current route,
    /// or `None` when there is nothing to go back to.
    pub fn back(&self) -> Option<Route> {
        let mut history = self.inner.lock_or_recover();
        if history.entries.len() <= 1 {
            return None;
        }
        history.entries.pop();
        history.entries.last().copied()
    }
}

impl Navigator for HistoryNavigator {
    fn current(&self) -> Route {
        self.inner
            .lock_or_recover()
            .entries
            .last()
            .copied()
            .unwrap_or(Route::Home)
    }

    fn navigate(&self, route: Route, mode: NavigationMode) {
        let mut history = self.inner.lock_or_recover();
        match mode {
            NavigationMode::Push => history.entries.push(route),
            NavigationMode::Replace => match history.entries.last_mut() {
                Some(last) => *last = route,
                None => history.entries.push(route),
            },
        }
        history.events.push(NavigationEvent { route, mode });
        tracing::debug!(route = route.path(), ?mode, "navigated");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_path_resolves_known_routes_and_falls_back_home() {
        assert_eq!(Route::from_path("/login"), Route::Login);
        assert_eq!(Route::from_path("/register/"), Route::Register);
        assert_eq!(
            Route::from_path("/auth/github/callback?code=abc123"),
            Route::GitHubCallback
        );
        assert_eq!(Route::from_path("/"), Route::Home);
        assert_eq!(Route::from_path("/nope"), Route::Home);
        assert_eq!(Route::from_path(""), Route::Home);
    }

    #[test]
    fn replace_overwrites_current_entry() {
        let nav = HistoryNavigator::new(Route::Login);
        nav.navigate(Route::GitHubCallback, NavigationMode::Push);
        nav.navigate(Route::Home, NavigationMode::Replace);

        assert_eq!(nav.entries(), vec![Route::Login, Route::Home]);
        assert_eq!(nav.back(), Some(Route::Login));
        assert_eq!(nav.back(), None);
    }

    #[test]
    fn redirect_to_login_is_skipped_on_login() {
        let nav = HistoryNavigator::new(Route::Home);
        assert!(redirect_to_login(&nav));
        assert!(!redirect_to_login(&nav));
        assert_eq!(nav.events().len(), 1);
        assert_eq!(nav.current(), Route::Login);
    }
}

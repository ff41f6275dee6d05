//! Route guards. They are UX only: they decide whether a view renders, shows a
//! loading placeholder, or redirects. Real access control lives on the API.

use crate::{
    notify::{Notifier, Toast, ToastLevel},
    session::{Session, StatusKind},
};
use url::form_urlencoded;

pub const HOME_PATH: &str = "/";
pub const LOGIN_PATH: &str = "/login";
/// Query parameter carrying the path to return to after login.
pub const NEXT_PARAM: &str = "next";

pub const LOGIN_REQUIRED_MESSAGE: &str = "Login required to access the requested page.";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GuardDecision {
    Render,
    Loading,
    Redirect { to: String, replace: bool },
}

/// Current route: path plus raw query string.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Location {
    pub path: String,
    pub query: Option<String>,
}

impl Location {
    /// Splits `"/feeds?page=2"` into path and query.
    pub fn parse(target: &str) -> Self {
        let target = target.trim();
        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path, Some(query.to_string())),
            None => (target, None),
        };
        let path = if path.is_empty() { HOME_PATH } else { path };

        Self {
            path: path.to_string(),
            query,
        }
    }

    pub fn query_param(&self, name: &str) -> Option<String> {
        let query = self.query.as_deref()?;
        form_urlencoded::parse(query.as_bytes())
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    }

    fn is_logout(&self) -> bool {
        self.path.contains("logout")
    }
}

/// Guard for views that require an authenticated session.
///
/// One guard instance corresponds to one mounted guard. The "login required"
/// toast fires when the (status, logout-path) pair changes to unauthenticated,
/// not on every evaluation.
#[derive(Debug, Default)]
pub struct AuthGuard {
    last_seen: Option<(StatusKind, bool)>,
}

impl AuthGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn check<N: Notifier + ?Sized>(
        &mut self,
        session: &Session,
        location: &Location,
        notifier: &N,
    ) -> GuardDecision {
        let status = session.kind();
        let just_logged_out = location.is_logout();

        let deps = (status, just_logged_out);
        if self.last_seen != Some(deps) {
            self.last_seen = Some(deps);
            if status == StatusKind::Unauthenticated && !just_logged_out {
                notifier.notify(Toast::new(ToastLevel::Info, LOGIN_REQUIRED_MESSAGE));
            }
        }

        match status {
            StatusKind::Pending => GuardDecision::Loading,
            StatusKind::Unauthenticated if just_logged_out => GuardDecision::Redirect {
                to: HOME_PATH.to_string(),
                replace: false,
            },
            StatusKind::Unauthenticated => GuardDecision::Redirect {
                to: format!("{LOGIN_PATH}?{NEXT_PARAM}={}", location.path),
                replace: false,
            },
            StatusKind::Authenticated => GuardDecision::Render,
        }
    }
}

/// Guard for public-only views (login, registration). An authenticated session
/// is sent back to where it came from; everything else renders, `Pending`
/// included.
#[derive(Clone, Copy, Debug, Default)]
pub struct AntiAuthGuard;

impl AntiAuthGuard {
    pub fn check(self, session: &Session, location: &Location) -> GuardDecision {
        if session.is_authenticated() {
            GuardDecision::Redirect {
                to: next_path(location),
                replace: true,
            }
        } else {
            GuardDecision::Render
        }
    }
}

/// The `next` parameter when it is a same-site absolute path, otherwise home.
fn next_path(location: &Location) -> String {
    location
        .query_param(NEXT_PARAM)
        .filter(|next| next.starts_with('/') && !next.starts_with("//"))
        .unwrap_or_else(|| HOME_PATH.to_string())
}

use super::state::{Session, StatusKind};
use crate::{
    api::{ApiError, AuthApi, Credentials, LoginReceipt, PasswordChange, Registration, UserProfile},
    drafts::DraftStore,
    notify::{Notifier, Toast, ToastLevel},
};
use serde_json::Value;
use std::{
    collections::BTreeMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

/// Shown when a login fails without a server answer.
pub const LOGIN_FALLBACK_MESSAGE: &str = "Unable to log in. Please try again.";

/// Keys of a login error body that are not field errors.
const NON_FIELD_KEYS: [&str; 3] = ["error", "detail", "non_field_errors"];

/// Login failure handed back to the form so it can map field-level errors.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct LoginError {
    message: String,
    #[source]
    source: ApiError,
}

impl LoginError {
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn api_error(&self) -> &ApiError {
        &self.source
    }

    /// Field name to messages, read from a DRF-style error body.
    pub fn field_errors(&self) -> BTreeMap<String, Vec<String>> {
        let Some(Value::Object(body)) = self.source.body() else {
            return BTreeMap::new();
        };

        body.iter()
            .filter(|(key, _)| !NON_FIELD_KEYS.contains(&key.as_str()))
            .filter_map(|(key, value)| {
                let messages: Vec<String> = match value {
                    Value::String(message) => vec![message.clone()],
                    Value::Array(items) => items
                        .iter()
                        .filter_map(Value::as_str)
                        .map(str::to_string)
                        .collect(),
                    _ => Vec::new(),
                };
                (!messages.is_empty()).then(|| (key.clone(), messages))
            })
            .collect()
    }
}

impl From<ApiError> for LoginError {
    fn from(source: ApiError) -> Self {
        let message = match &source {
            ApiError::Http { message, .. } => message.clone(),
            _ => LOGIN_FALLBACK_MESSAGE.to_string(),
        };
        Self { message, source }
    }
}

/// Owner of the authentication session. Clones share the same state, API
/// client and notifier; each store is independent of every other store.
///
/// Overlapping login and logout calls are not ordered: each settles on its own
/// and the last one to settle decides the final status.
pub struct SessionStore<A, N> {
    inner: Arc<Inner<A, N>>,
}

struct Inner<A, N> {
    api: A,
    notifier: N,
    state: watch::Sender<Session>,
    generations: AtomicU64,
}

impl<A, N> Clone for SessionStore<A, N> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A: AuthApi, N: Notifier> SessionStore<A, N> {
    /// Creates a store with an unauthenticated session.
    pub fn new(api: A, notifier: N) -> Self {
        let (state, _) = watch::channel(Session::Unauthenticated);
        Self {
            inner: Arc::new(Inner {
                api,
                notifier,
                state,
                generations: AtomicU64::new(0),
            }),
        }
    }

    pub fn snapshot(&self) -> Session {
        self.inner.state.borrow().clone()
    }

    pub fn status(&self) -> StatusKind {
        self.inner.state.borrow().kind()
    }

    /// Receiver notified on every session change. Unchanged writes are not sent.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.inner.state.subscribe()
    }

    pub fn api(&self) -> &A {
        &self.inner.api
    }

    fn next_generation(&self) -> u64 {
        self.inner.generations.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Reconciles the session with the server. Never fails: errors become
    /// `Unauthenticated` without a toast.
    #[instrument(skip_all)]
    pub async fn check_authentication(&self) {
        match self.inner.api.check_authentication().await {
            Ok(check) => {
                let next = self.next_generation();
                let changed = self
                    .inner
                    .state
                    .send_if_modified(|session| session.confirm(check.is_superuser, next));
                debug!(changed, is_superuser = check.is_superuser, "authentication confirmed");
            }
            Err(err) => {
                let changed = self.inner.state.send_if_modified(Session::demote);
                debug!(changed, error = %err, "authentication check failed");
            }
        }
    }

    /// Logs in and returns the server response. The status is `Pending` only
    /// while the request is in flight.
    ///
    /// # Errors
    /// Returns `LoginError` carrying the server message, or a generic message
    /// when no response was received.
    #[instrument(skip_all, fields(username = %credentials.username))]
    pub async fn login_user(&self, credentials: &Credentials) -> Result<LoginReceipt, LoginError> {
        self.inner.state.send_if_modified(Session::begin_request);

        match self.inner.api.login(credentials).await {
            Ok(receipt) => {
                self.inner.state.send_replace(Session::Authenticated {
                    user: UserProfile::default(),
                    is_superuser: false,
                    generation: self.next_generation(),
                });
                info!("login succeeded");
                self.inner
                    .notifier
                    .notify(Toast::new(ToastLevel::Success, "You've been logged in!"));
                Ok(receipt)
            }
            Err(err) => {
                self.inner.state.send_if_modified(Session::demote);
                let err = LoginError::from(err);
                warn!(error = %err.api_error(), "login failed");
                self.inner.notifier.notify(
                    Toast::new(ToastLevel::Danger, "Login failed!")
                        .with_detail(Some(err.message().to_string()))
                        .sticky(),
                );
                Err(err)
            }
        }
    }

    /// Logs out. Whatever the server answers, the local session ends
    /// unauthenticated so the UI never looks signed in after a failed logout.
    #[instrument(skip_all)]
    pub async fn logout_user(&self) {
        self.inner.state.send_if_modified(Session::begin_request);

        if let Err(err) = self.inner.api.logout().await {
            warn!(error = %err, "logout request failed, clearing local session");
        }

        self.inner.state.send_if_modified(Session::demote);
        self.inner
            .notifier
            .notify(Toast::new(ToastLevel::Info, "Logged out!"));
    }

    /// Loads the user profile into the authenticated session that was current
    /// when the request started. A profile for an earlier login is dropped.
    #[instrument(skip_all)]
    pub async fn fetch_user_access(&self) {
        let requested_for = self.inner.state.borrow().generation();

        match self.inner.api.fetch_user_access().await {
            Ok(access) => {
                let mut discarded = false;
                self.inner.state.send_if_modified(|session| match session {
                    Session::Authenticated {
                        user, generation, ..
                    } if requested_for == Some(*generation) => {
                        if *user == access.user {
                            false
                        } else {
                            *user = access.user;
                            true
                        }
                    }
                    _ => {
                        discarded = true;
                        false
                    }
                });
                if discarded {
                    debug!("profile discarded, session changed during the request");
                }
            }
            Err(err) => {
                warn!(error = %err, "failed to fetch user access");
                self.inner.notifier.notify(
                    Toast::new(ToastLevel::Danger, "Error fetching user access information!")
                        .with_detail(Some(err.user_message())),
                );
            }
        }
    }

    /// Changes the current user's password. The session status is untouched.
    ///
    /// # Errors
    /// Returns the `ApiError` of a failed request after emitting a toast.
    #[instrument(skip_all)]
    pub async fn change_password(&self, change: &PasswordChange) -> Result<(), ApiError> {
        match self.inner.api.change_password(change).await {
            Ok(()) => {
                self.inner
                    .notifier
                    .notify(Toast::new(ToastLevel::Success, "Password changed successfully!"));
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "password change failed");
                self.inner.notifier.notify(
                    Toast::new(ToastLevel::Danger, "Password change failed!")
                        .with_detail(Some(err.user_message())),
                );
                Err(err)
            }
        }
    }

    /// Submits a signup. The saved draft is cleared only when the server
    /// accepts it, so a rejected form can be corrected and resent. The session
    /// status is untouched: a new account must verify its email first.
    ///
    /// # Errors
    /// Returns the `ApiError` of a failed request after emitting a toast.
    #[instrument(skip_all, fields(username = %registration.draft.username))]
    pub async fn register_user(
        &self,
        drafts: &DraftStore,
        registration: &Registration,
    ) -> Result<(), ApiError> {
        let result = drafts
            .submit_registration(self.inner.api.register(registration))
            .await;

        match &result {
            Ok(()) => {
                info!("registration accepted");
                self.inner.notifier.notify(
                    Toast::new(ToastLevel::Success, "Registration successful!").with_detail(Some(
                        "Check your inbox to verify your email address.".to_string(),
                    )),
                );
            }
            Err(err) => {
                warn!(error = %err, "registration failed");
                self.inner.notifier.notify(
                    Toast::new(ToastLevel::Danger, "Registration failed!")
                        .with_detail(Some(err.user_message()))
                        .sticky(),
                );
            }
        }
        result
    }

    /// # Errors
    /// Returns the `ApiError` of a failed request after emitting a toast.
    #[instrument(skip_all)]
    pub async fn resend_verification(&self, email: &str) -> Result<(), ApiError> {
        let result = self.inner.api.resend_verification(email).await;
        self.report(
            &result,
            "Verification email sent!",
            "Failed to send verification email!",
        );
        result
    }

    /// # Errors
    /// Returns the `ApiError` of a failed request after emitting a toast.
    #[instrument(skip_all)]
    pub async fn request_password_reset(&self, email: &str) -> Result<(), ApiError> {
        let result = self.inner.api.request_password_reset(email).await;
        self.report(
            &result,
            "Password reset email sent!",
            "Failed to request a password reset!",
        );
        result
    }

    fn report(&self, result: &Result<(), ApiError>, success: &str, failure: &str) {
        let toast = match result {
            Ok(()) => Toast::new(ToastLevel::Success, success),
            Err(err) => {
                warn!(error = %err, "{failure}");
                Toast::new(ToastLevel::Danger, failure).with_detail(Some(err.user_message()))
            }
        };
        self.inner.notifier.notify(toast);
    }
}

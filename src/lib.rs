//! # GreedyBear session client
//!
//! Client-side authentication session for the GreedyBear threat intelligence
//! API. The session store is the single owner of the authentication status, the
//! current user profile and the superuser flag; guards read it to decide whether
//! a view renders, waits, or redirects.
//!
//! ## Flow
//!
//! 1. **Mount:** [`bootstrap::BootstrapProbe`] calls
//!    [`session::SessionStore::check_authentication`] once per shell mount.
//! 2. **Hydrate:** when the status enters `Authenticated`, the probe fetches the
//!    user profile from `/api/me/access`.
//! 3. **Route:** [`guards::AuthGuard`] and [`guards::AntiAuthGuard`] turn the
//!    current status and location into a [`guards::GuardDecision`].
//!
//! Network failures never surface as fatal errors. They degrade the session to
//! `Unauthenticated` and, for user-initiated actions, emit a toast through the
//! configured [`notify::Notifier`].
//!
//! Session cookies stay inside the HTTP client's cookie store; passwords are held
//! as `SecretString` and must never be logged.

pub mod api;
pub mod bootstrap;
pub mod cli;
pub mod config;
pub mod drafts;
pub mod guards;
pub mod notify;
pub mod session;

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

pub const GIT_COMMIT_HASH: &str = env!("GREEDYBEAR_GIT_SHA");

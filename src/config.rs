//! Client configuration: API base URL, endpoint paths, request timeout and the
//! state directory used for persisted drafts. Values are public; do not store
//! secrets here.

use crate::drafts::DraftStore;
use std::{path::PathBuf, time::Duration};
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid API URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("unsupported API URL scheme: {0}")]
    UnsupportedScheme(String),
}

pub const API_BASE_PATH: &str = "/api";

/// Endpoint paths relative to the API host.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoints {
    pub check_authentication: String,
    pub login: String,
    pub logout: String,
    pub user_access: String,
    pub change_password: String,
    pub register: String,
    pub resend_verification: String,
    pub request_password_reset: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        let auth = format!("{API_BASE_PATH}/auth");
        Self {
            check_authentication: format!("{auth}/authentication"),
            login: format!("{auth}/login"),
            logout: format!("{auth}/logout"),
            user_access: format!("{API_BASE_PATH}/me/access"),
            change_password: format!("{auth}/change-password"),
            register: format!("{auth}/register"),
            resend_verification: format!("{auth}/resend-verification"),
            request_password_reset: format!("{auth}/request-password-reset"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub api_base_url: Url,
    pub endpoints: Endpoints,
    /// No timeout unless configured; a hung request keeps the session pending.
    pub request_timeout: Option<Duration>,
    pub state_dir: PathBuf,
}

impl ClientConfig {
    /// # Errors
    /// Returns an error if `api_base_url` is not an absolute http(s) URL.
    pub fn new(api_base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            api_base_url: parse_base_url(api_base_url)?,
            endpoints: Endpoints::default(),
            request_timeout: None,
            state_dir: default_state_dir(),
        })
    }

    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_state_dir(mut self, state_dir: PathBuf) -> Self {
        self.state_dir = state_dir;
        self
    }

    pub fn drafts(&self) -> DraftStore {
        DraftStore::new(&self.state_dir)
    }

    /// Joins an endpoint path onto the base URL, keeping any base path prefix.
    pub fn url_for(&self, path: &str) -> String {
        build_url_with_base(self.api_base_url.as_str(), path)
    }
}

fn parse_base_url(value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value.trim())?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::UnsupportedScheme(other.to_string())),
    }
}

fn build_url_with_base(base_url: &str, path: &str) -> String {
    let base = base_url.trim().trim_end_matches('/');
    let path = path.trim();

    if base.is_empty() {
        path.to_string()
    } else {
        format!("{}/{}", base, path.trim_start_matches('/'))
    }
}

/// `$XDG_STATE_HOME/greedybear-session`, falling back to `~/.local/state`.
pub fn default_state_dir() -> PathBuf {
    std::env::var_os("XDG_STATE_HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".local/state")))
        .unwrap_or_else(std::env::temp_dir)
        .join(env!("CARGO_PKG_NAME"))
}

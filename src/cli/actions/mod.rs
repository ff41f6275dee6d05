pub mod draft;
pub mod login;
pub mod probe;
pub mod register;

// Single dispatch point lives in `run` so this module stays a list of actions.
mod run;

use crate::{
    api::HttpAuthApi,
    config::ClientConfig,
    notify::TracingNotifier,
    session::{Session, SessionStore},
};
use anyhow::{Context, Result};
use std::time::Duration;

#[derive(Debug)]
pub enum Action {
    Probe(probe::Args),
    Login(login::Args),
    Draft(draft::Args),
    Register(register::Args),
}

impl Action {
    /// Execute the action.
    /// # Errors
    /// Returns an error if the action fails.
    pub async fn execute(self) -> Result<()> {
        run::execute(self).await
    }
}

/// Connection settings shared by every action.
#[derive(Debug, Clone)]
pub struct SessionArgs {
    pub api_url: String,
    pub request_timeout: Option<Duration>,
}

impl SessionArgs {
    /// # Errors
    /// Returns an error if the API URL is invalid.
    pub fn client_config(&self) -> Result<ClientConfig> {
        let config = ClientConfig::new(&self.api_url)
            .with_context(|| format!("invalid GREEDYBEAR_API_URL: {}", self.api_url))?
            .with_request_timeout(self.request_timeout);
        Ok(config)
    }

    /// # Errors
    /// Returns an error if the configuration or the HTTP client is invalid.
    pub fn store(&self) -> Result<SessionStore<HttpAuthApi, TracingNotifier>> {
        let api = HttpAuthApi::new(self.client_config()?).context("could not build API client")?;
        Ok(SessionStore::new(api, TracingNotifier))
    }
}

/// Prints the session as pretty JSON on stdout.
pub(crate) fn print_session(session: &Session) -> Result<()> {
    let rendered = serde_json::to_string_pretty(session)?;
    println!("{rendered}");
    Ok(())
}

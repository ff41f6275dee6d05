use crate::{
    api::Credentials,
    bootstrap::BootstrapProbe,
    cli::actions::{print_session, SessionArgs},
};
use anyhow::{anyhow, Result};
use tracing::info;

#[derive(Debug)]
pub struct Args {
    pub session: SessionArgs,
    pub credentials: Credentials,
    pub logout: bool,
}

/// Logs in, lets the bootstrap probe hydrate the profile and prints the session.
/// # Errors
/// Returns an error if the login is rejected or the client cannot be configured.
pub async fn execute(args: Args) -> Result<()> {
    let store = args.session.store()?;

    store
        .login_user(&args.credentials)
        .await
        .map_err(|err| anyhow!("login failed: {err}"))?;

    let mut shell = BootstrapProbe::mount(&store);
    shell.idle().await;
    print_session(&store.snapshot())?;

    if args.logout {
        store.logout_user().await;
        shell.idle().await;
        info!(status = %store.status(), "logged out");
    }

    Ok(())
}

use crate::{
    bootstrap::BootstrapProbe,
    cli::actions::{print_session, SessionArgs},
};
use anyhow::Result;
use tracing::info;

#[derive(Debug)]
pub struct Args {
    pub session: SessionArgs,
}

/// Mounts the shell once, waits for the probe to settle and prints the session.
/// # Errors
/// Returns an error if the client cannot be configured or the session cannot be printed.
pub async fn execute(args: Args) -> Result<()> {
    let store = args.session.store()?;

    let mut shell = BootstrapProbe::mount(&store);
    shell.idle().await;
    shell.unmount();

    info!(status = %store.status(), "probe finished");
    print_session(&store.snapshot())
}

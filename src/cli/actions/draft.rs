use crate::drafts::DraftStore;
use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::info;

#[derive(Debug)]
pub struct Args {
    pub state_dir: PathBuf,
    pub clear: bool,
}

/// Prints the saved registration draft as JSON, or clears it.
/// # Errors
/// Returns an error if the draft file cannot be written or the draft cannot be printed.
pub fn execute(args: &Args) -> Result<()> {
    let drafts = DraftStore::new(&args.state_dir);

    if args.clear {
        drafts
            .clear_registration()
            .with_context(|| format!("could not clear {}", drafts.path().display()))?;
        info!(path = %drafts.path().display(), "registration draft cleared");
        return Ok(());
    }

    let rendered = serde_json::to_string_pretty(&drafts.load_registration())?;
    println!("{rendered}");
    Ok(())
}

use crate::cli::actions::{draft, login, probe, register, Action};
use anyhow::Result;

/// Execute the provided action.
// To add a new action, add an `Action::*` variant and its `*::execute` call here.
/// # Errors
/// Returns an error if the action fails.
pub async fn execute(action: Action) -> Result<()> {
    match action {
        Action::Probe(args) => probe::execute(args).await,
        Action::Login(args) => login::execute(args).await,
        Action::Draft(args) => draft::execute(&args),
        Action::Register(args) => register::execute(args).await,
    }
}

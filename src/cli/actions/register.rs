use crate::{
    api::Registration,
    cli::actions::SessionArgs,
    drafts::{DraftStore, RegistrationDraft},
};
use anyhow::{anyhow, Result};
use secrecy::{ExposeSecret, SecretString};
use std::path::PathBuf;
use tracing::info;

/// Form fields given on the command line. Unset fields keep the saved draft.
#[derive(Debug, Default)]
pub struct Fields {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub company_name: Option<String>,
    pub company_role: Option<String>,
    pub twitter_handle: Option<String>,
    pub discover_from: Option<String>,
}

impl Fields {
    fn apply(self, draft: &mut RegistrationDraft) {
        let pairs = [
            (self.first_name, &mut draft.first_name),
            (self.last_name, &mut draft.last_name),
            (self.username, &mut draft.username),
            (self.email, &mut draft.email),
            (self.company_name, &mut draft.company_name),
            (self.company_role, &mut draft.company_role),
            (self.twitter_handle, &mut draft.twitter_handle),
            (self.discover_from, &mut draft.discover_from),
        ];
        for (value, field) in pairs {
            if let Some(value) = value {
                *field = value;
            }
        }
    }
}

#[derive(Debug)]
pub struct Args {
    pub session: SessionArgs,
    pub state_dir: PathBuf,
    pub fields: Fields,
    pub password: SecretString,
}

/// Merges the flags into the saved draft, saves it, and submits the signup.
/// The draft survives a rejected submit so the next run can resume from it.
/// # Errors
/// Returns an error if the draft cannot be saved or the server rejects the signup.
pub async fn execute(args: Args) -> Result<()> {
    let drafts = DraftStore::new(&args.state_dir);
    let mut draft = drafts.load_registration();
    args.fields.apply(&mut draft);
    drafts.save_registration(&draft)?;

    let store = args.session.store()?;
    let registration = Registration::new(draft, args.password.expose_secret());
    store
        .register_user(&drafts, &registration)
        .await
        .map_err(|err| anyhow!("registration failed: {}", err.user_message()))?;

    info!(username = %registration.draft.username, "registration accepted, verify your email");
    Ok(())
}

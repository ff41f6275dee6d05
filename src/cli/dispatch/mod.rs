use crate::{
    api::Credentials,
    cli::actions::{draft, login, probe, register, Action, SessionArgs},
    config::default_state_dir,
};
use anyhow::{anyhow, Context, Result};
use secrecy::SecretString;
use std::{path::PathBuf, time::Duration};

/// # Errors
/// Returns an error if required arguments are missing.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    match matches.subcommand() {
        Some(("probe", _)) => Ok(Action::Probe(probe::Args {
            session: session_args(matches)?,
        })),
        Some(("login", sub_m)) => {
            let session = session_args(matches)?;
            let username = sub_m
                .get_one::<String>("username")
                .cloned()
                .context("missing required argument: --username")?;
            let password = sub_m
                .get_one::<String>("password")
                .cloned()
                .context("missing required argument: --password")?;

            Ok(Action::Login(login::Args {
                session,
                credentials: Credentials::new(username, password),
                logout: sub_m.get_flag("logout"),
            }))
        }
        Some(("register", sub_m)) => {
            let field = |name: &str| sub_m.get_one::<String>(name).cloned();
            let password = sub_m
                .get_one::<String>("password")
                .cloned()
                .context("missing required argument: --password")?;

            Ok(Action::Register(register::Args {
                session: session_args(matches)?,
                state_dir: state_dir(matches),
                fields: register::Fields {
                    first_name: field("first-name"),
                    last_name: field("last-name"),
                    username: field("username"),
                    email: field("email"),
                    company_name: field("company-name"),
                    company_role: field("company-role"),
                    twitter_handle: field("twitter-handle"),
                    discover_from: field("discover-from"),
                },
                password: SecretString::from(password),
            }))
        }
        Some(("draft", sub_m)) => Ok(Action::Draft(draft::Args {
            state_dir: state_dir(matches),
            clear: sub_m.get_flag("clear"),
        })),
        Some((name, _)) => Err(anyhow!("unknown command: {name}")),
        None => Err(anyhow!("missing command")),
    }
}

fn state_dir(matches: &clap::ArgMatches) -> PathBuf {
    matches
        .get_one::<String>("state-dir")
        .map_or_else(default_state_dir, PathBuf::from)
}

fn session_args(matches: &clap::ArgMatches) -> Result<SessionArgs> {
    let api_url = matches
        .get_one::<String>("api-url")
        .cloned()
        .context("missing required argument: --api-url")?;

    Ok(SessionArgs {
        api_url,
        request_timeout: matches
            .get_one::<u64>("request-timeout")
            .map(|secs| Duration::from_secs(*secs)),
    })
}

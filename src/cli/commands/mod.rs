use clap::{
    builder::{
        styling::{AnsiColor, Effects, Styles},
        ValueParser,
    },
    Arg, ArgAction, ColorChoice, Command,
};

/// Registration form flags, in form order.
pub const REGISTRATION_FIELDS: [(&str, &str); 8] = [
    ("first-name", "First name"),
    ("last-name", "Last name"),
    ("username", "Account username"),
    ("email", "Email address, the verification link is sent here"),
    ("company-name", "Company name"),
    ("company-role", "Role at the company"),
    ("twitter-handle", "Twitter handle"),
    ("discover-from", "How you found GreedyBear"),
];

pub fn validator_log_level() -> ValueParser {
    ValueParser::from(move |level: &str| -> std::result::Result<u8, String> {
        if let Ok(parsed) = level.parse::<u8>() {
            if parsed <= 5 {
                return Ok(parsed);
            }
        }

        match level.to_lowercase().as_str() {
            "error" => Ok(0),
            "warn" => Ok(1),
            "info" => Ok(2),
            "debug" => Ok(3),
            "trace" => Ok(4),
            _ => Err("invalid log level".to_string()),
        }
    })
}

pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    Command::new("greedybear-session")
        .about("GreedyBear authentication session client")
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(concat!(
            env!("CARGO_PKG_VERSION"),
            " - ",
            env!("GREEDYBEAR_GIT_SHA")
        ))
        .color(ColorChoice::Auto)
        .styles(styles)
        .subcommand_required(true)
        .arg(
            Arg::new("api-url")
                .long("api-url")
                .help("GreedyBear base URL, example: https://greedybear.example")
                .env("GREEDYBEAR_API_URL")
                .global(true),
        )
        .arg(
            Arg::new("request-timeout")
                .long("request-timeout")
                .help("Request timeout in seconds (default: no timeout)")
                .env("GREEDYBEAR_REQUEST_TIMEOUT")
                .global(true)
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
        .arg(
            Arg::new("state-dir")
                .long("state-dir")
                .help("Directory for persisted drafts")
                .env("GREEDYBEAR_STATE_DIR")
                .global(true),
        )
        .arg(
            Arg::new("verbosity")
                .short('v')
                .long("verbose")
                .help("Verbosity level: ERROR, WARN, INFO, DEBUG, TRACE (default: ERROR)")
                .env("GREEDYBEAR_LOG_LEVEL")
                .global(true)
                .action(ArgAction::Count)
                .value_parser(validator_log_level()),
        )
        .subcommand(
            Command::new("probe")
                .about("Check authentication, load the user profile and print the session"),
        )
        .subcommand(
            Command::new("login")
                .about("Log in, load the user profile and print the session")
                .arg(
                    Arg::new("username")
                        .short('u')
                        .long("username")
                        .help("Account username")
                        .env("GREEDYBEAR_USERNAME")
                        .required(true),
                )
                .arg(
                    Arg::new("password")
                        .long("password")
                        .help("Account password")
                        .env("GREEDYBEAR_PASSWORD")
                        .hide_env_values(true)
                        .required(true),
                )
                .arg(
                    Arg::new("logout")
                        .long("logout")
                        .help("Log out again before exiting")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("register")
                .about("Sign up, resuming from the saved registration draft")
                .args(REGISTRATION_FIELDS.iter().map(|(name, help)| {
                    Arg::new(*name).long(*name).help(*help)
                }))
                .arg(
                    Arg::new("password")
                        .long("password")
                        .help("Account password, never saved with the draft")
                        .env("GREEDYBEAR_PASSWORD")
                        .hide_env_values(true)
                        .required(true),
                ),
        )
        .subcommand(
            Command::new("draft")
                .about("Print the saved registration draft")
                .arg(
                    Arg::new("clear")
                        .long("clear")
                        .help("Delete the saved draft instead of printing it")
                        .action(ArgAction::SetTrue),
                ),
        )
}

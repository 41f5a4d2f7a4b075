use crate::{
    api::{RegisterRequest, ResetPasswordRequest, Role, User, UserUpdate, DEFAULT_PAGE_LIMIT},
    cli::{
        actions::{auth, health, users, Action},
        globals::GlobalArgs,
    },
    config::{AppConfig, ConfigInput},
    health::DEFAULT_HEALTH_INTERVAL,
};
use anyhow::{anyhow, bail, Context, Result};
use clap::ArgMatches;
use regex::Regex;
use secrecy::SecretString;
use std::time::Duration;

fn valid_email(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|regex| regex.is_match(email))
}

fn required(matches: &ArgMatches, id: &str) -> Result<String> {
    matches
        .get_one::<String>(id)
        .cloned()
        .with_context(|| format!("missing required argument: --{id}"))
}

fn optional(matches: &ArgMatches, id: &str) -> Option<String> {
    matches
        .get_one::<String>(id)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn email(matches: &ArgMatches) -> Result<String> {
    let email = required(matches, "email")?.trim().to_lowercase();
    if !valid_email(&email) {
        bail!("invalid email address: {email}");
    }
    Ok(email)
}

fn role(matches: &ArgMatches) -> Result<Option<Role>> {
    match matches.get_one::<String>("role").map(String::as_str) {
        None => Ok(None),
        Some("user") => Ok(Some(Role::User)),
        Some("admin") => Ok(Some(Role::Admin)),
        Some(other) => Err(anyhow!("unknown role: {other}")),
    }
}

fn id(matches: &ArgMatches) -> Result<i64> {
    matches
        .get_one::<i64>("id")
        .copied()
        .context("missing required argument: <id>")
}

/// # Errors
/// Returns an error if arguments are missing, malformed or inconsistent.
pub fn handler(matches: &ArgMatches) -> Result<(Action, GlobalArgs)> {
    let config = AppConfig::resolve(ConfigInput {
        api_url: matches.get_one::<String>("api-url").cloned(),
        origin: matches.get_one::<String>("origin").cloned(),
        session_file: matches.get_one::<String>("session-file").cloned(),
        timeout_secs: matches.get_one::<u64>("timeout").copied(),
        ephemeral: matches.get_flag("ephemeral"),
    })?;

    let action = match matches.subcommand() {
        Some(("login", sub)) => Action::Auth(auth::Args::Login {
            email: email(sub)?,
            password: SecretString::from(required(sub, "password")?),
        }),
        Some(("register", sub)) => Action::Auth(auth::Args::Register(RegisterRequest {
            name: required(sub, "name")?,
            surname: required(sub, "surname")?,
            email: email(sub)?,
            password: required(sub, "password")?,
        })),
        Some(("logout", _)) => Action::Auth(auth::Args::Logout),
        Some(("whoami", _)) => Action::Auth(auth::Args::Whoami),
        Some(("refresh", sub)) => Action::Auth(auth::Args::Refresh {
            refresh_token: SecretString::from(required(sub, "refresh-token")?),
        }),
        Some(("forgot-password", sub)) => {
            Action::Auth(auth::Args::ForgotPassword { email: email(sub)? })
        }
        Some(("reset-password", sub)) => {
            Action::Auth(auth::Args::ResetPassword(ResetPasswordRequest {
                email: email(sub)?,
                new_password: required(sub, "new-password")?,
                reset_token: required(sub, "reset-token")?,
            }))
        }
        Some(("users", sub)) => Action::Users(users_args(sub)?),
        Some(("health", sub)) => Action::Health(health::Args {
            watch: sub.get_flag("watch"),
            interval: sub
                .get_one::<u64>("interval")
                .copied()
                .map_or(DEFAULT_HEALTH_INTERVAL, Duration::from_secs),
        }),
        Some((other, _)) => bail!("unknown command: {other}"),
        None => bail!("missing command, see --help"),
    };

    Ok((action, GlobalArgs::new(config)))
}

fn users_args(matches: &ArgMatches) -> Result<users::Args> {
    let args = match matches.subcommand() {
        Some(("list", sub)) => users::Args::List {
            limit: sub
                .get_one::<u32>("limit")
                .copied()
                .unwrap_or(DEFAULT_PAGE_LIMIT),
            offset: sub.get_one::<u32>("offset").copied().unwrap_or(0),
        },
        Some(("get", sub)) => users::Args::Get { id: id(sub)? },
        Some(("find", sub)) => users::Args::Find { email: email(sub)? },
        Some(("create", sub)) => users::Args::Create(User {
            id: None,
            name: required(sub, "name")?,
            surname: optional(sub, "surname"),
            email: email(sub)?,
            role: role(sub)?.unwrap_or_default(),
        }),
        Some(("update", sub)) => {
            let email = if sub.contains_id("email") {
                Some(email(sub)?)
            } else {
                None
            };
            users::Args::Update {
                id: id(sub)?,
                update: UserUpdate {
                    name: optional(sub, "name"),
                    surname: optional(sub, "surname"),
                    email,
                    role: role(sub)?,
                },
            }
        }
        Some(("delete", sub)) => users::Args::Delete { id: id(sub)? },
        Some(("count", _)) => users::Args::Count,
        Some((other, _)) => bail!("unknown users command: {other}"),
        None => bail!("missing users command, see --help"),
    };

    Ok(args)
}

mod auth;
mod health;
pub mod logging;
mod users;

use clap::{
    builder::styling::{AnsiColor, Effects, Styles},
    Arg, ArgAction, ColorChoice, Command,
};

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let long_version: &'static str = Box::leak(
        format!("{} - {}", env!("CARGO_PKG_VERSION"), crate::GIT_COMMIT_HASH).into_boxed_str(),
    );

    let command = Command::new("userdash")
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("api-url")
                .long("api-url")
                .help("API base URL, absolute or a path relative to --origin")
                .env("USERDASH_API_URL")
                .global(true),
        )
        .arg(
            Arg::new("origin")
                .long("origin")
                .help("Origin used to resolve a relative --api-url")
                .env("USERDASH_ORIGIN")
                .global(true),
        )
        .arg(
            Arg::new("session-file")
                .long("session-file")
                .help("File holding the persisted session")
                .env("USERDASH_SESSION_FILE")
                .global(true)
                .conflicts_with("ephemeral"),
        )
        .arg(
            Arg::new("ephemeral")
                .long("ephemeral")
                .help("Keep the session in memory only")
                .global(true)
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("timeout")
                .long("timeout")
                .help("Request timeout in seconds, 0 disables it")
                .env("USERDASH_TIMEOUT")
                .global(true)
                .value_parser(clap::value_parser!(u64)),
        );

    let command = auth::with_subcommands(command);
    let command = users::with_subcommands(command);
    let command = health::with_subcommands(command);
    logging::with_args(command)
}

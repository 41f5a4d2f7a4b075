use clap::{Arg, Command};

fn email_arg() -> Arg {
    Arg::new("email")
        .short('e')
        .long("email")
        .help("Account email address")
        .env("USERDASH_EMAIL")
        .required(true)
}

fn password_arg() -> Arg {
    Arg::new("password")
        .short('p')
        .long("password")
        .help("Account password")
        .env("USERDASH_PASSWORD")
        .hide_env_values(true)
        .required(true)
}

#[must_use]
pub fn with_subcommands(command: Command) -> Command {
    command
        .subcommand(
            Command::new("login")
                .about("Log in and persist the session")
                .arg(email_arg())
                .arg(password_arg()),
        )
        .subcommand(
            Command::new("register")
                .about("Create an account and log in with it")
                .arg(
                    Arg::new("name")
                        .long("name")
                        .help("First name")
                        .required(true),
                )
                .arg(
                    Arg::new("surname")
                        .long("surname")
                        .help("Last name")
                        .required(true),
                )
                .arg(email_arg())
                .arg(password_arg()),
        )
        .subcommand(Command::new("logout").about("End the current session"))
        .subcommand(Command::new("whoami").about("Print the user of the stored session"))
        .subcommand(
            Command::new("refresh")
                .about("Exchange a refresh token for a new session token")
                .arg(
                    Arg::new("refresh-token")
                        .long("refresh-token")
                        .help("Refresh token issued by the server")
                        .env("USERDASH_REFRESH_TOKEN")
                        .hide_env_values(true)
                        .required(true),
                ),
        )
        .subcommand(
            Command::new("forgot-password")
                .about("Ask the server to send a password reset email")
                .arg(email_arg()),
        )
        .subcommand(
            Command::new("reset-password")
                .about("Set a new password using a reset token")
                .arg(email_arg())
                .arg(
                    Arg::new("new-password")
                        .long("new-password")
                        .help("New account password")
                        .env("USERDASH_NEW_PASSWORD")
                        .hide_env_values(true)
                        .required(true),
                )
                .arg(
                    Arg::new("reset-token")
                        .long("reset-token")
                        .help("Token from the reset email")
                        .env("USERDASH_RESET_TOKEN")
                        .hide_env_values(true)
                        .required(true),
                ),
        )
}

use clap::{Arg, ArgAction, Command};

#[must_use]
pub fn with_subcommands(command: Command) -> Command {
    command.subcommand(
        Command::new("health")
            .about("Check whether the API is up")
            .arg(
                Arg::new("watch")
                    .short('w')
                    .long("watch")
                    .help("Keep polling and print every status until interrupted")
                    .action(ArgAction::SetTrue),
            )
            .arg(
                Arg::new("interval")
                    .long("interval")
                    .help("Seconds between checks in watch mode")
                    .env("USERDASH_HEALTH_INTERVAL")
                    .default_value("30")
                    .value_parser(clap::value_parser!(u64).range(1..)),
            ),
    )
}

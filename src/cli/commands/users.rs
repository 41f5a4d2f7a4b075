use clap::{Arg, Command};

const ROLES: [&str; 2] = ["user", "admin"];

fn id_arg() -> Arg {
    Arg::new("id")
        .help("User id")
        .required(true)
        .value_parser(clap::value_parser!(i64))
}

#[must_use]
pub fn with_subcommands(command: Command) -> Command {
    command.subcommand(
        Command::new("users")
            .about("Manage users")
            .subcommand_required(true)
            .arg_required_else_help(true)
            .subcommand(
                Command::new("list")
                    .about("List one page of users")
                    .arg(
                        Arg::new("limit")
                            .long("limit")
                            .help("Maximum number of users to return")
                            .default_value("100")
                            .value_parser(clap::value_parser!(u32)),
                    )
                    .arg(
                        Arg::new("offset")
                            .long("offset")
                            .help("Number of users to skip")
                            .default_value("0")
                            .value_parser(clap::value_parser!(u32)),
                    ),
            )
            .subcommand(Command::new("get").about("Show one user").arg(id_arg()))
            .subcommand(
                Command::new("find").about("Look a user up by email").arg(
                    Arg::new("email")
                        .short('e')
                        .long("email")
                        .help("Email address to look up")
                        .required(true),
                ),
            )
            .subcommand(
                Command::new("create")
                    .about("Create a user")
                    .arg(
                        Arg::new("name")
                            .long("name")
                            .help("First name")
                            .required(true),
                    )
                    .arg(Arg::new("surname").long("surname").help("Last name"))
                    .arg(
                        Arg::new("email")
                            .short('e')
                            .long("email")
                            .help("Email address")
                            .required(true),
                    )
                    .arg(
                        Arg::new("role")
                            .long("role")
                            .help("Role of the new user")
                            .value_parser(ROLES)
                            .default_value("user"),
                    ),
            )
            .subcommand(
                Command::new("update")
                    .about("Change fields of a user; omitted fields are kept")
                    .arg(id_arg())
                    .arg(Arg::new("name").long("name").help("First name"))
                    .arg(Arg::new("surname").long("surname").help("Last name"))
                    .arg(
                        Arg::new("email")
                            .short('e')
                            .long("email")
                            .help("Email address"),
                    )
                    .arg(
                        Arg::new("role")
                            .long("role")
                            .help("Role")
                            .value_parser(ROLES),
                    ),
            )
            .subcommand(Command::new("delete").about("Delete a user").arg(id_arg()))
            .subcommand(Command::new("count").about("Print the number of users")),
    )
}

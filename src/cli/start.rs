use crate::cli::{
    actions::Action,
    commands::{self, logging::{ARG_LOG_FORMAT, ARG_VERBOSITY}},
    dispatch::handler,
    globals::GlobalArgs,
    telemetry,
};
use anyhow::Result;
use tracing::Level;

/// Map verbosity count to tracing level
const fn get_verbosity_level(verbosity: u8) -> Option<Level> {
    match verbosity {
        0 => None,
        1 => Some(Level::WARN),
        2 => Some(Level::INFO),
        3 => Some(Level::DEBUG),
        _ => Some(Level::TRACE),
    }
}

/// Start the CLI
///
/// # Errors
/// Returns an error if logging cannot be initialized or the arguments are invalid.
pub fn start() -> Result<(Action, GlobalArgs)> {
    let matches = commands::new().get_matches();

    let verbosity_level =
        get_verbosity_level(matches.get_one::<u8>(ARG_VERBOSITY).copied().unwrap_or(0));
    let json = matches
        .get_one::<String>(ARG_LOG_FORMAT)
        .is_some_and(|format| format == "json");

    telemetry::init(verbosity_level, json)?;

    handler(&matches)
}

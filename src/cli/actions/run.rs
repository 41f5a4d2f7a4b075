use crate::cli::{
    actions::{auth, health, users, Action},
    globals::GlobalArgs,
};
use anyhow::Result;

/// Execute the provided action.
// Single dispatch point for all CLI actions.
/// # Errors
/// Returns an error if the action fails.
pub async fn execute(action: Action, globals: &GlobalArgs) -> Result<()> {
    match action {
        Action::Auth(args) => auth::execute(args, globals).await,
        Action::Users(args) => users::execute(args, globals).await,
        Action::Health(args) => health::execute(args, globals).await,
    }
}

use crate::{
    api::{User, UserUpdate, DEFAULT_PAGE_LIMIT},
    cli::{actions::print_json, globals::GlobalArgs},
    users::UserDirectory,
};
use anyhow::{anyhow, Result};
use serde_json::json;
use tracing::{instrument, warn};

#[derive(Debug)]
pub enum Args {
    List { limit: u32, offset: u32 },
    Get { id: i64 },
    Find { email: String },
    Create(User),
    Update { id: i64, update: UserUpdate },
    Delete { id: i64 },
    Count,
}

/// Execute a user-management action with the stored session's token.
///
/// # Errors
/// Returns an error if the request fails or an update carries no fields.
#[instrument(skip_all)]
pub async fn execute(args: Args, globals: &GlobalArgs) -> Result<()> {
    let (limit, offset) = match &args {
        Args::List { limit, offset } => (*limit, *offset),
        _ => (DEFAULT_PAGE_LIMIT, 0),
    };

    let session = globals.session()?;
    if !session.is_authenticated() {
        warn!("No stored session, sending request without a token");
    }
    let api = session.api().clone();
    let mut directory = UserDirectory::with_page(api.clone(), limit, offset);

    match args {
        Args::List { .. } => {
            let users = directory.refetch().await?;
            print_json(&users)
        }
        Args::Get { id } => print_json(&api.get_user(id).await?),
        Args::Find { email } => print_json(&api.get_user_by_email(&email).await?),
        Args::Create(user) => print_json(&directory.create(&user).await?),
        Args::Update { id, update } => {
            if update.is_empty() {
                return Err(anyhow!("nothing to update, pass at least one field"));
            }
            print_json(&directory.update(id, &update).await?)
        }
        Args::Delete { id } => {
            directory.delete(id).await?;
            print_json(&json!({"deleted": id}))
        }
        Args::Count => print_json(&json!({"count": api.count_users().await?})),
    }
}

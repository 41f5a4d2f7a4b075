use crate::{
    api::{RegisterRequest, ResetPasswordRequest},
    cli::{actions::print_json, globals::GlobalArgs},
};
use anyhow::{anyhow, Result};
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use tracing::{info, instrument};

#[derive(Debug)]
pub enum Args {
    Login {
        email: String,
        password: SecretString,
    },
    Register(RegisterRequest),
    Logout,
    Whoami,
    Refresh {
        refresh_token: SecretString,
    },
    ForgotPassword {
        email: String,
    },
    ResetPassword(ResetPasswordRequest),
}

/// Execute an account action against the stored session.
///
/// # Errors
/// Returns an error if the request fails or no session is stored for `whoami`.
#[instrument(skip_all)]
pub async fn execute(args: Args, globals: &GlobalArgs) -> Result<()> {
    let mut session = globals.session()?;

    match args {
        Args::Login { email, password } => {
            let user = session.login(&email, password.expose_secret()).await?;
            print_json(&user)
        }
        Args::Register(request) => {
            let user = session.register(&request).await?;
            print_json(&user)
        }
        Args::Logout => {
            session.logout().await;
            info!("session cleared");
            print_json(&json!({"loggedOut": true}))
        }
        Args::Whoami => match session.user() {
            Some(user) if session.is_authenticated() => print_json(user),
            _ => Err(anyhow!("not logged in")),
        },
        Args::Refresh { refresh_token } => {
            if !session.is_authenticated() {
                return Err(anyhow!("not logged in"));
            }
            session.refresh(refresh_token.expose_secret()).await?;
            print_json(&json!({"refreshed": true}))
        }
        Args::ForgotPassword { email } => {
            let envelope = session.api().forgot_password(&email).await?;
            print_json(&envelope)
        }
        Args::ResetPassword(request) => {
            let envelope = session.api().reset_password(&request).await?;
            print_json(&envelope)
        }
    }
}

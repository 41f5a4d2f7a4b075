//! Keyed session persistence: the bearer token under `authToken` and the
//! cached user as JSON under `user`.

use super::storage::{Storage, StoreError};
use crate::api::User;
use secrecy::SecretString;
use std::sync::Arc;
use tracing::{error, warn};

pub const TOKEN_KEY: &str = "authToken";
pub const USER_KEY: &str = "user";

/// Persists the bearer token and the last known user under fixed keys.
#[derive(Clone)]
pub struct SessionStore {
    storage: Arc<dyn Storage>,
}

impl SessionStore {
    #[must_use]
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// # Errors
    /// Returns an error if either key cannot be written.
    pub fn save(&self, token: &str, user: &User) -> Result<(), StoreError> {
        let user = serde_json::to_string(user)?;
        self.storage.set(TOKEN_KEY, token)?;
        self.storage.set(USER_KEY, &user)
    }

    #[must_use]
    pub fn load_token(&self) -> Option<SecretString> {
        self.storage
            .get(TOKEN_KEY)
            .filter(|token| !token.trim().is_empty())
            .map(SecretString::from)
    }

    /// Returns the stored user. A stored value that does not decode clears the
    /// whole session and reads as absent.
    #[must_use]
    pub fn load_user(&self) -> Option<User> {
        let raw = self.storage.get(USER_KEY)?;

        match serde_json::from_str::<User>(&raw) {
            Ok(user) => Some(user),
            Err(err) => {
                warn!("Discarding stored user: {}", err);
                if let Err(err) = self.clear() {
                    error!("Failed to clear session store: {}", err);
                }
                None
            }
        }
    }

    /// Removes both keys, attempting each even if the first fails.
    ///
    /// # Errors
    /// Returns the first removal error.
    pub fn clear(&self) -> Result<(), StoreError> {
        let token = self.storage.remove(TOKEN_KEY);
        let user = self.storage.remove(USER_KEY);
        token.and(user)
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.debug_struct("SessionStore").finish_non_exhaustive()
    }
}

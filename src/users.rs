//! Cached user list for management views. Mutations go to the server first and
//! are applied to the cache only once the server accepted them, so the cache
//! never shows a record the server rejected or already deleted.

use crate::api::{ApiError, DashboardApi, User, UserUpdate, DEFAULT_PAGE_LIMIT};
use tracing::{debug, instrument};

#[derive(Debug)]
pub struct UserDirectory {
    api: DashboardApi,
    users: Vec<User>,
    loading: bool,
    error: Option<String>,
    limit: u32,
    offset: u32,
}

impl UserDirectory {
    #[must_use]
    pub fn new(api: DashboardApi) -> Self {
        Self::with_page(api, DEFAULT_PAGE_LIMIT, 0)
    }

    #[must_use]
    pub fn with_page(api: DashboardApi, limit: u32, offset: u32) -> Self {
        Self {
            api,
            users: Vec::new(),
            loading: false,
            error: None,
            limit,
            offset,
        }
    }

    #[must_use]
    pub fn users(&self) -> &[User] {
        &self.users
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Reloads the current page from the server.
    ///
    /// # Errors
    /// Returns the facade error; the previous cache is kept.
    #[instrument(skip(self))]
    pub async fn refetch(&mut self) -> Result<&[User], ApiError> {
        self.loading = true;
        self.error = None;

        let result = self.api.list_users(self.limit, self.offset).await;
        self.loading = false;

        let users = self.record(result)?;
        debug!("loaded {} users", users.len());
        self.users = users;
        Ok(&self.users)
    }

    /// # Errors
    /// Returns the facade error; the cache is untouched.
    #[instrument(skip(self, user), fields(email = %user.email))]
    pub async fn create(&mut self, user: &User) -> Result<User, ApiError> {
        let result = self.api.create_user(user).await;
        let created = self.record(result)?;
        self.users.push(created.clone());
        Ok(created)
    }

    /// # Errors
    /// Returns the facade error; the cache is untouched.
    #[instrument(skip(self, update))]
    pub async fn update(&mut self, id: i64, update: &UserUpdate) -> Result<User, ApiError> {
        let result = self.api.update_user(id, update).await;
        let updated = self.record(result)?;
        if let Some(cached) = self.users.iter_mut().find(|user| user.id == Some(id)) {
            *cached = updated.clone();
        }
        Ok(updated)
    }

    /// # Errors
    /// Returns the facade error; the cache is untouched.
    #[instrument(skip(self))]
    pub async fn delete(&mut self, id: i64) -> Result<(), ApiError> {
        let result = self.api.delete_user(id).await;
        self.record(result)?;
        self.users.retain(|user| user.id != Some(id));
        Ok(())
    }

    fn record<T>(&mut self, result: Result<T, ApiError>) -> Result<T, ApiError> {
        result.map_err(|err| {
            self.error = Some(err.message());
            err
        })
    }
}

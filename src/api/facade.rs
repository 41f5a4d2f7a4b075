//! Typed wrappers for every dashboard API endpoint. These functions keep
//! endpoint paths centralized, unwrap the response envelope and otherwise pass
//! errors through untouched. Nothing here writes session state; persisting the
//! token after `login` is the session controller's job.

use super::{
    client::HttpClient,
    envelope::Envelope,
    errors::{ApiError, ErrorBody},
    types::{
        HealthStatus, LoginRequest, LoginResponse, RefreshRequest, RegisterRequest,
        ResetPasswordRequest, TokenResponse, User, UserUpdate,
    },
};
use serde_json::Value;
use std::sync::Arc;
use tracing::instrument;
use url::form_urlencoded;

pub const DEFAULT_PAGE_LIMIT: u32 = 100;

/// Dashboard API facade over a shared [`HttpClient`].
#[derive(Clone, Debug)]
pub struct DashboardApi {
    client: Arc<HttpClient>,
}

impl DashboardApi {
    #[must_use]
    pub fn new(client: Arc<HttpClient>) -> Self {
        Self { client }
    }

    /// The shared transport, whose token the session controller manages.
    #[must_use]
    pub fn client(&self) -> &Arc<HttpClient> {
        &self.client
    }

    /// Exchanges credentials for a token and the user profile.
    ///
    /// # Errors
    /// Returns the transport or application error, or `MissingData` if the
    /// server answered without a payload.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let envelope: Envelope<LoginResponse> = self.client.post("/auth/login", &request).await?;
        envelope.into_data()
    }

    /// Creates an account. Does not log in.
    ///
    /// # Errors
    /// Returns the transport or application error, or `MissingData`.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn register(&self, request: &RegisterRequest) -> Result<User, ApiError> {
        let envelope: Envelope<User> = self.client.post("/auth/register", request).await?;
        envelope.into_data()
    }

    /// Invalidates the session on the server.
    ///
    /// # Errors
    /// Returns the transport or application error; callers treat this as best-effort.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<(), ApiError> {
        let _: Value = self.client.post_empty("/auth/logout").await?;
        Ok(())
    }

    /// # Errors
    /// Returns the transport or application error, or `MissingData`.
    #[instrument(skip_all)]
    pub async fn refresh_token(&self, refresh_token: &str) -> Result<TokenResponse, ApiError> {
        let request = RefreshRequest {
            refresh_token: refresh_token.to_string(),
        };
        let envelope: Envelope<TokenResponse> = self.client.post("/auth/refresh", &request).await?;
        envelope.into_data()
    }

    /// Asks the server to send a password reset email.
    ///
    /// # Errors
    /// Returns the transport or application error.
    #[instrument(skip(self))]
    pub async fn forgot_password(&self, email: &str) -> Result<Envelope<Value>, ApiError> {
        let path = format!("/auth/forgot?email={}", encode(email));
        self.client.post_empty(&path).await
    }

    /// # Errors
    /// Returns the transport or application error.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn reset_password(
        &self,
        request: &ResetPasswordRequest,
    ) -> Result<Envelope<Value>, ApiError> {
        self.client.post("/auth/reset", request).await
    }

    /// # Errors
    /// Returns the transport or application error, or `MissingData`.
    #[instrument(skip(self))]
    pub async fn list_users(&self, limit: u32, offset: u32) -> Result<Vec<User>, ApiError> {
        let path = format!("/users?limit={limit}&offset={offset}");
        let envelope: Envelope<Vec<User>> = self.client.get(&path).await?;
        envelope.into_data()
    }

    /// # Errors
    /// Returns the transport or application error, or `MissingData`.
    #[instrument(skip(self))]
    pub async fn get_user(&self, id: i64) -> Result<User, ApiError> {
        let envelope: Envelope<User> = self.client.get(&format!("/users/{id}")).await?;
        envelope.into_data()
    }

    /// # Errors
    /// Returns the transport or application error, or `MissingData`.
    #[instrument(skip(self))]
    pub async fn get_user_by_email(&self, email: &str) -> Result<User, ApiError> {
        let path = format!("/users/email?email={}", encode(email));
        let envelope: Envelope<User> = self.client.get(&path).await?;
        envelope.into_data()
    }

    /// # Errors
    /// Returns the transport or application error, or `MissingData`.
    #[instrument(skip(self, user), fields(email = %user.email))]
    pub async fn create_user(&self, user: &User) -> Result<User, ApiError> {
        let envelope: Envelope<User> = self.client.post("/users", user).await?;
        envelope.into_data()
    }

    /// # Errors
    /// Returns the transport or application error, or `MissingData`.
    #[instrument(skip(self, update))]
    pub async fn update_user(&self, id: i64, update: &UserUpdate) -> Result<User, ApiError> {
        let envelope: Envelope<User> = self.client.put(&format!("/users/{id}"), update).await?;
        envelope.into_data()
    }

    /// # Errors
    /// Returns the transport or application error.
    #[instrument(skip(self))]
    pub async fn delete_user(&self, id: i64) -> Result<(), ApiError> {
        let _: Value = self.client.delete(&format!("/users/{id}")).await?;
        Ok(())
    }

    /// # Errors
    /// Returns the transport or application error, or `MissingData`.
    #[instrument(skip(self))]
    pub async fn count_users(&self) -> Result<u64, ApiError> {
        let envelope: Envelope<u64> = self.client.get("/users/count").await?;
        envelope.into_data()
    }

    /// Reads the API health. Accepts the status either inside the envelope's
    /// `data` or at the top level of the body.
    ///
    /// # Errors
    /// Returns the transport or application error, or `Malformed` when neither
    /// location holds a status.
    #[instrument(skip(self))]
    pub async fn health_check(&self) -> Result<HealthStatus, ApiError> {
        let (status, value) = self.client.get_value("/health").await?;
        let candidate = match value.get("data") {
            Some(data) if data.get("status").is_some() => data.clone(),
            _ => value.clone(),
        };

        serde_json::from_value(candidate).map_err(|err| ApiError::Malformed {
            status,
            body: ErrorBody::unexpected_shape(value, &err),
        })
    }
}

fn encode(value: &str) -> String {
    form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

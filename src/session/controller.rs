//! Session state for consumers of the dashboard API. The controller restores a
//! persisted session on construction, drives login/register/logout through the
//! facade and is the only code that writes the [`SessionStore`]. The current
//! state is kept on a watch channel; every transition, including the short
//! lived `Error` before `Anonymous`, is also sent on a broadcast channel.

use super::store::SessionStore;
use crate::api::{ApiError, DashboardApi, LoginResponse, RegisterRequest, User};
use secrecy::SecretString;
use tokio::sync::{broadcast, watch};
use tracing::{error, info, instrument, warn};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Loading,
    Authenticated(User),
    Anonymous,
    /// Sent right before falling back to `Anonymous` after a failure.
    Error(String),
}

const EVENT_CAPACITY: usize = 16;

pub struct SessionController {
    api: DashboardApi,
    store: SessionStore,
    user: Option<User>,
    error: Option<String>,
    state: watch::Sender<SessionState>,
    events: broadcast::Sender<SessionState>,
}

impl SessionController {
    /// Builds the controller and restores any persisted session.
    #[must_use]
    pub fn new(api: DashboardApi, store: SessionStore) -> Self {
        let mut controller = Self::pending(api, store);
        controller.restore();
        controller
    }

    /// Builds the controller without reading the store. The session stays
    /// `Uninitialized`, and `is_loading()` true, until [`Self::restore`] runs.
    #[must_use]
    pub fn pending(api: DashboardApi, store: SessionStore) -> Self {
        let (state, _) = watch::channel(SessionState::Uninitialized);
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            api,
            store,
            user: None,
            error: None,
            state,
            events,
        }
    }

    /// Re-reads the store. Both a token and a user are required; anything less
    /// clears the store and leaves the session anonymous.
    pub fn restore(&mut self) {
        let token = self.store.load_token();
        let user = self.store.load_user();

        match (token, user) {
            (Some(token), Some(user)) => {
                self.api.client().set_token(token);
                self.user = Some(user.clone());
                info!("restored session for {}", user.email);
                self.transition(SessionState::Authenticated(user));
            }
            (token, user) => {
                if token.is_some() || user.is_some() {
                    warn!("incomplete stored session, clearing it");
                }
                self.reset_session();
                self.transition(SessionState::Anonymous);
            }
        }
    }

    /// Logs in and persists the session.
    ///
    /// # Errors
    /// Returns the facade error after recording its message and falling back to
    /// `Anonymous`.
    #[instrument(skip(self, password))]
    pub async fn login(&mut self, email: &str, password: &str) -> Result<User, ApiError> {
        self.error = None;
        self.transition(SessionState::Loading);

        match self.api.login(email, password).await {
            Ok(LoginResponse { token, user }) => {
                self.api.client().set_token(SecretString::from(token.clone()));
                if let Err(err) = self.store.save(&token, &user) {
                    error!("Failed to persist session: {}", err);
                }
                self.user = Some(user.clone());
                info!("logged in as {}", user.email);
                self.transition(SessionState::Authenticated(user.clone()));
                Ok(user)
            }
            Err(err) => {
                self.fail(&err);
                Err(err)
            }
        }
    }

    /// Registers and then logs in with the same credentials.
    ///
    /// # Errors
    /// Returns the registration error, or the login error if the automatic
    /// login fails. The session stays anonymous in both cases.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn register(&mut self, request: &RegisterRequest) -> Result<User, ApiError> {
        self.error = None;
        self.transition(SessionState::Loading);

        if let Err(err) = self.api.register(request).await {
            self.fail(&err);
            return Err(err);
        }

        self.login(&request.email, &request.password).await
    }

    /// Ends the session locally whatever the server answers.
    #[instrument(skip(self))]
    pub async fn logout(&mut self) {
        self.transition(SessionState::Loading);

        if let Err(err) = self.api.logout().await {
            warn!("Logout request failed: {}", err);
        }

        self.reset_session();
        self.error = None;
        info!("logged out");
        self.transition(SessionState::Anonymous);
    }

    /// Swaps the bearer token for a fresh one and re-persists the session.
    ///
    /// # Errors
    /// Returns the facade error; the current session is left untouched.
    #[instrument(skip_all)]
    pub async fn refresh(&mut self, refresh_token: &str) -> Result<(), ApiError> {
        self.error = None;

        match self.api.refresh_token(refresh_token).await {
            Ok(response) => {
                self.api
                    .client()
                    .set_token(SecretString::from(response.token.clone()));
                if let Some(user) = &self.user {
                    if let Err(err) = self.store.save(&response.token, user) {
                        error!("Failed to persist refreshed session: {}", err);
                    }
                }
                info!("session token refreshed");
                Ok(())
            }
            Err(err) => {
                self.error = Some(err.message());
                Err(err)
            }
        }
    }

    /// True only while both a user and a token are held.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some() && self.api.client().has_token()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(
            *self.state.borrow(),
            SessionState::Uninitialized | SessionState::Loading
        )
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    #[must_use]
    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    #[must_use]
    pub fn api(&self) -> &DashboardApi {
        &self.api
    }

    /// Receiver of every subsequent transition, in order.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SessionState> {
        self.events.subscribe()
    }

    /// Receiver of the latest state only; intermediate states may be skipped.
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    fn fail(&mut self, err: &ApiError) {
        let message = err.message();
        warn!("session operation failed: {}", err);
        self.error = Some(message.clone());
        self.reset_session();
        self.transition(SessionState::Error(message));
        self.transition(SessionState::Anonymous);
    }

    fn reset_session(&mut self) {
        self.user = None;
        self.api.client().clear_token();
        if let Err(err) = self.store.clear() {
            error!("Failed to clear session store: {}", err);
        }
    }

    fn transition(&self, next: SessionState) {
        // no subscribers is fine
        let _ = self.events.send(next.clone());
        self.state.send_replace(next);
    }
}

impl std::fmt::Debug for SessionController {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("SessionController")
            .field("state", &*self.state.borrow())
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{HttpClient, Role};
    use crate::session::{
        storage::{MemoryStorage, Storage},
        store::{TOKEN_KEY, USER_KEY},
    };
    use anyhow::Result;
    use std::sync::Arc;

    fn user() -> User {
        User {
            id: Some(1),
            name: "A".to_string(),
            surname: None,
            email: "a@b.com".to_string(),
            role: Role::User,
        }
    }

    fn controller_with(storage: Arc<MemoryStorage>) -> Result<SessionController> {
        // never contacted by these tests
        let client = HttpClient::new("http://127.0.0.1:9/api", None)?;
        let api = DashboardApi::new(Arc::new(client));
        Ok(SessionController::new(api, SessionStore::new(storage)))
    }

    #[test]
    fn restores_complete_session() -> Result<()> {
        let storage = Arc::new(MemoryStorage::new());
        SessionStore::new(storage.clone()).save("T1", &user())?;

        let controller = controller_with(storage)?;
        assert_eq!(controller.state(), SessionState::Authenticated(user()));
        assert!(controller.is_authenticated());
        assert!(!controller.is_loading());
        assert!(controller.api().client().has_token());
        Ok(())
    }

    #[test]
    fn user_without_token_is_anonymous_and_cleared() -> Result<()> {
        let storage = Arc::new(MemoryStorage::new());
        storage.set(USER_KEY, &serde_json::to_string(&user())?)?;

        let controller = controller_with(storage.clone())?;
        assert_eq!(controller.state(), SessionState::Anonymous);
        assert!(!controller.is_authenticated());
        assert_eq!(storage.get(USER_KEY), None);
        Ok(())
    }

    #[test]
    fn token_without_user_is_anonymous() -> Result<()> {
        let storage = Arc::new(MemoryStorage::new());
        storage.set(TOKEN_KEY, "T1")?;

        let controller = controller_with(storage.clone())?;
        assert_eq!(controller.state(), SessionState::Anonymous);
        assert!(!controller.api().client().has_token());
        assert_eq!(storage.get(TOKEN_KEY), None);
        Ok(())
    }

    #[test]
    fn is_authenticated_tracks_token_state() -> Result<()> {
        let storage = Arc::new(MemoryStorage::new());
        SessionStore::new(storage.clone()).save("T1", &user())?;

        let controller = controller_with(storage)?;
        assert!(controller.is_authenticated());
        controller.api().client().clear_token();
        assert!(!controller.is_authenticated());
        Ok(())
    }

    #[tokio::test]
    async fn logout_survives_unreachable_server() -> Result<()> {
        let storage = Arc::new(MemoryStorage::new());
        SessionStore::new(storage.clone()).save("T1", &user())?;

        let mut controller = controller_with(storage.clone())?;
        controller.logout().await;

        assert_eq!(controller.state(), SessionState::Anonymous);
        assert!(!controller.is_authenticated());
        assert!(controller.user().is_none());
        assert_eq!(storage.get(TOKEN_KEY), None);
        Ok(())
    }

    #[test]
    fn pending_controller_is_loading_until_restored() -> Result<()> {
        let storage = Arc::new(MemoryStorage::new());
        SessionStore::new(storage.clone()).save("T1", &user())?;
        let client = HttpClient::new("http://127.0.0.1:9/api", None)?;
        let api = DashboardApi::new(Arc::new(client));

        let mut controller = SessionController::pending(api, SessionStore::new(storage));
        assert!(controller.is_loading());
        assert_eq!(controller.state(), SessionState::Uninitialized);
        assert!(!controller.is_authenticated());

        controller.restore();
        assert!(!controller.is_loading());
        assert!(controller.is_authenticated());
        Ok(())
    }

    #[tokio::test]
    async fn failed_login_sends_error_then_anonymous() -> Result<()> {
        let mut controller = controller_with(Arc::new(MemoryStorage::new()))?;
        let mut events = controller.subscribe();

        assert!(controller.login("a@b.com", "pw").await.is_err());

        let mut seen = Vec::new();
        while let Ok(state) = events.try_recv() {
            seen.push(state);
        }
        assert_eq!(seen.len(), 3);
        assert_eq!(seen.first(), Some(&SessionState::Loading));
        assert!(matches!(seen.get(1), Some(SessionState::Error(_))));
        assert_eq!(seen.get(2), Some(&SessionState::Anonymous));
        assert_eq!(controller.state(), SessionState::Anonymous);
        assert!(controller.last_error().is_some());
        Ok(())
    }

    #[test]
    fn clear_error_drops_message() -> Result<()> {
        let mut controller = controller_with(Arc::new(MemoryStorage::new()))?;
        controller.error = Some("boom".to_string());
        assert_eq!(controller.last_error(), Some("boom"));
        controller.clear_error();
        assert_eq!(controller.last_error(), None);
        Ok(())
    }
}

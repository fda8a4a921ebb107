use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::refresh::TokenRefresher;
use super::store::CredentialStore;
use super::types::{
    activation_path, current_user_path, GoogleLoginRequest, LoginRequest, LoginResponse, Session,
    SessionUpdate, UserProfile, GOOGLE_LOGIN_PATH, LOGIN_PATH,
};
use crate::error::{ApiError, RequestResult, StoreResult};
use crate::http_client::{ApiClient, ApiRequest};

/// Default interval of the background token refresh (10 minutes)
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(600);

/// Authentication state as seen by the rest of the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Unauthenticated,
    AuthenticatedUnverified,
    AuthenticatedVerified,
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        !matches!(self, SessionState::Unauthenticated)
    }
}

/// What observers receive on every session change
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub user: Option<UserProfile>,
    /// True until the startup profile check has completed
    pub loading: bool,
    /// Time of the last successful background refresh
    pub last_refresh: Option<DateTime<Utc>>,
}

/// How persisted credentials are trusted at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BootstrapMode {
    /// Trust the stored profile; the first 401 triggers a refresh
    #[default]
    Lazy,
    /// Re-fetch the profile from the backend before clearing `loading`
    Eager,
}

#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub refresh_interval: Duration,
    pub bootstrap_mode: BootstrapMode,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            bootstrap_mode: BootstrapMode::Lazy,
        }
    }
}

/// Outcome of one background refresh tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackgroundRefresh {
    /// Nothing to refresh
    Skipped,
    Refreshed,
    /// Refresh failed and the session was torn down
    LoggedOut,
}

/// Session lifecycle manager
///
/// Owns bootstrap from persisted state, login and logout, the periodic
/// background refresh and observer notification.
pub struct SessionManager {
    /// Session storage shared with the API client
    store: Arc<dyn CredentialStore>,

    /// API client for login and profile calls
    api: Arc<ApiClient>,

    /// Refresh coordinator shared with the API client
    refresher: Arc<TokenRefresher>,

    /// Observer channel
    state: watch::Sender<SessionSnapshot>,

    /// Set by a successful verification when no profile is stored
    verified: AtomicBool,

    settings: SessionSettings,

    /// Background refresh task
    background: Mutex<Option<JoinHandle<()>>>,
}

impl SessionManager {
    /// Create a manager over the persisted session
    ///
    /// Observers see `loading = true` until [`bootstrap`](Self::bootstrap)
    /// completes.
    pub fn new(api: Arc<ApiClient>, settings: SessionSettings) -> Self {
        let store = api.store().clone();
        let refresher = api.refresher().clone();
        let session = store.get();

        let (state, _) = watch::channel(SessionSnapshot {
            state: state_of(&session, false),
            user: session.user.clone(),
            loading: true,
            last_refresh: None,
        });

        Self {
            store,
            api,
            refresher,
            state,
            verified: AtomicBool::new(false),
            settings,
            background: Mutex::new(None),
        }
    }

    /// Run the startup profile check and clear the `loading` flag
    pub async fn bootstrap(&self) {
        let session = self.store.get();

        if session.is_authenticated() {
            match (self.settings.bootstrap_mode, session.user.as_ref()) {
                (BootstrapMode::Eager, Some(user)) => {
                    tracing::info!(user_id = user.id, "Validating persisted session...");
                    if let RequestResult::Error(e) = self.refresh_profile().await {
                        tracing::warn!("Profile check failed, keeping stored profile: {}", e);
                    }
                }
                _ => {
                    tracing::info!(
                        user_id = session.user.as_ref().map(|u| u.id),
                        "Restored persisted session"
                    );
                }
            }
        } else {
            tracing::debug!("No persisted session");
        }

        let session = self.store.get();
        let verified = self.verified.load(Ordering::Acquire);
        self.state.send_modify(|snapshot| {
            snapshot.state = state_of(&session, verified);
            snapshot.user = session.user.clone();
            snapshot.loading = false;
        });
    }

    /// Subscribe to session changes
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.borrow().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.store.get().is_authenticated()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    pub fn current_user(&self) -> Option<UserProfile> {
        self.store.get().user
    }

    pub fn api(&self) -> &Arc<ApiClient> {
        &self.api
    }

    /// Log in with email and password
    pub async fn login(&self, email: &str, password: &str) -> RequestResult<UserProfile> {
        let request = match ApiRequest::new(Method::POST, LOGIN_PATH)
            .json(&LoginRequest { email, password })
        {
            Ok(request) => request,
            Err(e) => return e.into(),
        };

        let result = self.api.execute_once::<LoginResponse>(&request).await;
        self.complete_login(result)
    }

    /// Log in with a Google identity credential
    pub async fn google_login(&self, credential: &str) -> RequestResult<UserProfile> {
        let request = match ApiRequest::new(Method::POST, GOOGLE_LOGIN_PATH)
            .json(&GoogleLoginRequest { token: credential })
        {
            Ok(request) => request,
            Err(e) => return e.into(),
        };

        let result = self.api.execute_once::<LoginResponse>(&request).await;
        self.complete_login(result)
    }

    fn complete_login(&self, result: RequestResult<LoginResponse>) -> RequestResult<UserProfile> {
        let login = match result {
            RequestResult::Data(Some(login)) => login,
            RequestResult::Data(None) => return ApiError::InvalidResponse.into(),
            RequestResult::Error(e) => {
                tracing::warn!("Login failed: {}", e);
                return e.into();
            }
            RequestResult::Cancelled => return RequestResult::Cancelled,
        };

        let user = login.user.clone();
        let update = SessionUpdate {
            access_token: Some(login.access),
            refresh_token: Some(login.refresh),
            user: Some(login.user),
        };
        if let Err(e) = self.store.set(update) {
            tracing::error!("Failed to persist session: {}", e);
            return ApiError::from(e).into();
        }

        self.verified.store(false, Ordering::Release);
        tracing::info!(user_id = user.id, role = ?user.role, "Logged in");
        self.publish();

        RequestResult::Data(Some(user))
    }

    /// Clear the session and notify observers
    ///
    /// Calling this without an active session is a no-op.
    pub fn logout(&self) -> StoreResult<()> {
        let session = self.store.get();
        if session.is_empty() && !self.state.borrow().state.is_authenticated() {
            tracing::debug!("Logout requested with no active session");
            return Ok(());
        }

        self.store.clear()?;
        self.verified.store(false, Ordering::Release);

        self.state.send_modify(|snapshot| {
            snapshot.state = SessionState::Unauthenticated;
            snapshot.user = None;
            snapshot.last_refresh = None;
        });

        tracing::info!("Logged out");
        Ok(())
    }

    /// Confirm the email address with an activation link's uid and token
    pub async fn verify_email(&self, uid: &str, token: &str) -> bool {
        // Public endpoint: a stale access token must not trigger a refresh
        let result: RequestResult<serde_json::Value> = self
            .api
            .execute_once(&ApiRequest::get(activation_path(uid, token)))
            .await;

        match result {
            RequestResult::Data(_) => {}
            RequestResult::Error(e) => {
                tracing::warn!("Email verification failed: {}", e);
                return false;
            }
            RequestResult::Cancelled => return false,
        }

        if let Some(mut user) = self.store.get().user {
            user.email_verified = true;
            if let Err(e) = self.store.set(SessionUpdate::user(user)) {
                tracing::error!("Failed to persist email verification: {}", e);
            }
        }
        self.verified.store(true, Ordering::Release);

        tracing::info!("Email verified");
        self.publish();
        true
    }

    /// Replace the stored profile wholesale (after a profile edit)
    pub fn set_user(&self, user: UserProfile) -> StoreResult<()> {
        self.store.set(SessionUpdate::user(user))?;
        self.publish();
        Ok(())
    }

    /// Fetch the current profile from the backend and store it
    pub async fn refresh_profile(&self) -> RequestResult<UserProfile> {
        let Some(user_id) = self.store.get().user.map(|u| u.id) else {
            return ApiError::SessionExpired.into();
        };

        match self.api.get::<UserProfile>(&current_user_path(user_id)).await {
            RequestResult::Data(Some(user)) => {
                if let Err(e) = self.set_user(user.clone()) {
                    tracing::error!("Failed to store refreshed profile: {}", e);
                    return ApiError::from(e).into();
                }
                RequestResult::Data(Some(user))
            }
            RequestResult::Data(None) => ApiError::InvalidResponse.into(),
            other => other,
        }
    }

    /// One tick of the periodic refresh
    ///
    /// A failed refresh here means the refresh token itself is no longer
    /// valid, so the session is torn down.
    pub async fn run_background_refresh(&self) -> BackgroundRefresh {
        let session = self.store.get();
        if !session.is_authenticated() {
            return BackgroundRefresh::Skipped;
        }
        let Some(refresh_token) = session.refresh_token else {
            tracing::debug!("No refresh token stored, skipping background refresh");
            return BackgroundRefresh::Skipped;
        };

        match self.refresher.refresh().await {
            Some(_) => {
                self.state
                    .send_modify(|snapshot| snapshot.last_refresh = Some(Utc::now()));
                BackgroundRefresh::Refreshed
            }
            None if self.store.get().refresh_token.as_deref() != Some(refresh_token.as_str()) => {
                // Login or logout replaced the session during the exchange
                tracing::debug!("Session replaced during background refresh, keeping it");
                BackgroundRefresh::Skipped
            }
            None => {
                tracing::warn!("Background token refresh failed, ending session");
                if let Err(e) = self.logout() {
                    tracing::error!("Failed to clear session after refresh failure: {}", e);
                }
                BackgroundRefresh::LoggedOut
            }
        }
    }

    /// Spawn the periodic refresh task
    ///
    /// The first tick fires immediately. The task stops when the manager is
    /// dropped or [`stop_background_refresh`](Self::stop_background_refresh)
    /// is called.
    pub fn start_background_refresh(self: &Arc<Self>) {
        let manager = Arc::downgrade(self);
        let period = self.settings.refresh_interval;

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                let Some(manager) = manager.upgrade() else {
                    break;
                };
                let outcome = manager.run_background_refresh().await;
                tracing::debug!(outcome = ?outcome, "Background refresh tick");
            }
        });

        tracing::info!(
            "Background token refresh every {}s",
            self.settings.refresh_interval.as_secs()
        );

        if let Some(previous) = self.lock_background().replace(handle) {
            previous.abort();
        }
    }

    pub fn stop_background_refresh(&self) {
        if let Some(handle) = self.lock_background().take() {
            handle.abort();
        }
    }

    fn lock_background(&self) -> std::sync::MutexGuard<'_, Option<JoinHandle<()>>> {
        self.background
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Push the stored session to observers
    fn publish(&self) {
        let session = self.store.get();
        let verified = self.verified.load(Ordering::Acquire);
        self.state.send_modify(|snapshot| {
            snapshot.state = state_of(&session, verified);
            snapshot.user = session.user.clone();
        });
    }
}

impl Drop for SessionManager {
    fn drop(&mut self) {
        self.stop_background_refresh();
    }
}

fn state_of(session: &Session, verified: bool) -> SessionState {
    if !session.is_authenticated() {
        SessionState::Unauthenticated
    } else if session.email_verified || verified {
        SessionState::AuthenticatedVerified
    } else {
        SessionState::AuthenticatedUnverified
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::store::MemoryCredentialStore;
    use crate::session::types::UserRole;

    fn user(verified: bool) -> UserProfile {
        UserProfile {
            id: 3,
            email: "jean@example.com".to_string(),
            name: "Jean".to_string(),
            company: None,
            role: UserRole::Translator,
            email_verified: verified,
        }
    }

    fn manager(session: Session) -> SessionManager {
        let store: Arc<dyn CredentialStore> =
            Arc::new(MemoryCredentialStore::with_session(session));
        let api = ApiClient::connect(
            "http://127.0.0.1:9",
            store,
            Duration::from_secs(1),
            Duration::from_secs(1),
        )
        .unwrap();
        SessionManager::new(Arc::new(api), SessionSettings::default())
    }

    fn authenticated(verified: bool) -> Session {
        Session {
            access_token: Some("a".to_string()),
            refresh_token: Some("r".to_string()),
            user: Some(user(verified)),
            email_verified: verified,
        }
    }

    #[test]
    fn test_state_of() {
        assert_eq!(
            state_of(&Session::default(), false),
            SessionState::Unauthenticated
        );
        assert_eq!(
            state_of(&authenticated(false), false),
            SessionState::AuthenticatedUnverified
        );
        assert_eq!(
            state_of(&authenticated(true), false),
            SessionState::AuthenticatedVerified
        );
        assert_eq!(
            state_of(&authenticated(false), true),
            SessionState::AuthenticatedVerified
        );
    }

    #[tokio::test]
    async fn test_bootstrap_clears_loading() {
        let manager = manager(authenticated(false));
        assert!(manager.is_loading());
        assert_eq!(manager.snapshot().state, SessionState::AuthenticatedUnverified);

        manager.bootstrap().await;

        let snapshot = manager.snapshot();
        assert!(!snapshot.loading);
        assert_eq!(snapshot.user, Some(user(false)));
    }

    #[tokio::test]
    async fn test_bootstrap_without_session() {
        let manager = manager(Session::default());
        manager.bootstrap().await;

        let snapshot = manager.snapshot();
        assert!(!snapshot.loading);
        assert_eq!(snapshot.state, SessionState::Unauthenticated);
        assert!(!manager.is_authenticated());
    }

    #[tokio::test]
    async fn test_logout_notifies_and_is_idempotent() {
        let manager = manager(authenticated(true));
        manager.bootstrap().await;
        let mut rx = manager.subscribe();

        manager.logout().unwrap();
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().state, SessionState::Unauthenticated);
        assert!(manager.current_user().is_none());

        manager.logout().unwrap();
        assert!(!rx.has_changed().unwrap());
    }

    #[tokio::test]
    async fn test_background_refresh_skipped_without_refresh_token() {
        let manager = manager(Session {
            access_token: Some("a".to_string()),
            ..Default::default()
        });
        assert_eq!(
            manager.run_background_refresh().await,
            BackgroundRefresh::Skipped
        );
        assert!(manager.is_authenticated());
    }

    #[tokio::test]
    async fn test_set_user_publishes_profile() {
        let manager = manager(authenticated(false));
        manager.set_user(user(true)).unwrap();

        let snapshot = manager.snapshot();
        assert_eq!(snapshot.state, SessionState::AuthenticatedVerified);
        assert_eq!(snapshot.user, Some(user(true)));
    }

    #[tokio::test]
    async fn test_refresh_profile_requires_user() {
        let manager = manager(Session::default());
        assert_eq!(
            manager.refresh_profile().await,
            RequestResult::Error(ApiError::SessionExpired)
        );
    }
}

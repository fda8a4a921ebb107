// Session module
// Credential storage, token refresh and session lifecycle

mod manager;
mod refresh;
mod store;
mod types;

pub use manager::{
    BackgroundRefresh, BootstrapMode, SessionManager, SessionSettings, SessionSnapshot,
    SessionState, DEFAULT_REFRESH_INTERVAL,
};
pub use refresh::TokenRefresher;
pub use store::{CredentialStore, MemoryCredentialStore, SqliteCredentialStore};
pub use types::{
    Session, SessionUpdate, UserProfile, UserRole, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY,
    USER_DATA_KEY,
};

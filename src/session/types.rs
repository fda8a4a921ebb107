// Session types

use serde::{Deserialize, Serialize};

/// Persisted key holding the access token
pub const ACCESS_TOKEN_KEY: &str = "authToken";

/// Persisted key holding the refresh token
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";

/// Persisted key holding the JSON-encoded user profile
pub const USER_DATA_KEY: &str = "userData";

pub const LOGIN_PATH: &str = "/api/auth/login/";
pub const GOOGLE_LOGIN_PATH: &str = "/api/auth/google/";
pub const REFRESH_PATH: &str = "/api/auth/token/refresh/";

pub fn activation_path(uid: &str, token: &str) -> String {
    format!("/api/auth/activate/{}/{}/", uid, token)
}

pub fn current_user_path(user_id: u64) -> String {
    format!("/api/users/me/{}/", user_id)
}

/// Role of an authenticated user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Translator,
    Client,
}

/// Profile of the signed-in user, cached alongside the tokens
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: u64,
    pub email: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    pub role: UserRole,
    #[serde(default)]
    pub email_verified: bool,
}

/// Current credential state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub user: Option<UserProfile>,
    pub email_verified: bool,
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.access_token.is_none() && self.refresh_token.is_none() && self.user.is_none()
    }
}

/// Partial session written through [`CredentialStore::set`](super::CredentialStore::set)
///
/// Only the `Some` fields are written; the rest keep their stored values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionUpdate {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub user: Option<UserProfile>,
}

impl SessionUpdate {
    pub fn access_token(token: impl Into<String>) -> Self {
        Self {
            access_token: Some(token.into()),
            ..Default::default()
        }
    }

    pub fn user(user: UserProfile) -> Self {
        Self {
            user: Some(user),
            ..Default::default()
        }
    }
}

/// Login request body
#[derive(Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Google credential login request body
#[derive(Serialize)]
pub struct GoogleLoginRequest<'a> {
    pub token: &'a str,
}

/// Login response (password and Google flows)
#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    #[serde(alias = "accessToken")]
    pub access: String,
    #[serde(alias = "refreshToken")]
    pub refresh: String,
    pub user: UserProfile,
}

/// Token refresh request body
#[derive(Serialize)]
pub struct RefreshRequest<'a> {
    pub refresh: &'a str,
}

/// Token refresh response
#[derive(Debug, Deserialize)]
pub struct RefreshResponse {
    #[serde(default, alias = "accessToken")]
    pub access: String,
    /// Present when the backend rotates refresh tokens
    #[serde(default, alias = "refreshToken")]
    pub refresh: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_profile_wire_format() {
        let user: UserProfile = serde_json::from_str(
            r#"{"id": 4, "email": "ana@example.com", "name": "Ana", "role": "translator"}"#,
        )
        .unwrap();
        assert_eq!(user.role, UserRole::Translator);
        assert!(!user.email_verified);
        assert!(user.company.is_none());

        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["role"], "translator");
        assert!(json.get("company").is_none());
    }

    #[test]
    fn test_login_response_accepts_camel_case_tokens() {
        let body = r#"{
            "accessToken": "a1",
            "refreshToken": "r1",
            "user": {"id": 1, "email": "c@example.com", "name": "C", "role": "client", "email_verified": true}
        }"#;
        let resp: LoginResponse = serde_json::from_str(body).unwrap();
        assert_eq!(resp.access, "a1");
        assert_eq!(resp.refresh, "r1");
        assert!(resp.user.email_verified);
    }

    #[test]
    fn test_refresh_response_without_rotation() {
        let resp: RefreshResponse = serde_json::from_str(r#"{"access": "new"}"#).unwrap();
        assert_eq!(resp.access, "new");
        assert!(resp.refresh.is_none());
    }

    #[test]
    fn test_paths() {
        assert_eq!(activation_path("MQ", "abc-123"), "/api/auth/activate/MQ/abc-123/");
        assert_eq!(current_user_path(9), "/api/users/me/9/");
    }

    #[test]
    fn test_session_flags() {
        let mut session = Session::default();
        assert!(session.is_empty());
        assert!(!session.is_authenticated());

        session.refresh_token = Some("r".to_string());
        assert!(!session.is_empty());
        assert!(!session.is_authenticated());
    }
}

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ==================================================================================================
// Users
// ==================================================================================================

/// User as listed by the admin endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    #[serde(default)]
    pub username: Option<String>,
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub company: Option<String>,
    pub role: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoleChange<'a> {
    pub role: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RoleChangeResponse {
    pub success: bool,
    pub message: String,
    #[serde(default)]
    pub user: Option<User>,
}

/// Editable profile fields
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
}

// ==================================================================================================
// Account flows
// ==================================================================================================

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Registration<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub company: Option<&'a str>,
    pub password: &'a str,
    pub password2: &'a str,
}

// ==================================================================================================
// Notifications and settings
// ==================================================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub message: String,
    /// `info`, `success`, `warning` or `error`
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub read: bool,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSettings {
    pub theme: String,
    pub notifications_enabled: bool,
    pub email_notifications: bool,
    pub language_preference: String,
    #[serde(default)]
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AppSettings {
    pub maintenance_mode: bool,
    pub version: String,
    #[serde(default)]
    pub features: HashMap<String, bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notification_type_field() {
        let n: Notification = serde_json::from_str(
            r#"{"id": "n1", "message": "Quote sent", "type": "info", "read": false, "created_at": "2024-01-01T00:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(n.kind.as_deref(), Some("info"));
    }

    #[test]
    fn test_registration_keeps_null_company() {
        let body = serde_json::to_value(Registration {
            name: "Paul",
            email: "paul@example.com",
            company: None,
            password: "s3cret!",
            password2: "s3cret!",
        })
        .unwrap();
        assert!(body["company"].is_null());
    }
}

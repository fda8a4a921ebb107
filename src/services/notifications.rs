use serde_json::json;
use std::sync::Arc;

use crate::error::RequestResult;
use crate::http_client::ApiClient;
use crate::models::account::{AppSettings, Notification, UserSettings};

#[derive(Clone)]
pub struct NotificationService {
    api: Arc<ApiClient>,
}

impl NotificationService {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    pub async fn list(&self) -> RequestResult<Vec<Notification>> {
        self.api.get("/api/notifications/").await
    }

    pub async fn get(&self, notification_id: &str) -> RequestResult<Notification> {
        self.api
            .get(&format!("/api/notifications/{}/", notification_id))
            .await
    }

    pub async fn mark_read(&self, notification_id: &str) -> RequestResult<Notification> {
        self.api
            .put(
                &format!("/api/notifications/{}/read/", notification_id),
                &json!({}),
            )
            .await
    }

    pub async fn mark_all_read(&self) -> RequestResult<serde_json::Value> {
        self.api
            .post("/api/notifications/mark-all-read/", &json!({}))
            .await
    }

    pub async fn delete(&self, notification_id: &str) -> RequestResult<()> {
        self.api
            .delete(&format!("/api/notifications/{}/", notification_id))
            .await
    }

    pub async fn clear_all(&self) -> RequestResult<()> {
        self.api.delete("/api/notifications/").await
    }
}

#[derive(Clone)]
pub struct SettingsService {
    api: Arc<ApiClient>,
}

impl SettingsService {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    pub async fn user_settings(&self) -> RequestResult<UserSettings> {
        self.api.get("/api/settings/user/").await
    }

    pub async fn update_user_settings(
        &self,
        settings: &serde_json::Value,
    ) -> RequestResult<UserSettings> {
        self.api.put("/api/settings/user/", settings).await
    }

    pub async fn reset_user_settings(&self) -> RequestResult<UserSettings> {
        self.api.post("/api/settings/user/reset/", &json!({})).await
    }

    pub async fn app_settings(&self) -> RequestResult<AppSettings> {
        self.api.get("/api/settings/app/").await
    }
}

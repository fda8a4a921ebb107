use reqwest::Method;
use serde_json::json;
use std::sync::Arc;

use crate::error::RequestResult;
use crate::http_client::{ApiClient, ApiRequest};
use crate::models::account::{MessageResponse, Registration};

/// Account flows that do not require a session
///
/// Login, logout and email verification live on the session manager since
/// they change the session.
#[derive(Clone)]
pub struct AccountService {
    api: Arc<ApiClient>,
}

impl AccountService {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    pub async fn register(&self, registration: &Registration<'_>) -> RequestResult<MessageResponse> {
        self.send("/api/auth/register/", registration).await
    }

    pub async fn request_password_reset(&self, email: &str) -> RequestResult<MessageResponse> {
        self.send("/api/auth/password/reset/", &json!({ "email": email }))
            .await
    }

    pub async fn reset_password(
        &self,
        uid: &str,
        token: &str,
        password: &str,
    ) -> RequestResult<MessageResponse> {
        self.send(
            &format!("/api/auth/password/reset/{}/{}/", uid, token),
            &json!({ "password": password }),
        )
        .await
    }

    pub async fn resend_verification_email(&self, email: &str) -> RequestResult<MessageResponse> {
        self.send("/api/auth/resend-activation/", &json!({ "email": email }))
            .await
    }

    // Public endpoints: a 401 here is a real rejection, not an expired token.
    async fn send<B: serde::Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> RequestResult<MessageResponse> {
        match ApiRequest::new(Method::POST, endpoint).json(body) {
            Ok(request) => self.api.execute_once(&request).await,
            Err(e) => e.into(),
        }
    }
}

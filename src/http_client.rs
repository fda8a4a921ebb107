use anyhow::{Context, Result};
use bytes::Bytes;
use futures::future::{AbortRegistration, Abortable};
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{ApiError, RequestResult};
use crate::session::{CredentialStore, TokenRefresher};

/// Body of an outbound request
#[derive(Debug, Clone)]
pub enum RequestBody {
    /// Sent as `application/json`
    Json(serde_json::Value),

    /// Sent as `multipart/form-data`; the boundary is chosen by the transport
    Multipart(Vec<FormPart>),

    /// Opaque payload sent without a forced content type
    Binary(Bytes),
}

/// One field of a multipart body
#[derive(Debug, Clone)]
pub struct FormPart {
    pub name: String,
    pub value: PartValue,
}

#[derive(Debug, Clone)]
pub enum PartValue {
    Text(String),
    File {
        file_name: String,
        mime: Option<String>,
        bytes: Bytes,
    },
}

impl FormPart {
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: PartValue::Text(value.into()),
        }
    }

    pub fn file(
        name: impl Into<String>,
        file_name: impl Into<String>,
        mime: Option<String>,
        bytes: impl Into<Bytes>,
    ) -> Self {
        Self {
            name: name.into(),
            value: PartValue::File {
                file_name: file_name.into(),
                mime,
                bytes: bytes.into(),
            },
        }
    }
}

/// A logical call against the backend
///
/// Kept independent of the transport so it can be rebuilt for the retry
/// that follows a token refresh.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub endpoint: String,
    pub body: Option<RequestBody>,
}

impl ApiRequest {
    pub fn new(method: Method, endpoint: impl Into<String>) -> Self {
        Self {
            method,
            endpoint: endpoint.into(),
            body: None,
        }
    }

    pub fn get(endpoint: impl Into<String>) -> Self {
        Self::new(Method::GET, endpoint)
    }

    pub fn delete(endpoint: impl Into<String>) -> Self {
        Self::new(Method::DELETE, endpoint)
    }

    /// Attach a JSON body
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, ApiError> {
        let value =
            serde_json::to_value(body).map_err(|e| ApiError::InvalidBody(e.to_string()))?;
        self.body = Some(RequestBody::Json(value));
        Ok(self)
    }

    pub fn multipart(mut self, parts: Vec<FormPart>) -> Self {
        self.body = Some(RequestBody::Multipart(parts));
        self
    }

    pub fn binary(mut self, bytes: impl Into<Bytes>) -> Self {
        self.body = Some(RequestBody::Binary(bytes.into()));
        self
    }
}

/// Which phase of the refresh-and-retry protocol an attempt belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Attempt {
    Initial,
    AfterRefresh,
}

/// Result of a single transport round trip
enum AttemptOutcome {
    Completed(Response),
    Unauthorized {
        response: Response,
        sent_token: Option<String>,
    },
    Failed(ApiError),
}

/// Build the shared transport
///
/// Cookies received from the backend are kept and sent back on later calls.
pub fn build_transport(connect_timeout: Duration, request_timeout: Duration) -> Result<Client> {
    Client::builder()
        .cookie_store(true)
        .connect_timeout(connect_timeout)
        .timeout(request_timeout)
        .build()
        .context("Failed to create HTTP client")
}

/// Session-aware HTTP client for the backend API
///
/// Every call reads the access token from the credential store, and a 401
/// on the first attempt triggers at most one refresh followed by at most one
/// retry.
pub struct ApiClient {
    /// Shared HTTP client with connection pooling
    client: Client,

    /// Base URL without trailing slash
    base_url: String,

    /// Session storage, read on every attempt
    store: Arc<dyn CredentialStore>,

    /// Refresh coordinator
    refresher: Arc<TokenRefresher>,
}

impl ApiClient {
    pub fn new(
        client: Client,
        base_url: &str,
        store: Arc<dyn CredentialStore>,
        refresher: Arc<TokenRefresher>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            store,
            refresher,
        }
    }

    /// Build the transport and refresh coordinator for `base_url`
    pub fn connect(
        base_url: &str,
        store: Arc<dyn CredentialStore>,
        connect_timeout: Duration,
        request_timeout: Duration,
    ) -> Result<Self> {
        let client = build_transport(connect_timeout, request_timeout)?;
        let refresher = Arc::new(TokenRefresher::new(client.clone(), base_url, store.clone()));
        Ok(Self::new(client, base_url, store, refresher))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn store(&self) -> &Arc<dyn CredentialStore> {
        &self.store
    }

    pub fn refresher(&self) -> &Arc<TokenRefresher> {
        &self.refresher
    }

    /// Execute a request, refreshing the token and retrying once on 401
    pub async fn execute<T: DeserializeOwned>(&self, request: &ApiRequest) -> RequestResult<T> {
        let response = match self.attempt(request, Attempt::Initial).await {
            AttemptOutcome::Completed(response) => response,
            AttemptOutcome::Failed(e) => return e.into(),
            AttemptOutcome::Unauthorized { sent_token, .. } => {
                tracing::warn!(
                    endpoint = %request.endpoint,
                    "Received 401, refreshing token and retrying..."
                );

                if self
                    .refresher
                    .refresh_after(sent_token.as_deref())
                    .await
                    .is_none()
                {
                    tracing::warn!(endpoint = %request.endpoint, "Token refresh failed, session expired");
                    return ApiError::SessionExpired.into();
                }

                match self.attempt(request, Attempt::AfterRefresh).await {
                    AttemptOutcome::Completed(response) => response,
                    AttemptOutcome::Failed(e) => return e.into(),
                    AttemptOutcome::Unauthorized { .. } => {
                        tracing::warn!(
                            endpoint = %request.endpoint,
                            "Request rejected again after token refresh"
                        );
                        return ApiError::SessionExpired.into();
                    }
                }
            }
        };

        read_response(response).await
    }

    /// Execute a request without the refresh path (login, public endpoints)
    ///
    /// A 401 is reported like any other error status.
    pub async fn execute_once<T: DeserializeOwned>(
        &self,
        request: &ApiRequest,
    ) -> RequestResult<T> {
        match self.attempt(request, Attempt::Initial).await {
            AttemptOutcome::Completed(response)
            | AttemptOutcome::Unauthorized { response, .. } => read_response(response).await,
            AttemptOutcome::Failed(e) => e.into(),
        }
    }

    /// Execute a request that resolves to `Cancelled` once `abort` fires
    pub async fn execute_cancellable<T: DeserializeOwned>(
        &self,
        request: &ApiRequest,
        abort: AbortRegistration,
    ) -> RequestResult<T> {
        match Abortable::new(self.execute(request), abort).await {
            Ok(result) => result,
            Err(_) => {
                tracing::debug!(endpoint = %request.endpoint, "Request cancelled by caller");
                RequestResult::Cancelled
            }
        }
    }

    pub async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> RequestResult<T> {
        self.execute(&ApiRequest::get(endpoint)).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> RequestResult<T> {
        self.send_json(Method::POST, endpoint, body).await
    }

    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> RequestResult<T> {
        self.send_json(Method::PUT, endpoint, body).await
    }

    pub async fn patch<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> RequestResult<T> {
        self.send_json(Method::PATCH, endpoint, body).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, endpoint: &str) -> RequestResult<T> {
        self.execute(&ApiRequest::delete(endpoint)).await
    }

    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        parts: Vec<FormPart>,
    ) -> RequestResult<T> {
        self.execute(&ApiRequest::new(Method::POST, endpoint).multipart(parts))
            .await
    }

    pub async fn post_binary<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        bytes: impl Into<Bytes>,
    ) -> RequestResult<T> {
        self.execute(&ApiRequest::new(Method::POST, endpoint).binary(bytes))
            .await
    }

    async fn send_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        method: Method,
        endpoint: &str,
        body: &B,
    ) -> RequestResult<T> {
        match ApiRequest::new(method, endpoint).json(body) {
            Ok(request) => self.execute(&request).await,
            Err(e) => e.into(),
        }
    }

    fn url(&self, endpoint: &str) -> String {
        if endpoint.starts_with('/') {
            format!("{}{}", self.base_url, endpoint)
        } else {
            format!("{}/{}", self.base_url, endpoint)
        }
    }

    /// One round trip with the access token as currently stored
    async fn attempt(&self, request: &ApiRequest, attempt: Attempt) -> AttemptOutcome {
        let token = self.store.get().access_token;
        let url = self.url(&request.endpoint);

        let mut builder = self.client.request(request.method.clone(), &url);
        if let Some(ref token) = token {
            builder = builder.bearer_auth(token);
        }

        builder = match &request.body {
            None => builder.header(CONTENT_TYPE, "application/json"),
            Some(RequestBody::Json(value)) => builder.json(value),
            Some(RequestBody::Multipart(parts)) => match build_form(parts) {
                Ok(form) => builder.multipart(form),
                Err(e) => return AttemptOutcome::Failed(e),
            },
            Some(RequestBody::Binary(bytes)) => builder.body(bytes.clone()),
        };

        tracing::debug!(
            method = %request.method,
            url = %url,
            attempt = ?attempt,
            authenticated = token.is_some(),
            "Sending HTTP request"
        );

        match builder.send().await {
            Ok(response) => {
                let status = response.status();
                tracing::debug!(status = %status, "Received HTTP response");

                if status == StatusCode::UNAUTHORIZED {
                    AttemptOutcome::Unauthorized {
                        response,
                        sent_token: token,
                    }
                } else {
                    AttemptOutcome::Completed(response)
                }
            }
            Err(e) => AttemptOutcome::Failed(transport_error(&e, &url)),
        }
    }
}

fn build_form(parts: &[FormPart]) -> Result<Form, ApiError> {
    let mut form = Form::new();
    for part in parts {
        form = match &part.value {
            PartValue::Text(text) => form.text(part.name.clone(), text.clone()),
            PartValue::File {
                file_name,
                mime,
                bytes,
            } => {
                let mut file = Part::bytes(bytes.to_vec()).file_name(file_name.clone());
                if let Some(mime) = mime {
                    file = file
                        .mime_str(mime)
                        .map_err(|e| ApiError::InvalidBody(e.to_string()))?;
                }
                form.part(part.name.clone(), file)
            }
        };
    }
    Ok(form)
}

/// Normalize a response into the uniform result shape
async fn read_response<T: DeserializeOwned>(response: Response) -> RequestResult<T> {
    let status = response.status();
    let url = response.url().to_string();

    let body = match response.bytes().await {
        Ok(body) => body,
        Err(e) => return transport_error(&e, &url).into(),
    };

    if !status.is_success() {
        let message = extract_error_message(&body);
        tracing::warn!(
            status = status.as_u16(),
            url = %url,
            error_message = message.as_deref().unwrap_or(""),
            "HTTP request failed with error response"
        );
        return ApiError::http(status.as_u16(), message).into();
    }

    if status == StatusCode::NO_CONTENT || body.iter().all(u8::is_ascii_whitespace) {
        return RequestResult::Data(None);
    }

    match serde_json::from_slice::<T>(&body) {
        Ok(data) => RequestResult::Data(Some(data)),
        Err(e) => {
            tracing::warn!(url = %url, error = %e, "Failed to parse response body");
            ApiError::InvalidResponse.into()
        }
    }
}

/// Best-effort message from a JSON error body (`message`, then `detail`)
pub fn extract_error_message(body: &[u8]) -> Option<String> {
    let json: serde_json::Value = serde_json::from_slice(body).ok()?;
    ["message", "detail"].iter().find_map(|field| {
        json.get(field)
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    })
}

fn transport_error(e: &reqwest::Error, url: &str) -> ApiError {
    // Categorize the error for better debugging
    let error_kind = if e.is_timeout() {
        "timeout"
    } else if e.is_connect() {
        "connection_failed"
    } else if e.is_request() {
        "request_error"
    } else if e.is_body() {
        "body_error"
    } else if e.is_decode() {
        "decode_error"
    } else {
        "unknown"
    };

    tracing::warn!(
        error_kind = error_kind,
        error = %e,
        url = %url,
        "HTTP request error"
    );

    if e.is_timeout() {
        ApiError::Timeout
    } else {
        ApiError::Network(e.to_string())
    }
}

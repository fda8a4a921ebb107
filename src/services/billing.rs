use std::sync::Arc;

use crate::error::RequestResult;
use crate::http_client::ApiClient;
use crate::models::billing::{Payment, PaymentInput, Quote, QuoteInput, QuoteStatusUpdate};

#[derive(Clone)]
pub struct PaymentService {
    api: Arc<ApiClient>,
}

impl PaymentService {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    pub async fn list(&self) -> RequestResult<Vec<Payment>> {
        self.api.get("/api/payments/").await
    }

    pub async fn get(&self, payment_id: &str) -> RequestResult<Payment> {
        self.api.get(&format!("/api/payments/{}/", payment_id)).await
    }

    pub async fn create(&self, payment: &PaymentInput) -> RequestResult<Payment> {
        self.api.post("/api/payments/", payment).await
    }

    pub async fn update(&self, payment_id: &str, payment: &PaymentInput) -> RequestResult<Payment> {
        self.api
            .put(&format!("/api/payments/{}/", payment_id), payment)
            .await
    }

    pub async fn patch(&self, payment_id: &str, payment: &PaymentInput) -> RequestResult<Payment> {
        self.api
            .patch(&format!("/api/payments/{}/", payment_id), payment)
            .await
    }

    pub async fn delete(&self, payment_id: &str) -> RequestResult<()> {
        self.api
            .delete(&format!("/api/payments/{}/", payment_id))
            .await
    }
}

#[derive(Clone)]
pub struct QuoteService {
    api: Arc<ApiClient>,
}

impl QuoteService {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    pub async fn list(&self) -> RequestResult<Vec<Quote>> {
        self.api.get("/api/quotes/").await
    }

    pub async fn by_project(&self, project_id: &str) -> RequestResult<Vec<Quote>> {
        self.api
            .get(&format!("/api/quotes/by-project/{}/", project_id))
            .await
    }

    pub async fn get(&self, quote_id: &str) -> RequestResult<Quote> {
        self.api.get(&format!("/api/quotes/{}/", quote_id)).await
    }

    pub async fn create(&self, quote: &QuoteInput) -> RequestResult<Quote> {
        self.api.post("/api/quotes/", quote).await
    }

    pub async fn update(&self, quote_id: &str, quote: &QuoteInput) -> RequestResult<Quote> {
        self.api
            .put(&format!("/api/quotes/{}/", quote_id), quote)
            .await
    }

    pub async fn patch(&self, quote_id: &str, quote: &QuoteInput) -> RequestResult<Quote> {
        self.api
            .patch(&format!("/api/quotes/{}/", quote_id), quote)
            .await
    }

    /// Move a quote to `sent`, `accepted` or `rejected`
    pub async fn update_status(
        &self,
        quote_id: &str,
        status: &str,
    ) -> RequestResult<serde_json::Value> {
        self.api
            .patch(
                &format!("/api/quotes/{}/update-status/", quote_id),
                &QuoteStatusUpdate { status },
            )
            .await
    }

    pub async fn delete(&self, quote_id: &str) -> RequestResult<()> {
        self.api.delete(&format!("/api/quotes/{}/", quote_id)).await
    }
}

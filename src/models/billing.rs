use serde::{Deserialize, Serialize};

// ==================================================================================================
// Payments
// ==================================================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: String,
    pub amount: f64,
    pub currency: String,
    pub status: String,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub user: Option<u64>,
    #[serde(default)]
    pub project: Option<String>,
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_notes: Option<String>,
}

/// Payment creation or partial update
#[derive(Debug, Clone, Default, Serialize)]
pub struct PaymentInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_notes: Option<String>,
}

// ==================================================================================================
// Quotes
// ==================================================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub id: String,
    pub project: String,
    pub total_amount: f64,
    pub currency: String,
    /// `pending`, `sent`, `accepted` or `rejected`
    pub status: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub quote_file_url: Option<String>,
    pub created_at: String,
    #[serde(default)]
    pub sent_at: Option<String>,
    #[serde(default)]
    pub accepted_at: Option<String>,
    #[serde(default)]
    pub rejected_at: Option<String>,
}

/// Quote creation or partial update
#[derive(Debug, Clone, Default, Serialize)]
pub struct QuoteInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuoteStatusUpdate<'a> {
    pub status: &'a str,
}

/// Per-document price line attached to a project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentQuote {
    pub document_id: String,
    pub document_name: String,
    pub price: f64,
    pub currency: String,
}

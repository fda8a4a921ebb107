use serde::{Deserialize, Serialize};

use super::billing::{DocumentQuote, Payment};

// ==================================================================================================
// Projects
// ==================================================================================================

/// Project as returned by the list and update endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub client: u64,
    pub translator: Option<u64>,
    pub source_language: String,
    pub target_language: String,
    /// Workflow status (`waiting`, `in-progress`, `review`, `completed`)
    #[serde(default)]
    pub status: String,
    pub submitted_at: Option<String>,
    pub started_at: Option<String>,
    pub estimated_completion_date: Option<String>,
    pub completed_at: Option<String>,
    #[serde(default)]
    pub private_project: bool,
    pub instructions: Option<String>,
    #[serde(default)]
    pub source_document_count: u32,
    #[serde(default)]
    pub translated_document_count: u32,
    #[serde(default)]
    pub payments: Vec<Payment>,
}

/// Project detail with its documents, comments and quote lines
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectDetail {
    #[serde(flatten)]
    pub project: Project,
    #[serde(default)]
    pub documents: Vec<Document>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub quote: Vec<DocumentQuote>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewProject<'a> {
    pub name: &'a str,
    pub source_language: &'a str,
    pub target_language: &'a str,
}

/// Partial project update; unset fields are left out of the body
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProjectUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_completion_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_project: Option<bool>,
}

/// Body of the translator assignment endpoint; `None` unassigns
#[derive(Debug, Clone, Serialize)]
pub struct TranslatorAssignment {
    pub translator: Option<u64>,
}

// ==================================================================================================
// Documents
// ==================================================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub source_url: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub uploaded_at: Option<String>,
    #[serde(default)]
    pub translated_url: Option<String>,
}

// ==================================================================================================
// Comments
// ==================================================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub user: Option<u64>,
    #[serde(default)]
    pub project: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CommentText<'a> {
    pub text: &'a str,
}

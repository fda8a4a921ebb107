use bytes::Bytes;
use std::sync::Arc;

use crate::error::RequestResult;
use crate::http_client::{ApiClient, FormPart};
use crate::models::project::{
    Comment, CommentText, Document, NewProject, Project, ProjectDetail, ProjectUpdate,
    TranslatorAssignment,
};

/// Projects, their documents, comments and translator assignment
#[derive(Clone)]
pub struct ProjectService {
    api: Arc<ApiClient>,
}

impl ProjectService {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    pub async fn list(&self) -> RequestResult<Vec<Project>> {
        self.api.get("/api/projects/").await
    }

    pub async fn get(&self, project_id: &str) -> RequestResult<ProjectDetail> {
        self.api.get(&format!("/api/projects/{}/", project_id)).await
    }

    pub async fn create(&self, project: &NewProject<'_>) -> RequestResult<Project> {
        self.api.post("/api/projects/", project).await
    }

    pub async fn update(&self, project_id: &str, update: &ProjectUpdate) -> RequestResult<Project> {
        self.api
            .put(&format!("/api/projects/{}/", project_id), update)
            .await
    }

    pub async fn patch(&self, project_id: &str, update: &ProjectUpdate) -> RequestResult<Project> {
        self.api
            .patch(&format!("/api/projects/{}/", project_id), update)
            .await
    }

    pub async fn delete(&self, project_id: &str) -> RequestResult<()> {
        self.api
            .delete(&format!("/api/projects/{}/", project_id))
            .await
    }

    pub async fn comments(&self, project_id: &str) -> RequestResult<Vec<Comment>> {
        self.api
            .get(&format!("/api/projects/{}/comments/", project_id))
            .await
    }

    pub async fn add_comment(&self, project_id: &str, text: &str) -> RequestResult<Comment> {
        self.api
            .post(
                &format!("/api/projects/{}/comments/", project_id),
                &CommentText { text },
            )
            .await
    }

    pub async fn documents(&self, project_id: &str) -> RequestResult<Vec<Document>> {
        self.api
            .get(&format!("/api/projects/{}/documents/", project_id))
            .await
    }

    pub async fn document(&self, project_id: &str, document_id: &str) -> RequestResult<Document> {
        self.api
            .get(&format!(
                "/api/projects/{}/documents/{}/",
                project_id, document_id
            ))
            .await
    }

    /// Upload a source document as multipart form data
    pub async fn upload_document(
        &self,
        project_id: &str,
        file_name: &str,
        mime: Option<String>,
        contents: impl Into<Bytes>,
    ) -> RequestResult<Document> {
        let parts = vec![
            FormPart::file("file", file_name, mime, contents),
            FormPart::text("project", project_id),
            FormPart::text("name", file_name),
        ];
        self.api
            .post_multipart(&format!("/api/projects/{}/documents/", project_id), parts)
            .await
    }

    pub async fn delete_document(&self, project_id: &str, document_id: &str) -> RequestResult<()> {
        self.api
            .delete(&format!(
                "/api/projects/{}/documents/{}/",
                project_id, document_id
            ))
            .await
    }

    pub async fn assign_translator(
        &self,
        project_id: &str,
        translator_id: u64,
    ) -> RequestResult<Project> {
        self.set_translator(project_id, Some(translator_id)).await
    }

    pub async fn unassign_translator(&self, project_id: &str) -> RequestResult<Project> {
        self.set_translator(project_id, None).await
    }

    async fn set_translator(
        &self,
        project_id: &str,
        translator: Option<u64>,
    ) -> RequestResult<Project> {
        self.api
            .patch(
                &format!("/api/projects/{}/assign-translator/", project_id),
                &TranslatorAssignment { translator },
            )
            .await
    }
}

/// Comments addressed by their own id
#[derive(Clone)]
pub struct CommentService {
    api: Arc<ApiClient>,
}

impl CommentService {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    pub async fn list(&self) -> RequestResult<Vec<Comment>> {
        self.api.get("/api/comments/").await
    }

    pub async fn get(&self, comment_id: &str) -> RequestResult<Comment> {
        self.api.get(&format!("/api/comments/{}/", comment_id)).await
    }

    pub async fn update(&self, comment_id: &str, text: &str) -> RequestResult<Comment> {
        self.api
            .put(&format!("/api/comments/{}/", comment_id), &CommentText { text })
            .await
    }

    pub async fn delete(&self, comment_id: &str) -> RequestResult<()> {
        self.api
            .delete(&format!("/api/comments/{}/", comment_id))
            .await
    }
}

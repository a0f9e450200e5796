use std::path::Path;

use reqwest::multipart::{Form, Part};
use reqwest::Method;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::client::ApiClient;
use super::error::ApiError;
use crate::models::{
    DocumentSet, NewProject, ProgressUpdate, Project, ProjectStatus, ProjectSummary,
};
use crate::token::Credential;

/// `GET /api/all-projects` answers `{"message": ..}` instead of `[]`
/// when there is nothing to list.
#[derive(Deserialize)]
#[serde(untagged)]
enum ProjectListing {
    Rows(Vec<ProjectSummary>),
    Empty {
        #[allow(dead_code)]
        message: String,
    },
}

#[derive(Deserialize)]
struct CreatedProject {
    project: Project,
}

#[derive(Deserialize)]
struct UploadedDocuments {
    contract: DocumentSet,
}

/// One file of a document upload.
#[derive(Debug, Clone)]
pub struct DocumentFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl DocumentFile {
    pub async fn from_path(path: &Path) -> Result<Self, String> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string());
        Ok(Self { file_name, bytes })
    }

    fn into_part(self) -> Part {
        Part::bytes(self.bytes).file_name(self.file_name)
    }
}

impl ApiClient {
    pub async fn list_projects(
        &self,
        credential: &Credential,
    ) -> Result<Vec<ProjectSummary>, ApiError> {
        let request = self.request(Method::GET, "all-projects", Some(credential));
        match self.execute_json(request, "all-projects").await? {
            ProjectListing::Rows(rows) => Ok(rows),
            ProjectListing::Empty { .. } => Ok(Vec::new()),
        }
    }

    /// Project details, served from the cache while fresh.
    pub async fn get_project(
        &self,
        credential: &Credential,
        id: &str,
    ) -> Result<Project, ApiError> {
        if let Some(project) = self.cached_project(id) {
            debug!(project_id = id, "Project served from cache");
            return Ok(project);
        }
        self.fetch_project(credential, id).await
    }

    /// Project details straight from the backend; refreshes the cache.
    pub async fn fetch_project(
        &self,
        credential: &Credential,
        id: &str,
    ) -> Result<Project, ApiError> {
        let request = self.request(Method::GET, &format!("projects/{}", id), Some(credential));
        let project: Project = self.execute_json(request, "projects.get").await?;
        self.remember_project(&project);
        Ok(project)
    }

    pub async fn create_project(
        &self,
        credential: &Credential,
        project: &NewProject,
    ) -> Result<Project, ApiError> {
        let request = self
            .request(Method::POST, "add-project", Some(credential))
            .json(project);
        let created: CreatedProject = self.execute_json(request, "add-project").await?;
        Ok(created.project)
    }

    pub async fn cancel_project(&self, credential: &Credential, id: &str) -> Result<(), ApiError> {
        let request = self.request(
            Method::DELETE,
            &format!("cancel-project/{}", id),
            Some(credential),
        );
        self.execute(request, "cancel-project").await?;
        self.forget_project(id);
        Ok(())
    }

    pub async fn update_status(
        &self,
        credential: &Credential,
        id: &str,
        status: ProjectStatus,
    ) -> Result<(), ApiError> {
        let request = self
            .request(
                Method::PUT,
                &format!("projects/{}/status", id),
                Some(credential),
            )
            .json(&json!({"status": status}));
        self.execute(request, "projects.status").await?;
        self.forget_project(id);
        Ok(())
    }

    pub async fn list_updates(
        &self,
        credential: &Credential,
        id: &str,
    ) -> Result<Vec<ProgressUpdate>, ApiError> {
        let request = self.request(
            Method::GET,
            &format!("projects/{}/updates", id),
            Some(credential),
        );
        self.execute_json(request, "projects.updates").await
    }

    pub async fn post_update(
        &self,
        credential: &Credential,
        id: &str,
        update: &str,
    ) -> Result<(), ApiError> {
        let request = self
            .request(
                Method::POST,
                &format!("projects/{}/updates", id),
                Some(credential),
            )
            .json(&json!({"update": update}));
        self.execute(request, "projects.updates").await?;
        Ok(())
    }

    pub async fn documents(
        &self,
        credential: &Credential,
        id: &str,
    ) -> Result<Vec<DocumentSet>, ApiError> {
        let request = self.request(
            Method::GET,
            &format!("projects/{}/documents", id),
            Some(credential),
        );
        self.execute_json(request, "projects.documents").await
    }

    /// Upload the signed contract and the payment proof in one request.
    pub async fn upload_documents(
        &self,
        credential: &Credential,
        id: &str,
        contract: DocumentFile,
        payment: DocumentFile,
    ) -> Result<DocumentSet, ApiError> {
        let form = Form::new()
            .part("contract", contract.into_part())
            .part("payment", payment.into_part());
        let request = self
            .request(
                Method::POST,
                &format!("projects/{}/upload-documents", id),
                Some(credential),
            )
            .multipart(form);
        let uploaded: UploadedDocuments =
            self.execute_json(request, "projects.upload-documents").await?;
        Ok(uploaded.contract)
    }
}

#[cfg(test)]
mod tests {
    use super::super::client::tests::client_for;
    use super::*;
    use mockito::{Matcher, Server};

    fn credential() -> Credential {
        Credential::new("h.p.s")
    }

    #[tokio::test]
    async fn empty_listing_message_becomes_an_empty_list() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("GET", "/api/all-projects")
            .match_header("authorization", "Bearer h.p.s")
            .with_status(200)
            .with_body(r#"{"message": "No hay proyectos disponibles"}"#)
            .create_async()
            .await;

        let client = client_for(&server.url());
        let projects = client.list_projects(&credential()).await.unwrap();
        m.assert_async().await;
        assert!(projects.is_empty());
    }

    #[tokio::test]
    async fn listing_rows_are_decoded() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/api/all-projects")
            .with_status(200)
            .with_body(
                json!([{
                    "project_id": "p-1",
                    "project_name": "Storefront",
                    "project_description": "Glass front",
                    "project_status": "pending",
                    "project_created_at": "2024-11-20T15:32:00",
                    "user_id": 3,
                    "user_name": "Luis",
                    "user_email": "luis@example.com"
                }])
                .to_string(),
            )
            .create_async()
            .await;

        let client = client_for(&server.url());
        let projects = client.list_projects(&credential()).await.unwrap();
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].status, ProjectStatus::Pending);
    }

    #[tokio::test]
    async fn project_details_are_cached_until_status_changes() {
        let mut server = Server::new_async().await;
        let get = server
            .mock("GET", "/api/projects/p-1")
            .with_status(200)
            .with_body(r#"{"id": "p-1", "name": "Storefront", "status": "pending"}"#)
            .expect(2)
            .create_async()
            .await;
        let put = server
            .mock("PUT", "/api/projects/p-1/status")
            .match_body(Matcher::Json(json!({"status": "in_progress"})))
            .with_status(200)
            .create_async()
            .await;

        let client = client_for(&server.url());
        client.get_project(&credential(), "p-1").await.unwrap();
        client.get_project(&credential(), "p-1").await.unwrap();
        client
            .update_status(&credential(), "p-1", ProjectStatus::InProgress)
            .await
            .unwrap();
        client.get_project(&credential(), "p-1").await.unwrap();

        get.assert_async().await;
        put.assert_async().await;
    }

    #[tokio::test]
    async fn missing_project_is_not_found() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/api/projects/nope")
            .with_status(404)
            .with_body(r#"{"error": "Proyecto no encontrado"}"#)
            .create_async()
            .await;

        let client = client_for(&server.url());
        let err = client.get_project(&credential(), "nope").await.unwrap_err();
        assert_eq!(err, ApiError::NotFound("Proyecto no encontrado".to_string()));
    }

    #[tokio::test]
    async fn create_and_cancel() {
        let mut server = Server::new_async().await;
        let create = server
            .mock("POST", "/api/add-project")
            .match_body(Matcher::Json(json!({"name": "Patio", "description": "Tiles"})))
            .with_status(201)
            .with_body(
                r#"{"message": "Proyecto creado exitosamente",
                    "project": {"id": "p-2", "name": "Patio", "description": "Tiles",
                                "status": "pending", "user_id": 7}}"#,
            )
            .create_async()
            .await;
        let cancel = server
            .mock("DELETE", "/api/cancel-project/p-2")
            .with_status(200)
            .create_async()
            .await;

        let client = client_for(&server.url());
        let project = client
            .create_project(
                &credential(),
                &NewProject {
                    name: "Patio".to_string(),
                    description: "Tiles".to_string(),
                },
            )
            .await
            .unwrap();
        assert_eq!(project.id, "p-2");
        assert_eq!(project.user_id.as_deref(), Some("7"));

        client.cancel_project(&credential(), "p-2").await.unwrap();
        create.assert_async().await;
        cancel.assert_async().await;
    }

    #[tokio::test]
    async fn progress_updates_round_trip_the_update_field() {
        let mut server = Server::new_async().await;
        let post = server
            .mock("POST", "/api/projects/p-1/updates")
            .match_body(Matcher::Json(json!({"update": "Walls painted"})))
            .with_status(201)
            .create_async()
            .await;
        let _get = server
            .mock("GET", "/api/projects/p-1/updates")
            .with_status(200)
            .with_body(r#"[{"id": 1, "project_id": "p-1", "update": "Walls painted"}]"#)
            .create_async()
            .await;

        let client = client_for(&server.url());
        client
            .post_update(&credential(), "p-1", "Walls painted")
            .await
            .unwrap();
        let updates = client.list_updates(&credential(), "p-1").await.unwrap();
        post.assert_async().await;
        assert_eq!(updates[0].content, "Walls painted");
    }

    #[tokio::test]
    async fn documents_are_uploaded_as_multipart() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("POST", "/api/projects/p-1/upload-documents")
            .match_header(
                "content-type",
                Matcher::Regex("^multipart/form-data".to_string()),
            )
            .match_body(Matcher::Regex("name=\"payment\"".to_string()))
            .with_status(201)
            .with_body(
                r#"{"message": "Documentos subidos exitosamente",
                    "contract": {"id": 9, "project_id": "p-1",
                                 "contract_url": "https://files/c.pdf",
                                 "payment_url": "https://files/p.pdf"}}"#,
            )
            .create_async()
            .await;

        let client = client_for(&server.url());
        let documents = client
            .upload_documents(
                &credential(),
                "p-1",
                DocumentFile {
                    file_name: "contract.pdf".to_string(),
                    bytes: b"%PDF-1.4".to_vec(),
                },
                DocumentFile {
                    file_name: "payment.png".to_string(),
                    bytes: b"receipt".to_vec(),
                },
            )
            .await
            .unwrap();
        m.assert_async().await;
        assert_eq!(documents.id, "9");
        assert_eq!(documents.payment_url.as_deref(), Some("https://files/p.pdf"));
    }
}

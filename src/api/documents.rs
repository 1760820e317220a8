use crate::api::ApiClient;
use crate::error::{JournalError, Result};
use crate::models::Document;
use reqwest::multipart::{Form, Part};
use reqwest::Method;
use std::path::Path;

impl ApiClient {
    pub async fn list_documents(&self) -> Result<Vec<Document>> {
        self.get("/documents").await
    }

    /// Upload a file for retrieval-augmented chat context.
    pub async fn upload_document(&self, path: &Path) -> Result<Document> {
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| JournalError::Other(format!("Invalid file name: {}", path.display())))?
            .to_string();
        let bytes = tokio::fs::read(path).await?;
        self.log(&format!("uploading {} ({} bytes)", filename, bytes.len()));

        let part = Part::bytes(bytes).file_name(filename);
        let form = Form::new().part("file", part);
        let builder = self.request(Method::POST, "/documents/upload")?.multipart(form);
        let (status, envelope) = self.send_envelope("/documents/upload", builder).await?;
        envelope.into_data(status)
    }

    pub async fn delete_document(&self, id: &str) -> Result<()> {
        self.delete(&format!("/documents/{}", id)).await
    }
}

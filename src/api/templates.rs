use crate::api::ApiClient;
use crate::error::Result;
use crate::models::{CreateTemplateRequest, JournalTemplate, UpdateTemplateRequest};

impl ApiClient {
    pub async fn list_templates(&self) -> Result<Vec<JournalTemplate>> {
        self.get("/journal-templates").await
    }

    pub async fn get_template(&self, id: &str) -> Result<JournalTemplate> {
        self.get(&format!("/journal-templates/{}", id)).await
    }

    pub async fn create_template(&self, request: &CreateTemplateRequest) -> Result<JournalTemplate> {
        self.post("/journal-templates", request).await
    }

    pub async fn update_template(
        &self,
        id: &str,
        request: &UpdateTemplateRequest,
    ) -> Result<JournalTemplate> {
        self.patch(&format!("/journal-templates/{}", id), request)
            .await
    }

    pub async fn delete_template(&self, id: &str) -> Result<()> {
        self.delete(&format!("/journal-templates/{}", id)).await
    }
}

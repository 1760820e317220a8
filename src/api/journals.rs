use crate::api::ApiClient;
use crate::error::Result;
use crate::models::{CreateJournalRequest, JournalEntry, JournalQuery, UpdateJournalRequest};

impl ApiClient {
    pub async fn list_journals(&self, query: &JournalQuery) -> Result<Vec<JournalEntry>> {
        self.get_with_query("/journals", query).await
    }

    pub async fn get_journal(&self, id: &str) -> Result<JournalEntry> {
        self.get(&format!("/journals/{}", id)).await
    }

    pub async fn create_journal(&self, request: &CreateJournalRequest) -> Result<JournalEntry> {
        self.post("/journals", request).await
    }

    pub async fn update_journal(
        &self,
        id: &str,
        request: &UpdateJournalRequest,
    ) -> Result<JournalEntry> {
        self.patch(&format!("/journals/{}", id), request).await
    }

    pub async fn delete_journal(&self, id: &str) -> Result<()> {
        self.delete(&format!("/journals/{}", id)).await
    }
}

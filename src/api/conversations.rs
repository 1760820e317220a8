use crate::api::ApiClient;
use crate::error::Result;
use crate::models::{Conversation, ConversationSummary};
use serde::Serialize;
use serde_json::json;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateConversationRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl ApiClient {
    pub async fn list_conversations(&self) -> Result<Vec<ConversationSummary>> {
        self.get("/chat/conversations").await
    }

    pub async fn get_conversation(&self, id: &str) -> Result<Conversation> {
        self.get(&format!("/chat/conversations/{}", id)).await
    }

    pub async fn create_conversation(&self, title: Option<String>) -> Result<Conversation> {
        self.post("/chat/conversations", &CreateConversationRequest { title })
            .await
    }

    pub async fn rename_conversation(&self, id: &str, title: &str) -> Result<Conversation> {
        self.patch(
            &format!("/chat/conversations/{}", id),
            &json!({ "title": title }),
        )
        .await
    }

    pub async fn delete_conversation(&self, id: &str) -> Result<()> {
        self.delete(&format!("/chat/conversations/{}", id)).await
    }
}

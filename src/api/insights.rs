use crate::api::ApiClient;
use crate::error::Result;
use crate::models::Insight;
use serde_json::json;

impl ApiClient {
    pub async fn list_insights(&self) -> Result<Vec<Insight>> {
        self.get("/insights").await
    }

    /// Insight for the week starting on `week_start` (a Monday), if generated.
    pub async fn get_weekly_insight(&self, week_start: &str) -> Result<Option<Insight>> {
        self.get_with_query("/insights/weekly", &[("weekStart", week_start)])
            .await
    }

    pub async fn generate_insight(&self, week_start: &str) -> Result<Insight> {
        self.post("/insights/generate", &json!({ "weekStart": week_start }))
            .await
    }
}

use crate::api::ApiClient;
use crate::error::Result;
use crate::models::{CreateGoalRequest, Goal, GoalStatus, UpdateGoalRequest};

impl ApiClient {
    pub async fn list_goals(&self, status: Option<GoalStatus>) -> Result<Vec<Goal>> {
        match status {
            Some(status) => {
                self.get_with_query("/goals", &[("status", status.to_string())])
                    .await
            }
            None => self.get("/goals").await,
        }
    }

    pub async fn get_goal(&self, id: &str) -> Result<Goal> {
        self.get(&format!("/goals/{}", id)).await
    }

    pub async fn create_goal(&self, request: &CreateGoalRequest) -> Result<Goal> {
        self.post("/goals", request).await
    }

    pub async fn update_goal(&self, id: &str, request: &UpdateGoalRequest) -> Result<Goal> {
        self.patch(&format!("/goals/{}", id), request).await
    }

    pub async fn delete_goal(&self, id: &str) -> Result<()> {
        self.delete(&format!("/goals/{}", id)).await
    }
}

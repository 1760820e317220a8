use crate::api::ApiClient;
use crate::error::Result;
use crate::push::PushSubscription;
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PublicKeyData {
    public_key: String,
}

impl ApiClient {
    /// The server's VAPID public key.
    pub async fn push_public_key(&self) -> Result<String> {
        let data: PublicKeyData = self.get("/push/public-key").await?;
        Ok(data.public_key)
    }

    pub async fn push_subscribe(&self, subscription: &PushSubscription) -> Result<()> {
        let _: Value = self.post("/push/subscribe", subscription).await?;
        Ok(())
    }

    pub async fn push_unsubscribe(&self, endpoint: &str) -> Result<()> {
        let _: Value = self
            .post("/push/unsubscribe", &json!({ "endpoint": endpoint }))
            .await?;
        Ok(())
    }

    pub async fn push_send_test(&self) -> Result<()> {
        let _: Value = self.post("/push/send-test", &json!({})).await?;
        Ok(())
    }
}

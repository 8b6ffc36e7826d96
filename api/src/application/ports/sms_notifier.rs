use async_trait::async_trait;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct SmsReceipt {
    pub sent: bool,
    pub message: String,
}

#[async_trait]
pub trait SmsNotifier: Send + Sync {
    async fn send(&self, to: &str, body: &str) -> anyhow::Result<SmsReceipt>;
}

use async_trait::async_trait;

use crate::domain::realtime::change::OutboundMessage;

#[async_trait]
pub trait RoomPublisher: Send + Sync {
    async fn publish(&self, message: OutboundMessage) -> anyhow::Result<()>;
}

use async_trait::async_trait;
use futures_util::stream::BoxStream;

use crate::domain::realtime::change::ChangeNotification;

#[async_trait]
pub trait ChangeFeed: Send + Sync {
    /// Stream of database change notifications. Implementations reconnect on
    /// their own; the stream only ends when the feed shuts down.
    async fn subscribe(&self) -> anyhow::Result<BoxStream<'static, ChangeNotification>>;
}

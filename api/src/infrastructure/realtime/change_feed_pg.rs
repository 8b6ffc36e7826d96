use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use futures_util::stream::{BoxStream, StreamExt};
use tokio::sync::mpsc;
use tokio::time::sleep;
use tokio_stream::wrappers::UnboundedReceiverStream;

use crate::application::ports::change_feed::ChangeFeed;
use crate::domain::realtime::change::ChangeNotification;
use crate::infrastructure::db::PgPool;

/// Change notifications from the table triggers, read with `LISTEN`.
/// Notifications raised while the listener is reconnecting are lost.
#[derive(Clone)]
pub struct PgChangeFeed {
    pool: PgPool,
    channel: String,
    retry: Duration,
}

impl PgChangeFeed {
    pub fn new(pool: PgPool, channel: impl Into<String>, retry: Duration) -> Self {
        Self {
            pool,
            channel: channel.into(),
            retry,
        }
    }
}

#[async_trait]
impl ChangeFeed for PgChangeFeed {
    async fn subscribe(&self) -> anyhow::Result<BoxStream<'static, ChangeNotification>> {
        let (tx, rx) = mpsc::unbounded_channel::<ChangeNotification>();
        let pool = self.pool.clone();
        let channel = self.channel.clone();
        let retry = self.retry;

        tokio::spawn(async move {
            loop {
                let listener = sqlx::postgres::PgListener::connect_with(&pool)
                    .await
                    .context("change_feed_connect");
                let mut listener = match listener {
                    Ok(listener) => listener,
                    Err(err) => {
                        tracing::error!(error = ?err, "change_feed_connect_failed");
                        sleep(retry).await;
                        continue;
                    }
                };

                if let Err(err) = listener.listen(&channel).await {
                    tracing::error!(error = ?err, channel = %channel, "change_feed_listen_failed");
                    sleep(retry).await;
                    continue;
                }
                tracing::info!(channel = %channel, "change_feed_listening");

                loop {
                    match listener.recv().await {
                        Ok(notification) => {
                            let payload = notification.payload();
                            match serde_json::from_str::<ChangeNotification>(payload) {
                                Ok(change) => {
                                    if tx.send(change).is_err() {
                                        tracing::debug!("change_feed_receiver_dropped");
                                        return;
                                    }
                                }
                                Err(err) => {
                                    tracing::warn!(
                                        error = ?err,
                                        raw_payload = payload,
                                        "change_feed_decode_failed"
                                    );
                                }
                            }
                        }
                        Err(err) => {
                            tracing::error!(error = ?err, channel = %channel, "change_feed_recv_failed");
                            sleep(retry).await;
                            break;
                        }
                    }
                }
            }
        });

        Ok(UnboundedReceiverStream::new(rx).boxed())
    }
}

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::application::ports::room_publisher::RoomPublisher;
use crate::domain::realtime::change::OutboundMessage;

/// In-process fan-out of room messages. Every socket holds a receiver and
/// keeps the messages addressed to a room it joined.
#[derive(Clone)]
pub struct RoomHub {
    sender: broadcast::Sender<OutboundMessage>,
}

impl RoomHub {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<OutboundMessage> {
        self.sender.subscribe()
    }

    pub fn socket_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

#[async_trait]
impl RoomPublisher for RoomHub {
    async fn publish(&self, message: OutboundMessage) -> anyhow::Result<()> {
        match self.sender.send(message) {
            Ok(receivers) => {
                tracing::trace!(receivers, "room_message_published");
                Ok(())
            }
            // Nobody connected.
            Err(broadcast::error::SendError(_)) => Ok(()),
        }
    }
}

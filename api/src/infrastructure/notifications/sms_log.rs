use async_trait::async_trait;

use crate::application::ports::sms_notifier::{SmsNotifier, SmsReceipt};

/// Writes outgoing SMS to the log instead of a gateway. With delivery
/// disabled the receipt reports the message as not sent.
#[derive(Debug, Clone)]
pub struct LogSmsNotifier {
    enabled: bool,
}

impl LogSmsNotifier {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }
}

#[async_trait]
impl SmsNotifier for LogSmsNotifier {
    async fn send(&self, to: &str, body: &str) -> anyhow::Result<SmsReceipt> {
        let to = to.trim();
        if to.is_empty() {
            anyhow::bail!("sms recipient is empty");
        }
        tracing::info!(to = %to, body = %body, enabled = self.enabled, "sms_logged");
        Ok(if self.enabled {
            SmsReceipt {
                sent: true,
                message: "SMS logged".into(),
            }
        } else {
            SmsReceipt {
                sent: false,
                message: "SMS delivery disabled".into(),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn receipt_follows_the_switch() {
        let on = LogSmsNotifier::new(true).send("9876543210", "hi").await.unwrap();
        assert!(on.sent);
        let off = LogSmsNotifier::new(false).send("9876543210", "hi").await.unwrap();
        assert!(!off.sent);
        assert!(LogSmsNotifier::new(true).send("  ", "hi").await.is_err());
    }
}

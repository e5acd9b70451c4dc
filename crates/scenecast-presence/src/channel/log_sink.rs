//! A sink that reports presence changes through `tracing`.

use async_trait::async_trait;
use scenecast_common::ChannelError;
use tracing::info;

use super::task::PresenceSink;
use crate::descriptor::PresenceDescriptor;

/// Emits every applied descriptor as a JSON log line.
#[derive(Debug, Default)]
pub struct LogSink {
    client_id: Option<u64>,
    applied: usize,
}

impl LogSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of presences applied since connecting.
    pub fn applied(&self) -> usize {
        self.applied
    }
}

#[async_trait]
impl PresenceSink for LogSink {
    fn name(&self) -> &'static str {
        "log"
    }

    async fn connect(&mut self, client_id: u64) -> Result<(), ChannelError> {
        self.client_id = Some(client_id);
        info!(client_id, "log sink ready");
        Ok(())
    }

    async fn set_presence(&mut self, descriptor: &PresenceDescriptor) -> Result<(), ChannelError> {
        let json = serde_json::to_string(descriptor)
            .map_err(|e| ChannelError::Rejected(format!("unserializable presence: {e}")))?;
        self.applied += 1;
        info!(target: "scenecast::presence", client_id = self.client_id, presence = %json, "presence set");
        Ok(())
    }

    async fn clear_presence(&mut self) -> Result<(), ChannelError> {
        info!(target: "scenecast::presence", client_id = self.client_id, "presence cleared");
        Ok(())
    }

    async fn close(&mut self) {
        info!(applied = self.applied, "log sink closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn counts_applied_presences() {
        let mut sink = LogSink::new();
        sink.connect(5).await.unwrap();
        sink.set_presence(&PresenceDescriptor::idle("a")).await.unwrap();
        sink.set_presence(&PresenceDescriptor::idle("b")).await.unwrap();
        sink.clear_presence().await.unwrap();
        assert_eq!(sink.applied(), 2);
    }
}

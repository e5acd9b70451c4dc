use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Events the host application raises toward the presence layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum HostEvent {
    /// A named context (scene) became active.
    ContextActivated(String),
    /// One cycle of the host's main loop.
    Tick,
    Shutdown,
    #[serde(other)]
    Unknown,
}

pub struct EventBus {
    sender: broadcast::Sender<HostEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<HostEvent> {
        self.sender.subscribe()
    }

    /// Returns the number of receivers the event reached.
    pub fn publish(&self, event: HostEvent) -> usize {
        match self.sender.send(event) {
            Ok(receivers) => receivers,
            Err(e) => {
                tracing::trace!(event = ?e.0, "host event dropped: no subscribers");
                0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_and_receive() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();

        bus.publish(HostEvent::Tick);

        let event = rx.recv().await.unwrap();
        assert_eq!(event, HostEvent::Tick);
    }

    #[tokio::test]
    async fn multiple_subscribers() {
        let bus = EventBus::new(16);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.publish(HostEvent::Shutdown);

        assert_eq!(rx1.recv().await.unwrap(), HostEvent::Shutdown);
        assert_eq!(rx2.recv().await.unwrap(), HostEvent::Shutdown);
    }

    #[tokio::test]
    async fn context_events_keep_order() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();

        bus.publish(HostEvent::ContextActivated("Menu".into()));
        bus.publish(HostEvent::Tick);
        bus.publish(HostEvent::ContextActivated("Lobby".into()));

        let e1 = rx.recv().await.unwrap();
        assert!(matches!(e1, HostEvent::ContextActivated(ref name) if name == "Menu"));
        assert_eq!(rx.recv().await.unwrap(), HostEvent::Tick);
        let e3 = rx.recv().await.unwrap();
        assert!(matches!(e3, HostEvent::ContextActivated(ref name) if name == "Lobby"));
    }

    #[test]
    fn publish_returns_zero_with_no_subscribers() {
        let bus = EventBus::new(16);
        let count = bus.publish(HostEvent::Shutdown);
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn publish_returns_subscriber_count() {
        let bus = EventBus::new(16);
        let _rx1 = bus.subscribe();
        let _rx2 = bus.subscribe();

        let count = bus.publish(HostEvent::Tick);
        assert_eq!(count, 2);
    }

    #[test]
    fn context_event_serializes_tagged() {
        let json = serde_json::to_string(&HostEvent::ContextActivated("Menu".into())).unwrap();
        assert_eq!(json, r#"{"type":"ContextActivated","data":"Menu"}"#);
    }

    #[test]
    fn unknown_event_deserializes() {
        let json = r#"{"type":"SomeNewEventWeNeverHeardOf","data":null}"#;
        let event: HostEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event, HostEvent::Unknown);
    }
}

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;
use crate::core::events::DomainEvent;
use crate::core::library::LibraryError;
use crate::gateway::events::EventPublisher;

#[derive(Debug, Default)]
pub struct MemoryPublisher {
    events: Mutex<Vec<DomainEvent>>,
}

impl MemoryPublisher {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) async fn published(&self) -> Vec<DomainEvent> {
        self.events.lock().await.clone()
    }
}

#[async_trait]
impl EventPublisher for MemoryPublisher {
    async fn create_topic(&self, topic: &str) -> Result<String, LibraryError> {
        Ok(topic.to_string())
    }

    async fn get_topics(&self) -> Result<Vec<String>, LibraryError> {
        let mut topics: Vec<String> = self.events.lock().await.iter().map(|e| e.name.clone()).collect();
        topics.sort();
        topics.dedup();
        Ok(topics)
    }

    async fn publish(&self, event: &DomainEvent) -> Result<(), LibraryError> {
        debug!("publishing {} for {}", event.name, event.key);
        self.events.lock().await.push(event.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::core::events::{DomainEvent, DomainEventType};
    use crate::gateway::events::EventPublisher;
    use crate::gateway::memory::publisher::MemoryPublisher;

    #[tokio::test]
    async fn test_should_keep_published_events() {
        let publisher = MemoryPublisher::new();
        for name in ["hold_placed", "hold_promoted", "hold_placed"] {
            let event = DomainEvent::hold(name, DomainEventType::Updated, "hold1", "book1", &"data").expect("build event");
            publisher.publish(&event).await.expect("should publish");
        }
        assert_eq!(3, publisher.published().await.len());
        assert_eq!(vec!["hold_placed".to_string(), "hold_promoted".to_string()], publisher.get_topics().await.unwrap());
    }

    #[tokio::test]
    async fn test_should_skip_events_that_failed_to_build() {
        let publisher = MemoryPublisher::new();
        publisher.publish_after_commit(serde_json::from_str::<DomainEvent>("not json")).await;
        assert!(publisher.published().await.is_empty());
        publisher.publish_after_commit(
            DomainEvent::hold("hold_cancelled", DomainEventType::Updated, "hold1", "book1", &"data")).await;
        assert_eq!(1, publisher.published().await.len());
    }
}

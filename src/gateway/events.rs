use async_trait::async_trait;
use tracing::warn;
use crate::core::events::DomainEvent;
use crate::core::library::LibraryError;

// EventPublisher fans domain events out to the configured gateway. Topics are named
// after the event so consumers can subscribe to a single kind of change.
#[async_trait]
pub(crate) trait EventPublisher: Sync + Send {
    async fn create_topic(&self, topic: &str) -> Result<String, LibraryError>;
    async fn get_topics(&self) -> Result<Vec<String>, LibraryError>;
    async fn publish(&self, event: &DomainEvent) -> Result<(), LibraryError>;

    // Events go out after the change is stored; a failure here is logged and never
    // reported to the caller of the operation that produced the event.
    async fn publish_after_commit(&self, event: serde_json::Result<DomainEvent>) {
        match event {
            Ok(event) => {
                if let Err(err) = self.publish(&event).await {
                    warn!("failed to publish {} for {}: {}", event.name, event.key, err);
                }
            }
            Err(err) => warn!("failed to build event: {}", err),
        }
    }
}

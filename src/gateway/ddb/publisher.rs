use std::collections::BTreeSet;
use async_trait::async_trait;
use aws_sdk_dynamodb::Client;
use tokio::sync::Mutex;
use crate::core::events::DomainEvent;
use crate::core::library::LibraryError;
use crate::gateway::events::EventPublisher;
use crate::utils::ddb::put_new;

pub(crate) const EVENTS_TABLE: &str = "events";

// DDBPublisher appends events to a table keyed by event_id. Local stacks have no
// SNS, so event names stand in for topics.
#[derive(Debug)]
pub struct DDBPublisher {
    client: Client,
    table_name: String,
    topics: Mutex<BTreeSet<String>>,
}

impl DDBPublisher {
    pub(crate) fn new(client: Client, table_name: &str) -> Self {
        Self {
            client,
            table_name: table_name.to_string(),
            topics: Mutex::new(BTreeSet::new()),
        }
    }
}

#[async_trait]
impl EventPublisher for DDBPublisher {
    async fn create_topic(&self, topic: &str) -> Result<String, LibraryError> {
        self.topics.lock().await.insert(topic.to_string());
        Ok(format!("{}/{}", self.table_name, topic))
    }

    async fn get_topics(&self) -> Result<Vec<String>, LibraryError> {
        Ok(self.topics.lock().await.iter().cloned().collect())
    }

    async fn publish(&self, event: &DomainEvent) -> Result<(), LibraryError> {
        put_new(&self.client, self.table_name.as_str(), "event_id", event).await?;
        self.topics.lock().await.insert(event.name.to_string());
        Ok(())
    }
}

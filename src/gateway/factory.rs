use crate::core::repository::RepositoryStore;
use crate::gateway::ddb::publisher::{DDBPublisher, EVENTS_TABLE};
use crate::gateway::events::EventPublisher;
use crate::gateway::GatewayPublisherVia;
use crate::gateway::memory::publisher::MemoryPublisher;
use crate::gateway::sns::publisher::SNSPublisher;
use crate::utils::ddb::{build_db_client, build_sns_client, create_table};

pub(crate) async fn create_publisher(via: GatewayPublisherVia) -> Box<dyn EventPublisher> {
    match via {
        GatewayPublisherVia::Sns => {
            let client = build_sns_client().await;
            Box::new(SNSPublisher::new(client))
        }
        GatewayPublisherVia::LocalDynamoDB => {
            let client = build_db_client(RepositoryStore::LocalDynamoDB).await;
            let _ = create_table(&client, EVENTS_TABLE, "event_id", "name", "created_at").await;
            Box::new(DDBPublisher::new(client, EVENTS_TABLE))
        }
        GatewayPublisherVia::InMemory => {
            Box::new(MemoryPublisher::new())
        }
    }
}

use crate::core::domain::Configuration;
use crate::core::repository::RepositoryStore;
use crate::notifications::domain::NotificationService;
use crate::notifications::domain::service::NotificationServiceImpl;
use crate::notifications::repository::NotificationRepository;
use crate::notifications::repository::ddb_notification_repository::DDBNotificationRepository;
use crate::notifications::repository::memory_notification_repository::MemoryNotificationRepository;
use crate::utils::ddb::{build_db_client, create_table};
use crate::utils::memory::MemoryDatabase;
use std::sync::Arc;

pub(crate) const NOTIFICATIONS_TABLE: &str = "notifications";

pub(crate) async fn create_notification_repository(store: RepositoryStore) -> Box<dyn NotificationRepository> {
    match store {
        RepositoryStore::DynamoDB => {
            let client = build_db_client(store).await;
            Box::new(DDBNotificationRepository::new(client, NOTIFICATIONS_TABLE, "notifications_ndx"))
        }
        RepositoryStore::LocalDynamoDB => {
            let client = build_db_client(store).await;
            let _ = create_table(&client, NOTIFICATIONS_TABLE, "notification_id", "patron_id", "sent_at").await;
            Box::new(DDBNotificationRepository::new(client, NOTIFICATIONS_TABLE, "notifications_ndx"))
        }
        RepositoryStore::InMemory => {
            Box::new(MemoryNotificationRepository::new(MemoryDatabase::shared(), NOTIFICATIONS_TABLE))
        }
    }
}

pub(crate) async fn create_notification_service(config: &Configuration, store: RepositoryStore) -> Arc<dyn NotificationService> {
    let notification_repo = create_notification_repository(store).await;
    Arc::new(NotificationServiceImpl::new(config, notification_repo))
}

use std::sync::Arc;
use crate::books::factory::BOOKS_TABLE;
use crate::catalog::factory::create_catalog_service;
use crate::core::domain::Configuration;
use crate::core::repository::RepositoryStore;
use crate::gateway::factory::create_publisher;
use crate::hold::domain::HoldService;
use crate::hold::domain::service::HoldServiceImpl;
use crate::hold::repository::HoldRepository;
use crate::hold::repository::ddb_hold_repository::DDBHoldRepository;
use crate::hold::repository::memory_hold_repository::MemoryHoldRepository;
use crate::notifications::factory::NOTIFICATIONS_TABLE;
use crate::patrons::factory::create_patron_service;
use crate::utils::ddb::{build_db_client, create_table};
use crate::utils::memory::MemoryDatabase;

pub(crate) const HOLDS_TABLE: &str = "holds";

pub(crate) async fn create_hold_repository(store: RepositoryStore) -> Box<dyn HoldRepository> {
    match store {
        RepositoryStore::DynamoDB => {
            let client = build_db_client(store).await;
            Box::new(DDBHoldRepository::new(client, HOLDS_TABLE, "holds_ndx", BOOKS_TABLE, NOTIFICATIONS_TABLE))
        }
        RepositoryStore::LocalDynamoDB => {
            let client = build_db_client(store).await;
            let _ = create_table(&client, HOLDS_TABLE, "hold_id", "book_id", "created_at").await;
            Box::new(DDBHoldRepository::new(client, HOLDS_TABLE, "holds_ndx", BOOKS_TABLE, NOTIFICATIONS_TABLE))
        }
        RepositoryStore::InMemory => {
            Box::new(MemoryHoldRepository::new(MemoryDatabase::shared(), HOLDS_TABLE, BOOKS_TABLE, NOTIFICATIONS_TABLE))
        }
    }
}

// One engine per process: its per-item locks only serialize callers that share it.
pub(crate) async fn create_hold_service(config: &Configuration, store: RepositoryStore) -> Arc<dyn HoldService> {
    let hold_repository = create_hold_repository(store).await;
    let catalog_svc = create_catalog_service(config, store).await;
    let patron_svc = create_patron_service(config, store).await;
    let publisher = create_publisher(store.gateway_publisher()).await;
    Arc::new(HoldServiceImpl::new(config, hold_repository, patron_svc, catalog_svc, publisher))
}

use crate::core::domain::Configuration;
use crate::core::repository::RepositoryStore;
use crate::patrons::domain::PatronService;
use crate::patrons::domain::service::PatronServiceImpl;
use crate::patrons::repository::PatronRepository;
use crate::patrons::repository::ddb_patron_repository::DDBPatronRepository;
use crate::patrons::repository::memory_patron_repository::MemoryPatronRepository;
use crate::utils::ddb::{build_db_client, create_table};
use crate::utils::memory::MemoryDatabase;

pub(crate) const PATRONS_TABLE: &str = "patrons";

pub(crate) async fn create_patron_repository(store: RepositoryStore) -> Box<dyn PatronRepository> {
    match store {
        RepositoryStore::DynamoDB => {
            let client = build_db_client(store).await;
            Box::new(DDBPatronRepository::new(client, PATRONS_TABLE, "patrons_ndx"))
        }
        RepositoryStore::LocalDynamoDB => {
            let client = build_db_client(store).await;
            let _ = create_table(&client, PATRONS_TABLE, "patron_id", "email", "created_at").await;
            Box::new(DDBPatronRepository::new(client, PATRONS_TABLE, "patrons_ndx"))
        }
        RepositoryStore::InMemory => {
            Box::new(MemoryPatronRepository::new(MemoryDatabase::shared(), PATRONS_TABLE))
        }
    }
}

pub(crate) async fn create_patron_service(config: &Configuration, store: RepositoryStore) -> Box<dyn PatronService> {
    let patron_repo = create_patron_repository(store).await;
    Box::new(PatronServiceImpl::new(config, patron_repo))
}

pub(crate) mod ddb_patron_repository;
pub(crate) mod memory_patron_repository;

use async_trait::async_trait;
use crate::core::library::LibraryResult;
use crate::core::repository::Repository;
use crate::patrons::domain::model::PatronEntity;

#[async_trait]
pub(crate) trait PatronRepository: Repository<PatronEntity> {
    async fn find_by_email(&self, email: &str) -> LibraryResult<Vec<PatronEntity>>;
}

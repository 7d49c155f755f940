pub mod ddb_notification_repository;
pub mod memory_notification_repository;

use async_trait::async_trait;
use crate::core::library::LibraryResult;
use crate::core::repository::Repository;
use crate::notifications::domain::model::NotificationEntity;

#[async_trait]
pub(crate) trait NotificationRepository: Repository<NotificationEntity> {
    async fn find_unread(&self, patron_id: &str) -> LibraryResult<Vec<NotificationEntity>>;
}

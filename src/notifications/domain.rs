pub mod model;
pub mod service;

use async_trait::async_trait;
use crate::core::library::LibraryResult;
use crate::notifications::dto::NotificationDto;

#[async_trait]
pub(crate) trait NotificationService: Sync + Send {
    // newest first
    async fn list_unread(&self, patron_id: &str) -> LibraryResult<Vec<NotificationDto>>;
    async fn mark_read(&self, notification_id: &str) -> LibraryResult<NotificationDto>;
}

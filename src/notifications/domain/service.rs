use async_trait::async_trait;
use chrono::Utc;
use tracing::debug;
use crate::core::domain::Configuration;
use crate::core::library::LibraryResult;
use crate::notifications::domain::NotificationService;
use crate::notifications::dto::NotificationDto;
use crate::notifications::repository::NotificationRepository;

pub(crate) struct NotificationServiceImpl {
    notification_repository: Box<dyn NotificationRepository>,
}

impl NotificationServiceImpl {
    pub(crate) fn new(_config: &Configuration, notification_repository: Box<dyn NotificationRepository>) -> Self {
        Self {
            notification_repository,
        }
    }
}

#[async_trait]
impl NotificationService for NotificationServiceImpl {
    async fn list_unread(&self, patron_id: &str) -> LibraryResult<Vec<NotificationDto>> {
        let mut unread = self.notification_repository.find_unread(patron_id).await?;
        unread.sort_by(|a, b| b.sent_at.cmp(&a.sent_at));
        Ok(unread.iter().map(NotificationDto::from).collect())
    }

    async fn mark_read(&self, notification_id: &str) -> LibraryResult<NotificationDto> {
        let mut notification = self.notification_repository.get(notification_id).await?;
        if notification.is_read {
            return Ok(NotificationDto::from(&notification));
        }
        notification.is_read = true;
        notification.updated_at = Utc::now().naive_utc();
        self.notification_repository.update(&notification).await?;
        debug!("notification {} read by {}", notification_id, notification.patron_id);
        notification.version += 1;
        Ok(NotificationDto::from(&notification))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use chrono::{Duration, Utc};
    use crate::core::domain::Configuration;
    use crate::core::library::{LibraryError, NotificationCategory};
    use crate::core::repository::Repository;
    use crate::notifications::domain::model::NotificationEntity;
    use crate::notifications::domain::NotificationService;
    use crate::notifications::domain::service::NotificationServiceImpl;
    use crate::notifications::repository::memory_notification_repository::MemoryNotificationRepository;
    use crate::utils::memory::MemoryDatabase;

    #[tokio::test]
    async fn test_should_list_unread_newest_first_and_mark_read() {
        let db = Arc::new(MemoryDatabase::new());
        let repo = MemoryNotificationRepository::new(db.clone(), "notifications");
        let now = Utc::now().naive_utc();
        let older = NotificationEntity::new("p1", Some("h1"), NotificationCategory::Ready, "older", now - Duration::hours(1));
        let newer = NotificationEntity::new("p1", Some("h2"), NotificationCategory::Expiry, "newer", now);
        let other = NotificationEntity::new("p2", None, NotificationCategory::Reminder, "other", now);
        for n in [&older, &newer, &other] {
            repo.create(n).await.expect("should create notification");
        }
        let svc = NotificationServiceImpl::new(&Configuration::new("test"),
                                               Box::new(MemoryNotificationRepository::new(db, "notifications")));

        let unread = svc.list_unread("p1").await.expect("should list unread");
        assert_eq!(vec!["newer", "older"], unread.iter().map(|n| n.message.as_str()).collect::<Vec<&str>>());

        let read = svc.mark_read(newer.notification_id.as_str()).await.expect("should mark read");
        assert!(read.is_read);
        let again = svc.mark_read(newer.notification_id.as_str()).await.expect("should stay read");
        assert!(again.is_read);
        assert_eq!(read.version, again.version);

        let unread = svc.list_unread("p1").await.expect("should list unread");
        assert_eq!(1, unread.len());
        assert_eq!("older", unread[0].message.as_str());
    }

    #[tokio::test]
    async fn test_should_fail_mark_read_for_unknown_notification() {
        let svc = NotificationServiceImpl::new(&Configuration::new("test"),
                                               Box::new(MemoryNotificationRepository::new(Arc::new(MemoryDatabase::new()), "notifications")));
        assert!(matches!(svc.mark_read("missing").await, Err(LibraryError::NotFound { .. })));
    }
}

pub mod ddb_hold_repository;
pub mod memory_hold_repository;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use crate::books::domain::model::BookEntity;
use crate::core::library::{BookStatus, HoldStatus, LibraryResult};
use crate::core::repository::Repository;
use crate::hold::domain::model::HoldEntity;
use crate::notifications::domain::model::NotificationEntity;

// HoldTransaction gathers every write of one queue mutation. The book carries the
// version it was read at and is always rewritten, so two writers that read the same
// queue cannot both commit.
#[derive(Debug, Clone)]
pub(crate) struct HoldTransaction {
    pub book: BookEntity,
    pub created: Vec<HoldEntity>,
    pub updated: Vec<HoldEntity>,
    pub notifications: Vec<NotificationEntity>,
}

impl HoldTransaction {
    pub(crate) fn new(book: BookEntity, now: NaiveDateTime) -> Self {
        let mut book = book;
        book.updated_at = now;
        Self {
            book,
            created: vec![],
            updated: vec![],
            notifications: vec![],
        }
    }

    pub(crate) fn set_book_status(&mut self, status: BookStatus) {
        self.book.book_status = status;
    }

    pub(crate) fn create(&mut self, hold: HoldEntity) {
        self.created.push(hold);
    }

    // a later change to the same hold replaces the earlier one
    pub(crate) fn update(&mut self, hold: HoldEntity) {
        if let Some(existing) = self.updated.iter_mut().find(|h| h.hold_id == hold.hold_id) {
            *existing = hold;
        } else {
            self.updated.push(hold);
        }
    }

    pub(crate) fn notify(&mut self, notification: NotificationEntity) {
        self.notifications.push(notification);
    }

    pub(crate) fn size(&self) -> usize {
        1 + self.created.len() + self.updated.len() + self.notifications.len()
    }
}

#[async_trait]
pub(crate) trait HoldRepository: Repository<HoldEntity> {
    // active holds only
    async fn find_by_book(&self, book_id: &str) -> LibraryResult<Vec<HoldEntity>>;

    // active holds only
    async fn find_by_patron(&self, patron_id: &str) -> LibraryResult<Vec<HoldEntity>>;

    async fn find_by_status(&self, status: HoldStatus) -> LibraryResult<Vec<HoldEntity>>;

    async fn find_ready_expiring_before(&self, cutoff: NaiveDateTime) -> LibraryResult<Vec<HoldEntity>>;

    // all or nothing; a stale book or hold version fails with Conflict
    async fn commit(&self, txn: &HoldTransaction) -> LibraryResult<usize>;
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use crate::books::domain::model::BookEntity;
    use crate::core::library::{BookStatus, NotificationCategory};
    use crate::hold::domain::model::HoldEntity;
    use crate::hold::repository::HoldTransaction;
    use crate::notifications::domain::model::NotificationEntity;

    #[tokio::test]
    async fn test_should_merge_updates_of_same_hold() {
        let now = Utc::now().naive_utc();
        let book = BookEntity::new("isbn", "title", BookStatus::CheckedOut);
        let mut txn = HoldTransaction::new(book, now);
        let mut hold = HoldEntity::new("branch", "book1", "patron1", now).with_rank(2);
        txn.update(hold.clone());
        hold.queue_rank = Some(1);
        txn.update(hold.clone());
        txn.create(HoldEntity::new("branch", "book1", "patron2", now));
        txn.notify(NotificationEntity::new("patron1", None, NotificationCategory::Ready, "ready", now));
        txn.set_book_status(BookStatus::OnHold);
        assert_eq!(1, txn.updated.len());
        assert_eq!(Some(1), txn.updated[0].queue_rank);
        assert_eq!(4, txn.size());
        assert_eq!(BookStatus::OnHold, txn.book.book_status);
        assert_eq!(now, txn.book.updated_at);
    }
}

use std::collections::HashMap;
use std::sync::Arc;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde_json::Value;
use crate::core::library::{HoldStatus, LibraryResult, PaginatedResult};
use crate::core::repository::Repository;
use crate::hold::domain::model::HoldEntity;
use crate::hold::repository::{HoldRepository, HoldTransaction};
use crate::utils::memory::{MemoryDatabase, WriteOp};

#[derive(Debug)]
pub struct MemoryHoldRepository {
    db: Arc<MemoryDatabase>,
    table_name: String,
    books_table: String,
    notifications_table: String,
}

impl MemoryHoldRepository {
    pub(crate) fn new(db: Arc<MemoryDatabase>, table_name: &str,
                      books_table: &str, notifications_table: &str) -> Self {
        Self {
            db,
            table_name: table_name.to_string(),
            books_table: books_table.to_string(),
            notifications_table: notifications_table.to_string(),
        }
    }

    fn scan<F>(&self, filter: F) -> LibraryResult<Vec<HoldEntity>>
        where F: Fn(&HoldEntity) -> bool {
        let records = self.db.scan(self.table_name.as_str(), |_| true)?;
        let holds = records.into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<HoldEntity>, serde_json::Error>>()?;
        Ok(holds.into_iter().filter(|h| filter(h)).collect())
    }
}

#[async_trait]
impl Repository<HoldEntity> for MemoryHoldRepository {
    async fn create(&self, entity: &HoldEntity) -> LibraryResult<usize> {
        self.db.put_if_absent(self.table_name.as_str(), entity.hold_id.as_str(), serde_json::to_value(entity)?)
    }

    async fn update(&self, entity: &HoldEntity) -> LibraryResult<usize> {
        self.db.update_versioned(self.table_name.as_str(), entity.hold_id.as_str(), serde_json::to_value(entity)?)
    }

    async fn get(&self, id: &str) -> LibraryResult<HoldEntity> {
        let val = self.db.get(self.table_name.as_str(), id)?;
        Ok(serde_json::from_value(val)?)
    }

    async fn delete(&self, id: &str) -> LibraryResult<usize> {
        self.db.delete(self.table_name.as_str(), id)
    }

    async fn query(&self, predicate: &HashMap<String, String>,
                   page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<HoldEntity>> {
        let res = self.db.query(self.table_name.as_str(), predicate, page, page_size)?;
        let records = res.records.into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<HoldEntity>, serde_json::Error>>()?;
        Ok(PaginatedResult::new(page, page_size, res.next_page, records))
    }
}

#[async_trait]
impl HoldRepository for MemoryHoldRepository {
    async fn find_by_book(&self, book_id: &str) -> LibraryResult<Vec<HoldEntity>> {
        self.scan(|h| h.book_id == book_id && h.hold_status.is_active())
    }

    async fn find_by_patron(&self, patron_id: &str) -> LibraryResult<Vec<HoldEntity>> {
        self.scan(|h| h.patron_id == patron_id && h.hold_status.is_active())
    }

    async fn find_by_status(&self, status: HoldStatus) -> LibraryResult<Vec<HoldEntity>> {
        self.scan(|h| h.hold_status == status)
    }

    async fn find_ready_expiring_before(&self, cutoff: NaiveDateTime) -> LibraryResult<Vec<HoldEntity>> {
        self.scan(|h| h.hold_status == HoldStatus::Ready && h.expires_at.map(|at| at < cutoff).unwrap_or(false))
    }

    async fn commit(&self, txn: &HoldTransaction) -> LibraryResult<usize> {
        let mut ops = vec![
            WriteOp::update(self.books_table.as_str(), txn.book.book_id.as_str(), serde_json::to_value(&txn.book)?),
        ];
        for hold in &txn.created {
            ops.push(WriteOp::put(self.table_name.as_str(), hold.hold_id.as_str(), serde_json::to_value(hold)?));
        }
        for hold in &txn.updated {
            ops.push(WriteOp::update(self.table_name.as_str(), hold.hold_id.as_str(), serde_json::to_value(hold)?));
        }
        for notification in &txn.notifications {
            let val: Value = serde_json::to_value(notification)?;
            ops.push(WriteOp::put(self.notifications_table.as_str(), notification.notification_id.as_str(), val));
        }
        self.db.transact(ops)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use chrono::{Duration, Utc};
    use crate::books::domain::model::BookEntity;
    use crate::books::repository::memory_book_repository::MemoryBookRepository;
    use crate::core::library::{BookStatus, HoldStatus, LibraryError, NotificationCategory};
    use crate::core::repository::Repository;
    use crate::hold::domain::model::HoldEntity;
    use crate::hold::repository::{HoldRepository, HoldTransaction};
    use crate::hold::repository::memory_hold_repository::MemoryHoldRepository;
    use crate::notifications::domain::model::NotificationEntity;
    use crate::utils::memory::MemoryDatabase;

    fn build_repos() -> (MemoryHoldRepository, MemoryBookRepository) {
        let db = Arc::new(MemoryDatabase::new());
        (MemoryHoldRepository::new(db.clone(), "holds", "books", "notifications"),
         MemoryBookRepository::new(db, "books"))
    }

    #[tokio::test]
    async fn test_should_create_update_get_hold() {
        let (hold_repo, _) = build_repos();
        let mut hold = HoldEntity::new("branch", "book1", "patron1", Utc::now().naive_utc()).with_rank(1);
        assert_eq!(1, hold_repo.create(&hold).await.expect("should create hold"));
        hold.queue_rank = Some(2);
        assert_eq!(1, hold_repo.update(&hold).await.expect("should update hold"));
        let loaded = hold_repo.get(hold.hold_id.as_str()).await.expect("should get hold");
        assert_eq!(Some(2), loaded.queue_rank);
        assert_eq!(1, loaded.version);
        assert!(matches!(hold_repo.update(&hold).await, Err(LibraryError::Conflict { .. })));
        assert_eq!(1, hold_repo.delete(hold.hold_id.as_str()).await.expect("should delete hold"));
    }

    #[tokio::test]
    async fn test_should_find_active_holds() {
        let (hold_repo, _) = build_repos();
        let now = Utc::now().naive_utc();
        let waiting = HoldEntity::new("branch", "book1", "patron1", now).with_rank(1);
        let mut ready = HoldEntity::new("branch", "book1", "patron2", now);
        ready.promote(now, Duration::days(3));
        let mut done = HoldEntity::new("branch", "book1", "patron1", now);
        done.fulfill(now);
        for hold in [&waiting, &ready, &done] {
            hold_repo.create(hold).await.expect("should create hold");
        }
        assert_eq!(2, hold_repo.find_by_book("book1").await.expect("should find").len());
        assert_eq!(1, hold_repo.find_by_patron("patron1").await.expect("should find").len());
        assert_eq!(1, hold_repo.find_by_status(HoldStatus::Fulfilled).await.expect("should find").len());
        assert!(hold_repo.find_ready_expiring_before(now + Duration::days(3)).await.expect("should find").is_empty());
        assert_eq!(1, hold_repo.find_ready_expiring_before(now + Duration::days(4)).await.expect("should find").len());
    }

    #[tokio::test]
    async fn test_should_commit_transaction() {
        let (hold_repo, book_repo) = build_repos();
        let now = Utc::now().naive_utc();
        let book = BookEntity::new("isbn", "title", BookStatus::Available);
        book_repo.create(&book).await.expect("should create book");

        let mut hold = HoldEntity::new("branch", book.book_id.as_str(), "patron1", now);
        hold.promote(now, Duration::days(3));
        let mut txn = HoldTransaction::new(book.clone(), now);
        txn.set_book_status(BookStatus::OnHold);
        txn.create(hold.clone());
        txn.notify(NotificationEntity::new("patron1", Some(hold.hold_id.as_str()), NotificationCategory::Ready, "ready", now));
        assert_eq!(3, hold_repo.commit(&txn).await.expect("should commit"));

        let loaded = book_repo.get(book.book_id.as_str()).await.expect("should get book");
        assert_eq!(BookStatus::OnHold, loaded.book_status);
        assert_eq!(1, loaded.version);

        // same book version again is stale and leaves nothing behind
        let mut stale = HoldTransaction::new(book, now);
        let other = HoldEntity::new("branch", loaded.book_id.as_str(), "patron2", now).with_rank(1);
        stale.create(other.clone());
        assert!(matches!(hold_repo.commit(&stale).await, Err(LibraryError::Conflict { .. })));
        assert!(hold_repo.get(other.hold_id.as_str()).await.is_err());
    }
}

use std::collections::HashMap;
use std::sync::Arc;
use async_trait::async_trait;
use serde_json::Value;
use crate::core::library::{LibraryResult, PaginatedResult};
use crate::core::repository::Repository;
use crate::notifications::domain::model::NotificationEntity;
use crate::notifications::repository::NotificationRepository;
use crate::utils::memory::MemoryDatabase;

#[derive(Debug)]
pub struct MemoryNotificationRepository {
    db: Arc<MemoryDatabase>,
    table_name: String,
}

impl MemoryNotificationRepository {
    pub(crate) fn new(db: Arc<MemoryDatabase>, table_name: &str) -> Self {
        Self {
            db,
            table_name: table_name.to_string(),
        }
    }
}

#[async_trait]
impl Repository<NotificationEntity> for MemoryNotificationRepository {
    async fn create(&self, entity: &NotificationEntity) -> LibraryResult<usize> {
        self.db.put_if_absent(self.table_name.as_str(), entity.notification_id.as_str(), serde_json::to_value(entity)?)
    }

    async fn update(&self, entity: &NotificationEntity) -> LibraryResult<usize> {
        self.db.update_versioned(self.table_name.as_str(), entity.notification_id.as_str(), serde_json::to_value(entity)?)
    }

    async fn get(&self, id: &str) -> LibraryResult<NotificationEntity> {
        let val = self.db.get(self.table_name.as_str(), id)?;
        Ok(serde_json::from_value(val)?)
    }

    async fn delete(&self, id: &str) -> LibraryResult<usize> {
        self.db.delete(self.table_name.as_str(), id)
    }

    async fn query(&self, predicate: &HashMap<String, String>,
                   page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<NotificationEntity>> {
        let res = self.db.query(self.table_name.as_str(), predicate, page, page_size)?;
        let records = res.records.into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<NotificationEntity>, serde_json::Error>>()?;
        Ok(PaginatedResult::new(page, page_size, res.next_page, records))
    }
}

#[async_trait]
impl NotificationRepository for MemoryNotificationRepository {
    async fn find_unread(&self, patron_id: &str) -> LibraryResult<Vec<NotificationEntity>> {
        let records = self.db.scan(self.table_name.as_str(), |v| {
            v.get("patron_id").and_then(Value::as_str) == Some(patron_id) &&
                v.get("is_read").and_then(Value::as_bool) == Some(false)
        })?;
        Ok(records.into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<NotificationEntity>, serde_json::Error>>()?)
    }
}

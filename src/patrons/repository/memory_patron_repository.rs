use std::collections::HashMap;
use std::sync::Arc;
use async_trait::async_trait;
use crate::core::library::{LibraryResult, PaginatedResult};
use crate::core::repository::Repository;
use crate::patrons::domain::model::PatronEntity;
use crate::patrons::repository::PatronRepository;
use crate::utils::memory::MemoryDatabase;

#[derive(Debug)]
pub(crate) struct MemoryPatronRepository {
    db: Arc<MemoryDatabase>,
    table_name: String,
}

impl MemoryPatronRepository {
    pub(crate) fn new(db: Arc<MemoryDatabase>, table_name: &str) -> Self {
        Self {
            db,
            table_name: table_name.to_string(),
        }
    }
}

#[async_trait]
impl Repository<PatronEntity> for MemoryPatronRepository {
    async fn create(&self, entity: &PatronEntity) -> LibraryResult<usize> {
        self.db.put_if_absent(self.table_name.as_str(), entity.patron_id.as_str(), serde_json::to_value(entity)?)
    }

    async fn update(&self, entity: &PatronEntity) -> LibraryResult<usize> {
        self.db.update_versioned(self.table_name.as_str(), entity.patron_id.as_str(), serde_json::to_value(entity)?)
    }

    async fn get(&self, id: &str) -> LibraryResult<PatronEntity> {
        let val = self.db.get(self.table_name.as_str(), id)?;
        Ok(serde_json::from_value(val)?)
    }

    async fn delete(&self, id: &str) -> LibraryResult<usize> {
        self.db.delete(self.table_name.as_str(), id)
    }

    async fn query(&self, predicate: &HashMap<String, String>,
                   page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<PatronEntity>> {
        let res = self.db.query(self.table_name.as_str(), predicate, page, page_size)?;
        let records = res.records.into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<PatronEntity>, serde_json::Error>>()?;
        Ok(PaginatedResult::new(page, page_size, res.next_page, records))
    }
}

#[async_trait]
impl PatronRepository for MemoryPatronRepository {
    async fn find_by_email(&self, email: &str) -> LibraryResult<Vec<PatronEntity>> {
        let predicate = HashMap::from([
            ("email".to_string(), email.to_string()),
        ]);
        let res = self.query(&predicate, None, 50).await?;
        Ok(res.records)
    }
}

use std::collections::HashMap;
use std::sync::Arc;
use async_trait::async_trait;
use crate::books::domain::model::BookEntity;
use crate::books::repository::BookRepository;
use crate::core::library::{LibraryResult, PaginatedResult};
use crate::core::repository::Repository;
use crate::utils::memory::MemoryDatabase;

#[derive(Debug)]
pub struct MemoryBookRepository {
    db: Arc<MemoryDatabase>,
    table_name: String,
}

impl MemoryBookRepository {
    pub(crate) fn new(db: Arc<MemoryDatabase>, table_name: &str) -> Self {
        Self {
            db,
            table_name: table_name.to_string(),
        }
    }
}

#[async_trait]
impl Repository<BookEntity> for MemoryBookRepository {
    async fn create(&self, entity: &BookEntity) -> LibraryResult<usize> {
        self.db.put_if_absent(self.table_name.as_str(), entity.book_id.as_str(), serde_json::to_value(entity)?)
    }

    async fn update(&self, entity: &BookEntity) -> LibraryResult<usize> {
        self.db.update_versioned(self.table_name.as_str(), entity.book_id.as_str(), serde_json::to_value(entity)?)
    }

    async fn get(&self, id: &str) -> LibraryResult<BookEntity> {
        let val = self.db.get(self.table_name.as_str(), id)?;
        Ok(serde_json::from_value(val)?)
    }

    async fn delete(&self, id: &str) -> LibraryResult<usize> {
        self.db.delete(self.table_name.as_str(), id)
    }

    async fn query(&self, predicate: &HashMap<String, String>,
                   page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<BookEntity>> {
        let res = self.db.query(self.table_name.as_str(), predicate, page, page_size)?;
        let records = res.records.into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<BookEntity>, serde_json::Error>>()?;
        Ok(PaginatedResult::new(page, page_size, res.next_page, records))
    }
}

impl BookRepository for MemoryBookRepository {}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;
    use crate::books::domain::model::BookEntity;
    use crate::books::repository::memory_book_repository::MemoryBookRepository;
    use crate::core::library::{BookStatus, LibraryError};
    use crate::core::repository::Repository;
    use crate::utils::memory::MemoryDatabase;

    #[tokio::test]
    async fn test_should_create_update_books() {
        let books_repo = MemoryBookRepository::new(Arc::new(MemoryDatabase::new()), "books");
        let mut book = BookEntity::new("isbn", "test book", BookStatus::Available);
        assert_eq!(1, books_repo.create(&book).await.expect("should create book"));
        assert!(matches!(books_repo.create(&book).await, Err(LibraryError::DuplicateKey { .. })));

        book.book_status = BookStatus::CheckedOut;
        books_repo.update(&book).await.expect("should update book");
        let loaded = books_repo.get(book.book_id.as_str()).await.expect("should return book");
        assert_eq!(BookStatus::CheckedOut, loaded.book_status);
        assert_eq!(1, loaded.version);
        assert!(matches!(books_repo.update(&book).await, Err(LibraryError::Conflict { .. })));
    }

    #[tokio::test]
    async fn test_should_query_books() {
        let books_repo = MemoryBookRepository::new(Arc::new(MemoryDatabase::new()), "books");
        for i in 0..30 {
            let status = if i % 3 == 0 { BookStatus::OnHold } else { BookStatus::Available };
            let book = BookEntity::new(format!("isbn_{}", i / 10).as_str(), "title", status);
            books_repo.create(&book).await.expect("should create book");
        }
        let by_isbn = HashMap::from([("isbn".to_string(), "isbn_1".to_string())]);
        let res = books_repo.query(&by_isbn, None, 100).await.expect("should return books");
        assert_eq!(10, res.records.len());
        let predicate = HashMap::from([("book_status".to_string(), BookStatus::OnHold.to_string())]);
        let res = books_repo.query(&predicate, None, 100).await.expect("should return books");
        assert_eq!(10, res.records.len());
    }
}

use crate::books::repository::BookRepository;
use crate::books::repository::ddb_book_repository::DDBBookRepository;
use crate::books::repository::memory_book_repository::MemoryBookRepository;
use crate::core::repository::RepositoryStore;
use crate::utils::ddb::{build_db_client, create_table};
use crate::utils::memory::MemoryDatabase;

pub(crate) const BOOKS_TABLE: &str = "books";

pub(crate) async fn create_book_repository(store: RepositoryStore) -> Box<dyn BookRepository> {
    match store {
        RepositoryStore::DynamoDB => {
            let client = build_db_client(store).await;
            Box::new(DDBBookRepository::new(client, BOOKS_TABLE, "books_ndx"))
        }
        RepositoryStore::LocalDynamoDB => {
            let client = build_db_client(store).await;
            let _ = create_table(&client, BOOKS_TABLE, "book_id", "book_status", "isbn").await;
            Box::new(DDBBookRepository::new(client, BOOKS_TABLE, "books_ndx"))
        }
        RepositoryStore::InMemory => {
            Box::new(MemoryBookRepository::new(MemoryDatabase::shared(), BOOKS_TABLE))
        }
    }
}

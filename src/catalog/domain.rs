pub mod service;

use async_trait::async_trait;
use crate::books::dto::BookDto;
use crate::core::library::{BookStatus, LibraryResult};

// CatalogService owns the availability view of books. The hold engine reads it and
// writes statuses through its own transaction; circulation moves books on and off
// loan through `change_status`.
#[async_trait]
pub(crate) trait CatalogService: Sync + Send {
    async fn add_book(&self, book: &BookDto) -> LibraryResult<BookDto>;
    async fn find_book_by_id(&self, id: &str) -> LibraryResult<BookDto>;
    // rejected with Conflict when the book moved since `book` was read
    async fn change_status(&self, book: &BookDto, status: BookStatus) -> LibraryResult<BookDto>;
}

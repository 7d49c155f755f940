pub mod ddb_book_repository;
pub mod memory_book_repository;

use crate::books::domain::model::BookEntity;
use crate::core::repository::Repository;

// BookRepository stores the availability view of catalog entries; lookups by
// status or isbn go through `Repository::query`.
pub(crate) trait BookRepository: Repository<BookEntity> {}

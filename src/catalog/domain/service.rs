use std::collections::HashMap;
use async_trait::async_trait;
use chrono::Utc;
use tracing::debug;
use crate::books::domain::model::BookEntity;
use crate::books::dto::BookDto;
use crate::books::repository::BookRepository;
use crate::catalog::domain::CatalogService;
use crate::core::domain::Configuration;
use crate::core::events::DomainEvent;
use crate::core::library::{BookStatus, LibraryError, LibraryResult};
use crate::gateway::events::EventPublisher;

pub(crate) struct CatalogServiceImpl {
    book_repository: Box<dyn BookRepository>,
    events_publisher: Box<dyn EventPublisher>,
}

impl CatalogServiceImpl {
    pub(crate) fn new(_config: &Configuration, book_repository: Box<dyn BookRepository>,
                      events_publisher: Box<dyn EventPublisher>) -> Self {
        Self {
            book_repository,
            events_publisher,
        }
    }
}

#[async_trait]
impl CatalogService for CatalogServiceImpl {
    async fn add_book(&self, book: &BookDto) -> LibraryResult<BookDto> {
        if book.title.trim().is_empty() {
            return Err(LibraryError::validation("book title is required", Some("400".to_string())));
        }
        let _ = self.book_repository.create(&BookEntity::from(book)).await?;
        self.events_publisher.publish_after_commit(DomainEvent::added(
            "book_added", "books", book.book_id.as_str(), &HashMap::new(), book)).await;
        Ok(book.clone())
    }

    async fn find_book_by_id(&self, id: &str) -> LibraryResult<BookDto> {
        self.book_repository.get(id).await.map(|b| BookDto::from(&b))
    }

    async fn change_status(&self, book: &BookDto, status: BookStatus) -> LibraryResult<BookDto> {
        let mut entity = BookEntity::from(book);
        entity.book_status = status;
        entity.updated_at = Utc::now().naive_utc();
        let _ = self.book_repository.update(&entity).await?;
        debug!("book {} moved from {} to {}", book.book_id, book.book_status, status);
        entity.version += 1;
        let changed = BookDto::from(&entity);
        let metadata = HashMap::from([("previous_status".to_string(), book.book_status.to_string())]);
        self.events_publisher.publish_after_commit(DomainEvent::updated(
            "book_status_changed", "books", changed.book_id.as_str(), &metadata, &changed)).await;
        Ok(changed)
    }
}

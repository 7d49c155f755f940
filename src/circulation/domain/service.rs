use std::collections::HashMap;
use std::sync::Arc;
use async_trait::async_trait;
use tracing::info;
use crate::books::dto::BookDto;
use crate::catalog::domain::CatalogService;
use crate::circulation::domain::CirculationService;
use crate::core::events::DomainEvent;
use crate::core::library::{BookStatus, LibraryError, LibraryResult};
use crate::gateway::events::EventPublisher;
use crate::hold::domain::HoldService;
use crate::hold::dto::HoldDto;
use crate::patrons::domain::PatronService;

const BOOK_BORROWED: &str = "book_borrowed";
const BOOK_RETURNED: &str = "book_returned";

pub(crate) struct CirculationServiceImpl {
    patron_service: Box<dyn PatronService>,
    catalog_service: Box<dyn CatalogService>,
    hold_service: Arc<dyn HoldService>,
    events_publisher: Box<dyn EventPublisher>,
}

impl CirculationServiceImpl {
    pub(crate) fn new(patron_service: Box<dyn PatronService>, catalog_service: Box<dyn CatalogService>,
                      hold_service: Arc<dyn HoldService>, events_publisher: Box<dyn EventPublisher>) -> Self {
        Self {
            patron_service,
            catalog_service,
            hold_service,
            events_publisher,
        }
    }

    async fn lend(&self, book: BookDto, patron_id: &str) -> LibraryResult<BookDto> {
        let lent = self.catalog_service.change_status(&book, BookStatus::CheckedOut).await?;
        info!("book {} lent to patron {}", lent.book_id, patron_id);
        self.publish_borrowed(&lent, patron_id).await;
        Ok(lent)
    }

    async fn publish_borrowed(&self, book: &BookDto, patron_id: &str) {
        let metadata = HashMap::from([("patron_id".to_string(), patron_id.to_string())]);
        self.publish(BOOK_BORROWED, book, &metadata).await;
    }

    async fn publish(&self, name: &str, book: &BookDto, metadata: &HashMap<String, String>) {
        self.events_publisher.publish_after_commit(
            DomainEvent::updated(name, "books", book.book_id.as_str(), metadata, book)).await;
    }
}

#[async_trait]
impl CirculationService for CirculationServiceImpl {
    async fn borrow(&self, book_id: &str, patron_id: &str) -> LibraryResult<BookDto> {
        if !self.patron_service.is_known_patron(patron_id).await? {
            return Err(LibraryError::unknown_patron(patron_id));
        }
        let book = match self.catalog_service.find_book_by_id(book_id).await {
            Ok(book) => book,
            Err(LibraryError::NotFound { .. }) => return Err(LibraryError::unknown_item(book_id)),
            Err(err) => return Err(err),
        };
        if !book.book_status.is_available() {
            return Err(LibraryError::validation(
                format!("book {} cannot be borrowed while {}", book_id, book.book_status).as_str(),
                Some("400".to_string())));
        }
        self.lend(book, patron_id).await
    }

    async fn borrow_on_hold(&self, hold_id: &str) -> LibraryResult<BookDto> {
        let (fulfilled, lent) = self.hold_service.fulfill_for_loan(hold_id).await?;
        info!("book {} lent to patron {} on hold {}", lent.book_id, fulfilled.patron_id, hold_id);
        self.publish_borrowed(&lent, fulfilled.patron_id.as_str()).await;
        Ok(lent)
    }

    async fn return_book(&self, book_id: &str) -> LibraryResult<Option<HoldDto>> {
        let book = match self.catalog_service.find_book_by_id(book_id).await {
            Ok(book) => book,
            Err(LibraryError::NotFound { .. }) => return Err(LibraryError::unknown_item(book_id)),
            Err(err) => return Err(err),
        };
        if book.book_status != BookStatus::CheckedOut {
            return Err(LibraryError::validation(
                format!("book {} is not on loan, status {}", book_id, book.book_status).as_str(),
                Some("400".to_string())));
        }
        let promoted = self.hold_service.process_return(book_id).await?;
        info!("book {} returned, promoted hold {:?}", book_id, promoted.as_ref().map(|h| h.hold_id.as_str()));
        self.publish(BOOK_RETURNED, &book, &HashMap::new()).await;
        Ok(promoted)
    }
}

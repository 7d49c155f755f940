use async_trait::async_trait;
use crate::books::dto::BookDto;
use crate::core::library::LibraryResult;
use crate::hold::dto::HoldDto;

pub mod service;

// CirculationService lends and takes back the single copy behind a catalog entry
// and hands returns over to the reservation engine.
#[async_trait]
pub(crate) trait CirculationService: Sync + Send {
    // lends an available book; books held for someone or already on loan are refused
    async fn borrow(&self, book_id: &str, patron_id: &str) -> LibraryResult<BookDto>;

    // lends the book of a ready hold to its patron and fulfills the hold
    async fn borrow_on_hold(&self, hold_id: &str) -> LibraryResult<BookDto>;

    // returns the promoted hold when someone was waiting
    async fn return_book(&self, book_id: &str) -> LibraryResult<Option<HoldDto>>;
}

use async_trait::async_trait;
use chrono::{Duration, NaiveDateTime};
use crate::books::dto::BookDto;
use crate::core::library::LibraryResult;
use crate::hold::dto::{HoldDto, WaitingListDto};

pub mod model;
pub mod queue;
pub mod service;

// HoldService is the reservation engine. Every mutation of a book's queue runs under
// that book's lock and commits as one transaction guarded by the book version.
#[async_trait]
pub(crate) trait HoldService: Sync + Send {
    // Places a hold, or returns the patron's existing active hold on the book.
    async fn place_hold(&self, book_id: &str, patron_id: &str) -> LibraryResult<HoldDto>;

    // Called once a copy is back on the shelf. Returns the promoted hold, if any.
    async fn process_return(&self, book_id: &str) -> LibraryResult<Option<HoldDto>>;

    async fn cancel_hold(&self, hold_id: &str) -> LibraryResult<HoldDto>;

    async fn fulfill_hold(&self, hold_id: &str) -> LibraryResult<HoldDto>;

    // Fulfills the Ready hold and puts the copy on loan in one commit.
    async fn fulfill_for_loan(&self, hold_id: &str) -> LibraryResult<(HoldDto, BookDto)>;

    // Expires ready holds whose pickup window closed before `now` and returns how many.
    async fn sweep_expired(&self, now: NaiveDateTime) -> LibraryResult<usize>;

    // One reminder per pickup window for holds expiring within `lead` of `now`.
    async fn send_pickup_reminders(&self, now: NaiveDateTime, lead: Duration) -> LibraryResult<usize>;

    async fn get_hold(&self, hold_id: &str) -> LibraryResult<HoldDto>;

    async fn list_active_holds_for_patron(&self, patron_id: &str) -> LibraryResult<Vec<HoldDto>>;

    async fn list_queue_for_item(&self, book_id: &str) -> LibraryResult<Vec<HoldDto>>;

    // Books with waiting holds, longest queue first.
    async fn list_waiting_lists(&self) -> LibraryResult<Vec<WaitingListDto>>;
}

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use chrono::{Duration, NaiveDateTime, Utc};
use tracing::{debug, info, warn};

use crate::books::domain::model::BookEntity;
use crate::books::dto::BookDto;
use crate::catalog::domain::CatalogService;
use crate::core::domain::{Configuration, MAX_PICKUP_WINDOW_DAYS};
use crate::core::events::{DomainEvent, DomainEventType};
use crate::core::library::{BookStatus, HoldStatus, LibraryError, LibraryResult, NotificationCategory};
use crate::gateway::events::EventPublisher;
use crate::hold::domain::HoldService;
use crate::hold::domain::model::HoldEntity;
use crate::hold::domain::queue::HoldQueue;
use crate::hold::dto::{HoldDto, WaitingListDto};
use crate::hold::repository::{HoldRepository, HoldTransaction};
use crate::notifications::domain::model::NotificationEntity;
use crate::patrons::domain::PatronService;
use crate::utils::date::DATE_FMT;
use crate::utils::locks::KeyedLocks;

const HOLD_PLACED: &str = "hold_placed";
const HOLD_PROMOTED: &str = "hold_promoted";
const HOLD_CANCELLED: &str = "hold_cancelled";
const HOLD_FULFILLED: &str = "hold_fulfilled";
const HOLD_EXPIRED: &str = "hold_expired";
const HOLD_REMINDED: &str = "hold_reminded";

fn book_key(book_id: &str) -> String {
    format!("book:{}", book_id)
}

fn patron_key(patron_id: &str) -> String {
    format!("patron:{}", patron_id)
}

// published once the transaction that produced it has committed
struct PendingEvent {
    name: &'static str,
    kind: DomainEventType,
    hold: HoldDto,
}

impl PendingEvent {
    fn new(name: &'static str, kind: DomainEventType, hold: HoldDto) -> Self {
        Self { name, kind, hold }
    }
}

pub(crate) struct HoldServiceImpl {
    branch_id: String,
    max_active_holds: usize,
    pickup_window_days: i64,
    hold_repository: Box<dyn HoldRepository>,
    patron_service: Box<dyn PatronService>,
    catalog_service: Box<dyn CatalogService>,
    events_publisher: Box<dyn EventPublisher>,
    locks: KeyedLocks,
}

impl HoldServiceImpl {
    pub(crate) fn new(config: &Configuration, hold_repository: Box<dyn HoldRepository>,
                      patron_service: Box<dyn PatronService>, catalog_service: Box<dyn CatalogService>,
                      events_publisher: Box<dyn EventPublisher>) -> Self {
        Self {
            branch_id: config.branch_id.to_string(),
            max_active_holds: config.max_active_holds_per_patron,
            pickup_window_days: config.pickup_window_days.clamp(1, MAX_PICKUP_WINDOW_DAYS),
            hold_repository,
            patron_service,
            catalog_service,
            events_publisher,
            locks: KeyedLocks::new(),
        }
    }

    fn pickup_window(&self) -> Duration {
        Duration::days(self.pickup_window_days)
    }

    async fn load_book(&self, book_id: &str) -> LibraryResult<BookDto> {
        match self.catalog_service.find_book_by_id(book_id).await {
            Ok(book) if book.is_reservable() => Ok(book),
            Ok(_) | Err(LibraryError::NotFound { .. }) => Err(LibraryError::unknown_item(book_id)),
            Err(err) => Err(err),
        }
    }

    async fn load_queue(&self, book_id: &str) -> LibraryResult<HoldQueue> {
        let holds = self.hold_repository.find_by_book(book_id).await?;
        Ok(HoldQueue::new(book_id, holds))
    }

    fn ready_notification(&self, hold: &HoldEntity, book: &BookDto, now: NaiveDateTime) -> NotificationEntity {
        let message = format!("The book you reserved '{}' is now available for pickup. Please collect it within {} days.",
                              book.title, self.pickup_window_days);
        NotificationEntity::new(hold.patron_id.as_str(), Some(hold.hold_id.as_str()),
                                NotificationCategory::Ready, message.as_str(), now)
    }

    fn expiry_notification(&self, hold: &HoldEntity, book: &BookDto, now: NaiveDateTime) -> NotificationEntity {
        let message = format!("Your reservation for '{}' has expired.", book.title);
        NotificationEntity::new(hold.patron_id.as_str(), Some(hold.hold_id.as_str()),
                                NotificationCategory::Expiry, message.as_str(), now)
    }

    fn reminder_notification(&self, hold: &HoldEntity, book: &BookDto, now: NaiveDateTime) -> NotificationEntity {
        let until = hold.expires_at.map(|at| at.format("%Y-%m-%d %H:%M").to_string()).unwrap_or_default();
        let message = format!("Reminder: '{}' is waiting for you until {}.", book.title, until);
        NotificationEntity::new(hold.patron_id.as_str(), Some(hold.hold_id.as_str()),
                                NotificationCategory::Reminder, message.as_str(), now)
    }

    // The copy is free again: hand it to the head of the queue, or put it back on the
    // shelf when nobody waits. The caller has already resolved any Ready hold.
    fn promote_or_release(&self, queue: &mut HoldQueue, txn: &mut HoldTransaction, book: &BookDto,
                          now: NaiveDateTime, events: &mut Vec<PendingEvent>) -> Option<HoldEntity> {
        match queue.promote_head(now, self.pickup_window()) {
            Some(promoted) => {
                for shifted in queue.close_gaps(now) {
                    txn.update(shifted);
                }
                txn.set_book_status(BookStatus::OnHold);
                txn.notify(self.ready_notification(&promoted, book, now));
                txn.update(promoted.clone());
                info!("hold {} of patron {} is ready for book {}", promoted.hold_id, promoted.patron_id, book.book_id);
                events.push(PendingEvent::new(HOLD_PROMOTED, DomainEventType::Updated, HoldDto::committed(&promoted)));
                Some(promoted)
            }
            None => {
                txn.set_book_status(BookStatus::Available);
                debug!("nobody waits for book {}, releasing it", book.book_id);
                None
            }
        }
    }

    async fn commit(&self, txn: &HoldTransaction, events: Vec<PendingEvent>) -> LibraryResult<()> {
        self.hold_repository.commit(txn).await?;
        for event in events {
            self.publish(event).await;
        }
        Ok(())
    }

    async fn publish(&self, event: PendingEvent) {
        let hold = &event.hold;
        self.events_publisher.publish_after_commit(
            DomainEvent::hold(event.name, event.kind, hold.hold_id.as_str(), hold.book_id.as_str(), hold)).await;
    }

    // Marks the Ready hold Fulfilled. With `lend` the copy goes on loan in the same
    // transaction, so the book is never OnHold without a Ready hold.
    async fn fulfill(&self, hold_id: &str, lend: bool) -> LibraryResult<(HoldDto, BookDto)> {
        let book_id = self.hold_repository.get(hold_id).await?.book_id;
        let _guard = self.locks.lock(book_key(book_id.as_str()).as_str()).await;
        let mut hold = self.hold_repository.get(hold_id).await?;
        if hold.hold_status != HoldStatus::Ready {
            return Err(LibraryError::hold_not_ready(hold_id, hold.hold_status));
        }
        let book = self.load_book(book_id.as_str()).await?;
        let now = Utc::now().naive_utc();
        let mut txn = HoldTransaction::new(BookEntity::from(&book), now);
        hold.fulfill(now);
        txn.update(hold.clone());
        if lend {
            txn.set_book_status(BookStatus::CheckedOut);
        }
        let dto = HoldDto::committed(&hold);
        self.commit(&txn, vec![PendingEvent::new(HOLD_FULFILLED, DomainEventType::Updated, dto.clone())]).await?;
        info!("hold {} fulfilled for patron {}", hold_id, hold.patron_id);
        let mut committed = txn.book;
        committed.version += 1;
        Ok((dto, BookDto::from(&committed)))
    }

    // expires the item's Ready hold if it is still overdue at `now`
    async fn expire_book(&self, book_id: &str, now: NaiveDateTime) -> LibraryResult<usize> {
        let _guard = self.locks.lock(book_key(book_id).as_str()).await;
        let mut queue = self.load_queue(book_id).await?;
        let mut expired = match queue.take_ready() {
            Some(hold) if hold.is_expired_at(now) => hold,
            _ => return Ok(0),
        };
        let book = self.load_book(book_id).await?;
        let mut txn = HoldTransaction::new(BookEntity::from(&book), now);
        let mut events = vec![];
        let deadline = expired.expires_at.map(|at| at.format(DATE_FMT).to_string()).unwrap_or_default();
        expired.expire(now, format!("Not collected before {}", deadline).as_str());
        txn.notify(self.expiry_notification(&expired, &book, now));
        txn.update(expired.clone());
        events.push(PendingEvent::new(HOLD_EXPIRED, DomainEventType::Updated, HoldDto::committed(&expired)));
        if book.book_status == BookStatus::CheckedOut {
            warn!("book {} is on loan while hold {} expired, leaving the queue as is", book_id, expired.hold_id);
        } else {
            self.promote_or_release(&mut queue, &mut txn, &book, now, &mut events);
        }
        self.commit(&txn, events).await?;
        info!("hold {} of patron {} expired for book {}", expired.hold_id, expired.patron_id, book_id);
        Ok(1)
    }

    async fn remind_book(&self, book_id: &str, now: NaiveDateTime, cutoff: NaiveDateTime) -> LibraryResult<usize> {
        let _guard = self.locks.lock(book_key(book_id).as_str()).await;
        let queue = self.load_queue(book_id).await?;
        let mut hold = match queue.ready() {
            Some(hold) if hold.is_due_for_reminder(now, cutoff) => hold.clone(),
            _ => return Ok(0),
        };
        let book = self.load_book(book_id).await?;
        let mut txn = HoldTransaction::new(BookEntity::from(&book), now);
        hold.reminder_sent = true;
        hold.updated_at = now;
        txn.notify(self.reminder_notification(&hold, &book, now));
        txn.update(hold.clone());
        self.commit(&txn, vec![PendingEvent::new(HOLD_REMINDED, DomainEventType::Updated, HoldDto::committed(&hold))]).await?;
        debug!("reminded patron {} about hold {}", hold.patron_id, hold.hold_id);
        Ok(1)
    }
}

// distinct books in a stable order
fn books_of(holds: &[HoldEntity]) -> BTreeSet<String> {
    holds.iter().map(|h| h.book_id.to_string()).collect()
}

#[async_trait]
impl HoldService for HoldServiceImpl {
    async fn place_hold(&self, book_id: &str, patron_id: &str) -> LibraryResult<HoldDto> {
        if !self.patron_service.is_known_patron(patron_id).await? {
            return Err(LibraryError::unknown_patron(patron_id));
        }
        let _patron_guard = self.locks.lock(patron_key(patron_id).as_str()).await;
        let _book_guard = self.locks.lock(book_key(book_id).as_str()).await;
        let book = self.load_book(book_id).await?;
        let queue = self.load_queue(book_id).await?;
        if let Some(existing) = queue.find_by_patron(patron_id) {
            debug!("patron {} already holds book {} as {}", patron_id, book_id, existing.hold_id);
            return Ok(HoldDto::from(existing));
        }
        let active = self.hold_repository.find_by_patron(patron_id).await?.len();
        if active >= self.max_active_holds {
            return Err(LibraryError::quota_exceeded(patron_id, self.max_active_holds));
        }

        let now = Utc::now().naive_utc();
        let mut txn = HoldTransaction::new(BookEntity::from(&book), now);
        let mut hold = HoldEntity::new(self.branch_id.as_str(), book_id, patron_id, now);
        if book.book_status.is_available() && queue.is_empty() {
            hold.promote(now, self.pickup_window());
            txn.set_book_status(BookStatus::OnHold);
            txn.notify(self.ready_notification(&hold, &book, now));
        } else {
            hold = hold.with_rank(queue.next_rank());
        }
        txn.create(hold.clone());
        let dto = HoldDto::from(&hold);
        self.commit(&txn, vec![PendingEvent::new(HOLD_PLACED, DomainEventType::Added, dto.clone())]).await?;
        info!("patron {} placed hold {} on book {} as {}", patron_id, hold.hold_id, book_id, hold.hold_status);
        Ok(dto)
    }

    async fn process_return(&self, book_id: &str) -> LibraryResult<Option<HoldDto>> {
        let _guard = self.locks.lock(book_key(book_id).as_str()).await;
        let book = self.load_book(book_id).await?;
        let mut queue = self.load_queue(book_id).await?;
        if let Some(ready) = queue.ready() {
            debug!("book {} is already held for patron {}", book_id, ready.patron_id);
            return Ok(None);
        }
        let now = Utc::now().naive_utc();
        let mut txn = HoldTransaction::new(BookEntity::from(&book), now);
        let mut events = vec![];
        let promoted = self.promote_or_release(&mut queue, &mut txn, &book, now, &mut events);
        if promoted.is_none() && book.book_status.is_available() {
            return Ok(None);
        }
        self.commit(&txn, events).await?;
        Ok(promoted.as_ref().map(HoldDto::committed))
    }

    async fn cancel_hold(&self, hold_id: &str) -> LibraryResult<HoldDto> {
        let book_id = self.hold_repository.get(hold_id).await?.book_id;
        let _guard = self.locks.lock(book_key(book_id.as_str()).as_str()).await;
        let mut hold = self.hold_repository.get(hold_id).await?;
        if hold.hold_status.is_terminal() {
            return Err(LibraryError::hold_not_cancellable(hold_id, hold.hold_status));
        }
        let book = self.load_book(book_id.as_str()).await?;
        let mut queue = self.load_queue(book_id.as_str()).await?;
        let now = Utc::now().naive_utc();
        let mut txn = HoldTransaction::new(BookEntity::from(&book), now);
        let mut events = vec![];
        let was_ready = hold.hold_status == HoldStatus::Ready;
        hold.cancel(now, format!("Cancelled on {}", now.format(DATE_FMT)).as_str());
        txn.update(hold.clone());
        events.push(PendingEvent::new(HOLD_CANCELLED, DomainEventType::Updated, HoldDto::committed(&hold)));
        if was_ready {
            let _ = queue.take_ready();
            if book.book_status == BookStatus::CheckedOut {
                warn!("book {} is on loan while ready hold {} was cancelled", book_id, hold_id);
            } else {
                self.promote_or_release(&mut queue, &mut txn, &book, now, &mut events);
            }
        } else {
            let _ = queue.remove_waiting(hold_id);
            for shifted in queue.close_gaps(now) {
                txn.update(shifted);
            }
        }
        self.commit(&txn, events).await?;
        info!("hold {} of patron {} cancelled for book {}", hold_id, hold.patron_id, book_id);
        Ok(HoldDto::committed(&hold))
    }

    async fn fulfill_hold(&self, hold_id: &str) -> LibraryResult<HoldDto> {
        self.fulfill(hold_id, false).await.map(|(hold, _)| hold)
    }

    async fn fulfill_for_loan(&self, hold_id: &str) -> LibraryResult<(HoldDto, BookDto)> {
        self.fulfill(hold_id, true).await
    }

    async fn sweep_expired(&self, now: NaiveDateTime) -> LibraryResult<usize> {
        let overdue = self.hold_repository.find_ready_expiring_before(now).await?;
        let mut count = 0;
        let mut first_err: Option<LibraryError> = None;
        for book_id in books_of(&overdue) {
            match self.expire_book(book_id.as_str(), now).await {
                Ok(n) => count += n,
                Err(err) => {
                    warn!("failed to expire holds of book {}: {}", book_id, err);
                    if first_err.is_none() {
                        first_err = Some(err);
                    }
                }
            }
        }
        info!("expiry sweep at {} expired {} holds", now, count);
        match first_err {
            Some(err) => Err(err),
            None => Ok(count),
        }
    }

    async fn send_pickup_reminders(&self, now: NaiveDateTime, lead: Duration) -> LibraryResult<usize> {
        let cutoff = now.checked_add_signed(lead).ok_or_else(|| LibraryError::validation(
            format!("reminder lead {} from {} is out of range", lead, now).as_str(), Some("400".to_string())))?;
        let due: Vec<HoldEntity> = self.hold_repository.find_ready_expiring_before(cutoff).await?
            .into_iter().filter(|h| h.is_due_for_reminder(now, cutoff)).collect();
        let mut count = 0;
        let mut first_err: Option<LibraryError> = None;
        for book_id in books_of(&due) {
            match self.remind_book(book_id.as_str(), now, cutoff).await {
                Ok(n) => count += n,
                Err(err) => {
                    warn!("failed to remind holders of book {}: {}", book_id, err);
                    if first_err.is_none() {
                        first_err = Some(err);
                    }
                }
            }
        }
        info!("sent {} pickup reminders", count);
        match first_err {
            Some(err) => Err(err),
            None => Ok(count),
        }
    }

    async fn get_hold(&self, hold_id: &str) -> LibraryResult<HoldDto> {
        self.hold_repository.get(hold_id).await.map(|h| HoldDto::from(&h))
    }

    async fn list_active_holds_for_patron(&self, patron_id: &str) -> LibraryResult<Vec<HoldDto>> {
        let mut holds = self.hold_repository.find_by_patron(patron_id).await?;
        holds.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(holds.iter().map(HoldDto::from).collect())
    }

    async fn list_queue_for_item(&self, book_id: &str) -> LibraryResult<Vec<HoldDto>> {
        let _ = self.load_book(book_id).await?;
        let queue = self.load_queue(book_id).await?;
        Ok(queue.ordered().iter().map(HoldDto::from).collect())
    }

    async fn list_waiting_lists(&self) -> LibraryResult<Vec<WaitingListDto>> {
        let waiting = self.hold_repository.find_by_status(HoldStatus::Waiting).await?;
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for hold in &waiting {
            *counts.entry(hold.book_id.to_string()).or_default() += 1;
        }
        let mut lists = vec![];
        for (book_id, count) in counts {
            match self.catalog_service.find_book_by_id(book_id.as_str()).await {
                Ok(book) => lists.push(WaitingListDto::new(&book, count)),
                Err(LibraryError::NotFound { .. }) => warn!("{} holds wait for missing book {}", count, book_id),
                Err(err) => return Err(err),
            }
        }
        lists.sort_by(|a, b| b.waiting.cmp(&a.waiting).then_with(|| a.title.cmp(&b.title)));
        Ok(lists)
    }
}

use chrono::{Duration, NaiveDateTime};
use uuid::Uuid;
use serde::{Deserialize, Serialize};
use crate::core::domain::Identifiable;
use crate::core::library::HoldStatus;
use crate::utils::date::{opt_serializer, serializer};

// HoldEntity is a patron's claim on a book. A queue rank exists only while the hold
// is Waiting and an expiry only once it is Ready.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub(crate) struct HoldEntity {
    pub hold_id: String,
    pub version: i64,
    pub branch_id: String,
    pub book_id: String,
    pub patron_id: String,
    pub hold_status: HoldStatus,
    pub queue_rank: Option<i64>,
    #[serde(with = "opt_serializer", default)]
    pub expires_at: Option<NaiveDateTime>,
    #[serde(with = "opt_serializer", default)]
    pub fulfilled_at: Option<NaiveDateTime>,
    #[serde(with = "opt_serializer", default)]
    pub cancelled_at: Option<NaiveDateTime>,
    pub notes: Option<String>,
    #[serde(default)]
    pub reminder_sent: bool,
    #[serde(with = "serializer")]
    pub created_at: NaiveDateTime,
    #[serde(with = "serializer")]
    pub updated_at: NaiveDateTime,
}

impl HoldEntity {
    pub fn new(branch_id: &str, book_id: &str, patron_id: &str, now: NaiveDateTime) -> Self {
        Self {
            hold_id: Uuid::new_v4().to_string(),
            version: 0,
            branch_id: branch_id.to_string(),
            book_id: book_id.to_string(),
            patron_id: patron_id.to_string(),
            hold_status: HoldStatus::Waiting,
            queue_rank: None,
            expires_at: None,
            fulfilled_at: None,
            cancelled_at: None,
            notes: None,
            reminder_sent: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_rank(mut self, rank: i64) -> Self {
        self.queue_rank = Some(rank);
        self
    }

    // Waiting -> Ready; a fresh pickup window also re-arms the reminder.
    // The deadline saturates at the latest representable time.
    pub fn promote(&mut self, now: NaiveDateTime, window: Duration) {
        self.hold_status = HoldStatus::Ready;
        self.queue_rank = None;
        self.expires_at = Some(now.checked_add_signed(window).unwrap_or(NaiveDateTime::MAX));
        self.reminder_sent = false;
        self.updated_at = now;
    }

    pub fn cancel(&mut self, now: NaiveDateTime, note: &str) {
        self.hold_status = HoldStatus::Cancelled;
        self.queue_rank = None;
        self.cancelled_at = Some(now);
        self.notes = Some(note.to_string());
        self.updated_at = now;
    }

    pub fn expire(&mut self, now: NaiveDateTime, note: &str) {
        self.hold_status = HoldStatus::Expired;
        self.queue_rank = None;
        self.notes = Some(note.to_string());
        self.updated_at = now;
    }

    pub fn fulfill(&mut self, now: NaiveDateTime) {
        self.hold_status = HoldStatus::Fulfilled;
        self.queue_rank = None;
        self.fulfilled_at = Some(now);
        self.updated_at = now;
    }

    pub fn is_expired_at(&self, now: NaiveDateTime) -> bool {
        self.hold_status == HoldStatus::Ready && self.expires_at.map(|at| at < now).unwrap_or(false)
    }

    // Ready, not yet reminded, and the window closes within [now, cutoff)
    pub fn is_due_for_reminder(&self, now: NaiveDateTime, cutoff: NaiveDateTime) -> bool {
        self.hold_status == HoldStatus::Ready && !self.reminder_sent &&
            self.expires_at.map(|at| at >= now && at < cutoff).unwrap_or(false)
    }
}

impl Identifiable for HoldEntity {
    fn id(&self) -> String {
        self.hold_id.to_string()
    }

    fn version(&self) -> i64 {
        self.version
    }
}


#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use crate::core::library::HoldStatus;
    use crate::hold::domain::model::HoldEntity;

    #[tokio::test]
    async fn test_should_build_hold() {
        let now = Utc::now().naive_utc();
        let hold = HoldEntity::new("branch", "book1", "patron1", now).with_rank(2);
        assert_eq!("book1", hold.book_id.as_str());
        assert_eq!("patron1", hold.patron_id.as_str());
        assert_eq!(HoldStatus::Waiting, hold.hold_status);
        assert_eq!(Some(2), hold.queue_rank);
        assert_eq!(None, hold.expires_at);
    }

    #[tokio::test]
    async fn test_should_move_through_states() {
        let now = Utc::now().naive_utc();
        let mut hold = HoldEntity::new("branch", "book1", "patron1", now).with_rank(1);
        hold.reminder_sent = true;
        hold.promote(now, Duration::days(3));
        assert_eq!(HoldStatus::Ready, hold.hold_status);
        assert_eq!(None, hold.queue_rank);
        assert_eq!(Some(now + Duration::days(3)), hold.expires_at);
        assert!(!hold.reminder_sent);
        assert!(!hold.is_expired_at(now + Duration::days(3)));
        assert!(hold.is_expired_at(now + Duration::days(3) + Duration::seconds(1)));
        assert!(hold.is_due_for_reminder(now + Duration::days(2), now + Duration::days(4)));
        assert!(!hold.is_due_for_reminder(now, now + Duration::days(1)));

        hold.fulfill(now);
        assert_eq!(HoldStatus::Fulfilled, hold.hold_status);
        assert_eq!(Some(now), hold.fulfilled_at);
        assert!(!hold.is_expired_at(now + Duration::days(10)));
    }

    #[tokio::test]
    async fn test_should_record_notes_on_cancel_and_expire() {
        let now = Utc::now().naive_utc();
        let mut cancelled = HoldEntity::new("branch", "book1", "patron1", now).with_rank(1);
        cancelled.cancel(now, "cancelled by patron");
        assert_eq!(HoldStatus::Cancelled, cancelled.hold_status);
        assert_eq!(None, cancelled.queue_rank);
        assert_eq!(Some(now), cancelled.cancelled_at);
        assert_eq!(Some("cancelled by patron".to_string()), cancelled.notes);

        let mut expired = HoldEntity::new("branch", "book1", "patron2", now);
        expired.promote(now, Duration::days(1));
        expired.expire(now + Duration::days(2), "not collected");
        assert_eq!(HoldStatus::Expired, expired.hold_status);
        assert_eq!(Some("not collected".to_string()), expired.notes);
    }

    #[tokio::test]
    async fn test_should_serialize_missing_dates() {
        let hold = HoldEntity::new("branch", "book1", "patron1", Utc::now().naive_utc());
        let json = serde_json::to_value(&hold).expect("should serialize");
        assert!(json["expires_at"].is_null());
        let back: HoldEntity = serde_json::from_value(json).expect("should deserialize");
        assert_eq!(hold, back);
    }
}

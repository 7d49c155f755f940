use chrono::{Duration, NaiveDateTime};
use tracing::warn;
use crate::core::library::HoldStatus;
use crate::hold::domain::model::HoldEntity;

// HoldQueue is the in-memory view of one book's active holds: at most one Ready hold
// and the Waiting holds ordered by rank, ties broken by creation time.
#[derive(Debug, Clone)]
pub(crate) struct HoldQueue {
    ready: Option<HoldEntity>,
    waiting: Vec<HoldEntity>,
}

impl HoldQueue {
    pub(crate) fn new(book_id: &str, holds: Vec<HoldEntity>) -> Self {
        let mut ready: Option<HoldEntity> = None;
        let mut waiting = vec![];
        for hold in holds.into_iter().filter(|h| h.book_id == book_id) {
            match hold.hold_status {
                HoldStatus::Ready => {
                    if let Some(existing) = &ready {
                        warn!("book {} has more than one ready hold: {} and {}",
                            book_id, existing.hold_id, hold.hold_id);
                    } else {
                        ready = Some(hold);
                    }
                }
                HoldStatus::Waiting => waiting.push(hold),
                _ => {}
            }
        }
        waiting.sort_by(|a, b| {
            (a.queue_rank.unwrap_or(i64::MAX), a.created_at).cmp(&(b.queue_rank.unwrap_or(i64::MAX), b.created_at))
        });
        Self {
            ready,
            waiting,
        }
    }

    pub(crate) fn ready(&self) -> Option<&HoldEntity> {
        self.ready.as_ref()
    }

    pub(crate) fn waiting(&self) -> &[HoldEntity] {
        self.waiting.as_slice()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.ready.is_none() && self.waiting.is_empty()
    }

    pub(crate) fn find_by_patron(&self, patron_id: &str) -> Option<&HoldEntity> {
        self.ready.iter().chain(self.waiting.iter()).find(|h| h.patron_id == patron_id)
    }

    pub(crate) fn next_rank(&self) -> i64 {
        self.waiting.iter().filter_map(|h| h.queue_rank).max().unwrap_or(0) + 1
    }

    pub(crate) fn take_ready(&mut self) -> Option<HoldEntity> {
        self.ready.take()
    }

    // Moves the first waiting hold to Ready. Does nothing while another hold is Ready.
    pub(crate) fn promote_head(&mut self, now: NaiveDateTime, window: Duration) -> Option<HoldEntity> {
        if self.ready.is_some() || self.waiting.is_empty() {
            return None;
        }
        let mut head = self.waiting.remove(0);
        head.promote(now, window);
        self.ready = Some(head.clone());
        Some(head)
    }

    pub(crate) fn remove_waiting(&mut self, hold_id: &str) -> Option<HoldEntity> {
        let pos = self.waiting.iter().position(|h| h.hold_id == hold_id)?;
        Some(self.waiting.remove(pos))
    }

    // Renumbers waiting holds 1..n and returns only the ones whose rank moved.
    pub(crate) fn close_gaps(&mut self, now: NaiveDateTime) -> Vec<HoldEntity> {
        let mut changed = vec![];
        for (i, hold) in self.waiting.iter_mut().enumerate() {
            let rank = i as i64 + 1;
            if hold.queue_rank != Some(rank) {
                hold.queue_rank = Some(rank);
                hold.updated_at = now;
                changed.push(hold.clone());
            }
        }
        changed
    }

    // ready hold first, then waiting by rank
    pub(crate) fn ordered(&self) -> Vec<HoldEntity> {
        self.ready.iter().chain(self.waiting.iter()).cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveDateTime, Utc};
    use crate::core::library::HoldStatus;
    use crate::hold::domain::model::HoldEntity;
    use crate::hold::domain::queue::HoldQueue;

    fn waiting(patron_id: &str, rank: i64, now: NaiveDateTime) -> HoldEntity {
        HoldEntity::new("branch", "book1", patron_id, now).with_rank(rank)
    }

    fn ranks(queue: &HoldQueue) -> Vec<(String, Option<i64>)> {
        queue.waiting().iter().map(|h| (h.patron_id.clone(), h.queue_rank)).collect()
    }

    #[tokio::test]
    async fn test_should_order_waiting_holds() {
        let now = Utc::now().naive_utc();
        let queue = HoldQueue::new("book1", vec![
            waiting("c", 3, now),
            waiting("a", 1, now),
            waiting("b", 2, now),
            HoldEntity::new("branch", "book2", "x", now).with_rank(1),
        ]);
        assert_eq!(vec![("a".to_string(), Some(1)), ("b".to_string(), Some(2)), ("c".to_string(), Some(3))], ranks(&queue));
        assert_eq!(4, queue.next_rank());
        assert!(queue.ready().is_none());
        assert!(queue.find_by_patron("b").is_some());
        assert!(queue.find_by_patron("x").is_none());
    }

    #[tokio::test]
    async fn test_should_break_rank_ties_by_creation() {
        let now = Utc::now().naive_utc();
        let queue = HoldQueue::new("book1", vec![
            waiting("late", 1, now + Duration::seconds(5)),
            waiting("early", 1, now),
        ]);
        assert_eq!("early", queue.waiting()[0].patron_id.as_str());
    }

    #[tokio::test]
    async fn test_should_promote_head_and_close_gaps() {
        let now = Utc::now().naive_utc();
        let mut queue = HoldQueue::new("book1", vec![waiting("a", 1, now), waiting("b", 2, now), waiting("c", 3, now)]);
        let promoted = queue.promote_head(now, Duration::days(3)).expect("should promote");
        assert_eq!("a", promoted.patron_id.as_str());
        assert_eq!(HoldStatus::Ready, promoted.hold_status);
        assert_eq!(Some(now + Duration::days(3)), promoted.expires_at);
        // a second promotion waits for the ready hold to resolve
        assert!(queue.promote_head(now, Duration::days(3)).is_none());

        let shifted = queue.close_gaps(now);
        assert_eq!(2, shifted.len());
        assert_eq!(vec![("b".to_string(), Some(1)), ("c".to_string(), Some(2))], ranks(&queue));
        assert_eq!(vec!["a", "b", "c"], queue.ordered().iter().map(|h| h.patron_id.as_str()).collect::<Vec<&str>>());
    }

    #[tokio::test]
    async fn test_should_remove_waiting_and_shift_followers() {
        let now = Utc::now().naive_utc();
        let mut queue = HoldQueue::new("book1", vec![waiting("a", 1, now), waiting("b", 2, now), waiting("c", 3, now)]);
        let b_id = queue.waiting()[1].hold_id.clone();
        assert!(queue.remove_waiting(b_id.as_str()).is_some());
        assert!(queue.remove_waiting(b_id.as_str()).is_none());
        let shifted = queue.close_gaps(now);
        assert_eq!(1, shifted.len());
        assert_eq!("c", shifted[0].patron_id.as_str());
        assert_eq!(vec![("a".to_string(), Some(1)), ("c".to_string(), Some(2))], ranks(&queue));
    }

    #[tokio::test]
    async fn test_should_be_empty_without_active_holds() {
        let now = Utc::now().naive_utc();
        let mut done = HoldEntity::new("branch", "book1", "a", now);
        done.fulfill(now);
        let mut queue = HoldQueue::new("book1", vec![done]);
        assert!(queue.is_empty());
        assert_eq!(1, queue.next_rank());
        assert!(queue.promote_head(now, Duration::days(1)).is_none());
        assert!(queue.take_ready().is_none());
    }
}

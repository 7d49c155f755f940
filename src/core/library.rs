use std::fmt;
use std::fmt::{Display, Formatter};
use serde::{Deserialize, Serialize};

#[derive(Debug)]
pub enum LibraryError {
    Database {
        message: String,
        reason_code: Option<String>,
        retryable: bool,
    },
    // The underlying store cannot be reached. Operations surface this instead of
    // silently doing nothing; retrying is left to the caller.
    StorageUnavailable {
        message: String,
        reason_code: Option<String>,
        retryable: bool,
    },
    DuplicateKey {
        message: String,
    },
    NotFound {
        message: String,
    },
    // A concurrent writer changed the records guarded by an optimistic version check.
    Conflict {
        message: String,
        reason_code: Option<String>,
    },
    Validation {
        message: String,
        reason_code: Option<String>,
    },
    QuotaExceeded {
        message: String,
        patron_id: String,
        limit: usize,
    },
    HoldNotCancellable {
        message: String,
        hold_id: String,
        status: HoldStatus,
    },
    HoldNotReady {
        message: String,
        hold_id: String,
        status: HoldStatus,
    },
    UnknownPatron {
        message: String,
        patron_id: String,
    },
    UnknownItem {
        message: String,
        book_id: String,
    },
    Serialization {
        message: String,
    },
    Runtime {
        message: String,
        reason_code: Option<String>,
    },
}

impl LibraryError {
    pub fn database(message: &str, reason_code: Option<String>, retryable: bool) -> LibraryError {
        LibraryError::Database { message: message.to_string(), reason_code, retryable }
    }

    pub fn unavailable(message: &str, reason_code: Option<String>, retryable: bool) -> LibraryError {
        LibraryError::StorageUnavailable { message: message.to_string(), reason_code, retryable }
    }

    pub fn duplicate_key(message: &str) -> LibraryError {
        LibraryError::DuplicateKey { message: message.to_string() }
    }

    pub fn not_found(message: &str) -> LibraryError {
        LibraryError::NotFound { message: message.to_string() }
    }

    pub fn conflict(message: &str, reason_code: Option<String>) -> LibraryError {
        LibraryError::Conflict { message: message.to_string(), reason_code }
    }

    pub fn database_or_unavailable(message: &str, reason: Option<String>, retryable: bool) -> LibraryError {
        if retryable {
            LibraryError::unavailable(
                format!("ddb database unavailable error {:?} {:?}", message, reason).as_str(), reason, true)
        } else if let Some(ref reason_val) = reason {
            if reason_val.as_str().contains("404") {
                LibraryError::not_found(
                    format!("not found error {:?} {:?}", message, reason).as_str())
            } else if reason_val.as_str().contains("400") {
                LibraryError::validation(
                    format!("rejected request error {:?} {:?}", message, reason).as_str(), reason)
            } else {
                LibraryError::database(
                    format!("ddb database error {:?} {:?}", message, reason).as_str(), reason, false)
            }
        } else {
            LibraryError::database(
                format!("ddb database error {:?} {:?}", message, reason).as_str(), reason, false)
        }
    }

    pub fn validation(message: &str, reason_code: Option<String>) -> LibraryError {
        LibraryError::Validation { message: message.to_string(), reason_code }
    }

    pub fn quota_exceeded(patron_id: &str, limit: usize) -> LibraryError {
        LibraryError::QuotaExceeded {
            message: format!("patron {} already has {} active holds", patron_id, limit),
            patron_id: patron_id.to_string(),
            limit,
        }
    }

    pub fn hold_not_cancellable(hold_id: &str, status: HoldStatus) -> LibraryError {
        LibraryError::HoldNotCancellable {
            message: format!("hold {} cannot be cancelled in status {}", hold_id, status),
            hold_id: hold_id.to_string(),
            status,
        }
    }

    pub fn hold_not_ready(hold_id: &str, status: HoldStatus) -> LibraryError {
        LibraryError::HoldNotReady {
            message: format!("hold {} is not ready for pickup, status {}", hold_id, status),
            hold_id: hold_id.to_string(),
            status,
        }
    }

    pub fn unknown_patron(patron_id: &str) -> LibraryError {
        LibraryError::UnknownPatron {
            message: format!("patron {} is not known", patron_id),
            patron_id: patron_id.to_string(),
        }
    }

    pub fn unknown_item(book_id: &str) -> LibraryError {
        LibraryError::UnknownItem {
            message: format!("book {} is not in the catalog", book_id),
            book_id: book_id.to_string(),
        }
    }

    pub fn serialization(message: &str) -> LibraryError {
        LibraryError::Serialization { message: message.to_string() }
    }

    pub fn runtime(message: &str, reason_code: Option<String>) -> LibraryError {
        LibraryError::Runtime { message: message.to_string(), reason_code }
    }

    pub fn retryable(&self) -> bool {
        match self {
            LibraryError::Database { retryable, .. } => { *retryable }
            LibraryError::StorageUnavailable { retryable, .. } => { *retryable }
            LibraryError::DuplicateKey { .. } => { false }
            LibraryError::NotFound { .. } => { false }
            LibraryError::Conflict { .. } => { true }
            LibraryError::Validation { .. } => { false }
            LibraryError::QuotaExceeded { .. } => { false }
            LibraryError::HoldNotCancellable { .. } => { false }
            LibraryError::HoldNotReady { .. } => { false }
            LibraryError::UnknownPatron { .. } => { false }
            LibraryError::UnknownItem { .. } => { false }
            LibraryError::Serialization { .. } => { false }
            LibraryError::Runtime { .. } => { false }
        }
    }
}

impl From<std::io::Error> for LibraryError {
    fn from(err: std::io::Error) -> Self {
        LibraryError::runtime(
            format!("serde io {:?}", err).as_str(), None)
    }
}

impl From<serde_json::Error> for LibraryError {
    fn from(err: serde_json::Error) -> Self {
        LibraryError::serialization(
            format!("serde json parsing {:?}", err).as_str())
    }
}

impl From<String> for LibraryError {
    fn from(err: String) -> Self {
        LibraryError::serialization(
            format!("serde parsing {:?}", err).as_str())
    }
}

impl Display for LibraryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            LibraryError::Database { message, reason_code, retryable } => {
                write!(f, "{} {:?} {}", message, reason_code, retryable)
            }
            LibraryError::StorageUnavailable { message, reason_code, retryable } => {
                write!(f, "{} {:?} {}", message, reason_code, retryable)
            }
            LibraryError::DuplicateKey { message } => {
                write!(f, "{}", message)
            }
            LibraryError::NotFound { message } => {
                write!(f, "{}", message)
            }
            LibraryError::Conflict { message, reason_code } => {
                write!(f, "{} {:?}", message, reason_code)
            }
            LibraryError::Validation { message, reason_code } => {
                write!(f, "{} {:?}", message, reason_code)
            }
            LibraryError::QuotaExceeded { message, .. } => {
                write!(f, "{}", message)
            }
            LibraryError::HoldNotCancellable { message, .. } => {
                write!(f, "{}", message)
            }
            LibraryError::HoldNotReady { message, .. } => {
                write!(f, "{}", message)
            }
            LibraryError::UnknownPatron { message, .. } => {
                write!(f, "{}", message)
            }
            LibraryError::UnknownItem { message, .. } => {
                write!(f, "{}", message)
            }
            LibraryError::Serialization { message } => {
                write!(f, "{}", message)
            }
            LibraryError::Runtime { message, reason_code } => {
                write!(f, "{} {:?}", message, reason_code)
            }
        }
    }
}

impl std::error::Error for LibraryError {}

/// A specialized Result type for the library services and repositories.
pub type LibraryResult<T> = Result<T, LibraryError>;

// It defines abstraction for paginated result
#[derive(Debug, Clone)]
pub struct PaginatedResult<T> {
    // The page number or token
    pub page: Option<String>,
    // page size
    pub page_size: usize,
    // Next page if available
    pub next_page: Option<String>,
    // list of records
    pub records: Vec<T>,
}

impl<T> PaginatedResult<T> {
    pub(crate) fn new(page: Option<&str>, page_size: usize,
                      next_page: Option<String>, records: Vec<T>) -> Self {
        PaginatedResult {
            page: page.map(str::to_string),
            page_size,
            next_page,
            records,
        }
    }
}

// BookStatus is the availability of the single copy behind a catalog entry.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub enum BookStatus {
    Available,
    CheckedOut,
    OnHold,
    Deleted,
    Unknown,
}

impl BookStatus {
    pub fn is_available(&self) -> bool {
        *self == BookStatus::Available
    }
}

impl From<String> for BookStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Available" => BookStatus::Available,
            "CheckedOut" => BookStatus::CheckedOut,
            "OnHold" => BookStatus::OnHold,
            "Deleted" => BookStatus::Deleted,
            _ => BookStatus::Unknown,
        }
    }
}

impl Display for BookStatus {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            BookStatus::Available => write!(f, "Available"),
            BookStatus::CheckedOut => write!(f, "CheckedOut"),
            BookStatus::OnHold => write!(f, "OnHold"),
            BookStatus::Deleted => write!(f, "Deleted"),
            BookStatus::Unknown => write!(f, "Unknown"),
        }
    }
}

// HoldStatus tracks a hold through WAITING -> READY -> FULFILLED, with EXPIRED and
// CANCELLED as the other terminal states.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, Serialize, Deserialize)]
pub enum HoldStatus {
    Waiting,
    Ready,
    Fulfilled,
    Expired,
    Cancelled,
}

pub(crate) const ACTIVE_HOLD_STATUSES: [HoldStatus; 2] = [HoldStatus::Waiting, HoldStatus::Ready];

impl HoldStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, HoldStatus::Waiting | HoldStatus::Ready)
    }

    pub fn is_terminal(&self) -> bool {
        !self.is_active()
    }
}

impl From<String> for HoldStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Waiting" => HoldStatus::Waiting,
            "Ready" => HoldStatus::Ready,
            "Fulfilled" => HoldStatus::Fulfilled,
            "Expired" => HoldStatus::Expired,
            _ => HoldStatus::Cancelled,
        }
    }
}

impl Display for HoldStatus {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            HoldStatus::Waiting => write!(f, "Waiting"),
            HoldStatus::Ready => write!(f, "Ready"),
            HoldStatus::Fulfilled => write!(f, "Fulfilled"),
            HoldStatus::Expired => write!(f, "Expired"),
            HoldStatus::Cancelled => write!(f, "Cancelled"),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub enum NotificationCategory {
    Ready,
    Expiry,
    Reminder,
}

impl From<String> for NotificationCategory {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Ready" => NotificationCategory::Ready,
            "Expiry" => NotificationCategory::Expiry,
            _ => NotificationCategory::Reminder,
        }
    }
}

impl Display for NotificationCategory {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            NotificationCategory::Ready => write!(f, "Ready"),
            NotificationCategory::Expiry => write!(f, "Expiry"),
            NotificationCategory::Reminder => write!(f, "Reminder"),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::core::library::{BookStatus, HoldStatus, LibraryError, NotificationCategory};

    #[tokio::test]
    async fn test_should_create_database_error() {
        assert!(matches!(LibraryError::database("test", None, false), LibraryError::Database{ message: _, reason_code: _, retryable: _ }));
    }

    #[tokio::test]
    async fn test_should_create_duplicate_key_error() {
        assert!(matches!(LibraryError::duplicate_key("test"), LibraryError::DuplicateKey{ message: _ }));
    }

    #[tokio::test]
    async fn test_should_create_not_found_error() {
        assert!(matches!(LibraryError::not_found("test"), LibraryError::NotFound{ message: _ }));
    }

    #[tokio::test]
    async fn test_should_create_unavailable_error() {
        assert!(matches!(LibraryError::unavailable("test", None, false), LibraryError::StorageUnavailable{ message: _, reason_code: _, retryable: _ }));
    }

    #[tokio::test]
    async fn test_should_create_hold_errors() {
        assert!(matches!(LibraryError::quota_exceeded("p1", 5), LibraryError::QuotaExceeded{ limit: 5, .. }));
        assert!(matches!(LibraryError::hold_not_cancellable("h1", HoldStatus::Expired),
            LibraryError::HoldNotCancellable{ status: HoldStatus::Expired, .. }));
        assert!(matches!(LibraryError::hold_not_ready("h1", HoldStatus::Waiting),
            LibraryError::HoldNotReady{ status: HoldStatus::Waiting, .. }));
        assert!(matches!(LibraryError::unknown_patron("p1"), LibraryError::UnknownPatron{ .. }));
        assert!(matches!(LibraryError::unknown_item("b1"), LibraryError::UnknownItem{ .. }));
        assert_eq!("patron p1 already has 5 active holds", LibraryError::quota_exceeded("p1", 5).to_string());
    }

    #[tokio::test]
    async fn test_should_create_database_or_unavailable_error() {
        assert!(matches!(LibraryError::database_or_unavailable("test", None, true), LibraryError::StorageUnavailable{ message: _, reason_code: _, retryable: _ }));
        assert!(matches!(LibraryError::database_or_unavailable("test", Some("404".to_string()), false), LibraryError::NotFound{ message: _ }));
        assert!(matches!(LibraryError::database_or_unavailable("test", Some("400".to_string()), false), LibraryError::Validation{ message: _, reason_code: _ }));
        assert!(matches!(LibraryError::database_or_unavailable("test", Some("500".to_string()), false), LibraryError::Database{ message: _, reason_code: _, retryable: _ }));
        assert!(matches!(LibraryError::database_or_unavailable("test", None, false), LibraryError::Database{ message: _, reason_code: _, retryable: _ }));
    }

    #[tokio::test]
    async fn test_should_create_retryable_error() {
        assert_eq!(false, LibraryError::database("test", None, false).retryable());
        assert_eq!(false, LibraryError::duplicate_key("test").retryable());
        assert_eq!(false, LibraryError::not_found("test").retryable());
        assert_eq!(false, LibraryError::unavailable("test", None, false).retryable());
        assert_eq!(true, LibraryError::unavailable("test", None, true).retryable());
        assert_eq!(true, LibraryError::conflict("test", None).retryable());
        assert_eq!(false, LibraryError::validation("test", None).retryable());
        assert_eq!(false, LibraryError::quota_exceeded("p", 1).retryable());
        assert_eq!(false, LibraryError::serialization("test").retryable());
        assert_eq!(false, LibraryError::runtime("test", None).retryable());
    }

    #[tokio::test]
    async fn test_should_format_book_status() {
        let statuses = vec![
            BookStatus::Available,
            BookStatus::CheckedOut,
            BookStatus::OnHold,
            BookStatus::Deleted,
            BookStatus::Unknown,
        ];
        for status in statuses {
            let str = status.to_string();
            let str_status = BookStatus::from(str);
            assert_eq!(status, str_status);
        }
    }

    #[tokio::test]
    async fn test_should_format_hold_status() {
        let statuses = vec![
            HoldStatus::Waiting,
            HoldStatus::Ready,
            HoldStatus::Fulfilled,
            HoldStatus::Expired,
            HoldStatus::Cancelled,
        ];
        for status in statuses {
            let str = status.to_string();
            assert_eq!(status, HoldStatus::from(str));
        }
        assert!(HoldStatus::Waiting.is_active());
        assert!(HoldStatus::Ready.is_active());
        assert!(HoldStatus::Fulfilled.is_terminal());
        assert!(HoldStatus::Expired.is_terminal());
        assert!(HoldStatus::Cancelled.is_terminal());
    }

    #[tokio::test]
    async fn test_should_format_notification_category() {
        for category in [NotificationCategory::Ready, NotificationCategory::Expiry, NotificationCategory::Reminder] {
            assert_eq!(category, NotificationCategory::from(category.to_string()));
        }
    }
}

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use crate::books::dto::BookDto;
use crate::core::domain::Identifiable;
use crate::core::library::HoldStatus;
use crate::hold::domain::model::HoldEntity;
use crate::utils::date::{opt_serializer, serializer};

// HoldDto is a data transfer object for the reservation engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct HoldDto {
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
    pub reminder_sent: bool,
    #[serde(with = "serializer")]
    pub created_at: NaiveDateTime,
    #[serde(with = "serializer")]
    pub updated_at: NaiveDateTime,
}

impl HoldDto {
    // the view of an updated hold after its write bumped the version
    pub(crate) fn committed(entity: &HoldEntity) -> Self {
        let mut dto = HoldDto::from(entity);
        dto.version += 1;
        dto
    }
}

impl Identifiable for HoldDto {
    fn id(&self) -> String {
        self.hold_id.to_string()
    }

    fn version(&self) -> i64 {
        self.version
    }
}

impl From<&HoldEntity> for HoldDto {
    fn from(other: &HoldEntity) -> Self {
        Self {
            hold_id: other.hold_id.to_string(),
            version: other.version,
            branch_id: other.branch_id.to_string(),
            book_id: other.book_id.to_string(),
            patron_id: other.patron_id.to_string(),
            hold_status: other.hold_status,
            queue_rank: other.queue_rank,
            expires_at: other.expires_at,
            fulfilled_at: other.fulfilled_at,
            cancelled_at: other.cancelled_at,
            notes: other.notes.clone(),
            reminder_sent: other.reminder_sent,
            created_at: other.created_at,
            updated_at: other.updated_at,
        }
    }
}

// WaitingListDto summarizes demand for one book
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct WaitingListDto {
    pub book_id: String,
    pub isbn: String,
    pub title: String,
    pub waiting: usize,
}

impl WaitingListDto {
    pub fn new(book: &BookDto, waiting: usize) -> Self {
        Self {
            book_id: book.book_id.to_string(),
            isbn: book.isbn.to_string(),
            title: book.title.to_string(),
            waiting,
        }
    }
}

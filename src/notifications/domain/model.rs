use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::core::domain::Identifiable;
use crate::core::library::NotificationCategory;
use crate::utils::date::serializer;

// NotificationEntity is an outbox message for a patron. It is written only as a
// side effect of a hold transition; the read flag is the one field changed later.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub(crate) struct NotificationEntity {
    pub notification_id: String,
    pub version: i64,
    pub hold_id: Option<String>,
    pub patron_id: String,
    pub message: String,
    pub category: NotificationCategory,
    pub is_read: bool,
    #[serde(with = "serializer")]
    pub sent_at: NaiveDateTime,
    #[serde(with = "serializer")]
    pub updated_at: NaiveDateTime,
}

impl NotificationEntity {
    pub fn new(patron_id: &str, hold_id: Option<&str>, category: NotificationCategory,
               message: &str, sent_at: NaiveDateTime) -> Self {
        Self {
            notification_id: Uuid::new_v4().to_string(),
            version: 0,
            hold_id: hold_id.map(str::to_string),
            patron_id: patron_id.to_string(),
            message: message.to_string(),
            category,
            is_read: false,
            sent_at,
            updated_at: sent_at,
        }
    }
}

impl Identifiable for NotificationEntity {
    fn id(&self) -> String {
        self.notification_id.to_string()
    }

    fn version(&self) -> i64 {
        self.version
    }
}

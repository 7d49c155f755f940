use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use crate::core::library::NotificationCategory;
use crate::notifications::domain::model::NotificationEntity;
use crate::utils::date::serializer;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct NotificationDto {
    pub notification_id: String,
    pub version: i64,
    pub hold_id: Option<String>,
    pub patron_id: String,
    pub message: String,
    pub category: NotificationCategory,
    pub is_read: bool,
    #[serde(with = "serializer")]
    pub sent_at: NaiveDateTime,
}

impl From<&NotificationEntity> for NotificationDto {
    fn from(other: &NotificationEntity) -> Self {
        Self {
            notification_id: other.notification_id.to_string(),
            version: other.version,
            hold_id: other.hold_id.clone(),
            patron_id: other.patron_id.to_string(),
            message: other.message.to_string(),
            category: other.category,
            is_read: other.is_read,
            sent_at: other.sent_at,
        }
    }
}

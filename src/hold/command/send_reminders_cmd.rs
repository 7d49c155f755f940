use std::sync::Arc;
use async_trait::async_trait;
use chrono::{Duration, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::core::command::{Command, CommandError};
use crate::hold::domain::HoldService;
use crate::utils::date::opt_serializer;

const DEFAULT_LEAD_HOURS: i64 = 24;
const MAX_LEAD_HOURS: i64 = 24 * 365;

pub(crate) struct SendRemindersCommand {
    hold_service: Arc<dyn HoldService>,
}

impl SendRemindersCommand {
    pub(crate) fn new(hold_service: Arc<dyn HoldService>) -> Self {
        Self {
            hold_service,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SendRemindersCommandRequest {
    #[serde(with = "opt_serializer", default)]
    now: Option<NaiveDateTime>,
    #[serde(default)]
    lead_hours: Option<i64>,
}

impl SendRemindersCommandRequest {
    pub fn new(now: Option<NaiveDateTime>, lead_hours: Option<i64>) -> Self {
        Self {
            now,
            lead_hours,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct SendRemindersCommandResponse {
    pub reminded: usize,
}

impl SendRemindersCommandResponse {
    pub fn new(reminded: usize) -> Self {
        Self {
            reminded,
        }
    }
}

#[async_trait]
impl Command<SendRemindersCommandRequest, SendRemindersCommandResponse> for SendRemindersCommand {
    async fn execute(&self, req: SendRemindersCommandRequest) -> Result<SendRemindersCommandResponse, CommandError> {
        let lead_hours = req.lead_hours.unwrap_or(DEFAULT_LEAD_HOURS);
        if lead_hours <= 0 || lead_hours > MAX_LEAD_HOURS {
            return Err(CommandError::Validation {
                message: format!("lead_hours must be between 1 and {}, got {}", MAX_LEAD_HOURS, lead_hours),
                reason_code: Some("400".to_string()),
            });
        }
        let now = req.now.unwrap_or_else(|| Utc::now().naive_utc());
        self.hold_service.send_pickup_reminders(now, Duration::hours(lead_hours))
            .await.map_err(CommandError::from).map(SendRemindersCommandResponse::new)
    }
}

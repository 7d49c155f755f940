use std::sync::Arc;
use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::core::command::{Command, CommandError};
use crate::hold::domain::HoldService;
use crate::utils::date::opt_serializer;

pub(crate) struct SweepExpiredCommand {
    hold_service: Arc<dyn HoldService>,
}

impl SweepExpiredCommand {
    pub(crate) fn new(hold_service: Arc<dyn HoldService>) -> Self {
        Self {
            hold_service,
        }
    }
}

// `now` defaults to the current time
#[derive(Debug, Default, Deserialize)]
pub(crate) struct SweepExpiredCommandRequest {
    #[serde(with = "opt_serializer", default)]
    now: Option<NaiveDateTime>,
}

impl SweepExpiredCommandRequest {
    pub fn new(now: Option<NaiveDateTime>) -> Self {
        Self {
            now,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct SweepExpiredCommandResponse {
    pub expired: usize,
}

impl SweepExpiredCommandResponse {
    pub fn new(expired: usize) -> Self {
        Self {
            expired,
        }
    }
}

#[async_trait]
impl Command<SweepExpiredCommandRequest, SweepExpiredCommandResponse> for SweepExpiredCommand {
    async fn execute(&self, req: SweepExpiredCommandRequest) -> Result<SweepExpiredCommandResponse, CommandError> {
        let now = req.now.unwrap_or_else(|| Utc::now().naive_utc());
        self.hold_service.sweep_expired(now)
            .await.map_err(CommandError::from).map(SweepExpiredCommandResponse::new)
    }
}

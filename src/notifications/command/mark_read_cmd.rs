use std::sync::Arc;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::core::command::{Command, CommandError};
use crate::notifications::domain::NotificationService;
use crate::notifications::dto::NotificationDto;

pub(crate) struct MarkReadCommand {
    notification_service: Arc<dyn NotificationService>,
}

impl MarkReadCommand {
    pub(crate) fn new(notification_service: Arc<dyn NotificationService>) -> Self {
        Self {
            notification_service,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct MarkReadCommandRequest {
    notification_id: String,
}

impl MarkReadCommandRequest {
    pub fn new(notification_id: &str) -> Self {
        Self {
            notification_id: notification_id.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct MarkReadCommandResponse {
    pub notification: NotificationDto,
}

impl MarkReadCommandResponse {
    pub fn new(notification: NotificationDto) -> Self {
        Self {
            notification,
        }
    }
}

#[async_trait]
impl Command<MarkReadCommandRequest, MarkReadCommandResponse> for MarkReadCommand {
    async fn execute(&self, req: MarkReadCommandRequest) -> Result<MarkReadCommandResponse, CommandError> {
        self.notification_service.mark_read(req.notification_id.as_str())
            .await.map_err(CommandError::from).map(MarkReadCommandResponse::new)
    }
}

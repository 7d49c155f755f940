use std::sync::Arc;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::core::command::{Command, CommandError};
use crate::notifications::domain::NotificationService;
use crate::notifications::dto::NotificationDto;

pub(crate) struct ListUnreadCommand {
    notification_service: Arc<dyn NotificationService>,
}

impl ListUnreadCommand {
    pub(crate) fn new(notification_service: Arc<dyn NotificationService>) -> Self {
        Self {
            notification_service,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListUnreadCommandRequest {
    patron_id: String,
}

impl ListUnreadCommandRequest {
    pub fn new(patron_id: &str) -> Self {
        Self {
            patron_id: patron_id.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ListUnreadCommandResponse {
    pub notifications: Vec<NotificationDto>,
}

impl ListUnreadCommandResponse {
    pub fn new(notifications: Vec<NotificationDto>) -> Self {
        Self {
            notifications,
        }
    }
}

#[async_trait]
impl Command<ListUnreadCommandRequest, ListUnreadCommandResponse> for ListUnreadCommand {
    async fn execute(&self, req: ListUnreadCommandRequest) -> Result<ListUnreadCommandResponse, CommandError> {
        self.notification_service.list_unread(req.patron_id.as_str())
            .await.map_err(CommandError::from).map(ListUnreadCommandResponse::new)
    }
}

#[cfg(test)]
mod tests {
    use async_once::AsyncOnce;
    use lazy_static::lazy_static;
    use crate::core::command::Command;
    use crate::core::domain::Configuration;
    use crate::core::repository::RepositoryStore;
    use crate::notifications::command::list_unread_cmd::{ListUnreadCommand, ListUnreadCommandRequest};
    use crate::notifications::factory::create_notification_service;

    lazy_static! {
        static ref LIST_CMD: AsyncOnce<ListUnreadCommand> = AsyncOnce::new(async {
                let svc = create_notification_service(&Configuration::new("test"), RepositoryStore::InMemory).await;
                ListUnreadCommand::new(svc)
            });
    }

    #[tokio::test]
    async fn test_should_list_nothing_for_new_patron() {
        let list_cmd: &ListUnreadCommand = LIST_CMD.get().await;
        let res = list_cmd.execute(ListUnreadCommandRequest::new("nobody")).await.expect("should list unread");
        assert!(res.notifications.is_empty());
    }
}

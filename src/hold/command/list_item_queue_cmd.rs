use std::sync::Arc;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::core::command::{Command, CommandError};
use crate::hold::domain::HoldService;
use crate::hold::dto::HoldDto;

pub(crate) struct ListItemQueueCommand {
    hold_service: Arc<dyn HoldService>,
}

impl ListItemQueueCommand {
    pub(crate) fn new(hold_service: Arc<dyn HoldService>) -> Self {
        Self {
            hold_service,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListItemQueueCommandRequest {
    book_id: String,
}

impl ListItemQueueCommandRequest {
    pub fn new(book_id: &str) -> Self {
        Self {
            book_id: book_id.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ListItemQueueCommandResponse {
    pub holds: Vec<HoldDto>,
}

impl ListItemQueueCommandResponse {
    pub fn new(holds: Vec<HoldDto>) -> Self {
        Self {
            holds,
        }
    }
}

#[async_trait]
impl Command<ListItemQueueCommandRequest, ListItemQueueCommandResponse> for ListItemQueueCommand {
    async fn execute(&self, req: ListItemQueueCommandRequest) -> Result<ListItemQueueCommandResponse, CommandError> {
        self.hold_service.list_queue_for_item(req.book_id.as_str())
            .await.map_err(CommandError::from).map(ListItemQueueCommandResponse::new)
    }
}

#[cfg(test)]
mod tests {
    use async_once::AsyncOnce;
    use lazy_static::lazy_static;
    use crate::books::dto::BookDto;
    use crate::catalog::domain::CatalogService;
    use crate::catalog::factory::create_catalog_service;
    use crate::core::command::Command;
    use crate::core::domain::Configuration;
    use crate::core::library::{BookStatus, HoldStatus};
    use crate::core::repository::RepositoryStore;
    use crate::hold::command::list_item_queue_cmd::{ListItemQueueCommand, ListItemQueueCommandRequest};
    use crate::hold::command::place_hold_cmd::{PlaceHoldCommand, PlaceHoldCommandRequest};
    use crate::hold::factory::create_hold_service;
    use crate::patrons::domain::PatronService;
    use crate::patrons::dto::PatronDto;
    use crate::patrons::factory::create_patron_service;

    lazy_static! {
        static ref CATALOG_SVC: AsyncOnce<Box<dyn CatalogService>> = AsyncOnce::new(async {
                create_catalog_service(&Configuration::new("test"), RepositoryStore::InMemory).await
            });
        static ref PATRON_SVC: AsyncOnce<Box<dyn PatronService>> = AsyncOnce::new(async {
                create_patron_service(&Configuration::new("test"), RepositoryStore::InMemory).await
            });
        static ref PLACE_CMD: AsyncOnce<PlaceHoldCommand> = AsyncOnce::new(async {
                let svc = create_hold_service(&Configuration::new("test"), RepositoryStore::InMemory).await;
                PlaceHoldCommand::new(svc)
            });
        static ref QUEUE_CMD: AsyncOnce<ListItemQueueCommand> = AsyncOnce::new(async {
                let svc = create_hold_service(&Configuration::new("test"), RepositoryStore::InMemory).await;
                ListItemQueueCommand::new(svc)
            });
    }

    #[tokio::test]
    async fn test_should_run_list_item_queue() {
        let place_cmd: &PlaceHoldCommand = PLACE_CMD.get().await;
        let queue_cmd: &ListItemQueueCommand = QUEUE_CMD.get().await;
        let book = CATALOG_SVC.get().await.add_book(&BookDto::new("isbn", "queue", BookStatus::Available))
            .await.expect("should add book");
        for email in ["queue1@example.org", "queue2@example.org"] {
            let patron = PATRON_SVC.get().await.add_patron(&PatronDto::new(email)).await.expect("should add patron");
            place_cmd.execute(PlaceHoldCommandRequest::new(book.book_id.as_str(), patron.patron_id.as_str()))
                .await.expect("should place hold");
        }
        let res = queue_cmd.execute(ListItemQueueCommandRequest::new(book.book_id.as_str()))
            .await.expect("should list queue");
        assert_eq!(vec![HoldStatus::Ready, HoldStatus::Waiting],
                   res.holds.iter().map(|h| h.hold_status).collect::<Vec<HoldStatus>>());
    }
}

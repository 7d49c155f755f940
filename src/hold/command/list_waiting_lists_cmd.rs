use std::sync::Arc;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::core::command::{Command, CommandError};
use crate::hold::domain::HoldService;
use crate::hold::dto::WaitingListDto;

pub(crate) struct ListWaitingListsCommand {
    hold_service: Arc<dyn HoldService>,
}

impl ListWaitingListsCommand {
    pub(crate) fn new(hold_service: Arc<dyn HoldService>) -> Self {
        Self {
            hold_service,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ListWaitingListsCommandRequest {}

#[derive(Debug, Serialize)]
pub(crate) struct ListWaitingListsCommandResponse {
    pub books: Vec<WaitingListDto>,
}

impl ListWaitingListsCommandResponse {
    pub fn new(books: Vec<WaitingListDto>) -> Self {
        Self {
            books,
        }
    }
}

#[async_trait]
impl Command<ListWaitingListsCommandRequest, ListWaitingListsCommandResponse> for ListWaitingListsCommand {
    async fn execute(&self, _req: ListWaitingListsCommandRequest) -> Result<ListWaitingListsCommandResponse, CommandError> {
        self.hold_service.list_waiting_lists()
            .await.map_err(CommandError::from).map(ListWaitingListsCommandResponse::new)
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
    use crate::core::library::BookStatus;
    use crate::core::repository::RepositoryStore;
    use crate::hold::command::list_waiting_lists_cmd::{ListWaitingListsCommand, ListWaitingListsCommandRequest};
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
        static ref WAITING_CMD: AsyncOnce<ListWaitingListsCommand> = AsyncOnce::new(async {
                let svc = create_hold_service(&Configuration::new("test"), RepositoryStore::InMemory).await;
                ListWaitingListsCommand::new(svc)
            });
    }

    #[tokio::test]
    async fn test_should_run_list_waiting_lists() {
        let place_cmd: &PlaceHoldCommand = PLACE_CMD.get().await;
        let waiting_cmd: &ListWaitingListsCommand = WAITING_CMD.get().await;
        let book = CATALOG_SVC.get().await.add_book(&BookDto::new("isbn", "waiting list", BookStatus::CheckedOut))
            .await.expect("should add book");
        let patron = PATRON_SVC.get().await.add_patron(&PatronDto::new("waiting@example.org"))
            .await.expect("should add patron");
        place_cmd.execute(PlaceHoldCommandRequest::new(book.book_id.as_str(), patron.patron_id.as_str()))
            .await.expect("should place hold");

        let res = waiting_cmd.execute(ListWaitingListsCommandRequest::default()).await.expect("should list");
        let entry = res.books.iter().find(|b| b.book_id == book.book_id).expect("should list the book");
        assert_eq!(1, entry.waiting);
    }
}

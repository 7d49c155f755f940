use std::sync::Arc;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::circulation::domain::CirculationService;
use crate::core::command::{Command, CommandError};
use crate::hold::dto::HoldDto;

pub(crate) struct ReturnBookCommand {
    circulation_service: Arc<dyn CirculationService>,
}

impl ReturnBookCommand {
    pub(crate) fn new(circulation_service: Arc<dyn CirculationService>) -> Self {
        Self {
            circulation_service,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ReturnBookCommandRequest {
    book_id: String,
}

impl ReturnBookCommandRequest {
    pub fn new(book_id: &str) -> Self {
        Self {
            book_id: book_id.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ReturnBookCommandResponse {
    pub promoted: Option<HoldDto>,
}

impl ReturnBookCommandResponse {
    pub fn new(promoted: Option<HoldDto>) -> Self {
        Self {
            promoted,
        }
    }
}

#[async_trait]
impl Command<ReturnBookCommandRequest, ReturnBookCommandResponse> for ReturnBookCommand {
    async fn execute(&self, req: ReturnBookCommandRequest) -> Result<ReturnBookCommandResponse, CommandError> {
        self.circulation_service.return_book(req.book_id.as_str())
            .await.map_err(CommandError::from).map(ReturnBookCommandResponse::new)
    }
}

#[cfg(test)]
mod tests {
    use async_once::AsyncOnce;
    use lazy_static::lazy_static;
    use crate::books::dto::BookDto;
    use crate::catalog::domain::CatalogService;
    use crate::catalog::factory::create_catalog_service;
    use crate::circulation::command::return_book_cmd::{ReturnBookCommand, ReturnBookCommandRequest};
    use crate::circulation::factory::create_circulation_service;
    use crate::core::command::{Command, CommandError};
    use crate::core::domain::Configuration;
    use crate::core::library::{BookStatus, HoldStatus};
    use crate::core::repository::RepositoryStore;
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
        static ref SUT_CMD: AsyncOnce<ReturnBookCommand> = AsyncOnce::new(async {
                let config = Configuration::new("test");
                let holds = create_hold_service(&config, RepositoryStore::InMemory).await;
                ReturnBookCommand::new(create_circulation_service(&config, RepositoryStore::InMemory, holds).await)
            });
    }

    #[tokio::test]
    async fn test_should_run_return_book() {
        let place_cmd: &PlaceHoldCommand = PLACE_CMD.get().await;
        let cmd: &ReturnBookCommand = SUT_CMD.get().await;
        let book = CATALOG_SVC.get().await.add_book(&BookDto::new("isbn", "return", BookStatus::CheckedOut))
            .await.expect("should add book");
        let patron = PATRON_SVC.get().await.add_patron(&PatronDto::new("return@example.org"))
            .await.expect("should add patron");
        let placed = place_cmd.execute(PlaceHoldCommandRequest::new(book.book_id.as_str(), patron.patron_id.as_str()))
            .await.expect("should place hold");

        let res = cmd.execute(ReturnBookCommandRequest::new(book.book_id.as_str())).await.expect("should return");
        let promoted = res.promoted.expect("should promote the waiting hold");
        assert_eq!(placed.hold.hold_id, promoted.hold_id);
        assert_eq!(HoldStatus::Ready, promoted.hold_status);

        let again = cmd.execute(ReturnBookCommandRequest::new(book.book_id.as_str())).await;
        assert!(matches!(again, Err(CommandError::Validation { .. })));
    }
}

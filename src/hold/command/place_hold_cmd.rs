use std::sync::Arc;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::core::command::{Command, CommandError};
use crate::hold::domain::HoldService;
use crate::hold::dto::HoldDto;

pub(crate) struct PlaceHoldCommand {
    hold_service: Arc<dyn HoldService>,
}

impl PlaceHoldCommand {
    pub(crate) fn new(hold_service: Arc<dyn HoldService>) -> Self {
        Self {
            hold_service,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct PlaceHoldCommandRequest {
    book_id: String,
    patron_id: String,
}

impl PlaceHoldCommandRequest {
    pub fn new(book_id: &str, patron_id: &str) -> Self {
        Self {
            book_id: book_id.to_string(),
            patron_id: patron_id.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct PlaceHoldCommandResponse {
    pub hold: HoldDto,
}

impl PlaceHoldCommandResponse {
    pub fn new(hold: HoldDto) -> Self {
        Self {
            hold,
        }
    }
}

#[async_trait]
impl Command<PlaceHoldCommandRequest, PlaceHoldCommandResponse> for PlaceHoldCommand {
    async fn execute(&self, req: PlaceHoldCommandRequest) -> Result<PlaceHoldCommandResponse, CommandError> {
        self.hold_service.place_hold(req.book_id.as_str(), req.patron_id.as_str())
            .await.map_err(CommandError::from).map(PlaceHoldCommandResponse::new)
    }
}

#[cfg(test)]
mod tests {
    use async_once::AsyncOnce;
    use lazy_static::lazy_static;
    use crate::books::dto::BookDto;
    use crate::catalog::domain::CatalogService;
    use crate::catalog::factory::create_catalog_service;
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
    }

    #[tokio::test]
    async fn test_should_run_place_hold() {
        let place_cmd: &PlaceHoldCommand = PLACE_CMD.get().await;
        let book = CATALOG_SVC.get().await.add_book(&BookDto::new("isbn", "place hold", BookStatus::Available))
            .await.expect("should add book");
        let patron = PATRON_SVC.get().await.add_patron(&PatronDto::new("place@example.org"))
            .await.expect("should add patron");

        let res = place_cmd.execute(PlaceHoldCommandRequest::new(book.book_id.as_str(), patron.patron_id.as_str()))
            .await.expect("should place hold");
        assert_eq!(HoldStatus::Ready, res.hold.hold_status);
        assert_eq!(book.book_id, res.hold.book_id);

        let unknown = place_cmd.execute(PlaceHoldCommandRequest::new(book.book_id.as_str(), "nobody")).await;
        assert!(matches!(unknown, Err(CommandError::NotFound { .. })));
    }
}

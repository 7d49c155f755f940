use std::sync::Arc;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::core::command::{Command, CommandError};
use crate::hold::domain::HoldService;
use crate::hold::dto::HoldDto;

pub(crate) struct CancelHoldCommand {
    hold_service: Arc<dyn HoldService>,
}

impl CancelHoldCommand {
    pub(crate) fn new(hold_service: Arc<dyn HoldService>) -> Self {
        Self {
            hold_service,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct CancelHoldCommandRequest {
    hold_id: String,
}

impl CancelHoldCommandRequest {
    pub fn new(hold_id: &str) -> Self {
        Self {
            hold_id: hold_id.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct CancelHoldCommandResponse {
    pub hold: HoldDto,
}

impl CancelHoldCommandResponse {
    pub fn new(hold: HoldDto) -> Self {
        Self {
            hold,
        }
    }
}

#[async_trait]
impl Command<CancelHoldCommandRequest, CancelHoldCommandResponse> for CancelHoldCommand {
    async fn execute(&self, req: CancelHoldCommandRequest) -> Result<CancelHoldCommandResponse, CommandError> {
        self.hold_service.cancel_hold(req.hold_id.as_str())
            .await.map_err(CommandError::from).map(CancelHoldCommandResponse::new)
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
    use crate::hold::command::cancel_hold_cmd::{CancelHoldCommand, CancelHoldCommandRequest};
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
        static ref CANCEL_CMD: AsyncOnce<CancelHoldCommand> = AsyncOnce::new(async {
                let svc = create_hold_service(&Configuration::new("test"), RepositoryStore::InMemory).await;
                CancelHoldCommand::new(svc)
            });
    }

    #[tokio::test]
    async fn test_should_run_cancel_hold() {
        let place_cmd: &PlaceHoldCommand = PLACE_CMD.get().await;
        let cancel_cmd: &CancelHoldCommand = CANCEL_CMD.get().await;
        let book = CATALOG_SVC.get().await.add_book(&BookDto::new("isbn", "cancel hold", BookStatus::CheckedOut))
            .await.expect("should add book");
        let patron = PATRON_SVC.get().await.add_patron(&PatronDto::new("cancel@example.org"))
            .await.expect("should add patron");
        let placed = place_cmd.execute(PlaceHoldCommandRequest::new(book.book_id.as_str(), patron.patron_id.as_str()))
            .await.expect("should place hold");

        let res = cancel_cmd.execute(CancelHoldCommandRequest::new(placed.hold.hold_id.as_str()))
            .await.expect("should cancel hold");
        assert_eq!(HoldStatus::Cancelled, res.hold.hold_status);
        let again = cancel_cmd.execute(CancelHoldCommandRequest::new(placed.hold.hold_id.as_str())).await;
        assert!(matches!(again, Err(CommandError::Rejected { .. })));
    }
}

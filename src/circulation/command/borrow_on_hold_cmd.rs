use std::sync::Arc;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::books::dto::BookDto;
use crate::circulation::domain::CirculationService;
use crate::core::command::{Command, CommandError};

pub(crate) struct BorrowOnHoldCommand {
    circulation_service: Arc<dyn CirculationService>,
}

impl BorrowOnHoldCommand {
    pub(crate) fn new(circulation_service: Arc<dyn CirculationService>) -> Self {
        Self {
            circulation_service,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct BorrowOnHoldCommandRequest {
    hold_id: String,
}

impl BorrowOnHoldCommandRequest {
    pub fn new(hold_id: &str) -> Self {
        Self {
            hold_id: hold_id.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct BorrowOnHoldCommandResponse {
    pub book: BookDto,
}

impl BorrowOnHoldCommandResponse {
    pub fn new(book: BookDto) -> Self {
        Self {
            book,
        }
    }
}

#[async_trait]
impl Command<BorrowOnHoldCommandRequest, BorrowOnHoldCommandResponse> for BorrowOnHoldCommand {
    async fn execute(&self, req: BorrowOnHoldCommandRequest) -> Result<BorrowOnHoldCommandResponse, CommandError> {
        self.circulation_service.borrow_on_hold(req.hold_id.as_str())
            .await.map_err(CommandError::from).map(BorrowOnHoldCommandResponse::new)
    }
}

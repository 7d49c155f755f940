use std::sync::Arc;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::core::command::{Command, CommandError};
use crate::hold::domain::HoldService;
use crate::hold::dto::HoldDto;

pub(crate) struct ProcessReturnCommand {
    hold_service: Arc<dyn HoldService>,
}

impl ProcessReturnCommand {
    pub(crate) fn new(hold_service: Arc<dyn HoldService>) -> Self {
        Self {
            hold_service,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProcessReturnCommandRequest {
    book_id: String,
}

impl ProcessReturnCommandRequest {
    pub fn new(book_id: &str) -> Self {
        Self {
            book_id: book_id.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ProcessReturnCommandResponse {
    pub promoted: Option<HoldDto>,
}

impl ProcessReturnCommandResponse {
    pub fn new(promoted: Option<HoldDto>) -> Self {
        Self {
            promoted,
        }
    }
}

#[async_trait]
impl Command<ProcessReturnCommandRequest, ProcessReturnCommandResponse> for ProcessReturnCommand {
    async fn execute(&self, req: ProcessReturnCommandRequest) -> Result<ProcessReturnCommandResponse, CommandError> {
        self.hold_service.process_return(req.book_id.as_str())
            .await.map_err(CommandError::from).map(ProcessReturnCommandResponse::new)
    }
}

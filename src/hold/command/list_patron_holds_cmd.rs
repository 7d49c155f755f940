use std::sync::Arc;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::core::command::{Command, CommandError};
use crate::hold::domain::HoldService;
use crate::hold::dto::HoldDto;

pub(crate) struct ListPatronHoldsCommand {
    hold_service: Arc<dyn HoldService>,
}

impl ListPatronHoldsCommand {
    pub(crate) fn new(hold_service: Arc<dyn HoldService>) -> Self {
        Self {
            hold_service,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListPatronHoldsCommandRequest {
    patron_id: String,
}

impl ListPatronHoldsCommandRequest {
    pub fn new(patron_id: &str) -> Self {
        Self {
            patron_id: patron_id.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ListPatronHoldsCommandResponse {
    pub holds: Vec<HoldDto>,
}

impl ListPatronHoldsCommandResponse {
    pub fn new(holds: Vec<HoldDto>) -> Self {
        Self {
            holds,
        }
    }
}

#[async_trait]
impl Command<ListPatronHoldsCommandRequest, ListPatronHoldsCommandResponse> for ListPatronHoldsCommand {
    async fn execute(&self, req: ListPatronHoldsCommandRequest) -> Result<ListPatronHoldsCommandResponse, CommandError> {
        self.hold_service.list_active_holds_for_patron(req.patron_id.as_str())
            .await.map_err(CommandError::from).map(ListPatronHoldsCommandResponse::new)
    }
}

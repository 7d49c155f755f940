use std::sync::Arc;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::core::command::{Command, CommandError};
use crate::hold::domain::HoldService;
use crate::hold::dto::HoldDto;

pub(crate) struct FulfillHoldCommand {
    hold_service: Arc<dyn HoldService>,
}

impl FulfillHoldCommand {
    pub(crate) fn new(hold_service: Arc<dyn HoldService>) -> Self {
        Self {
            hold_service,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct FulfillHoldCommandRequest {
    hold_id: String,
}

impl FulfillHoldCommandRequest {
    pub fn new(hold_id: &str) -> Self {
        Self {
            hold_id: hold_id.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct FulfillHoldCommandResponse {
    pub hold: HoldDto,
}

impl FulfillHoldCommandResponse {
    pub fn new(hold: HoldDto) -> Self {
        Self {
            hold,
        }
    }
}

#[async_trait]
impl Command<FulfillHoldCommandRequest, FulfillHoldCommandResponse> for FulfillHoldCommand {
    async fn execute(&self, req: FulfillHoldCommandRequest) -> Result<FulfillHoldCommandResponse, CommandError> {
        self.hold_service.fulfill_hold(req.hold_id.as_str())
            .await.map_err(CommandError::from).map(FulfillHoldCommandResponse::new)
    }
}

use std::sync::Arc;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::core::command::{Command, CommandError};
use crate::hold::domain::HoldService;
use crate::hold::dto::HoldDto;

pub(crate) struct GetHoldCommand {
    hold_service: Arc<dyn HoldService>,
}

impl GetHoldCommand {
    pub(crate) fn new(hold_service: Arc<dyn HoldService>) -> Self {
        Self {
            hold_service,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct GetHoldCommandRequest {
    hold_id: String,
}

impl GetHoldCommandRequest {
    pub fn new(hold_id: &str) -> Self {
        Self {
            hold_id: hold_id.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct GetHoldCommandResponse {
    pub hold: HoldDto,
}

impl GetHoldCommandResponse {
    pub fn new(hold: HoldDto) -> Self {
        Self {
            hold,
        }
    }
}

#[async_trait]
impl Command<GetHoldCommandRequest, GetHoldCommandResponse> for GetHoldCommand {
    async fn execute(&self, req: GetHoldCommandRequest) -> Result<GetHoldCommandResponse, CommandError> {
        self.hold_service.get_hold(req.hold_id.as_str())
            .await.map_err(CommandError::from).map(GetHoldCommandResponse::new)
    }
}

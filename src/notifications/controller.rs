use axum::{
    extract::{Path, State},
    response::Json,
};
use crate::core::command::Command;
use crate::core::controller::{AppState, ServerError};
use crate::notifications::command::list_unread_cmd::{ListUnreadCommand, ListUnreadCommandRequest, ListUnreadCommandResponse};
use crate::notifications::command::mark_read_cmd::{MarkReadCommand, MarkReadCommandRequest, MarkReadCommandResponse};

pub(crate) async fn list_unread(
    State(state): State<AppState>,
    Path(patron_id): Path<String>) -> Result<Json<ListUnreadCommandResponse>, ServerError> {
    let req = ListUnreadCommandRequest::new(patron_id.as_str());
    let res = ListUnreadCommand::new(state.notifications.clone()).execute(req).await?;
    Ok(Json(res))
}

pub(crate) async fn mark_read(
    State(state): State<AppState>,
    Path(notification_id): Path<String>) -> Result<Json<MarkReadCommandResponse>, ServerError> {
    let req = MarkReadCommandRequest::new(notification_id.as_str());
    let res = MarkReadCommand::new(state.notifications.clone()).execute(req).await?;
    Ok(Json(res))
}

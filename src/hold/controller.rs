use axum::{
    extract::{Path, State},
    response::Json,
};
use serde_json::Value;
use crate::core::command::Command;
use crate::core::controller::{AppState, json_to_server_error, ServerError};
use crate::hold::command::cancel_hold_cmd::{CancelHoldCommand, CancelHoldCommandRequest, CancelHoldCommandResponse};
use crate::hold::command::fulfill_hold_cmd::{FulfillHoldCommand, FulfillHoldCommandRequest, FulfillHoldCommandResponse};
use crate::hold::command::get_hold_cmd::{GetHoldCommand, GetHoldCommandRequest, GetHoldCommandResponse};
use crate::hold::command::list_item_queue_cmd::{ListItemQueueCommand, ListItemQueueCommandRequest, ListItemQueueCommandResponse};
use crate::hold::command::list_patron_holds_cmd::{ListPatronHoldsCommand, ListPatronHoldsCommandRequest, ListPatronHoldsCommandResponse};
use crate::hold::command::list_waiting_lists_cmd::{ListWaitingListsCommand, ListWaitingListsCommandRequest, ListWaitingListsCommandResponse};
use crate::hold::command::place_hold_cmd::{PlaceHoldCommand, PlaceHoldCommandRequest, PlaceHoldCommandResponse};
use crate::hold::command::process_return_cmd::{ProcessReturnCommand, ProcessReturnCommandRequest, ProcessReturnCommandResponse};
use crate::hold::command::send_reminders_cmd::{SendRemindersCommand, SendRemindersCommandRequest, SendRemindersCommandResponse};
use crate::hold::command::sweep_expired_cmd::{SweepExpiredCommand, SweepExpiredCommandRequest, SweepExpiredCommandResponse};

pub(crate) async fn place_hold(
    State(state): State<AppState>,
    json: Json<Value>) -> Result<Json<PlaceHoldCommandResponse>, ServerError> {
    let req: PlaceHoldCommandRequest = serde_json::from_value(json.0).map_err(json_to_server_error)?;
    let res = PlaceHoldCommand::new(state.holds.clone()).execute(req).await?;
    Ok(Json(res))
}

pub(crate) async fn get_hold(
    State(state): State<AppState>,
    Path(hold_id): Path<String>) -> Result<Json<GetHoldCommandResponse>, ServerError> {
    let req = GetHoldCommandRequest::new(hold_id.as_str());
    let res = GetHoldCommand::new(state.holds.clone()).execute(req).await?;
    Ok(Json(res))
}

pub(crate) async fn cancel_hold(
    State(state): State<AppState>,
    Path(hold_id): Path<String>) -> Result<Json<CancelHoldCommandResponse>, ServerError> {
    let req = CancelHoldCommandRequest::new(hold_id.as_str());
    let res = CancelHoldCommand::new(state.holds.clone()).execute(req).await?;
    Ok(Json(res))
}

pub(crate) async fn fulfill_hold(
    State(state): State<AppState>,
    Path(hold_id): Path<String>) -> Result<Json<FulfillHoldCommandResponse>, ServerError> {
    let req = FulfillHoldCommandRequest::new(hold_id.as_str());
    let res = FulfillHoldCommand::new(state.holds.clone()).execute(req).await?;
    Ok(Json(res))
}

pub(crate) async fn list_patron_holds(
    State(state): State<AppState>,
    Path(patron_id): Path<String>) -> Result<Json<ListPatronHoldsCommandResponse>, ServerError> {
    let req = ListPatronHoldsCommandRequest::new(patron_id.as_str());
    let res = ListPatronHoldsCommand::new(state.holds.clone()).execute(req).await?;
    Ok(Json(res))
}

pub(crate) async fn list_item_queue(
    State(state): State<AppState>,
    Path(book_id): Path<String>) -> Result<Json<ListItemQueueCommandResponse>, ServerError> {
    let req = ListItemQueueCommandRequest::new(book_id.as_str());
    let res = ListItemQueueCommand::new(state.holds.clone()).execute(req).await?;
    Ok(Json(res))
}

pub(crate) async fn process_return(
    State(state): State<AppState>,
    Path(book_id): Path<String>) -> Result<Json<ProcessReturnCommandResponse>, ServerError> {
    let req = ProcessReturnCommandRequest::new(book_id.as_str());
    let res = ProcessReturnCommand::new(state.holds.clone()).execute(req).await?;
    Ok(Json(res))
}

pub(crate) async fn list_waiting_lists(
    State(state): State<AppState>) -> Result<Json<ListWaitingListsCommandResponse>, ServerError> {
    let res = ListWaitingListsCommand::new(state.holds.clone())
        .execute(ListWaitingListsCommandRequest::default()).await?;
    Ok(Json(res))
}

// maintenance bodies are optional; an empty body runs against the current time
pub(crate) async fn sweep_expired(
    State(state): State<AppState>,
    json: Option<Json<Value>>) -> Result<Json<SweepExpiredCommandResponse>, ServerError> {
    let req: SweepExpiredCommandRequest = match json {
        Some(Json(body)) => serde_json::from_value(body).map_err(json_to_server_error)?,
        None => SweepExpiredCommandRequest::default(),
    };
    let res = SweepExpiredCommand::new(state.holds.clone()).execute(req).await?;
    Ok(Json(res))
}

pub(crate) async fn send_reminders(
    State(state): State<AppState>,
    json: Option<Json<Value>>) -> Result<Json<SendRemindersCommandResponse>, ServerError> {
    let req: SendRemindersCommandRequest = match json {
        Some(Json(body)) => serde_json::from_value(body).map_err(json_to_server_error)?,
        None => SendRemindersCommandRequest::default(),
    };
    let res = SendRemindersCommand::new(state.holds.clone()).execute(req).await?;
    Ok(Json(res))
}

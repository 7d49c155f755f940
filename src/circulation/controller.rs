use axum::{
    extract::{Path, State},
    response::Json,
};
use serde::Deserialize;
use serde_json::Value;
use crate::circulation::command::borrow_book_cmd::{BorrowBookCommand, BorrowBookCommandRequest, BorrowBookCommandResponse};
use crate::circulation::command::borrow_on_hold_cmd::{BorrowOnHoldCommand, BorrowOnHoldCommandRequest, BorrowOnHoldCommandResponse};
use crate::circulation::command::return_book_cmd::{ReturnBookCommand, ReturnBookCommandRequest, ReturnBookCommandResponse};
use crate::core::command::Command;
use crate::core::controller::{AppState, json_to_server_error, ServerError};

#[derive(Deserialize)]
struct BorrowBody {
    patron_id: String,
}

pub(crate) async fn borrow_book(
    State(state): State<AppState>,
    Path(book_id): Path<String>,
    json: Json<Value>) -> Result<Json<BorrowBookCommandResponse>, ServerError> {
    let body: BorrowBody = serde_json::from_value(json.0).map_err(json_to_server_error)?;
    let req = BorrowBookCommandRequest::new(book_id.as_str(), body.patron_id.as_str());
    let res = BorrowBookCommand::new(state.circulation.clone()).execute(req).await?;
    Ok(Json(res))
}

pub(crate) async fn borrow_on_hold(
    State(state): State<AppState>,
    Path(hold_id): Path<String>) -> Result<Json<BorrowOnHoldCommandResponse>, ServerError> {
    let req = BorrowOnHoldCommandRequest::new(hold_id.as_str());
    let res = BorrowOnHoldCommand::new(state.circulation.clone()).execute(req).await?;
    Ok(Json(res))
}

pub(crate) async fn return_book(
    State(state): State<AppState>,
    Path(book_id): Path<String>) -> Result<Json<ReturnBookCommandResponse>, ServerError> {
    let req = ReturnBookCommandRequest::new(book_id.as_str());
    let res = ReturnBookCommand::new(state.circulation.clone()).execute(req).await?;
    Ok(Json(res))
}

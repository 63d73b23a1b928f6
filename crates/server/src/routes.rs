//! The dispatch table: one `GET` route per ledger operation.
//!
//! Composite routes accept their command either as the delimiter-joined path
//! parameter or as named query parameters on the bare prefix. Ledger
//! rejections an operation declares a sentinel for are answered with that
//! sentinel as a plain-text 200 body; everything else goes out as JSON.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use server_api::{
    decode_command, get_all_groups, get_user_record, query_all_users, sentinel_body,
    user_record_id, CommandInput, Dispatch,
};
use shared::{
    command::{AddGroup, AddUser, DeliveryItem, GenerateSet, PrepareDelivery},
    error::{ApiError, ErrorCode},
    protocol::Operation,
};
use tower_http::trace::TraceLayer;
use tracing::debug;

use crate::app_state::AppState;

type Fields = HashMap<String, String>;

pub(crate) fn build_router(state: Arc<AppState>) -> Router {
    let groups = Operation::GetAllGroups.route();
    let users = Operation::QueryAllUsers.route();

    Router::new()
        .route("/healthz", get(healthz))
        .route(groups, get(http_get_all_groups))
        .route(&format!("{groups}/"), get(http_get_all_groups))
        .route(users, get(http_query_all_users))
        .route(&format!("{users}/"), get(http_query_all_users))
        .route(
            Operation::AddGroup.path_template(),
            get(command_by_path::<AddGroup>),
        )
        .route(Operation::AddGroup.route(), get(command_by_query::<AddGroup>))
        .route(
            Operation::AddUser.path_template(),
            get(command_by_path::<AddUser>),
        )
        .route(Operation::AddUser.route(), get(command_by_query::<AddUser>))
        .route(
            Operation::GenerateSetForGroup.path_template(),
            get(command_by_path::<GenerateSet>),
        )
        .route(
            Operation::GenerateSetForGroup.route(),
            get(command_by_query::<GenerateSet>),
        )
        .route(
            Operation::GetUserRecord.path_template(),
            get(http_user_record_by_path),
        )
        .route(
            Operation::GetUserRecord.route(),
            get(http_user_record_by_query),
        )
        .route(
            Operation::PrepareForDelivery.path_template(),
            get(command_by_path::<PrepareDelivery>),
        )
        .route(
            Operation::PrepareForDelivery.route(),
            get(command_by_query::<PrepareDelivery>),
        )
        .route(
            Operation::DeliveryItem.path_template(),
            get(command_by_path::<DeliveryItem>),
        )
        .route(
            Operation::DeliveryItem.route(),
            get(command_by_query::<DeliveryItem>),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

async fn http_get_all_groups(State(state): State<Arc<AppState>>) -> Response {
    respond(Operation::GetAllGroups, get_all_groups(&state.api).await)
}

async fn http_query_all_users(State(state): State<Arc<AppState>>) -> Response {
    respond(Operation::QueryAllUsers, query_all_users(&state.api).await)
}

async fn command_by_path<C: Dispatch>(
    State(state): State<Arc<AppState>>,
    Path(raw): Path<String>,
) -> Response {
    run_command::<C>(&state, CommandInput::Path(&raw)).await
}

async fn command_by_query<C: Dispatch>(
    State(state): State<Arc<AppState>>,
    Query(fields): Query<Fields>,
) -> Response {
    run_command::<C>(&state, CommandInput::Fields(&fields)).await
}

async fn run_command<C: Dispatch>(state: &AppState, input: CommandInput<'_>) -> Response {
    let result = match decode_command::<C>(input) {
        Ok(command) => command.dispatch(&state.api).await,
        Err(err) => Err(err),
    };
    respond(C::OPERATION, result)
}

async fn http_user_record_by_path(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Response {
    user_record(&state, CommandInput::Path(&id)).await
}

async fn http_user_record_by_query(
    State(state): State<Arc<AppState>>,
    Query(fields): Query<Fields>,
) -> Response {
    user_record(&state, CommandInput::Fields(&fields)).await
}

async fn user_record(state: &AppState, input: CommandInput<'_>) -> Response {
    let result = match user_record_id(input) {
        Ok(id) => get_user_record(&state.api, &id).await,
        Err(err) => Err(err),
    };
    respond(Operation::GetUserRecord, result)
}

fn respond<T: Serialize>(operation: Operation, result: Result<T, ApiError>) -> Response {
    match result {
        Ok(payload) => Json(payload).into_response(),
        Err(err) => match sentinel_body(operation, &err) {
            Some(body) => {
                debug!(%operation, body, "answering with sentinel");
                (
                    StatusCode::OK,
                    [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                    body,
                )
                    .into_response()
            }
            None => (status_for(err.code), Json(err)).into_response(),
        },
    }
}

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::Validation => StatusCode::BAD_REQUEST,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Generation => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[cfg(test)]
#[path = "tests/routes_tests.rs"]
mod tests;

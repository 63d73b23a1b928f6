use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use ledger::{Ledger, LedgerError};
use serde::Serialize;
use shared::{
    command::{
        decode_path_segment, from_fields, AddGroup, AddUser, Command, DeliveryItem, GenerateSet,
        PrepareDelivery,
    },
    domain::{LedgerEntry, Record},
    error::{ApiError, ErrorCode},
    protocol::{Operation, StatusReply},
};
use tracing::{error, warn};

#[derive(Clone)]
pub struct ApiContext {
    pub ledger: Arc<dyn Ledger>,
}

impl ApiContext {
    pub fn new(ledger: Arc<dyn Ledger>) -> Self {
        Self { ledger }
    }
}

/// How a command arrived: the delimiter-joined path parameter, or named
/// query parameters on the bare route.
#[derive(Debug, Clone, Copy)]
pub enum CommandInput<'a> {
    Path(&'a str),
    Fields(&'a HashMap<String, String>),
}

/// A command the route layer can hand to the ledger. Lets one generic
/// handler serve every composite route.
#[async_trait]
pub trait Dispatch: Command + Send + Sync + 'static {
    type Reply: Serialize + Send;

    async fn dispatch(&self, ctx: &ApiContext) -> Result<Self::Reply, ApiError>;
}

#[async_trait]
impl Dispatch for AddGroup {
    type Reply = StatusReply;

    async fn dispatch(&self, ctx: &ApiContext) -> Result<StatusReply, ApiError> {
        add_group(ctx, self).await
    }
}

#[async_trait]
impl Dispatch for AddUser {
    type Reply = StatusReply;

    async fn dispatch(&self, ctx: &ApiContext) -> Result<StatusReply, ApiError> {
        add_user(ctx, self).await
    }
}

#[async_trait]
impl Dispatch for GenerateSet {
    type Reply = StatusReply;

    async fn dispatch(&self, ctx: &ApiContext) -> Result<StatusReply, ApiError> {
        generate_set_for_group(ctx, self).await
    }
}

#[async_trait]
impl Dispatch for PrepareDelivery {
    type Reply = Vec<LedgerEntry>;

    async fn dispatch(&self, ctx: &ApiContext) -> Result<Vec<LedgerEntry>, ApiError> {
        prepare_for_delivery(ctx, self).await
    }
}

#[async_trait]
impl Dispatch for DeliveryItem {
    type Reply = Record;

    async fn dispatch(&self, ctx: &ApiContext) -> Result<Record, ApiError> {
        delivery_item(ctx, self).await
    }
}

pub fn decode_command<C: Command>(input: CommandInput<'_>) -> Result<C, ApiError> {
    let decoded = match input {
        CommandInput::Path(raw) => decode_path_segment::<C>(raw).map_err(|e| e.to_string()),
        CommandInput::Fields(fields) => from_fields::<C>(fields).map_err(|e| e.to_string()),
    };
    decoded.map_err(|message| {
        warn!(operation = %C::OPERATION, %message, "rejected malformed command");
        ApiError::new(ErrorCode::Validation, message)
    })
}

/// The id of `get_user_record`. The path form is passed through verbatim,
/// delimiters included.
pub fn user_record_id(input: CommandInput<'_>) -> Result<String, ApiError> {
    match input {
        CommandInput::Path(raw) => Ok(raw.to_string()),
        CommandInput::Fields(fields) => fields.get("id").cloned().ok_or_else(|| {
            ApiError::new(ErrorCode::Validation, "missing field `id`")
        }),
    }
}

/// The literal body to answer with instead of `err`, when `operation`
/// declares one for its kind.
pub fn sentinel_body(operation: Operation, err: &ApiError) -> Option<&'static str> {
    err.code
        .failure_kind()
        .and_then(|kind| operation.sentinel_for(kind))
}

pub async fn get_all_groups(ctx: &ApiContext) -> Result<Vec<LedgerEntry>, ApiError> {
    ctx.ledger
        .list_groups()
        .await
        .map_err(|e| ledger_failure(Operation::GetAllGroups, e))
}

pub async fn add_group(ctx: &ApiContext, command: &AddGroup) -> Result<StatusReply, ApiError> {
    let key = ctx
        .ledger
        .add_group(command)
        .await
        .map_err(|e| ledger_failure(Operation::AddGroup, e))?;
    Ok(StatusReply::recorded(key))
}

pub async fn add_user(ctx: &ApiContext, command: &AddUser) -> Result<StatusReply, ApiError> {
    let key = ctx
        .ledger
        .add_user(command)
        .await
        .map_err(|e| ledger_failure(Operation::AddUser, e))?;
    Ok(StatusReply::recorded(key))
}

pub async fn query_all_users(ctx: &ApiContext) -> Result<Vec<LedgerEntry>, ApiError> {
    ctx.ledger
        .list_users()
        .await
        .map_err(|e| ledger_failure(Operation::QueryAllUsers, e))
}

pub async fn generate_set_for_group(
    ctx: &ApiContext,
    command: &GenerateSet,
) -> Result<StatusReply, ApiError> {
    let assigned = ctx
        .ledger
        .generate_set(command)
        .await
        .map_err(|e| ledger_failure(Operation::GenerateSetForGroup, e))?;
    Ok(StatusReply::generated(assigned))
}

pub async fn get_user_record(ctx: &ApiContext, id: &str) -> Result<Record, ApiError> {
    ctx.ledger
        .get_user_record(id)
        .await
        .map_err(|e| ledger_failure(Operation::GetUserRecord, e))
}

pub async fn prepare_for_delivery(
    ctx: &ApiContext,
    command: &PrepareDelivery,
) -> Result<Vec<LedgerEntry>, ApiError> {
    ctx.ledger
        .prepare_for_delivery(command)
        .await
        .map_err(|e| ledger_failure(Operation::PrepareForDelivery, e))
}

pub async fn delivery_item(ctx: &ApiContext, command: &DeliveryItem) -> Result<Record, ApiError> {
    ctx.ledger
        .delivery_item(command)
        .await
        .map_err(|e| ledger_failure(Operation::DeliveryItem, e))
}

fn ledger_failure(operation: Operation, err: LedgerError) -> ApiError {
    match err {
        LedgerError::Rejected { kind, message } => {
            warn!(%operation, ?kind, %message, "ledger rejected operation");
            ApiError::new(kind.into(), message)
        }
        LedgerError::Internal(source) => {
            error!(%operation, error = %source, "ledger operation failed");
            ApiError::internal(source.to_string())
        }
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;

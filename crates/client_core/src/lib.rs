use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::Serialize;
use shared::{
    command::{
        encode_path_segment, AddGroup, AddUser, Command, DeliveryItem, GenerateSet,
        PrepareDelivery,
    },
    domain::{KeyedRecord, Payload},
    error::ApiError,
    protocol::Operation,
};
use tracing::{debug, warn};
use url::Url;

pub mod classify;
pub mod error;
pub mod normalize;
pub mod view;

pub use error::ClientError;

use classify::{classify_listing, classify_status};
use normalize::{normalize, SortOrder};

pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8000";

/// How a command's fields travel to the route layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestEncoding {
    /// Named query parameters on the bare route, e.g. `/add_group?groupName=..`.
    #[default]
    Query,
    /// One `-`-joined path segment, e.g. `/add_group/AB21-Evening class`.
    LegacyPath,
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub server_url: String,
    pub encoding: RequestEncoding,
    /// Per-request timeout. `None` waits for the ledger indefinitely.
    pub timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            encoding: RequestEncoding::default(),
            timeout: None,
        }
    }
}

/// One method per ledger operation. Listings come back merged and sorted;
/// sentinel bodies come back as [`ClientError::Rejected`].
#[async_trait]
pub trait LedgerApi: Send + Sync {
    async fn query_all_groups(&self) -> Result<Vec<KeyedRecord>, ClientError>;
    async fn add_group(&self, command: &AddGroup) -> Result<Payload, ClientError>;
    async fn add_user(&self, command: &AddUser) -> Result<Payload, ClientError>;
    async fn query_all_users(&self) -> Result<Vec<KeyedRecord>, ClientError>;
    async fn generate_set_for_group(&self, command: &GenerateSet)
        -> Result<Payload, ClientError>;
    async fn get_user_record(&self, id: &str) -> Result<Payload, ClientError>;
    async fn prepare_for_delivery(
        &self,
        command: &PrepareDelivery,
    ) -> Result<Vec<KeyedRecord>, ClientError>;
    async fn delivery_item(&self, command: &DeliveryItem) -> Result<Payload, ClientError>;
}

pub struct LedgerClient {
    http: Client,
    base: Url,
    encoding: RequestEncoding,
}

impl LedgerClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let base = Url::parse(&config.server_url)?;
        if base.cannot_be_a_base() {
            return Err(ClientError::InvalidServerUrl(config.server_url.clone()));
        }
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;
        Ok(Self {
            http,
            base,
            encoding: config.encoding,
        })
    }

    pub fn encoding(&self) -> RequestEncoding {
        self.encoding
    }

    /// Route URL under the base path. `segment` is percent-encoded as a
    /// single path segment.
    fn endpoint(&self, operation: Operation, segment: Option<&str>) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty()
                .push(operation.route().trim_start_matches('/'));
            if let Some(segment) = segment {
                path.push(segment);
            }
        }
        url
    }

    async fn fetch(
        &self,
        operation: Operation,
        request: RequestBuilder,
    ) -> Result<String, ClientError> {
        debug!(%operation, "sending ledger request");
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            let message = serde_json::from_str::<ApiError>(&body)
                .map(|err| err.message)
                .unwrap_or(body);
            warn!(%operation, status = status.as_u16(), %message, "ledger request failed");
            return Err(ClientError::Status {
                operation,
                status: status.as_u16(),
                message,
            });
        }
        Ok(body)
    }

    async fn send_command<C>(&self, command: &C) -> Result<String, ClientError>
    where
        C: Command + Serialize + Sync,
    {
        let operation = C::OPERATION;
        let request = match self.encoding {
            RequestEncoding::Query => self.http.get(self.endpoint(operation, None)).query(command),
            RequestEncoding::LegacyPath => {
                let segment = encode_path_segment(command)?;
                self.http.get(self.endpoint(operation, Some(&segment)))
            }
        };
        self.fetch(operation, request).await
    }

    async fn list(&self, operation: Operation) -> Result<Vec<KeyedRecord>, ClientError> {
        let body = self
            .fetch(operation, self.http.get(self.endpoint(operation, None)))
            .await?;
        listing(operation, &body)
    }
}

fn listing(operation: Operation, body: &str) -> Result<Vec<KeyedRecord>, ClientError> {
    let entries = classify_listing(operation, body)?;
    let order = SortOrder::for_operation(operation).unwrap_or(SortOrder::GroupName);
    Ok(normalize(entries, order))
}

#[async_trait]
impl LedgerApi for LedgerClient {
    async fn query_all_groups(&self) -> Result<Vec<KeyedRecord>, ClientError> {
        self.list(Operation::GetAllGroups).await
    }

    async fn add_group(&self, command: &AddGroup) -> Result<Payload, ClientError> {
        let body = self.send_command(command).await?;
        classify_status(Operation::AddGroup, &body)
    }

    async fn add_user(&self, command: &AddUser) -> Result<Payload, ClientError> {
        let body = self.send_command(command).await?;
        classify_status(Operation::AddUser, &body)
    }

    async fn query_all_users(&self) -> Result<Vec<KeyedRecord>, ClientError> {
        self.list(Operation::QueryAllUsers).await
    }

    async fn generate_set_for_group(
        &self,
        command: &GenerateSet,
    ) -> Result<Payload, ClientError> {
        let body = self.send_command(command).await?;
        classify_status(Operation::GenerateSetForGroup, &body)
    }

    async fn get_user_record(&self, id: &str) -> Result<Payload, ClientError> {
        let operation = Operation::GetUserRecord;
        let request = match self.encoding {
            RequestEncoding::Query => self
                .http
                .get(self.endpoint(operation, None))
                .query(&[("id", id)]),
            RequestEncoding::LegacyPath => self.http.get(self.endpoint(operation, Some(id))),
        };
        let body = self.fetch(operation, request).await?;
        classify_status(operation, &body)
    }

    async fn prepare_for_delivery(
        &self,
        command: &PrepareDelivery,
    ) -> Result<Vec<KeyedRecord>, ClientError> {
        let body = self.send_command(command).await?;
        listing(Operation::PrepareForDelivery, &body)
    }

    async fn delivery_item(&self, command: &DeliveryItem) -> Result<Payload, ClientError> {
        let body = self.send_command(command).await?;
        classify_status(Operation::DeliveryItem, &body)
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;

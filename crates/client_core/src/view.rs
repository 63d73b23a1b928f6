//! Console regions. Each region moves `Idle -> Loading -> Success | Error`
//! on request completion only.

use shared::{
    command::{AddGroup, AddUser, DeliveryItem, EncodeError, GenerateSet, PrepareDelivery},
    domain::{KeyedRecord, Payload},
    error::FailureKind,
};
use tracing::{debug, info};

use crate::{error::ClientError, LedgerApi};

pub const RATE_FIELD: &str = "rate";
pub const USER_ID_FIELD: &str = "userId";
pub const COURSE_FIELD: &str = "course";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewError {
    /// The ledger answered with a failure sentinel.
    Rejected(FailureKind),
    /// The console could not build a request from its inputs.
    Invalid(String),
    Transport(String),
}

impl From<&ClientError> for ViewError {
    fn from(err: &ClientError) -> Self {
        match err {
            ClientError::Rejected { kind, .. } => Self::Rejected(*kind),
            ClientError::Encode(err) => Self::Invalid(err.to_string()),
            other => Self::Transport(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum ViewState<T> {
    #[default]
    Idle,
    Loading,
    Success(T),
    Error(ViewError),
}

impl<T> ViewState<T> {
    pub fn begin(&mut self) {
        *self = Self::Loading;
    }

    pub fn complete(&mut self, result: Result<T, ClientError>) {
        *self = match result {
            Ok(value) => Self::Success(value),
            Err(err) => Self::Error(ViewError::from(&err)),
        };
    }

    pub fn reset(&mut self) {
        *self = Self::Idle;
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn success(&self) -> Option<&T> {
        match self {
            Self::Success(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&ViewError> {
        match self {
            Self::Error(err) => Some(err),
            _ => None,
        }
    }
}

/// Builds the delivery command for a selected exam item and an entered rate.
pub fn delivery_command(item: &KeyedRecord, rate: &str) -> Result<DeliveryItem, EncodeError> {
    let student_id = item
        .str_field(USER_ID_FIELD)
        .ok_or(EncodeError::MissingField("studentId"))?;
    let course = item
        .str_field(COURSE_FIELD)
        .ok_or(EncodeError::MissingField("course"))?;
    Ok(DeliveryItem {
        student_id: student_id.to_string(),
        course: course.to_string(),
        rate: rate.to_string(),
    })
}

pub struct Console<B> {
    backend: B,
    pub groups: ViewState<Vec<KeyedRecord>>,
    pub users: ViewState<Vec<KeyedRecord>>,
    pub add_group: ViewState<Payload>,
    pub add_user: ViewState<Payload>,
    pub generated_set: ViewState<Payload>,
    pub user_record: ViewState<Payload>,
    pub delivery_items: ViewState<Vec<KeyedRecord>>,
    pub delivery: ViewState<Payload>,
    take_form: Option<KeyedRecord>,
}

impl<B: LedgerApi> Console<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            groups: ViewState::Idle,
            users: ViewState::Idle,
            add_group: ViewState::Idle,
            add_user: ViewState::Idle,
            generated_set: ViewState::Idle,
            user_record: ViewState::Idle,
            delivery_items: ViewState::Idle,
            delivery: ViewState::Idle,
            take_form: None,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub async fn query_all_groups(&mut self) {
        self.groups.begin();
        let result = self.backend.query_all_groups().await;
        self.groups.complete(result);
    }

    pub async fn add_group(&mut self, command: &AddGroup) {
        self.add_group.begin();
        let result = self.backend.add_group(command).await;
        self.add_group.complete(result);
    }

    pub async fn add_user(&mut self, command: &AddUser) {
        self.add_user.begin();
        let result = self.backend.add_user(command).await;
        self.add_user.complete(result);
    }

    pub async fn query_all_users(&mut self) {
        self.users.begin();
        let result = self.backend.query_all_users().await;
        self.users.complete(result);
    }

    pub async fn generate_set_for_group(&mut self, command: &GenerateSet) {
        self.generated_set.begin();
        let result = self.backend.generate_set_for_group(command).await;
        self.generated_set.complete(result);
    }

    pub async fn get_user_record(&mut self, id: &str) {
        self.user_record.begin();
        let result = self.backend.get_user_record(id).await;
        self.user_record.complete(result);
    }

    pub async fn prepare_for_delivery(&mut self, command: &PrepareDelivery) {
        self.delivery_items.begin();
        let result = self.backend.prepare_for_delivery(command).await;
        if result.is_ok() {
            self.take_form = None;
        }
        self.delivery_items.complete(result);
    }

    /// Opens the take form for an unrated item and clears the last delivery
    /// outcome. A rated item closes the form. Returns whether the form is open.
    pub fn select_item(&mut self, item: KeyedRecord) -> bool {
        let rated = item
            .str_field(RATE_FIELD)
            .is_some_and(|rate| !rate.is_empty());
        if rated {
            debug!(key = item.key(), "selected item already rated");
            self.take_form = None;
            return false;
        }
        self.delivery.reset();
        self.take_form = Some(item);
        true
    }

    pub fn take_form(&self) -> Option<&KeyedRecord> {
        self.take_form.as_ref()
    }

    pub async fn deliver_selected(&mut self, rate: &str) {
        let command = match &self.take_form {
            Some(item) => delivery_command(item, rate).map_err(ClientError::from),
            None => {
                self.delivery = ViewState::Error(ViewError::Invalid(
                    "no exam item selected".to_string(),
                ));
                return;
            }
        };
        self.delivery.begin();
        let result = match command {
            Ok(command) => {
                info!(student = %command.student_id, course = %command.course, "delivering exam item");
                self.backend.delivery_item(&command).await
            }
            Err(err) => Err(err),
        };
        self.delivery.complete(result);
    }
}

#[cfg(test)]
#[path = "tests/view_tests.rs"]
mod tests;

use std::sync::Mutex;

use super::*;
use async_trait::async_trait;
use serde_json::{json, Value};
use shared::{
    domain::LedgerEntry,
    protocol::{Operation, NO_GROUP_ITEM, UNPASSED_TEST},
};

fn keyed(key: &str, record: Value) -> KeyedRecord {
    LedgerEntry::new(key, record.as_object().cloned().expect("object")).into()
}

fn exam_item(key: &str, rate: &str) -> KeyedRecord {
    keyed(
        key,
        json!({
            "userId": key,
            "testId": "1A2B",
            "userName": "Student",
            "group": "AB17",
            "course": "Math",
            "rate": rate,
        }),
    )
}

fn rejected(operation: Operation, kind: FailureKind, sentinel: &'static str) -> ClientError {
    ClientError::Rejected {
        operation,
        kind,
        sentinel,
    }
}

#[derive(Default)]
struct FakeLedger {
    groups: Vec<KeyedRecord>,
    delivery_items: Vec<KeyedRecord>,
    reject_delivery: bool,
    delivered: Mutex<Vec<DeliveryItem>>,
}

#[async_trait]
impl LedgerApi for FakeLedger {
    async fn query_all_groups(&self) -> Result<Vec<KeyedRecord>, ClientError> {
        Ok(self.groups.clone())
    }

    async fn add_group(&self, command: &AddGroup) -> Result<Payload, ClientError> {
        Ok(json!({ "status": "recorded", "Key": command.group_name }))
    }

    async fn add_user(&self, command: &AddUser) -> Result<Payload, ClientError> {
        if command.group_name.is_empty() {
            return Err(rejected(
                Operation::AddUser,
                FailureKind::Validation,
                UNPASSED_TEST,
            ));
        }
        Ok(json!({ "status": "recorded" }))
    }

    async fn query_all_users(&self) -> Result<Vec<KeyedRecord>, ClientError> {
        Err(ClientError::InvalidServerUrl("offline".to_string()))
    }

    async fn generate_set_for_group(
        &self,
        _command: &GenerateSet,
    ) -> Result<Payload, ClientError> {
        Ok(json!({ "status": "generated", "assigned": 4 }))
    }

    async fn get_user_record(&self, id: &str) -> Result<Payload, ClientError> {
        Ok(json!({ "userId": id }))
    }

    async fn prepare_for_delivery(
        &self,
        _command: &PrepareDelivery,
    ) -> Result<Vec<KeyedRecord>, ClientError> {
        if self.delivery_items.is_empty() {
            return Err(rejected(
                Operation::PrepareForDelivery,
                FailureKind::NotFound,
                NO_GROUP_ITEM,
            ));
        }
        Ok(self.delivery_items.clone())
    }

    async fn delivery_item(&self, command: &DeliveryItem) -> Result<Payload, ClientError> {
        self.delivered
            .lock()
            .expect("delivered lock")
            .push(command.clone());
        if self.reject_delivery {
            return Err(rejected(
                Operation::DeliveryItem,
                FailureKind::Validation,
                UNPASSED_TEST,
            ));
        }
        Ok(json!({ "rate": command.rate }))
    }
}

fn prepare() -> PrepareDelivery {
    PrepareDelivery {
        group: "AB17".to_string(),
        course: "Math".to_string(),
    }
}

#[test]
fn view_state_moves_through_loading_to_outcome() {
    let mut state: ViewState<u32> = ViewState::default();
    assert_eq!(state, ViewState::Idle);
    state.begin();
    assert!(state.is_loading());
    state.complete(Ok(7));
    assert_eq!(state.success(), Some(&7));
    state.begin();
    state.complete(Err(ClientError::InvalidServerUrl("x".to_string())));
    assert!(state.success().is_none());
    assert!(matches!(state.error(), Some(ViewError::Transport(_))));
}

#[tokio::test]
async fn listing_success_fills_region() {
    let mut console = Console::new(FakeLedger {
        groups: vec![keyed("1", json!({ "groupName": "AB17" }))],
        ..FakeLedger::default()
    });
    console.query_all_groups().await;
    let groups = console.groups.success().expect("groups");
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].key(), "1");
    assert_eq!(console.users, ViewState::Idle);
}

#[tokio::test]
async fn transport_failure_lands_in_error_region() {
    let mut console = Console::new(FakeLedger::default());
    console.query_all_users().await;
    assert!(matches!(
        console.users.error(),
        Some(ViewError::Transport(_))
    ));
}

#[tokio::test]
async fn sentinel_never_reaches_success_state() {
    let mut console = Console::new(FakeLedger::default());
    console
        .add_user(&AddUser {
            student_id: "AB1705".to_string(),
            student_name: "New".to_string(),
            group_name: String::new(),
            description: String::new(),
        })
        .await;
    assert_eq!(
        console.add_user.error(),
        Some(&ViewError::Rejected(FailureKind::Validation))
    );
    assert!(console.add_user.success().is_none());

    console.prepare_for_delivery(&prepare()).await;
    assert_eq!(
        console.delivery_items.error(),
        Some(&ViewError::Rejected(FailureKind::NotFound))
    );
}

#[tokio::test]
async fn write_regions_hold_their_payloads() {
    let mut console = Console::new(FakeLedger::default());
    console
        .add_group(&AddGroup {
            group_name: "AB21".to_string(),
            description: "Evening class".to_string(),
        })
        .await;
    console
        .generate_set_for_group(&GenerateSet {
            group_name: "AB17".to_string(),
            course_name: "Math".to_string(),
            teacher_name: "Smith".to_string(),
        })
        .await;
    console.get_user_record("0000000000000001").await;

    assert_eq!(console.add_group.success().expect("add")["Key"], json!("AB21"));
    assert_eq!(
        console.generated_set.success().expect("generated")["assigned"],
        json!(4)
    );
    assert_eq!(
        console.user_record.success().expect("record")["userId"],
        json!("0000000000000001")
    );
}

#[tokio::test]
async fn unrated_item_opens_take_form_and_clears_last_delivery() {
    let mut console = Console::new(FakeLedger::default());
    console.delivery = ViewState::Success(json!({ "rate": "5" }));

    assert!(console.select_item(exam_item("0000000000000007", "")));
    assert_eq!(
        console.take_form().map(KeyedRecord::key),
        Some("0000000000000007")
    );
    assert_eq!(console.delivery, ViewState::Idle);
}

#[tokio::test]
async fn rated_item_closes_take_form() {
    let mut console = Console::new(FakeLedger::default());
    assert!(console.select_item(exam_item("1", "")));
    assert!(!console.select_item(exam_item("2", "4")));
    assert!(console.take_form().is_none());
}

#[tokio::test]
async fn successful_prepare_closes_take_form() {
    let mut console = Console::new(FakeLedger {
        delivery_items: vec![exam_item("2", ""), exam_item("10", "")],
        ..FakeLedger::default()
    });
    console.select_item(exam_item("2", ""));
    console.prepare_for_delivery(&prepare()).await;
    assert!(console.take_form().is_none());
    assert_eq!(console.delivery_items.success().map(Vec::len), Some(2));
}

#[tokio::test]
async fn failed_prepare_keeps_take_form() {
    let mut console = Console::new(FakeLedger::default());
    console.select_item(exam_item("2", ""));
    console.prepare_for_delivery(&prepare()).await;
    assert!(console.take_form().is_some());
}

#[tokio::test]
async fn deliver_selected_sends_user_id_as_student_id() {
    let mut console = Console::new(FakeLedger::default());
    console.select_item(exam_item("0000000000000007", ""));
    console.deliver_selected("5").await;

    let delivered = console.backend().delivered.lock().expect("lock").clone();
    assert_eq!(
        delivered,
        vec![DeliveryItem {
            student_id: "0000000000000007".to_string(),
            course: "Math".to_string(),
            rate: "5".to_string(),
        }]
    );
    assert_ne!(delivered[0].student_id, "undefined");
    assert_eq!(console.delivery.success(), Some(&json!({ "rate": "5" })));
}

#[tokio::test]
async fn deliver_without_selection_is_invalid() {
    let mut console = Console::new(FakeLedger::default());
    console.deliver_selected("5").await;
    assert!(matches!(console.delivery.error(), Some(ViewError::Invalid(_))));
    assert!(console.backend().delivered.lock().expect("lock").is_empty());
}

#[tokio::test]
async fn deliver_with_incomplete_item_sends_nothing() {
    let mut console = Console::new(FakeLedger::default());
    console.select_item(keyed("3", json!({ "userId": "3", "rate": "" })));
    console.deliver_selected("5").await;
    assert_eq!(
        console.delivery.error(),
        Some(&ViewError::Invalid(
            EncodeError::MissingField("course").to_string()
        ))
    );
    assert!(console.backend().delivered.lock().expect("lock").is_empty());
}

#[tokio::test]
async fn rejected_delivery_is_reported_as_validation() {
    let mut console = Console::new(FakeLedger {
        reject_delivery: true,
        ..FakeLedger::default()
    });
    console.select_item(exam_item("1", ""));
    console.deliver_selected("5").await;
    assert_eq!(
        console.delivery.error(),
        Some(&ViewError::Rejected(FailureKind::Validation))
    );
}

use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared::domain::Record;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RecordType {
    #[serde(rename = "G")]
    Group,
    #[default]
    #[serde(rename = "S")]
    Student,
    /// Reserved for teacher records.
    #[serde(rename = "T")]
    Teacher,
}

/// A stored ledger value. Groups and students share the layout and are told
/// apart by `record_type`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerRecord {
    pub record_type: RecordType,
    #[serde(default)]
    pub group_name: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "registerTS", default)]
    pub register_ts: String,
    #[serde(default)]
    pub record_list: Vec<ExamItem>,
}

impl LedgerRecord {
    pub fn group(group_name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            record_type: RecordType::Group,
            group_name: group_name.into(),
            description: description.into(),
            ..Self::default()
        }
    }

    pub fn student(
        user_id: impl Into<String>,
        user_name: impl Into<String>,
        group_name: impl Into<String>,
        description: impl Into<String>,
        register_ts: impl Into<String>,
    ) -> Self {
        Self {
            record_type: RecordType::Student,
            group_name: group_name.into(),
            user_id: user_id.into(),
            user_name: user_name.into(),
            description: description.into(),
            register_ts: register_ts.into(),
            record_list: Vec::new(),
        }
    }

    pub fn is_student(&self) -> bool {
        self.record_type == RecordType::Student
    }

    pub(crate) fn to_record(&self) -> anyhow::Result<Record> {
        to_object(self)
    }
}

/// One assigned exam of a student.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamItem {
    pub test_id: String,
    pub group: String,
    pub course: String,
    pub teacher: String,
    #[serde(rename = "assignedTS")]
    pub assigned_ts: String,
    #[serde(default)]
    pub rate: String,
    #[serde(rename = "executeTS", default)]
    pub execute_ts: String,
    #[serde(default)]
    pub execute_desc: String,
}

impl ExamItem {
    pub fn is_delivered(&self) -> bool {
        !self.rate.is_empty()
    }
}

/// Flattened view of one exam item for the delivery list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryRecord {
    pub user_id: String,
    pub test_id: String,
    pub user_name: String,
    pub group: String,
    pub course: String,
    #[serde(rename = "assignedTS")]
    pub assigned_ts: String,
    pub teacher: String,
    #[serde(rename = "executeTS")]
    pub execute_ts: String,
    pub rate: String,
}

impl DeliveryRecord {
    pub fn new(key: &str, student: &LedgerRecord, item: &ExamItem) -> Self {
        Self {
            user_id: key.to_string(),
            test_id: item.test_id.clone(),
            user_name: student.user_name.clone(),
            group: student.group_name.clone(),
            course: item.course.clone(),
            assigned_ts: item.assigned_ts.clone(),
            teacher: item.teacher.clone(),
            execute_ts: item.execute_ts.clone(),
            rate: item.rate.clone(),
        }
    }

    pub(crate) fn to_record(&self) -> anyhow::Result<Record> {
        to_object(self)
    }
}

fn to_object(value: &impl Serialize) -> anyhow::Result<Record> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(anyhow!("record serialized to non-object: {other}")),
    }
}

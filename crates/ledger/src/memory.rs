use std::{collections::BTreeMap, sync::Arc};

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use shared::{
    command::{AddGroup, AddUser, DeliveryItem, GenerateSet, PrepareDelivery},
    domain::{LedgerEntry, Record},
    error::FailureKind,
};
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    record::{DeliveryRecord, ExamItem, LedgerRecord, RecordType},
    Ledger, LedgerError,
};

const KEY_SPACE: u128 = 10_000_000_000_000_000;
/// RFC 1123 with a numeric zone, e.g. `Mon, 02 Jan 2006 15:04:05 -0700`.
const EXAM_TS_FORMAT: &str = "%a, %d %b %Y %H:%M:%S %z";

/// Ledger state held in process memory, keyed by 16-digit decimal strings.
#[derive(Clone, Default)]
pub struct MemoryLedger {
    records: Arc<RwLock<BTreeMap<String, LedgerRecord>>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// A ledger holding groups `AB17`..`AB20` and four students of `AB17`.
    pub async fn with_demo_records() -> Self {
        let ledger = Self::new();
        let now = register_timestamp();
        let mut seed: Vec<LedgerRecord> = (17..=20)
            .map(|n| LedgerRecord::group(format!("AB{n}"), format!("Desc AB{n}")))
            .collect();
        seed.extend((1..=4).map(|n| {
            LedgerRecord::student(
                format!("AB170{n}"),
                format!("Fighter 170{n}"),
                "AB17",
                format!("Desc 170{n}"),
                now.clone(),
            )
        }));

        let mut records = ledger.records.write().await;
        for record in seed {
            let key = fresh_key(&records);
            debug!(%key, group = %record.group_name, "seeded ledger record");
            records.insert(key, record);
        }
        drop(records);
        ledger
    }

    /// Stores `record` under an explicit key, replacing what was there.
    pub async fn put(&self, key: impl Into<String>, record: LedgerRecord) {
        self.records.write().await.insert(key.into(), record);
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    async fn list_by_type(&self, record_type: RecordType) -> Result<Vec<LedgerEntry>, LedgerError> {
        let records = self.records.read().await;
        records
            .iter()
            .filter(|(_, record)| record.record_type == record_type)
            .map(|(key, record)| -> Result<LedgerEntry, LedgerError> {
                Ok(LedgerEntry::new(key.clone(), record.to_record()?))
            })
            .collect()
    }

    async fn insert_new(&self, record: LedgerRecord) -> String {
        let mut records = self.records.write().await;
        let key = fresh_key(&records);
        records.insert(key.clone(), record);
        key
    }
}

#[async_trait]
impl Ledger for MemoryLedger {
    async fn list_groups(&self) -> Result<Vec<LedgerEntry>, LedgerError> {
        self.list_by_type(RecordType::Group).await
    }

    async fn add_group(&self, command: &AddGroup) -> Result<String, LedgerError> {
        let key = self
            .insert_new(LedgerRecord::group(
                command.group_name.clone(),
                command.description.clone(),
            ))
            .await;
        info!(%key, group = %command.group_name, "recorded new group");
        Ok(key)
    }

    async fn add_user(&self, command: &AddUser) -> Result<String, LedgerError> {
        let key = self
            .insert_new(LedgerRecord::student(
                command.student_id.clone(),
                command.student_name.clone(),
                command.group_name.clone(),
                command.description.clone(),
                register_timestamp(),
            ))
            .await;
        info!(%key, student_id = %command.student_id, "added user");
        Ok(key)
    }

    async fn list_users(&self) -> Result<Vec<LedgerEntry>, LedgerError> {
        self.list_by_type(RecordType::Student).await
    }

    async fn generate_set(&self, command: &GenerateSet) -> Result<usize, LedgerError> {
        let mut records = self.records.write().await;
        let assigned_ts = exam_timestamp();
        let mut assigned = 0;
        for record in records
            .values_mut()
            .filter(|record| record.is_student() && record.group_name == command.group_name)
        {
            record.record_list.push(ExamItem {
                test_id: test_id(),
                group: command.group_name.clone(),
                course: command.course_name.clone(),
                teacher: command.teacher_name.clone(),
                assigned_ts: assigned_ts.clone(),
                ..ExamItem::default()
            });
            assigned += 1;
        }

        if assigned == 0 {
            return Err(LedgerError::rejected(
                FailureKind::Generation,
                format!("no student records in group {}", command.group_name),
            ));
        }
        info!(
            group = %command.group_name,
            course = %command.course_name,
            assigned,
            "generated exam set"
        );
        Ok(assigned)
    }

    async fn get_user_record(&self, key: &str) -> Result<Record, LedgerError> {
        let records = self.records.read().await;
        let record = records.get(key).ok_or_else(|| {
            LedgerError::rejected(FailureKind::NotFound, "Could not locate user data")
        })?;
        Ok(record.to_record()?)
    }

    async fn prepare_for_delivery(
        &self,
        command: &PrepareDelivery,
    ) -> Result<Vec<LedgerEntry>, LedgerError> {
        let records = self.records.read().await;
        let mut entries = Vec::new();
        for (key, student) in records
            .iter()
            .filter(|(_, record)| record.is_student() && record.group_name == command.group)
        {
            for item in student
                .record_list
                .iter()
                .filter(|item| item.course == command.course)
            {
                let delivery = DeliveryRecord::new(key, student, item);
                entries.push(LedgerEntry::new(key.clone(), delivery.to_record()?));
            }
        }

        if entries.is_empty() {
            return Err(LedgerError::rejected(
                FailureKind::NotFound,
                "No group/item found",
            ));
        }
        debug!(
            group = %command.group,
            course = %command.course,
            items = entries.len(),
            "prepared delivery list"
        );
        Ok(entries)
    }

    async fn delivery_item(&self, command: &DeliveryItem) -> Result<Record, LedgerError> {
        let mut records = self.records.write().await;
        let student = records.get_mut(&command.student_id).ok_or_else(|| {
            LedgerError::rejected(
                FailureKind::Validation,
                "Could not locate selected student record",
            )
        })?;

        let item = student
            .record_list
            .iter_mut()
            .find(|item| item.course == command.course)
            .ok_or_else(|| {
                LedgerError::rejected(
                    FailureKind::Validation,
                    format!("no test assigned for course {}", command.course),
                )
            })?;
        if item.is_delivered() {
            return Err(LedgerError::rejected(
                FailureKind::Validation,
                "Selected item already delivered.",
            ));
        }

        item.rate = command.rate.clone();
        item.execute_ts = exam_timestamp();
        info!(
            key = %command.student_id,
            course = %command.course,
            rate = %command.rate,
            "delivered exam item"
        );
        Ok(student.to_record()?)
    }
}

fn fresh_key(records: &BTreeMap<String, LedgerRecord>) -> String {
    loop {
        let key = format!("{:016}", Uuid::new_v4().as_u128() % KEY_SPACE);
        if !records.contains_key(&key) {
            return key;
        }
    }
}

fn test_id() -> String {
    let (high, _) = Uuid::new_v4().as_u64_pair();
    format!("{:X}", high >> 1)
}

fn register_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn exam_timestamp() -> String {
    Utc::now().format(EXAM_TS_FORMAT).to_string()
}

#[cfg(test)]
#[path = "tests/memory_tests.rs"]
mod tests;

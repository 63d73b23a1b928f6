//! Encoding of console actions into the single path segment the ledger
//! routes expect, and the matching backend-side decoding.
//!
//! A command is an ordered tuple of field values joined by [`DELIMITER`].
//! Values are not escaped, so a value containing the delimiter cannot be
//! encoded into a path; such commands travel as query parameters instead.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::protocol::Operation;

pub const DELIMITER: &str = "-";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    #[error("missing field `{0}`")]
    MissingField(&'static str),
    #[error("field `{field}` contains the `-` delimiter: {value:?}")]
    DelimiterInField { field: &'static str, value: String },
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("Incorrect number of arguments. Expecting {expected}")]
    ArgumentCount { expected: usize, actual: usize },
}

pub trait Command: Sized {
    const OPERATION: Operation;

    /// Values in the order of [`Operation::fields`].
    fn values(&self) -> Vec<&str>;

    fn from_values(values: Vec<String>) -> Result<Self, DecodeError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddGroup {
    pub group_name: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddUser {
    pub student_id: String,
    pub student_name: String,
    pub group_name: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateSet {
    pub group_name: String,
    pub course_name: String,
    pub teacher_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrepareDelivery {
    pub group: String,
    pub course: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryItem {
    pub student_id: String,
    pub course: String,
    pub rate: String,
}

fn exact<const N: usize>(values: Vec<String>) -> Result<[String; N], DecodeError> {
    <[String; N]>::try_from(values).map_err(|values| DecodeError::ArgumentCount {
        expected: N,
        actual: values.len(),
    })
}

impl Command for AddGroup {
    const OPERATION: Operation = Operation::AddGroup;

    fn values(&self) -> Vec<&str> {
        vec![&self.group_name, &self.description]
    }

    fn from_values(values: Vec<String>) -> Result<Self, DecodeError> {
        let [group_name, description] = exact(values)?;
        Ok(Self {
            group_name,
            description,
        })
    }
}

impl Command for AddUser {
    const OPERATION: Operation = Operation::AddUser;

    fn values(&self) -> Vec<&str> {
        vec![
            &self.student_id,
            &self.student_name,
            &self.group_name,
            &self.description,
        ]
    }

    fn from_values(values: Vec<String>) -> Result<Self, DecodeError> {
        let [student_id, student_name, group_name, description] = exact(values)?;
        Ok(Self {
            student_id,
            student_name,
            group_name,
            description,
        })
    }
}

impl Command for GenerateSet {
    const OPERATION: Operation = Operation::GenerateSetForGroup;

    fn values(&self) -> Vec<&str> {
        vec![&self.group_name, &self.course_name, &self.teacher_name]
    }

    fn from_values(values: Vec<String>) -> Result<Self, DecodeError> {
        let [group_name, course_name, teacher_name] = exact(values)?;
        Ok(Self {
            group_name,
            course_name,
            teacher_name,
        })
    }
}

impl Command for PrepareDelivery {
    const OPERATION: Operation = Operation::PrepareForDelivery;

    fn values(&self) -> Vec<&str> {
        vec![&self.group, &self.course]
    }

    fn from_values(values: Vec<String>) -> Result<Self, DecodeError> {
        let [group, course] = exact(values)?;
        Ok(Self { group, course })
    }
}

impl Command for DeliveryItem {
    const OPERATION: Operation = Operation::DeliveryItem;

    fn values(&self) -> Vec<&str> {
        vec![&self.student_id, &self.course, &self.rate]
    }

    fn from_values(values: Vec<String>) -> Result<Self, DecodeError> {
        let [student_id, course, rate] = exact(values)?;
        Ok(Self {
            student_id,
            course,
            rate,
        })
    }
}

/// Joins the command's values with [`DELIMITER`].
pub fn encode_path_segment<C: Command>(command: &C) -> Result<String, EncodeError> {
    let values = command.values();
    for (field, value) in C::OPERATION.fields().iter().zip(&values) {
        if value.contains(DELIMITER) {
            return Err(EncodeError::DelimiterInField {
                field: *field,
                value: (*value).to_string(),
            });
        }
    }
    Ok(values.join(DELIMITER))
}

/// Splits a path segment on [`DELIMITER`]; the part count must match the
/// operation's field count exactly.
pub fn decode_path_segment<C: Command>(raw: &str) -> Result<C, DecodeError> {
    let values = raw.split(DELIMITER).map(str::to_string).collect();
    C::from_values(values)
}

/// Builds a command from named fields, as a console form or a query string
/// provides them. Absent fields are an error, never a placeholder value.
pub fn from_fields<C: Command>(fields: &HashMap<String, String>) -> Result<C, EncodeError> {
    let values = C::OPERATION
        .fields()
        .iter()
        .map(|name| {
            fields
                .get(*name)
                .cloned()
                .ok_or(EncodeError::MissingField(*name))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(C::from_values(values)?)
}

#[cfg(test)]
#[path = "tests/command_tests.rs"]
mod tests;

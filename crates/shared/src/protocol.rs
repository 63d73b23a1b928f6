use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::FailureKind;

pub const UNPASSED_TEST: &str = "Could not locate unpassed test";
pub const NO_GROUP_ITEM: &str = "No group/item found";
pub const USER_RECORD_NOT_FOUND: &str = "User record not found";
pub const ERROR_GENERATED: &str = "error_generated";

/// A literal response body the ledger sends in place of an error code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sentinel {
    pub body: &'static str,
    pub kind: FailureKind,
}

const VALIDATION_SENTINELS: &[Sentinel] = &[Sentinel {
    body: UNPASSED_TEST,
    kind: FailureKind::Validation,
}];
const GENERATION_SENTINELS: &[Sentinel] = &[Sentinel {
    body: ERROR_GENERATED,
    kind: FailureKind::Generation,
}];
const USER_RECORD_SENTINELS: &[Sentinel] = &[Sentinel {
    body: USER_RECORD_NOT_FOUND,
    kind: FailureKind::NotFound,
}];
const DELIVERY_LIST_SENTINELS: &[Sentinel] = &[Sentinel {
    body: NO_GROUP_ITEM,
    kind: FailureKind::NotFound,
}];

/// Every operation the route layer exposes. All of them are `GET`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    GetAllGroups,
    AddGroup,
    AddUser,
    QueryAllUsers,
    GenerateSetForGroup,
    GetUserRecord,
    PrepareForDelivery,
    DeliveryItem,
}

impl Operation {
    pub const ALL: [Operation; 8] = [
        Operation::GetAllGroups,
        Operation::AddGroup,
        Operation::AddUser,
        Operation::QueryAllUsers,
        Operation::GenerateSetForGroup,
        Operation::GetUserRecord,
        Operation::PrepareForDelivery,
        Operation::DeliveryItem,
    ];

    /// Ledger function name.
    pub fn name(self) -> &'static str {
        match self {
            Self::GetAllGroups => "queryAllGroups",
            Self::AddGroup => "addGroup",
            Self::AddUser => "addUser",
            Self::QueryAllUsers => "queryAllUsers",
            Self::GenerateSetForGroup => "generateSetForGroup",
            Self::GetUserRecord => "getUserRecord",
            Self::PrepareForDelivery => "prepareForDelivery",
            Self::DeliveryItem => "deliveryItem",
        }
    }

    /// Route prefix without any path parameter.
    pub fn route(self) -> &'static str {
        match self {
            Self::GetAllGroups => "/get_all_groups",
            Self::AddGroup => "/add_group",
            Self::AddUser => "/add_user",
            Self::QueryAllUsers => "/query_all_users",
            Self::GenerateSetForGroup => "/generate_set_for_group",
            Self::GetUserRecord => "/get_user_record",
            Self::PrepareForDelivery => "/prepare_for_delivery",
            Self::DeliveryItem => "/delivery_item",
        }
    }

    pub fn path_template(self) -> &'static str {
        match self {
            Self::GetAllGroups => "/get_all_groups/",
            Self::AddGroup => "/add_group/:newGroup",
            Self::AddUser => "/add_user/:user",
            Self::QueryAllUsers => "/query_all_users",
            Self::GenerateSetForGroup => "/generate_set_for_group/:generator",
            Self::GetUserRecord => "/get_user_record/:id",
            Self::PrepareForDelivery => "/prepare_for_delivery/:exam",
            Self::DeliveryItem => "/delivery_item/:delicase",
        }
    }

    /// Field order of the operation's command, shared by encoder and decoder.
    pub fn fields(self) -> &'static [&'static str] {
        match self {
            Self::GetAllGroups | Self::QueryAllUsers => &[],
            Self::AddGroup => &["groupName", "description"],
            Self::AddUser => &["studentId", "studentName", "groupName", "description"],
            Self::GenerateSetForGroup => &["groupName", "courseName", "teacherName"],
            Self::GetUserRecord => &["id"],
            Self::PrepareForDelivery => &["group", "course"],
            Self::DeliveryItem => &["studentId", "course", "rate"],
        }
    }

    /// Whether the success payload is a `[{Key, Record}]` collection.
    pub fn is_listing(self) -> bool {
        matches!(
            self,
            Self::GetAllGroups | Self::QueryAllUsers | Self::PrepareForDelivery
        )
    }

    pub fn sentinels(self) -> &'static [Sentinel] {
        match self {
            Self::AddGroup | Self::AddUser | Self::DeliveryItem => VALIDATION_SENTINELS,
            Self::GenerateSetForGroup => GENERATION_SENTINELS,
            Self::GetUserRecord => USER_RECORD_SENTINELS,
            Self::PrepareForDelivery => DELIVERY_LIST_SENTINELS,
            Self::GetAllGroups | Self::QueryAllUsers => &[],
        }
    }

    /// Body the route layer answers with when the ledger fails with `kind`.
    pub fn sentinel_for(self, kind: FailureKind) -> Option<&'static str> {
        self.sentinels()
            .iter()
            .find(|sentinel| sentinel.kind == kind)
            .map(|sentinel| sentinel.body)
    }

    /// Exact-match test of a raw body against this operation's sentinels.
    pub fn classify(self, body: &str) -> Option<FailureKind> {
        self.sentinels()
            .iter()
            .find(|sentinel| sentinel.body == body)
            .map(|sentinel| sentinel.kind)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Success body of the write operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusReply {
    pub status: String,
    #[serde(rename = "Key", default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned: Option<usize>,
}

impl StatusReply {
    pub fn recorded(key: impl Into<String>) -> Self {
        Self {
            status: "recorded".to_string(),
            key: Some(key.into()),
            assigned: None,
        }
    }

    pub fn generated(assigned: usize) -> Self {
        Self {
            status: "generated".to_string(),
            key: None,
            assigned: Some(assigned),
        }
    }
}

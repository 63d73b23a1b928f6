use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Named fields of a ledger record. The shape depends on the operation that
/// produced it, so it stays an untyped JSON object on the client side.
pub type Record = Map<String, Value>;

/// Success body of a status-style operation. Anything that is not a known
/// failure sentinel is accepted as-is.
pub type Payload = Value;

pub const KEY_FIELD: &str = "Key";

/// One `{Key, Record}` pair as the ledger returns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    #[serde(rename = "Key")]
    pub key: String,
    #[serde(rename = "Record")]
    pub record: Record,
}

impl LedgerEntry {
    pub fn new(key: impl Into<String>, record: Record) -> Self {
        Self {
            key: key.into(),
            record,
        }
    }
}

/// A record with its container key merged in. Only constructible from a
/// [`LedgerEntry`], so a displayed record always carries its key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyedRecord {
    #[serde(rename = "Key")]
    key: String,
    #[serde(flatten)]
    fields: Record,
}

impl KeyedRecord {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn fields(&self) -> &Record {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        if name == KEY_FIELD {
            return None;
        }
        self.fields.get(name)
    }

    pub fn str_field(&self, name: &str) -> Option<&str> {
        self.field(name).and_then(Value::as_str)
    }

    /// The record's fields plus `Key`, as one flat object.
    pub fn into_record(self) -> Record {
        let mut fields = self.fields;
        fields.insert(KEY_FIELD.to_string(), Value::String(self.key));
        fields
    }
}

impl From<LedgerEntry> for KeyedRecord {
    fn from(entry: LedgerEntry) -> Self {
        let mut fields = entry.record;
        // The container key wins over any `Key` the record already carried.
        fields.remove(KEY_FIELD);
        Self {
            key: entry.key,
            fields,
        }
    }
}

use derive_more::Deref;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

///
/// RawEventRecord
///
/// One externally-sourced event record as fetched by the caller. The shape
/// varies by source feed; the normalizer reads it through alias tables.
///

#[derive(Clone, Debug, Default, Deref, Deserialize, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RawEventRecord(Map<String, Value>);

impl RawEventRecord {
    #[must_use]
    pub const fn new(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Wrap a JSON value, or `None` when it is not an object.
    #[must_use]
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for RawEventRecord {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl From<RawEventRecord> for Value {
    fn from(record: RawEventRecord) -> Self {
        Self::Object(record.0)
    }
}

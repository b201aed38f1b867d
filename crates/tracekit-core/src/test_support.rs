//! Shared fixtures for engine tests.

use crate::event::RawEventRecord;
use serde_json::Value;

/// Build one raw record from a JSON object literal.
pub(crate) fn record(value: Value) -> RawEventRecord {
    RawEventRecord::from_value(value).expect("fixture record should be a JSON object")
}

/// Build one source list from a JSON array literal.
pub(crate) fn records(value: Value) -> Vec<RawEventRecord> {
    match value {
        Value::Array(items) => items.into_iter().map(record).collect(),
        other => panic!("fixture source should be a JSON array, got {other}"),
    }
}

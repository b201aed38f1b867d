//! Ordered alias resolution over loosely-shaped JSON records.
//!
//! Every logical field owns one alias list; lookups walk it in order and the
//! first usable value wins. Nothing here fails: an alias holding the wrong
//! shape is simply not usable.

use serde_json::{Map, Value};

/// Ordered alias list for one logical field.
pub type Aliases = &'static [&'static str];

pub const EVENT_ID: Aliases = &["event_id", "eventId", "id"];
pub const EVENT_TYPE: Aliases = &["event_type", "eventType", "type"];
pub const ACTION: Aliases = &["action"];
pub const BIZ_STEP: Aliases = &["biz_step", "bizStep"];
pub const DISPOSITION: Aliases = &["disposition"];
pub const EVENT_TIME: Aliases = &["event_time", "eventTime"];
pub const READ_POINT: Aliases = &["read_point", "readPoint"];
pub const BIZ_LOCATION: Aliases = &["biz_location", "bizLocation"];
pub const EPC_LIST: Aliases = &["epc_list", "epcList"];
pub const OWNER_ROLE: Aliases = &["owner_role", "event_owner_role", "batch_owner_role"];
pub const ILMD: Aliases = &["ilmd"];
pub const EXTENSIONS: Aliases = &["extensions"];
pub const PASSPORT: Aliases = &["dpp"];

/// Per-event embedded traceability sub-lists.
pub const TRACEABILITY: Aliases = &["traceability", "trace_events"];

/// Return the first alias holding a non-null value.
#[must_use]
pub fn first_present<'a>(record: &'a Map<String, Value>, aliases: &[&str]) -> Option<&'a Value> {
    aliases
        .iter()
        .find_map(|alias| record.get(*alias).filter(|value| !value.is_null()))
}

/// Return the first alias that reads as non-empty text.
#[must_use]
pub fn first_text(record: &Map<String, Value>, aliases: &[&str]) -> Option<String> {
    aliases
        .iter()
        .find_map(|alias| record.get(*alias).and_then(text_of))
}

/// Return the first alias holding a JSON object.
#[must_use]
pub fn first_object<'a>(
    record: &'a Map<String, Value>,
    aliases: &[&str],
) -> Option<&'a Map<String, Value>> {
    aliases
        .iter()
        .find_map(|alias| record.get(*alias).and_then(Value::as_object))
}

/// Read one value as text.
///
/// Strings are kept verbatim unless blank, numbers render to their decimal
/// form, and an object carrying a textual `id` (the EPCIS `{ "id": ... }`
/// location form) yields that id.
#[must_use]
pub fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::String(text) if !text.trim().is_empty() => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Object(map) => match map.get("id") {
            Some(Value::String(id)) if !id.trim().is_empty() => Some(id.clone()),
            _ => None,
        },
        _ => None,
    }
}

/// Read one value as a list of identifiers.
///
/// Arrays keep their text-like elements; a lone string counts as a list of
/// one. Anything else is empty.
pub fn text_list(value: &Value) -> impl Iterator<Item = String> + '_ {
    let items: &[Value] = match value {
        Value::Array(items) => items,
        Value::String(_) => std::slice::from_ref(value),
        _ => &[],
    };

    items.iter().filter_map(|item| match item {
        Value::Object(_) => None,
        other => text_of(other),
    })
}

///
/// TESTS
///
